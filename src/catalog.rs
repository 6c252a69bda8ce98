//! Attribute data model store.
//!
//! Owns the Section/Group/Field hierarchy, the per-product value rows and
//! attached images, and enforces the model invariants: global code
//! uniqueness per kind, section-derived-from-group consistency, derived
//! value previews, and back-link propagation into native product
//! attributes.

use crate::error::{DatasheetError, DatasheetResult};
use crate::types::{Field, Group, Product, ProductImage, Section, SectionColumn, Value};
use tracing::debug;

#[derive(Debug, Default)]
pub struct Catalog {
    sections: Vec<Section>,
    groups: Vec<Group>,
    fields: Vec<Field>,
    values: Vec<Value>,
    images: Vec<ProductImage>,
    products: Vec<Product>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    //--------------------------------------------------------------------------
    // Hierarchy records
    //--------------------------------------------------------------------------

    pub fn add_section(&mut self, section: Section) -> DatasheetResult<()> {
        if self.section(&section.code).is_some() {
            return Err(DatasheetError::Validation(format!(
                "section code '{}' already exists",
                section.code
            )));
        }
        for column in &section.columns {
            if self.group(&column.group).is_none() {
                return Err(DatasheetError::Validation(format!(
                    "section '{}' declares a column for unknown group '{}'",
                    section.code, column.group
                )));
            }
        }
        self.sections.push(section);
        Ok(())
    }

    pub fn add_group(&mut self, group: Group) -> DatasheetResult<()> {
        if self.group(&group.code).is_some() {
            return Err(DatasheetError::Validation(format!(
                "group code '{}' already exists",
                group.code
            )));
        }
        if self.section(&group.section).is_none() {
            return Err(DatasheetError::Validation(format!(
                "group '{}' references unknown section '{}'",
                group.code, group.section
            )));
        }
        self.groups.push(group);
        Ok(())
    }

    pub fn add_field(&mut self, field: Field) -> DatasheetResult<()> {
        if self.field(&field.code).is_some() {
            return Err(DatasheetError::Validation(format!(
                "field code '{}' already exists",
                field.code
            )));
        }
        self.fields.push(field);
        Ok(())
    }

    /// Rename a section. Renaming to the current code is a no-op; renaming
    /// to a code held by a different section is rejected.
    pub fn rename_section(&mut self, code: &str, new_code: &str) -> DatasheetResult<()> {
        if code != new_code && self.section(new_code).is_some() {
            return Err(DatasheetError::Validation(format!(
                "section code '{}' already exists",
                new_code
            )));
        }
        let section = self
            .sections
            .iter_mut()
            .find(|s| s.code == code)
            .ok_or_else(|| {
                DatasheetError::Validation(format!("unknown section '{}'", code))
            })?;
        section.code = new_code.to_string();
        for group in &mut self.groups {
            if group.section == code {
                group.section = new_code.to_string();
            }
        }
        for image in &mut self.images {
            if image.section == code {
                image.section = new_code.to_string();
            }
        }
        Ok(())
    }

    pub fn rename_group(&mut self, code: &str, new_code: &str) -> DatasheetResult<()> {
        if code != new_code && self.group(new_code).is_some() {
            return Err(DatasheetError::Validation(format!(
                "group code '{}' already exists",
                new_code
            )));
        }
        let group = self
            .groups
            .iter_mut()
            .find(|g| g.code == code)
            .ok_or_else(|| DatasheetError::Validation(format!("unknown group '{}'", code)))?;
        group.code = new_code.to_string();
        for value in &mut self.values {
            if value.group == code {
                value.group = new_code.to_string();
            }
        }
        for section in &mut self.sections {
            for column in &mut section.columns {
                if column.group == code {
                    column.group = new_code.to_string();
                }
            }
        }
        Ok(())
    }

    pub fn rename_field(&mut self, code: &str, new_code: &str) -> DatasheetResult<()> {
        if code != new_code && self.field(new_code).is_some() {
            return Err(DatasheetError::Validation(format!(
                "field code '{}' already exists",
                new_code
            )));
        }
        let field = self
            .fields
            .iter_mut()
            .find(|f| f.code == code)
            .ok_or_else(|| DatasheetError::Validation(format!("unknown field '{}'", code)))?;
        field.code = new_code.to_string();
        for value in &mut self.values {
            if value.field == code {
                value.field = new_code.to_string();
            }
        }
        Ok(())
    }

    /// Replace a section's declared value columns. Column targets must be
    /// existing groups.
    pub fn set_section_columns(
        &mut self,
        code: &str,
        columns: Vec<SectionColumn>,
    ) -> DatasheetResult<()> {
        for column in &columns {
            if self.group(&column.group).is_none() {
                return Err(DatasheetError::Validation(format!(
                    "section '{}' declares a column for unknown group '{}'",
                    code, column.group
                )));
            }
        }
        let section = self
            .sections
            .iter_mut()
            .find(|s| s.code == code)
            .ok_or_else(|| DatasheetError::Validation(format!("unknown section '{}'", code)))?;
        section.columns = columns;
        Ok(())
    }

    pub fn section(&self, code: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.code == code)
    }

    pub fn group(&self, code: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.code == code)
    }

    pub fn field(&self, code: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.code == code)
    }

    /// Owning section of a group, resolved transitively. A value row never
    /// stores a section of its own, so it cannot disagree with its group.
    pub fn section_of_group(&self, group_code: &str) -> Option<&Section> {
        self.group(group_code).and_then(|g| self.section(&g.section))
    }

    /// Display name of a group: `"{name} ({section.name})"`.
    pub fn group_display_name(&self, group_code: &str) -> Option<String> {
        let group = self.group(group_code)?;
        let section = self.section(&group.section)?;
        Some(format!("{} ({})", group.name, section.name))
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    //--------------------------------------------------------------------------
    // Products and images
    //--------------------------------------------------------------------------

    pub fn add_product(&mut self, product: Product) -> DatasheetResult<()> {
        if self.product(&product.code).is_some() {
            return Err(DatasheetError::Validation(format!(
                "product code '{}' already exists",
                product.code
            )));
        }
        self.products.push(product);
        Ok(())
    }

    pub fn product(&self, code: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.code == code)
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn add_image(&mut self, image: ProductImage) -> DatasheetResult<()> {
        if self.product(&image.product).is_none() {
            return Err(DatasheetError::Validation(format!(
                "image '{}' references unknown product '{}'",
                image.name, image.product
            )));
        }
        if self.section(&image.section).is_none() {
            return Err(DatasheetError::Validation(format!(
                "image '{}' references unknown section '{}'",
                image.name, image.section
            )));
        }
        self.images.push(image);
        Ok(())
    }

    /// Set the same photo on every listed product in one pass.
    pub fn assign_photo(&mut self, product_codes: &[String], data: &[u8]) -> DatasheetResult<()> {
        for code in product_codes {
            let product = self
                .products
                .iter_mut()
                .find(|p| p.code == *code)
                .ok_or_else(|| {
                    DatasheetError::Validation(format!("unknown product '{}'", code))
                })?;
            product.photo = Some(data.to_vec());
        }
        Ok(())
    }

    /// Images attached to (product, section), in insertion order.
    pub fn images_for(&self, product: &str, section: &str) -> Vec<&ProductImage> {
        self.images
            .iter()
            .filter(|i| i.product == product && i.section == section && i.active)
            .collect()
    }

    //--------------------------------------------------------------------------
    // Value rows
    //--------------------------------------------------------------------------

    /// Create or update the value row for (product, group, field).
    ///
    /// Updating recomputes `value_display` and propagates the raw value
    /// into the field's back-linked native product attribute, validating
    /// against the attribute's declared choice set.
    pub fn set_value(
        &mut self,
        product: &str,
        group: &str,
        field: &str,
        raw: Option<&str>,
    ) -> DatasheetResult<()> {
        if self.product(product).is_none() {
            return Err(DatasheetError::Validation(format!(
                "unknown product '{}'",
                product
            )));
        }
        if self.group(group).is_none() {
            return Err(DatasheetError::Validation(format!("unknown group '{}'", group)));
        }
        if self.field(field).is_none() {
            return Err(DatasheetError::Validation(format!("unknown field '{}'", field)));
        }

        self.sync_backlink(product, field, raw)?;

        if let Some(existing) = self
            .values
            .iter_mut()
            .find(|v| v.product == product && v.group == group && v.field == field)
        {
            existing.set_raw(raw);
        } else {
            let sequence = self.next_sequence(product);
            debug!(product, group, field, sequence, "creating value row");
            self.values
                .push(Value::new(product, group, field, raw, sequence));
        }
        Ok(())
    }

    /// Override the user-controlled ordering position of a value row.
    pub fn set_value_sequence(
        &mut self,
        product: &str,
        group: &str,
        field: &str,
        sequence: u32,
    ) -> DatasheetResult<()> {
        let row = self
            .values
            .iter_mut()
            .find(|v| v.product == product && v.group == group && v.field == field)
            .ok_or_else(|| {
                DatasheetError::Validation(format!(
                    "no value for product '{}', group '{}', field '{}'",
                    product, group, field
                ))
            })?;
        row.sequence = sequence;
        Ok(())
    }

    /// Attach a (group, field) pair to a set of products, inserting each
    /// new row after an anchor position. Existing rows are left untouched.
    ///
    /// Sequence of the new row, in order of preference: the anchor row's
    /// sequence + 1; the last sequence in the anchor group + 1; the last
    /// sequence for the product + 1; 0.
    pub fn attach_field(
        &mut self,
        product_codes: &[String],
        group: &str,
        field: &str,
        anchor: Option<(&str, &str)>,
    ) -> DatasheetResult<()> {
        let field_rec = self
            .field(field)
            .ok_or_else(|| DatasheetError::Validation(format!("unknown field '{}'", field)))?;
        if self.group(group).is_none() {
            return Err(DatasheetError::Validation(format!("unknown group '{}'", group)));
        }
        let backlink = field_rec.related_product_field.clone();

        for code in product_codes {
            let product = self
                .product(code)
                .ok_or_else(|| DatasheetError::Validation(format!("unknown product '{}'", code)))?;

            if self.value_row(code, group, field).is_some() {
                continue;
            }

            let sequence = match anchor {
                Some((anchor_group, anchor_field)) => {
                    if let Some(row) = self.value_row(code, anchor_group, anchor_field) {
                        row.sequence + 1
                    } else if let Some(last) = self
                        .values
                        .iter()
                        .filter(|v| v.product == *code && v.group == anchor_group)
                        .map(|v| v.sequence)
                        .max()
                    {
                        last + 1
                    } else {
                        self.next_sequence(code)
                    }
                }
                None => self.next_sequence(code),
            };

            // Seed from the back-linked native attribute where one exists.
            let raw = backlink
                .as_deref()
                .and_then(|attr| product.attributes.get(attr))
                .cloned();

            debug!(product = code.as_str(), group, field, sequence, "attaching field");
            self.values
                .push(Value::new(code, group, field, raw.as_deref(), sequence));
        }
        Ok(())
    }

    /// Remove the (group, field) rows from a set of products.
    pub fn detach_field(&mut self, product_codes: &[String], group: &str, field: &str) {
        self.values.retain(|v| {
            !(v.group == group && v.field == field && product_codes.contains(&v.product))
        });
    }

    fn value_row(&self, product: &str, group: &str, field: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|v| v.product == product && v.group == group && v.field == field)
    }

    fn next_sequence(&self, product: &str) -> u32 {
        self.values
            .iter()
            .filter(|v| v.product == product)
            .map(|v| v.sequence + 1)
            .max()
            .unwrap_or(0)
    }

    fn sync_backlink(&mut self, product: &str, field: &str, raw: Option<&str>) -> DatasheetResult<()> {
        let Some(attr) = self
            .field(field)
            .and_then(|f| f.related_product_field.clone())
        else {
            return Ok(());
        };
        let raw = raw.unwrap_or("");
        let prod = self
            .products
            .iter_mut()
            .find(|p| p.code == product)
            .expect("product existence checked by caller");
        if let Some(choices) = prod.attribute_choices.get(&attr) {
            if !choices.iter().any(|c| c == raw) {
                return Err(DatasheetError::Validation(format!(
                    "value '{}' is not an allowed choice for product attribute '{}'",
                    raw, attr
                )));
            }
        }
        prod.attributes.insert(attr, raw.to_string());
        Ok(())
    }

    //--------------------------------------------------------------------------
    // Ordered export queries
    //--------------------------------------------------------------------------

    /// Sections included in ad-hoc export, ordered by sequence.
    pub fn export_sections(&self) -> Vec<&Section> {
        let mut sections: Vec<&Section> = self
            .sections
            .iter()
            .filter(|s| s.export && s.active)
            .collect();
        sections.sort_by_key(|s| s.sequence);
        sections
    }

    /// Exported groups of a section, ordered by sequence.
    pub fn export_groups(&self, section: &str) -> Vec<&Group> {
        let mut groups: Vec<&Group> = self
            .groups
            .iter()
            .filter(|g| g.section == section && g.export && g.active)
            .collect();
        groups.sort_by_key(|g| g.sequence);
        groups
    }

    /// A product's value rows in a group, restricted to exported fields,
    /// ordered by sequence. Each row is paired with its field record.
    pub fn export_values(&self, product: &str, group: &str) -> Vec<(&Value, &Field)> {
        let mut rows: Vec<(&Value, &Field)> = self
            .values
            .iter()
            .filter(|v| v.product == product && v.group == group && v.active)
            .filter_map(|v| self.field(&v.field).map(|f| (v, f)))
            .filter(|(_, f)| f.export && f.active)
            .collect();
        rows.sort_by_key(|(v, _)| v.sequence);
        rows
    }

    /// The single value row matching the exact (product, section, group,
    /// field) path, or None. The section is checked against the group's
    /// owning section.
    pub fn value_at(
        &self,
        product: &str,
        section: &str,
        group: &str,
        field: &str,
    ) -> Option<&Value> {
        let owner = self.section_of_group(group)?;
        if owner.code != section {
            return None;
        }
        self.value_row(product, group, field)
    }

    /// All of a product's rows in full export order:
    /// (section.sequence, group.sequence, value.sequence) ascending.
    pub fn ordered_values(&self, product: &str) -> Vec<(&Section, &Group, &Value)> {
        let mut rows: Vec<(&Section, &Group, &Value)> = self
            .values
            .iter()
            .filter(|v| v.product == product && v.active)
            .filter_map(|v| {
                let group = self.group(&v.group)?;
                let section = self.section(&group.section)?;
                Some((section, group, v))
            })
            .collect();
        rows.sort_by_key(|(s, g, v)| (s.sequence, g.sequence, v.sequence));
        rows
    }
}
