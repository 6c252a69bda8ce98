//! Catalog file parsing.
//!
//! A catalog file is a YAML document describing the attribute hierarchy,
//! the products and their values, plus the company/footer blocks used by
//! the workbook header. Parsed records are routed through the catalog's
//! validating constructors, so file input is held to the same invariants
//! as programmatic input (duplicate codes, unknown references, back-link
//! choice sets).

use crate::catalog::Catalog;
use crate::error::{DatasheetError, DatasheetResult};
use crate::layout::FooterBlock;
use crate::types::{
    Company, Field, FieldType, Group, Product, ProductImage, Section, SectionColumn, Template, Uom,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Everything a catalog file provides for an export run.
#[derive(Debug)]
pub struct LoadedCatalog {
    pub catalog: Catalog,
    pub company: Option<Company>,
    pub footer: FooterBlock,
}

//==============================================================================
// Raw file shape
//==============================================================================

#[derive(Debug, Deserialize)]
struct RawCatalog {
    #[serde(default)]
    company: Option<RawCompany>,
    #[serde(default)]
    footer: Option<RawFooter>,
    #[serde(default)]
    sections: Vec<RawSection>,
    #[serde(default)]
    groups: Vec<RawGroup>,
    #[serde(default)]
    fields: Vec<RawField>,
    #[serde(default)]
    products: Vec<RawProduct>,
}

#[derive(Debug, Deserialize)]
struct RawCompany {
    name: String,
    #[serde(default)]
    address: Vec<String>,
    #[serde(default)]
    vat: Option<String>,
    #[serde(default)]
    logo: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawFooter {
    #[serde(default)]
    legal: String,
    #[serde(default)]
    note: String,
    #[serde(default)]
    legal_row_height: Option<f64>,
    #[serde(default)]
    note_row_height: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawSection {
    code: String,
    name: String,
    sequence: u32,
    #[serde(default = "default_true")]
    export: bool,
    #[serde(default)]
    columns: Vec<RawColumn>,
}

#[derive(Debug, Deserialize)]
struct RawColumn {
    group: String,
    index: u16,
    label: String,
}

#[derive(Debug, Deserialize)]
struct RawGroup {
    code: String,
    name: String,
    sequence: u32,
    section: String,
    #[serde(default = "default_true")]
    export: bool,
}

#[derive(Debug, Deserialize)]
struct RawField {
    code: String,
    name: String,
    #[serde(rename = "type")]
    field_type: FieldType,
    #[serde(default)]
    uom: Option<Uom>,
    #[serde(default = "default_true")]
    export: bool,
    #[serde(default)]
    readonly: bool,
    #[serde(default)]
    related_product_field: Option<String>,
    #[serde(default)]
    group_uoms: HashMap<String, Uom>,
}

#[derive(Debug, Deserialize)]
struct RawProduct {
    code: String,
    name: String,
    #[serde(default)]
    photo: Option<String>,
    #[serde(default)]
    attributes: HashMap<String, String>,
    #[serde(default)]
    attribute_choices: HashMap<String, Vec<String>>,
    #[serde(default)]
    seller: Option<RawCompany>,
    #[serde(default)]
    values: Vec<RawValue>,
    #[serde(default)]
    images: Vec<RawImage>,
}

#[derive(Debug, Deserialize)]
struct RawValue {
    group: String,
    field: String,
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    sequence: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawImage {
    section: String,
    name: String,
    path: String,
}

fn default_true() -> bool {
    true
}

//==============================================================================
// Entry points
//==============================================================================

/// Parse a catalog file and build the validated in-memory store.
pub fn parse_catalog(path: &Path) -> DatasheetResult<LoadedCatalog> {
    let content = std::fs::read_to_string(path)?;
    let raw: RawCatalog = serde_yaml::from_str(&content)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    build_catalog(raw, base_dir)
}

/// Load a template workbook from disk.
pub fn load_template(path: &Path) -> DatasheetResult<Template> {
    let data = std::fs::read(path)?;
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("template")
        .to_string();
    Ok(Template::new(&name, data))
}

fn build_catalog(raw: RawCatalog, base_dir: &Path) -> DatasheetResult<LoadedCatalog> {
    let mut catalog = Catalog::new();

    // Sections first without their columns: column targets are groups,
    // which are declared after the sections that own them.
    for raw_section in &raw.sections {
        let mut section = Section::new(&raw_section.code, &raw_section.name, raw_section.sequence);
        section.export = raw_section.export;
        catalog.add_section(section)?;
    }

    for raw_group in &raw.groups {
        let mut group = Group::new(
            &raw_group.code,
            &raw_group.name,
            raw_group.sequence,
            &raw_group.section,
        );
        group.export = raw_group.export;
        catalog.add_group(group)?;
    }

    for raw_section in &raw.sections {
        if raw_section.columns.is_empty() {
            continue;
        }
        let columns = raw_section
            .columns
            .iter()
            .map(|c| SectionColumn {
                group: c.group.clone(),
                index: c.index,
                label: c.label.clone(),
            })
            .collect();
        catalog.set_section_columns(&raw_section.code, columns)?;
    }

    for raw_field in raw.fields {
        let mut field = Field::new(&raw_field.code, &raw_field.name, raw_field.field_type);
        field.uom = raw_field.uom;
        field.export = raw_field.export;
        field.readonly = raw_field.readonly;
        field.related_product_field = raw_field.related_product_field;
        field.group_uoms = raw_field.group_uoms;
        catalog.add_field(field)?;
    }

    for raw_product in raw.products {
        let mut product = Product::new(&raw_product.code, &raw_product.name);
        product.attributes = raw_product.attributes;
        product.attribute_choices = raw_product.attribute_choices;
        if let Some(photo) = &raw_product.photo {
            product.photo = Some(read_asset(base_dir, photo)?);
        }
        if let Some(seller) = raw_product.seller {
            product.seller = Some(company_from(seller, base_dir)?);
        }
        catalog.add_product(product)?;

        for raw_value in &raw_product.values {
            catalog.set_value(
                &raw_product.code,
                &raw_value.group,
                &raw_value.field,
                raw_value.value.as_deref(),
            )?;
            if let Some(sequence) = raw_value.sequence {
                catalog.set_value_sequence(
                    &raw_product.code,
                    &raw_value.group,
                    &raw_value.field,
                    sequence,
                )?;
            }
        }

        for raw_image in &raw_product.images {
            catalog.add_image(ProductImage::new(
                &raw_product.code,
                &raw_image.section,
                &raw_image.name,
                read_asset(base_dir, &raw_image.path)?,
            ))?;
        }
    }

    let company = match raw.company {
        Some(c) => Some(company_from(c, base_dir)?),
        None => None,
    };

    let mut footer = FooterBlock::default();
    if let Some(raw_footer) = raw.footer {
        footer.legal = raw_footer.legal;
        footer.note = raw_footer.note;
        if let Some(height) = raw_footer.legal_row_height {
            footer.legal_row_height = height;
        }
        if let Some(height) = raw_footer.note_row_height {
            footer.note_row_height = height;
        }
    }

    Ok(LoadedCatalog {
        catalog,
        company,
        footer,
    })
}

fn company_from(raw: RawCompany, base_dir: &Path) -> DatasheetResult<Company> {
    let logo = match &raw.logo {
        Some(path) => Some(read_asset(base_dir, path)?),
        None => None,
    };
    Ok(Company {
        name: raw.name,
        address: raw.address,
        vat: raw.vat,
        logo,
    })
}

fn read_asset(base_dir: &Path, relative: &str) -> DatasheetResult<Vec<u8>> {
    let path = base_dir.join(relative);
    std::fs::read(&path).map_err(|e| {
        DatasheetError::Validation(format!("cannot read asset '{}': {}", path.display(), e))
    })
}
