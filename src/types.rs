use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

//==============================================================================
// Field typing
//==============================================================================

/// Declared type of a datasheet field.
///
/// The declared type governs *formatting*; whether a raw value actually
/// parses governs fallback safety (see `format::format_value`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Number,
    String,
    Html,
    Selection,
    Boolean,
    Date,
    Datetime,
}

/// Unit of measure attached to a field, optionally overridden per group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Uom {
    Gr,
    CfuG,
    M3,
    Cm,
    Cm3,
    Mm,
    Ud,
    Ug,
    Box,
    Mg,
    Kcal,
    Kj,
    Kg,
    L,
}

impl Uom {
    /// Localization key for the display string of this unit.
    pub fn key(&self) -> &'static str {
        match self {
            Uom::Gr => "uom.gr",
            Uom::CfuG => "uom.cfu_g",
            Uom::M3 => "uom.m3",
            Uom::Cm => "uom.cm",
            Uom::Cm3 => "uom.cm3",
            Uom::Mm => "uom.mm",
            Uom::Ud => "uom.ud",
            Uom::Ug => "uom.ug",
            Uom::Box => "uom.box",
            Uom::Mg => "uom.mg",
            Uom::Kcal => "uom.kcal",
            Uom::Kj => "uom.kj",
            Uom::Kg => "uom.kg",
            Uom::L => "uom.l",
        }
    }
}

/// Closed set of entity kinds addressable from placeholder paths.
///
/// Dispatch over this enum replaces dynamic lookup by string-composed
/// model names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Section,
    Group,
    Field,
}

impl EntityKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "section" => Some(EntityKind::Section),
            "group" => Some(EntityKind::Group),
            "field" => Some(EntityKind::Field),
            _ => None,
        }
    }
}

//==============================================================================
// Attribute hierarchy: Section -> Group -> Field
//==============================================================================

/// Top-level category of a product datasheet (e.g. "Nutritional Information").
#[derive(Debug, Clone)]
pub struct Section {
    pub code: String,
    pub name: String,
    pub sequence: u32,
    pub export: bool,
    pub active: bool,
    pub timestamp: DateTime<Utc>,
    /// Declared value columns. Empty means the section renders as stacked
    /// blocks with a single value column (column B).
    pub columns: Vec<SectionColumn>,
}

impl Section {
    pub fn new(code: &str, name: &str, sequence: u32) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            sequence,
            export: true,
            active: true,
            timestamp: Utc::now(),
            columns: Vec::new(),
        }
    }

    /// True when the section renders as a row-per-field / column-per-group
    /// table.
    pub fn is_column_table(&self) -> bool {
        !self.columns.is_empty()
    }

    /// Declared column for a group, if the group participates in the table.
    pub fn column_for(&self, group_code: &str) -> Option<&SectionColumn> {
        self.columns.iter().find(|c| c.group == group_code)
    }

    /// Number of value columns reserved after column A.
    pub fn reserved_columns(&self) -> u16 {
        if self.columns.is_empty() {
            1
        } else {
            self.columns.iter().map(|c| c.index).max().unwrap_or(1)
        }
    }
}

/// Section-scoped tabular layout directive: maps a group to a display
/// column within its owning section.
#[derive(Debug, Clone)]
pub struct SectionColumn {
    pub group: String,
    /// 1-based value-column index: 1 is sheet column B, 2 is C, ...
    pub index: u16,
    pub label: String,
}

/// Named subdivision within a section (e.g. "Per 100g").
#[derive(Debug, Clone)]
pub struct Group {
    pub code: String,
    pub name: String,
    pub sequence: u32,
    pub export: bool,
    pub active: bool,
    pub timestamp: DateTime<Utc>,
    pub section: String,
}

impl Group {
    pub fn new(code: &str, name: &str, sequence: u32, section: &str) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            sequence,
            export: true,
            active: true,
            timestamp: Utc::now(),
            section: section.to_string(),
        }
    }
}

/// A typed attribute definition, reusable across products.
#[derive(Debug, Clone)]
pub struct Field {
    pub code: String,
    pub name: String,
    pub field_type: FieldType,
    pub uom: Option<Uom>,
    pub export: bool,
    pub readonly: bool,
    pub active: bool,
    pub timestamp: DateTime<Utc>,
    /// Name of the native product attribute kept in sync with this
    /// field's values, if any.
    pub related_product_field: Option<String>,
    /// Per-group unit overrides: a field may report grams in one group's
    /// context and a percentage in another's. An absent entry falls back
    /// to `uom`.
    pub group_uoms: HashMap<String, Uom>,
}

impl Field {
    pub fn new(code: &str, name: &str, field_type: FieldType) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            field_type,
            uom: None,
            export: true,
            readonly: false,
            active: true,
            timestamp: Utc::now(),
            related_product_field: None,
            group_uoms: HashMap::new(),
        }
    }

    pub fn with_uom(mut self, uom: Uom) -> Self {
        self.uom = Some(uom);
        self
    }

    /// Unit resolution: per-group override first, else the default unit.
    pub fn uom_for(&self, group_code: &str) -> Option<Uom> {
        self.group_uoms.get(group_code).copied().or(self.uom)
    }
}

//==============================================================================
// Per-product data
//==============================================================================

/// Maximum length of the derived `value_display` string.
pub const VALUE_DISPLAY_LEN: usize = 50;

/// A product's concrete datum for one field within one group. The owning
/// section is derived transitively from the group.
#[derive(Debug, Clone)]
pub struct Value {
    pub product: String,
    pub group: String,
    pub field: String,
    pub value: Option<String>,
    pub sequence: u32,
    /// Derived preview, recomputed on every write of `value`.
    pub value_display: String,
    pub active: bool,
    pub timestamp: DateTime<Utc>,
}

impl Value {
    pub fn new(product: &str, group: &str, field: &str, raw: Option<&str>, sequence: u32) -> Self {
        Self {
            product: product.to_string(),
            group: group.to_string(),
            field: field.to_string(),
            value: raw.map(str::to_string),
            sequence,
            value_display: display_of(raw),
            active: true,
            timestamp: Utc::now(),
        }
    }

    pub fn set_raw(&mut self, raw: Option<&str>) {
        self.value = raw.map(str::to_string);
        self.value_display = display_of(raw);
    }
}

/// Truncate-and-ellipsize at `VALUE_DISPLAY_LEN` characters.
pub fn display_of(raw: Option<&str>) -> String {
    let raw = raw.unwrap_or("");
    if raw.chars().count() <= VALUE_DISPLAY_LEN {
        raw.to_string()
    } else {
        let head: String = raw.chars().take(VALUE_DISPLAY_LEN - 3).collect();
        format!("{}...", head)
    }
}

/// Illustrative artwork attached to a product and a section, placed
/// inline during export.
#[derive(Debug, Clone)]
pub struct ProductImage {
    pub product: String,
    pub section: String,
    pub name: String,
    pub data: Vec<u8>,
    pub active: bool,
    pub timestamp: DateTime<Utc>,
}

impl ProductImage {
    pub fn new(product: &str, section: &str, name: &str, data: Vec<u8>) -> Self {
        Self {
            product: product.to_string(),
            section: section.to_string(),
            name: name.to_string(),
            data,
            active: true,
            timestamp: Utc::now(),
        }
    }
}

/// Supplier / company block data for the workbook header.
#[derive(Debug, Clone, Default)]
pub struct Company {
    pub name: String,
    pub address: Vec<String>,
    pub vat: Option<String>,
    pub logo: Option<Vec<u8>>,
}

/// A product variant owning a datasheet.
#[derive(Debug, Clone)]
pub struct Product {
    pub code: String,
    pub name: String,
    pub photo: Option<Vec<u8>>,
    /// Native attributes, targets of field back-links.
    pub attributes: HashMap<String, String>,
    /// Allowed choice sets for selection-typed native attributes.
    pub attribute_choices: HashMap<String, Vec<String>>,
    pub seller: Option<Company>,
}

impl Product {
    pub fn new(code: &str, name: &str) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            photo: None,
            attributes: HashMap::new(),
            attribute_choices: HashMap::new(),
            seller: None,
        }
    }
}

/// A named workbook file containing placeholder tokens. Immutable once
/// attached to an export run.
#[derive(Debug, Clone)]
pub struct Template {
    pub name: String,
    pub data: Vec<u8>,
}

impl Template {
    pub fn new(name: &str, data: Vec<u8>) -> Self {
        Self {
            name: name.to_string(),
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_short_value_unchanged() {
        assert_eq!(display_of(Some("hello")), "hello");
    }

    #[test]
    fn display_exactly_fifty_chars_unchanged() {
        let raw = "x".repeat(50);
        assert_eq!(display_of(Some(raw.as_str())), raw);
    }

    #[test]
    fn display_long_value_ellipsized() {
        let raw = "a".repeat(60);
        let display = display_of(Some(raw.as_str()));
        assert_eq!(display.chars().count(), 50);
        assert_eq!(display, format!("{}...", "a".repeat(47)));
    }

    #[test]
    fn set_raw_recomputes_display() {
        let mut value = Value::new("p1", "g1", "f1", Some("first"), 0);
        assert_eq!(value.value_display, "first");
        let long = "b".repeat(80);
        value.set_raw(Some(long.as_str()));
        assert_eq!(value.value_display, format!("{}...", "b".repeat(47)));
    }

    #[test]
    fn uom_override_beats_default() {
        let mut field = Field::new("energy", "Energy", FieldType::Number).with_uom(Uom::Kcal);
        field.group_uoms.insert("per_dose".to_string(), Uom::Kj);
        assert_eq!(field.uom_for("per_dose"), Some(Uom::Kj));
        assert_eq!(field.uom_for("per_100g"), Some(Uom::Kcal));
    }

    #[test]
    fn section_reserved_columns() {
        let mut section = Section::new("nutrition", "Nutrition", 10);
        assert_eq!(section.reserved_columns(), 1);
        section.columns.push(SectionColumn {
            group: "avg".to_string(),
            index: 1,
            label: "Average value".to_string(),
        });
        section.columns.push(SectionColumn {
            group: "pct".to_string(),
            index: 2,
            label: "% daily reference".to_string(),
        });
        assert_eq!(section.reserved_columns(), 2);
        assert!(section.is_column_table());
    }

    #[test]
    fn entity_kind_parses_known_names_only() {
        assert_eq!(EntityKind::parse("section"), Some(EntityKind::Section));
        assert_eq!(EntityKind::parse("group"), Some(EntityKind::Group));
        assert_eq!(EntityKind::parse("field"), Some(EntityKind::Field));
        assert_eq!(EntityKind::parse("info"), None);
        assert_eq!(EntityKind::parse("SECTION"), None);
    }
}
