//! Product datasheet engine.
//!
//! This library manages hierarchical, typed product attributes
//! (Section → Group → Field → Value) and exports them into formatted
//! Excel workbooks, either with a built-in layout (ad-hoc mode) or by
//! filling a user-supplied template containing `{{ ... }}` placeholder
//! tokens (templated mode).
//!
//! # Features
//!
//! - Typed attribute hierarchy with code uniqueness, soft delete and
//!   export ordering invariants
//! - Locale-aware value formatting (units, numbers, the inverted
//!   boolean encoding)
//! - Placeholder mini-language with a typed AST and a read-only resolver
//! - Explicit-cursor layout engine with column-table sibling alignment
//! - Batch export into a zip archive with a per-product failure manifest
//!
//! # Example
//!
//! ```no_run
//! use product_datasheet::catalog::Catalog;
//! use product_datasheet::excel::{DatasheetExporter, GenerateMode};
//! use product_datasheet::i18n::BuiltinLocalizer;
//! use product_datasheet::types::{Field, FieldType, Group, Product, Section, Uom};
//!
//! let mut catalog = Catalog::new();
//! catalog.add_section(Section::new("nutrition", "Nutritional Information", 10))?;
//! catalog.add_group(Group::new("per_100g", "Per 100g", 10, "nutrition"))?;
//! catalog.add_field(Field::new("energy", "Energy", FieldType::Number).with_uom(Uom::Kcal))?;
//! catalog.add_product(Product::new("P1", "Choco Bar"))?;
//! catalog.set_value("P1", "per_100g", "energy", Some("123.456"))?;
//!
//! let exporter = DatasheetExporter::new(&catalog, &BuiltinLocalizer);
//! let bytes = exporter.generate(GenerateMode::AdHoc, "P1")?;
//! std::fs::write("P1.xlsx", bytes)?;
//! # Ok::<(), product_datasheet::error::DatasheetError>(())
//! ```

pub mod catalog;
pub mod cli;
pub mod error;
pub mod excel;
pub mod format;
pub mod i18n;
pub mod layout;
pub mod parser;
pub mod placeholder;
pub mod types;

// Re-export commonly used types
pub use catalog::Catalog;
pub use error::{DatasheetError, DatasheetResult};
pub use excel::{BatchOutput, DatasheetExporter, GenerateMode};
pub use types::{Field, FieldType, Group, Product, Section, Template, Uom, Value};
