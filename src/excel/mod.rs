//! Workbook input/output.
//!
//! - `template`: reads user-supplied template workbooks (calamine)
//! - `styles`: per-run style registry (fixed palette)
//! - `assembler`: builds the final document and the batch archive

pub mod assembler;
pub mod styles;
pub mod template;

pub use assembler::{BatchFailure, BatchOutput, DatasheetExporter, GenerateMode, BATCH_ARCHIVE_NAME};
pub use styles::StyleRegistry;
pub use template::{read_template, CellContent, TemplateCell, TemplateSheet};
