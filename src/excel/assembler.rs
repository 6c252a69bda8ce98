//! Workbook assembly.
//!
//! Builds the static parts of the document (company header, supplier
//! block, title, product photo), hands the variable attribute section to
//! the layout engine, applies the resulting plan with the per-run style
//! registry, and packages batch runs into a zip archive.

use crate::catalog::Catalog;
use crate::error::{DatasheetError, DatasheetResult};
use crate::excel::styles::StyleRegistry;
use crate::excel::template::read_template;
use crate::i18n::{Locale, Localizer};
use crate::layout::{FooterBlock, LayoutEngine, SheetOp, StyleRole, BANNER_LAST_COL};
use crate::placeholder::{Resolver, RunContext};
use crate::types::{Company, Product, Template};
use rust_xlsxwriter::{Image, Workbook, Worksheet};
use serde::Serialize;
use std::io::{Cursor, Write};
use tracing::{info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Fixed name of the batch archive.
pub const BATCH_ARCHIVE_NAME: &str = "ProductDatasheetTemplates.zip";

/// First layout row in ad-hoc mode, below the static header block.
const ADHOC_LAYOUT_START_ROW: u32 = 6;

/// Export mode for a single product.
#[derive(Debug, Clone, Copy)]
pub enum GenerateMode<'a> {
    AdHoc,
    Templated(&'a Template),
}

/// One failed product of a batch run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchFailure {
    pub product: String,
    pub reason: String,
}

/// Batch result: the archive bytes plus the per-product failure manifest.
/// Failures never abort the batch and never silently disappear.
#[derive(Debug)]
pub struct BatchOutput {
    pub archive: Vec<u8>,
    pub failures: Vec<BatchFailure>,
}

pub struct DatasheetExporter<'a> {
    catalog: &'a Catalog,
    l10n: &'a dyn Localizer,
    locale: Locale,
    company: Option<&'a Company>,
    footer: FooterBlock,
}

impl<'a> DatasheetExporter<'a> {
    pub fn new(catalog: &'a Catalog, l10n: &'a dyn Localizer) -> Self {
        Self {
            catalog,
            l10n,
            locale: Locale::default(),
            company: None,
            footer: FooterBlock::default(),
        }
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn with_company(mut self, company: &'a Company) -> Self {
        self.company = Some(company);
        self
    }

    pub fn with_footer(mut self, footer: FooterBlock) -> Self {
        self.footer = footer;
        self
    }

    /// Generate one product's workbook and return the `.xlsx` bytes.
    pub fn generate(&self, mode: GenerateMode, product_code: &str) -> DatasheetResult<Vec<u8>> {
        let product = self.catalog.product(product_code).ok_or_else(|| {
            DatasheetError::Validation(format!("unknown product '{}'", product_code))
        })?;
        info!(product = product_code, "generating datasheet workbook");
        match mode {
            GenerateMode::AdHoc => self.generate_adhoc(product),
            GenerateMode::Templated(template) => self.generate_templated(template, product),
        }
    }

    /// Templated export of a whole product list into the batch archive.
    pub fn generate_batch(
        &self,
        template: &Template,
        product_codes: &[String],
    ) -> DatasheetResult<BatchOutput> {
        let options = || SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut archive = ZipWriter::new(Cursor::new(Vec::new()));
        let mut failures = Vec::new();

        for code in product_codes {
            match self.generate(GenerateMode::Templated(template), code) {
                Ok(bytes) => {
                    let name = self
                        .catalog
                        .product(code)
                        .map(|p| p.name.clone())
                        .unwrap_or_else(|| code.clone());
                    archive
                        .start_file(format!("{}.xlsx", name), options())
                        .map_err(|e| DatasheetError::Archive(format!("failed to add entry: {}", e)))?;
                    archive
                        .write_all(&bytes)
                        .map_err(|e| DatasheetError::Archive(format!("failed to write entry: {}", e)))?;
                }
                Err(e) => {
                    warn!(product = code.as_str(), error = %e, "batch member failed");
                    failures.push(BatchFailure {
                        product: code.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        if !failures.is_empty() {
            let manifest = serde_json::to_vec_pretty(&failures)
                .map_err(|e| DatasheetError::Archive(format!("failed to encode manifest: {}", e)))?;
            archive
                .start_file("manifest.json", options())
                .map_err(|e| DatasheetError::Archive(format!("failed to add manifest: {}", e)))?;
            archive
                .write_all(&manifest)
                .map_err(|e| DatasheetError::Archive(format!("failed to write manifest: {}", e)))?;
        }

        let cursor = archive
            .finish()
            .map_err(|e| DatasheetError::Archive(format!("failed to finish archive: {}", e)))?;
        Ok(BatchOutput {
            archive: cursor.into_inner(),
            failures,
        })
    }

    //--------------------------------------------------------------------------
    // Ad-hoc mode
    //--------------------------------------------------------------------------

    fn generate_adhoc(&self, product: &Product) -> DatasheetResult<Vec<u8>> {
        let styles = StyleRegistry::new();
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(sanitize_sheet_name(&product.name))
            .map_err(|e| DatasheetError::Export(format!("failed to set sheet name: {}", e)))?;

        worksheet
            .set_column_width(0, 36.0)
            .map_err(|e| DatasheetError::Export(format!("failed to set column width: {}", e)))?;
        for col in 1..=BANNER_LAST_COL {
            worksheet
                .set_column_width(col, 18.0)
                .map_err(|e| DatasheetError::Export(format!("failed to set column width: {}", e)))?;
        }

        let header_ops = self.header_ops(product);
        apply_ops(worksheet, &header_ops, &styles)?;

        let engine = LayoutEngine::new(self.catalog, self.locale, self.l10n);
        let body_ops = engine.render_adhoc(product, ADHOC_LAYOUT_START_ROW, &self.footer)?;
        apply_ops(worksheet, &body_ops, &styles)?;

        workbook
            .save_to_buffer()
            .map_err(|e| DatasheetError::Export(format!("failed to serialize workbook: {}", e)))
    }

    /// Static header block: company, supplier, date, title, photo.
    fn header_ops(&self, product: &Product) -> Vec<SheetOp> {
        let mut ops = Vec::new();

        if let Some(company) = self.company {
            if let Some(logo) = &company.logo {
                ops.push(SheetOp::Image {
                    row: 0,
                    col: 0,
                    data: logo.clone(),
                });
            }
            ops.push(SheetOp::MergedText {
                row: 0,
                first_col: 1,
                last_col: BANNER_LAST_COL,
                text: company.name.clone(),
                style: StyleRole::Title,
            });
            if !company.address.is_empty() {
                ops.push(SheetOp::MergedText {
                    row: 1,
                    first_col: 1,
                    last_col: BANNER_LAST_COL,
                    text: company.address.join(", "),
                    style: StyleRole::Plain,
                });
            }
        }

        if let Some(seller) = &product.seller {
            ops.push(SheetOp::Text {
                row: 2,
                col: 0,
                text: self.l10n.localize("header.supplier", self.locale),
                style: StyleRole::FooterHeading,
            });
            let mut block = vec![seller.name.clone()];
            block.extend(seller.address.iter().cloned());
            if let Some(vat) = &seller.vat {
                block.push(vat.clone());
            }
            ops.push(SheetOp::MergedText {
                row: 2,
                first_col: 1,
                last_col: BANNER_LAST_COL,
                text: block.join(", "),
                style: StyleRole::Plain,
            });
        }

        ops.push(SheetOp::Text {
            row: 3,
            col: 0,
            text: self.l10n.localize("header.date", self.locale),
            style: StyleRole::FooterHeading,
        });
        ops.push(SheetOp::Text {
            row: 3,
            col: 1,
            text: chrono::Utc::now().format("%Y-%m-%d").to_string(),
            style: StyleRole::Plain,
        });

        ops.push(SheetOp::MergedText {
            row: 4,
            first_col: 0,
            last_col: BANNER_LAST_COL,
            text: format!(
                "{}: {}",
                self.l10n.localize("header.product", self.locale),
                product.name
            ),
            style: StyleRole::SectionHeader,
        });

        if let Some(photo) = &product.photo {
            ops.push(SheetOp::Image {
                row: 5,
                col: 0,
                data: photo.clone(),
            });
        }

        ops
    }

    //--------------------------------------------------------------------------
    // Templated mode
    //--------------------------------------------------------------------------

    fn generate_templated(&self, template: &Template, product: &Product) -> DatasheetResult<Vec<u8>> {
        let sheets = read_template(template)?;
        let styles = StyleRegistry::new();
        let context = RunContext::for_product(
            product,
            self.company.and_then(|c| c.logo.as_deref()),
            &self.footer.legal,
            &self.footer.note,
        );
        let resolver = Resolver::new(self.catalog, product, &context, self.locale, self.l10n);
        let engine = LayoutEngine::new(self.catalog, self.locale, self.l10n);

        let mut workbook = Workbook::new();
        for sheet in &sheets {
            let worksheet = workbook.add_worksheet();
            worksheet
                .set_name(sanitize_sheet_name(&sheet.name))
                .map_err(|e| DatasheetError::Export(format!("failed to set sheet name: {}", e)))?;
            let ops = engine.render_template(sheet, &resolver);
            apply_ops(worksheet, &ops, &styles)?;
        }

        workbook
            .save_to_buffer()
            .map_err(|e| DatasheetError::Export(format!("failed to serialize workbook: {}", e)))
    }
}

/// Apply a layout plan to a worksheet.
fn apply_ops(
    worksheet: &mut Worksheet,
    ops: &[SheetOp],
    styles: &StyleRegistry,
) -> DatasheetResult<()> {
    for op in ops {
        match op {
            SheetOp::Text {
                row,
                col,
                text,
                style,
            } => {
                worksheet
                    .write_string_with_format(*row, *col, text, styles.format_for(*style))
                    .map_err(|e| DatasheetError::Export(format!("failed to write cell: {}", e)))?;
            }
            SheetOp::Number {
                row,
                col,
                value,
                style,
            } => {
                worksheet
                    .write_number_with_format(*row, *col, *value, styles.format_for(*style))
                    .map_err(|e| DatasheetError::Export(format!("failed to write number: {}", e)))?;
            }
            SheetOp::Bool { row, col, value } => {
                worksheet
                    .write_boolean(*row, *col, *value)
                    .map_err(|e| DatasheetError::Export(format!("failed to write boolean: {}", e)))?;
            }
            SheetOp::MergedText {
                row,
                first_col,
                last_col,
                text,
                style,
            } => {
                worksheet
                    .merge_range(*row, *first_col, *row, *last_col, text, styles.format_for(*style))
                    .map_err(|e| DatasheetError::Export(format!("failed to merge range: {}", e)))?;
            }
            SheetOp::Image { row, col, data } => {
                let image = Image::new_from_buffer(data).map_err(|e| {
                    DatasheetError::Export(format!("failed to decode embedded image: {}", e))
                })?;
                worksheet
                    .insert_image(*row, *col, &image)
                    .map_err(|e| DatasheetError::Export(format!("failed to insert image: {}", e)))?;
            }
            SheetOp::RowHeight { row, height } => {
                worksheet
                    .set_row_height(*row, *height)
                    .map_err(|e| DatasheetError::Export(format!("failed to set row height: {}", e)))?;
            }
        }
    }
    Ok(())
}

/// Worksheet names: at most 31 chars, no `[ ] : * ? / \`.
fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => ' ',
            c => c,
        })
        .take(31)
        .collect();
    if cleaned.trim().is_empty() {
        "Datasheet".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sheet_names_are_sanitized() {
        assert_eq!(sanitize_sheet_name("Choco Bar"), "Choco Bar");
        assert_eq!(sanitize_sheet_name("A/B:C"), "A B C");
        assert_eq!(sanitize_sheet_name(&"x".repeat(40)).chars().count(), 31);
        assert_eq!(sanitize_sheet_name("???"), "Datasheet");
    }
}
