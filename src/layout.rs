//! Layout engine.
//!
//! Walks the Section/Group/Field hierarchy in export order and emits a
//! plan of sheet operations; the workbook assembler applies the plan to a
//! worksheet. Keeping layout as data makes row/column placement (sibling
//! alignment in column tables, bounded image slots, emission order)
//! directly assertable in tests.

use crate::catalog::Catalog;
use crate::error::DatasheetResult;
use crate::excel::template::{CellContent, TemplateSheet};
use crate::format::{format_value, NumberPolicy};
use crate::i18n::{Locale, Localizer};
use crate::placeholder::{Resolution, Resolver};
use crate::types::Product;
use tracing::debug;

/// Blank rows inserted before every section banner.
pub const SECTION_GAP_ROWS: u32 = 2;
/// Blank rows between the last section and the footer block.
pub const FOOTER_GAP_ROWS: u32 = 3;
/// Last column of full-width banners (A..=F).
pub const BANNER_LAST_COL: u16 = 5;
/// Image placement never runs past column Z.
pub const MAX_IMAGE_COL: u16 = 25;

//==============================================================================
// Sheet operation plan
//==============================================================================

/// Style slot a cell is rendered with; the registry maps roles to
/// concrete formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleRole {
    Title,
    SectionHeader,
    GroupHeader,
    ColumnLabel,
    FieldLabel,
    ValueCell,
    FooterHeading,
    FooterText,
    Plain,
}

/// One deferred write against the target worksheet.
#[derive(Debug, Clone, PartialEq)]
pub enum SheetOp {
    Text {
        row: u32,
        col: u16,
        text: String,
        style: StyleRole,
    },
    Number {
        row: u32,
        col: u16,
        value: f64,
        style: StyleRole,
    },
    Bool {
        row: u32,
        col: u16,
        value: bool,
    },
    MergedText {
        row: u32,
        first_col: u16,
        last_col: u16,
        text: String,
        style: StyleRole,
    },
    Image {
        row: u32,
        col: u16,
        data: Vec<u8>,
    },
    RowHeight {
        row: u32,
        height: f64,
    },
}

//==============================================================================
// Cursor
//==============================================================================

/// Explicit layout cursor: current row plus, per column-table section,
/// the saved anchor row sibling groups share. Passed and returned through
/// each layout step; no ambient state.
#[derive(Debug, Clone, Default)]
pub struct LayoutCursor {
    pub row: u32,
    anchors: Vec<(String, u32)>,
}

impl LayoutCursor {
    pub fn at(row: u32) -> Self {
        Self {
            row,
            anchors: Vec::new(),
        }
    }

    pub fn advanced(mut self, rows: u32) -> Self {
        self.row += rows;
        self
    }

    pub fn anchor(&self, table: &str) -> Option<u32> {
        self.anchors
            .iter()
            .find(|(t, _)| t == table)
            .map(|(_, row)| *row)
    }

    pub fn remember_anchor(mut self, table: &str, row: u32) -> Self {
        self.anchors.push((table.to_string(), row));
        self
    }

    /// Jump back to a remembered row (column-table sibling alignment).
    pub fn rewound_to(mut self, row: u32) -> Self {
        self.row = row;
        self
    }
}

//==============================================================================
// Footer block
//==============================================================================

/// Regulatory + free-text footer appended after the last section.
#[derive(Debug, Clone)]
pub struct FooterBlock {
    pub legal: String,
    pub note: String,
    pub legal_row_height: f64,
    pub note_row_height: f64,
}

impl Default for FooterBlock {
    fn default() -> Self {
        Self {
            legal: String::new(),
            note: String::new(),
            legal_row_height: 48.0,
            note_row_height: 64.0,
        }
    }
}

//==============================================================================
// Engine
//==============================================================================

pub struct LayoutEngine<'a> {
    catalog: &'a Catalog,
    locale: Locale,
    l10n: &'a dyn Localizer,
}

impl<'a> LayoutEngine<'a> {
    pub fn new(catalog: &'a Catalog, locale: Locale, l10n: &'a dyn Localizer) -> Self {
        Self {
            catalog,
            locale,
            l10n,
        }
    }

    /// Ad-hoc mode: drive the hierarchy walk directly.
    ///
    /// Emission order is (section.sequence, group.sequence,
    /// value.sequence); numeric formatting is strict, so malformed data
    /// aborts this product's export.
    pub fn render_adhoc(
        &self,
        product: &Product,
        start_row: u32,
        footer: &FooterBlock,
    ) -> DatasheetResult<Vec<SheetOp>> {
        let mut ops = Vec::new();
        let mut cursor = LayoutCursor::at(start_row);

        for section in self.catalog.export_sections() {
            cursor = cursor.advanced(SECTION_GAP_ROWS);
            debug!(section = section.code.as_str(), row = cursor.row, "section banner");
            ops.push(SheetOp::MergedText {
                row: cursor.row,
                first_col: 0,
                last_col: BANNER_LAST_COL,
                text: self.l10n.localize(&section.name, self.locale),
                style: StyleRole::SectionHeader,
            });

            // Images sit on the row below the banner, after the reserved
            // value columns, and stop silently at column Z.
            let mut image_col = section.reserved_columns() + 1;
            let images = self.catalog.images_for(&product.code, &section.code);
            let mut max_row = cursor.row;
            for image in images {
                if image_col > MAX_IMAGE_COL {
                    debug!(section = section.code.as_str(), "image columns exhausted");
                    break;
                }
                ops.push(SheetOp::Image {
                    row: cursor.row + 1,
                    col: image_col,
                    data: image.data.clone(),
                });
                max_row = max_row.max(cursor.row + 1);
                image_col += 1;
            }

            for group in self.catalog.export_groups(&section.code) {
                let column = section.column_for(&group.code);
                let value_col = match column {
                    Some(column) => {
                        // Sibling groups of a column table write into the
                        // same row band: the first group fixes the anchor,
                        // the rest rewind to it.
                        match cursor.anchor(&section.code) {
                            Some(anchor) => cursor = cursor.rewound_to(anchor),
                            None => {
                                cursor = cursor.advanced(1);
                                let row = cursor.row;
                                cursor = cursor.remember_anchor(&section.code, row);
                            }
                        }
                        ops.push(SheetOp::Text {
                            row: cursor.row,
                            col: column.index,
                            text: self.l10n.localize(&column.label, self.locale),
                            style: StyleRole::ColumnLabel,
                        });
                        column.index
                    }
                    None => {
                        cursor = cursor.advanced(1);
                        ops.push(SheetOp::MergedText {
                            row: cursor.row,
                            first_col: 0,
                            last_col: 1,
                            text: self.l10n.localize(&group.name, self.locale),
                            style: StyleRole::GroupHeader,
                        });
                        1
                    }
                };

                for (value, field) in self.catalog.export_values(&product.code, &group.code) {
                    cursor = cursor.advanced(1);
                    ops.push(SheetOp::Text {
                        row: cursor.row,
                        col: 0,
                        text: self.l10n.localize(&field.name, self.locale),
                        style: StyleRole::FieldLabel,
                    });
                    let display = format_value(
                        field,
                        value.value.as_deref(),
                        &group.code,
                        self.locale,
                        self.l10n,
                        NumberPolicy::Strict,
                    )?;
                    ops.push(SheetOp::Text {
                        row: cursor.row,
                        col: value_col,
                        text: display,
                        style: StyleRole::ValueCell,
                    });
                }
                max_row = max_row.max(cursor.row);
            }

            // Sibling groups may have left the cursor above deeper rows.
            cursor = cursor.rewound_to(max_row);
        }

        Ok(self.footer_ops(ops, cursor, footer))
    }

    /// Templated mode: the template author drives the walk; scan every
    /// cell, resolve placeholders in place, collect deferred images.
    pub fn render_template(&self, sheet: &TemplateSheet, resolver: &Resolver) -> Vec<SheetOp> {
        let mut ops = Vec::new();
        for cell in &sheet.cells {
            match &cell.content {
                CellContent::Number(value) => ops.push(SheetOp::Number {
                    row: cell.row,
                    col: cell.col,
                    value: *value,
                    style: StyleRole::Plain,
                }),
                CellContent::Bool(value) => ops.push(SheetOp::Bool {
                    row: cell.row,
                    col: cell.col,
                    value: *value,
                }),
                CellContent::Text(text) => match resolver.resolve_cell(text) {
                    Resolution::Literal => {
                        ops.push(self.templated_text(cell.row, cell.col, text.clone()))
                    }
                    Resolution::Text(resolved) => {
                        ops.push(self.templated_text(cell.row, cell.col, resolved))
                    }
                    Resolution::Image(data) => ops.push(SheetOp::Image {
                        row: cell.row,
                        col: cell.col,
                        data: data.to_vec(),
                    }),
                    Resolution::TextWithImages(resolved, images) => {
                        ops.push(self.templated_text(cell.row, cell.col, resolved));
                        let reserved = images
                            .first()
                            .and_then(|image| self.catalog.section(&image.section))
                            .map(|section| section.reserved_columns())
                            .unwrap_or(1);
                        let mut image_col = reserved + 1;
                        for image in images {
                            if image_col > MAX_IMAGE_COL {
                                break;
                            }
                            ops.push(SheetOp::Image {
                                row: cell.row,
                                col: image_col,
                                data: image.data.clone(),
                            });
                            image_col += 1;
                        }
                    }
                },
            }
        }
        ops
    }

    /// Numeric tie-break: resolved text that parses as a float is written
    /// as a number, anything else as text.
    fn templated_text(&self, row: u32, col: u16, text: String) -> SheetOp {
        match text.trim().parse::<f64>() {
            Ok(value) => SheetOp::Number {
                row,
                col,
                value,
                style: StyleRole::Plain,
            },
            _ => SheetOp::Text {
                row,
                col,
                text,
                style: StyleRole::Plain,
            },
        }
    }

    fn footer_ops(
        &self,
        mut ops: Vec<SheetOp>,
        cursor: LayoutCursor,
        footer: &FooterBlock,
    ) -> Vec<SheetOp> {
        let mut cursor = cursor.advanced(FOOTER_GAP_ROWS);
        ops.push(SheetOp::MergedText {
            row: cursor.row,
            first_col: 0,
            last_col: BANNER_LAST_COL,
            text: self.l10n.localize("footer.regulatory", self.locale),
            style: StyleRole::FooterHeading,
        });
        cursor = cursor.advanced(1);
        ops.push(SheetOp::MergedText {
            row: cursor.row,
            first_col: 0,
            last_col: BANNER_LAST_COL,
            text: footer.legal.clone(),
            style: StyleRole::FooterText,
        });
        ops.push(SheetOp::RowHeight {
            row: cursor.row,
            height: footer.legal_row_height,
        });
        cursor = cursor.advanced(1);
        ops.push(SheetOp::MergedText {
            row: cursor.row,
            first_col: 0,
            last_col: BANNER_LAST_COL,
            text: footer.note.clone(),
            style: StyleRole::FooterText,
        });
        ops.push(SheetOp::RowHeight {
            row: cursor.row,
            height: footer.note_row_height,
        });
        ops
    }
}
