//! Template workbook reading.
//!
//! A template is an ordinary `.xlsx` whose cells may contain placeholder
//! tokens. Cells are read with their absolute positions so templates that
//! do not start at A1 keep their layout.

use crate::error::{DatasheetError, DatasheetResult};
use crate::types::Template;
use calamine::{Data, Reader, Xlsx};
use std::io::Cursor;

/// Literal content of one template cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellContent {
    Text(String),
    Number(f64),
    Bool(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemplateCell {
    pub row: u32,
    pub col: u16,
    pub content: CellContent,
}

#[derive(Debug, Clone)]
pub struct TemplateSheet {
    pub name: String,
    pub cells: Vec<TemplateCell>,
}

/// Read every sheet of a template workbook into cell lists.
pub fn read_template(template: &Template) -> DatasheetResult<Vec<TemplateSheet>> {
    if template.data.is_empty() {
        return Err(DatasheetError::Validation(format!(
            "template '{}' has no content",
            template.name
        )));
    }

    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(template.data.clone()))
        .map_err(|e| DatasheetError::Template(format!("failed to open template workbook: {}", e)))?;

    let sheet_names = workbook.sheet_names().to_vec();
    let mut sheets = Vec::with_capacity(sheet_names.len());

    for sheet_name in sheet_names {
        let range = workbook.worksheet_range(&sheet_name).map_err(|e| {
            DatasheetError::Template(format!("failed to read sheet '{}': {}", sheet_name, e))
        })?;

        let (start_row, start_col) = range.start().unwrap_or((0, 0));
        let mut cells = Vec::new();
        for (row, col, data) in range.cells() {
            let content = match data {
                Data::String(s) => Some(CellContent::Text(s.clone())),
                Data::Float(f) => Some(CellContent::Number(*f)),
                Data::Int(i) => Some(CellContent::Number(*i as f64)),
                Data::Bool(b) => Some(CellContent::Bool(*b)),
                Data::DateTime(dt) => Some(CellContent::Number(dt.as_f64())),
                Data::DateTimeIso(s) | Data::DurationIso(s) => Some(CellContent::Text(s.clone())),
                Data::Empty | Data::Error(_) => None,
            };
            if let Some(content) = content {
                cells.push(TemplateCell {
                    row: start_row + row as u32,
                    col: (start_col as usize + col) as u16,
                    content,
                });
            }
        }

        sheets.push(TemplateSheet {
            name: sheet_name,
            cells,
        });
    }

    Ok(sheets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_template_is_a_validation_error() {
        let template = Template::new("empty", Vec::new());
        let err = read_template(&template).unwrap_err();
        assert!(matches!(err, DatasheetError::Validation(_)));
    }

    #[test]
    fn garbage_bytes_are_a_template_error() {
        let template = Template::new("bad", vec![0x00, 0x01, 0x02, 0x03]);
        let err = read_template(&template).unwrap_err();
        assert!(matches!(err, DatasheetError::Template(_)));
    }
}
