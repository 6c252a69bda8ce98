//! Per-run style registry.
//!
//! One registry is built per export run and passed by reference into
//! every write call; no workbook-level format objects are shared between
//! runs. The palette is fixed: black section bars, gray group bars,
//! bordered normal cells.

use crate::layout::StyleRole;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder};

const GRAY_BAR: Color = Color::RGB(0xD9D9D9);

#[derive(Debug)]
pub struct StyleRegistry {
    title: Format,
    section_header: Format,
    group_header: Format,
    column_label: Format,
    field_label: Format,
    value_cell: Format,
    footer_heading: Format,
    footer_text: Format,
    plain: Format,
}

impl StyleRegistry {
    pub fn new() -> Self {
        Self {
            title: Format::new().set_bold().set_font_size(14),
            section_header: Format::new()
                .set_bold()
                .set_background_color(Color::Black)
                .set_font_color(Color::White)
                .set_align(FormatAlign::Center),
            group_header: Format::new()
                .set_bold()
                .set_background_color(GRAY_BAR)
                .set_border(FormatBorder::Thin),
            column_label: Format::new()
                .set_bold()
                .set_background_color(GRAY_BAR)
                .set_align(FormatAlign::Center)
                .set_border(FormatBorder::Thin),
            field_label: Format::new().set_border(FormatBorder::Thin),
            value_cell: Format::new()
                .set_border(FormatBorder::Thin)
                .set_align(FormatAlign::Right),
            footer_heading: Format::new().set_bold(),
            footer_text: Format::new()
                .set_italic()
                .set_text_wrap()
                .set_align(FormatAlign::Top),
            plain: Format::new(),
        }
    }

    pub fn format_for(&self, role: StyleRole) -> &Format {
        match role {
            StyleRole::Title => &self.title,
            StyleRole::SectionHeader => &self.section_header,
            StyleRole::GroupHeader => &self.group_header,
            StyleRole::ColumnLabel => &self.column_label,
            StyleRole::FieldLabel => &self.field_label,
            StyleRole::ValueCell => &self.value_cell,
            StyleRole::FooterHeading => &self.footer_heading,
            StyleRole::FooterText => &self.footer_text,
            StyleRole::Plain => &self.plain,
        }
    }
}

impl Default for StyleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
