//! Placeholder resolution for templated export.
//!
//! A template cell is a placeholder when it starts with `{{`. The token
//! grammar is `{{ <path> [ | <modifier> ] }}` with a dot-separated path.
//! Recognized roots: `o.` / `h.` (per-run context), `i.<kind>.<code>`
//! (entity names and section image triggers) and
//! `i.info.<section>.<group>.<field> | value` (formatted value lookup).
//! Anything else stays literal text, and resolution never mutates the
//! underlying records.

mod tokenizer;

pub use tokenizer::{Token, Tokenizer};

use crate::catalog::Catalog;
use crate::format::{format_value, NumberPolicy};
use crate::i18n::{Locale, Localizer};
use crate::types::{EntityKind, Product, ProductImage};
use chrono::Utc;
use std::collections::HashMap;

//==============================================================================
// AST
//==============================================================================

/// A recognized placeholder, parsed from a cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placeholder {
    /// `o.*` / `h.*`: a slot of the per-run context dictionary.
    Context { key: String },
    /// `i.<kind>.<code> | name`: localized name of a hierarchy record.
    EntityName { kind: EntityKind, code: String },
    /// `i.<kind>.<code>`: localized name; for sections this also triggers
    /// inline image placement.
    Entity { kind: EntityKind, code: String },
    /// `i.info.<section>.<group>.<field> | value`: a formatted value.
    Info {
        section: String,
        group: String,
        field: String,
    },
}

/// Parse a cell's raw text. `None` means "not a placeholder": the cell is
/// left as literal text, never an error.
pub fn parse_placeholder(text: &str) -> Option<Placeholder> {
    let trimmed = text.trim();
    let body = trimmed.strip_prefix("{{")?.strip_suffix("}}")?;
    let tokens = Tokenizer::new(body).tokenize()?;

    // Split into path segments and an optional single modifier.
    let mut path: Vec<&str> = Vec::new();
    let mut modifier: Option<&str> = None;
    let mut iter = tokens.iter();
    loop {
        match iter.next() {
            Some(Token::Ident(seg)) => path.push(seg.as_str()),
            None if !path.is_empty() => break,
            _ => return None,
        }
        match iter.next() {
            Some(Token::Dot) => continue,
            Some(Token::Pipe) => {
                match (iter.next(), iter.next()) {
                    (Some(Token::Ident(m)), None) => modifier = Some(m.as_str()),
                    _ => return None,
                }
                break;
            }
            None => break,
            _ => return None,
        }
    }

    match (path.as_slice(), modifier) {
        (["o" | "h", rest @ ..], None) if !rest.is_empty() => Some(Placeholder::Context {
            key: format!("{}.{}", path[0], rest.join(".")),
        }),
        (["i", "info", section, group, field], Some("value")) => Some(Placeholder::Info {
            section: section.to_string(),
            group: group.to_string(),
            field: field.to_string(),
        }),
        (["i", kind, code], Some("name")) => Some(Placeholder::EntityName {
            kind: EntityKind::parse(kind)?,
            code: code.to_string(),
        }),
        (["i", kind, code], None) => Some(Placeholder::Entity {
            kind: EntityKind::parse(kind)?,
            code: code.to_string(),
        }),
        _ => None,
    }
}

//==============================================================================
// Per-run context dictionary
//==============================================================================

/// A slot of the per-run context: plain text or an embeddable image.
#[derive(Debug, Clone)]
pub enum ContextSlot {
    Text(String),
    Image(Vec<u8>),
}

/// Fixed dictionary built once per product before resolution starts.
/// Unknown keys resolve to empty text — templates may reference optional
/// slots.
#[derive(Debug, Default)]
pub struct RunContext {
    slots: HashMap<String, ContextSlot>,
}

impl RunContext {
    /// Build the standard slots for one product export run.
    pub fn for_product(
        product: &Product,
        logo: Option<&[u8]>,
        legal_footer: &str,
        footer_note: &str,
    ) -> Self {
        let mut slots = HashMap::new();
        slots.insert(
            "o.name".to_string(),
            ContextSlot::Text(product.name.clone()),
        );
        if let Some(photo) = &product.photo {
            slots.insert("o.image".to_string(), ContextSlot::Image(photo.clone()));
        }
        slots.insert(
            "h.today".to_string(),
            ContextSlot::Text(Utc::now().format("%Y-%m-%d").to_string()),
        );
        if let Some(logo) = logo {
            slots.insert("h.logo".to_string(), ContextSlot::Image(logo.to_vec()));
        }
        slots.insert(
            "h.legal_footer".to_string(),
            ContextSlot::Text(legal_footer.to_string()),
        );
        slots.insert(
            "h.footer_note".to_string(),
            ContextSlot::Text(footer_note.to_string()),
        );
        Self { slots }
    }

    pub fn insert(&mut self, key: &str, slot: ContextSlot) {
        self.slots.insert(key.to_string(), slot);
    }

    pub fn get(&self, key: &str) -> Option<&ContextSlot> {
        self.slots.get(key)
    }
}

//==============================================================================
// Resolver
//==============================================================================

/// Outcome of resolving one cell.
#[derive(Debug)]
pub enum Resolution<'a> {
    /// The cell was not a recognized placeholder; keep its text verbatim.
    Literal,
    /// Final cell text.
    Text(String),
    /// An image to insert at the cell position.
    Image(&'a [u8]),
    /// Cell text plus deferred image placements for a section.
    TextWithImages(String, Vec<&'a ProductImage>),
}

/// Resolves placeholders against one product's data snapshot. Read-only:
/// resolving the same token twice yields the same output.
pub struct Resolver<'a> {
    catalog: &'a Catalog,
    product: &'a Product,
    context: &'a RunContext,
    locale: Locale,
    l10n: &'a dyn Localizer,
}

impl<'a> Resolver<'a> {
    pub fn new(
        catalog: &'a Catalog,
        product: &'a Product,
        context: &'a RunContext,
        locale: Locale,
        l10n: &'a dyn Localizer,
    ) -> Self {
        Self {
            catalog,
            product,
            context,
            locale,
            l10n,
        }
    }

    /// Parse and resolve a cell's raw text in one step.
    pub fn resolve_cell(&self, text: &str) -> Resolution<'a> {
        match parse_placeholder(text) {
            Some(placeholder) => self.resolve(&placeholder),
            None => Resolution::Literal,
        }
    }

    pub fn resolve(&self, placeholder: &Placeholder) -> Resolution<'a> {
        match placeholder {
            Placeholder::Context { key } => match self.context.get(key) {
                Some(ContextSlot::Text(text)) => Resolution::Text(text.clone()),
                Some(ContextSlot::Image(data)) => Resolution::Image(data),
                None => Resolution::Text(String::new()),
            },
            Placeholder::EntityName { kind, code } => Resolution::Text(self.entity_name(*kind, code)),
            Placeholder::Entity { kind, code } => {
                let name = self.entity_name(*kind, code);
                if *kind == EntityKind::Section {
                    let images = self.catalog.images_for(&self.product.code, code);
                    Resolution::TextWithImages(name, images)
                } else {
                    Resolution::Text(name)
                }
            }
            Placeholder::Info {
                section,
                group,
                field,
            } => Resolution::Text(self.info_value(section, group, field)),
        }
    }

    /// Localized record name; unknown codes resolve empty (soft condition).
    fn entity_name(&self, kind: EntityKind, code: &str) -> String {
        let name = match kind {
            EntityKind::Section => self.catalog.section(code).map(|s| s.name.clone()),
            EntityKind::Group => self.catalog.group(code).map(|g| g.name.clone()),
            EntityKind::Field => self.catalog.field(code).map(|f| f.name.clone()),
        };
        match name {
            Some(name) => self.l10n.localize(&name, self.locale),
            None => String::new(),
        }
    }

    fn info_value(&self, section: &str, group: &str, field: &str) -> String {
        let Some(field_rec) = self.catalog.field(field) else {
            return String::new();
        };
        let raw = self
            .catalog
            .value_at(&self.product.code, section, group, field)
            .and_then(|v| v.value.as_deref());
        // Lenient formatting absorbs malformed data; a missing row renders
        // the absent dash.
        match format_value(
            field_rec,
            raw,
            group,
            self.locale,
            self.l10n,
            NumberPolicy::Lenient,
        ) {
            Ok(text) => text,
            Err(_) => self.l10n.localize("display.absent", self.locale),
        }
    }
}
