//! Localization seam.
//!
//! Translation lookup is an external collaborator: a pure function from
//! `(key, locale)` to a display string. The engine never hardcodes
//! locale-dependent strings at call sites; everything goes through a
//! [`Localizer`].

use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    En,
    Es,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "en" | "en_US" | "en_GB" => Ok(Locale::En),
            "es" | "es_ES" => Ok(Locale::Es),
            other => Err(format!("unknown locale: {}", other)),
        }
    }
}

/// Pure translation function. Unknown keys must fall back to the key
/// itself, so record names (used directly as keys) pass through verbatim
/// when no translation exists.
pub trait Localizer {
    fn localize(&self, key: &str, locale: Locale) -> String;
}

/// Built-in table covering the engine's own keys (display words, unit
/// suffixes, header labels) in English and Spanish.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinLocalizer;

impl Localizer for BuiltinLocalizer {
    fn localize(&self, key: &str, locale: Locale) -> String {
        let entry = TABLE.iter().find(|(k, _, _)| *k == key);
        match (entry, locale) {
            (Some((_, en, _)), Locale::En) => (*en).to_string(),
            (Some((_, _, es)), Locale::Es) => (*es).to_string(),
            (None, _) => key.to_string(),
        }
    }
}

// (key, en, es)
const TABLE: &[(&str, &str, &str)] = &[
    ("display.absent", "-", "-"),
    ("display.yes", "Yes", "Sí"),
    ("display.no", "No", "No"),
    ("header.supplier", "Supplier", "Proveedor"),
    ("header.date", "Date", "Fecha"),
    ("header.product", "Product datasheet", "Ficha técnica de producto"),
    ("footer.regulatory", "Regulatory information", "Información regulatoria"),
    ("uom.gr", "g", "g"),
    ("uom.cfu_g", "cfu/g", "ufc/g"),
    ("uom.m3", "m3", "m3"),
    ("uom.cm", "cm", "cm"),
    ("uom.cm3", "cm3", "cm3"),
    ("uom.mm", "mm", "mm"),
    ("uom.ud", "ud", "ud"),
    ("uom.ug", "µg", "µg"),
    ("uom.box", "box", "caja"),
    ("uom.mg", "mg", "mg"),
    ("uom.kcal", "kcal", "kcal"),
    ("uom.kj", "kJ", "kJ"),
    ("uom.kg", "kg", "kg"),
    ("uom.l", "L", "L"),
];
