//! Value formatting.
//!
//! Converts a raw stored value plus its field's declared type and unit
//! into a locale-appropriate display string. Absent data never errors;
//! malformed numeric data errors in the strict path only.

use crate::error::{DatasheetError, DatasheetResult};
use crate::i18n::{Locale, Localizer};
use crate::types::{Field, FieldType};

/// How to handle numeric text that does not parse.
///
/// Ad-hoc export is strict (data-integrity error); templated export is
/// lenient (degrade to text display). The asymmetry is intentional:
/// templates are external input and must never crash a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberPolicy {
    Strict,
    Lenient,
}

/// Format a raw stored value for display.
///
/// `group` supplies the unit context for per-group overrides. Absent
/// values (`None`, empty, and — outside Boolean fields — the literal
/// `"False"`) render the localized dash.
pub fn format_value(
    field: &Field,
    raw: Option<&str>,
    group: &str,
    locale: Locale,
    l10n: &dyn Localizer,
    policy: NumberPolicy,
) -> DatasheetResult<String> {
    if is_absent(field, raw) {
        return Ok(l10n.localize("display.absent", locale));
    }
    let raw = raw.unwrap_or_default();
    let suffix = unit_suffix(field, group, locale, l10n);

    match field.field_type {
        FieldType::Number => match raw.trim().parse::<f64>() {
            Ok(number) => Ok(format!("{:.2}{}", number, suffix)),
            Err(_) if policy == NumberPolicy::Lenient => Ok(format!("{}{}", raw, suffix)),
            Err(_) => Err(DatasheetError::DataIntegrity(format!(
                "field '{}' expects a number, got '{}'",
                field.code, raw
            ))),
        },
        // Inverted historical encoding: "0" and "True" mean yes. Kept
        // verbatim for backward compatibility with stored data.
        FieldType::Boolean => {
            let key = if raw == "0" || raw == "True" {
                "display.yes"
            } else {
                "display.no"
            };
            Ok(l10n.localize(key, locale))
        }
        _ => Ok(format!("{}{}", raw, suffix)),
    }
}

fn is_absent(field: &Field, raw: Option<&str>) -> bool {
    match raw {
        None => true,
        Some("") => true,
        // Boolean fields legitimately store "False"; everywhere else it
        // is the stored encoding of "no data".
        Some("False") => field.field_type != FieldType::Boolean,
        Some(_) => false,
    }
}

fn unit_suffix(field: &Field, group: &str, locale: Locale, l10n: &dyn Localizer) -> String {
    match field.uom_for(group) {
        Some(uom) => format!(" {}", l10n.localize(uom.key(), locale)),
        None => String::new(),
    }
}
