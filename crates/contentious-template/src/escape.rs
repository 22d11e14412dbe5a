//! HTML escaping.
//!
//! [`escape`] entity-escapes a plain string. [`escape_value`] applies the
//! same treatment to a [`ContextValue`], passing pre-trusted strings through
//! verbatim and recursing into lists and dicts. Escaped output is marked
//! trusted, so escaping twice never double-encodes.

use crate::context::ContextValue;

/// Escapes the HTML-significant characters `& < > " '`.
pub fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Escapes a value unless it is pre-trusted, recursing through collections.
///
/// Dict keys are left untouched; only values are escaped. Non-string scalars
/// are returned unchanged.
pub fn escape_value(value: &ContextValue) -> ContextValue {
    match value {
        ContextValue::String(s) => ContextValue::Trusted(escape(s)),
        ContextValue::Trusted(_) => value.clone(),
        ContextValue::List(items) => ContextValue::List(items.iter().map(escape_value).collect()),
        ContextValue::Dict(map) => ContextValue::Dict(
            map.iter()
                .map(|(k, v)| (k.clone(), escape_value(v)))
                .collect(),
        ),
        other => other.clone(),
    }
}
