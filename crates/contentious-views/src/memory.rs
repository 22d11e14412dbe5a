//! Reference in-memory content stores.
//!
//! [`MemorySource`] keeps one field map per key; [`TranslationSource`] scopes
//! the same storage by a language axis read from the template context. Both
//! exist for tests, demos, and as a model for real storage-backed
//! implementations; neither persists anything across process restarts.

use std::collections::HashMap;
use std::sync::RwLock;

use tracing::info;
use url::Url;

use contentious_core::ValidationError;
use contentious_template::context::{Context, ContextValue};
use contentious_template::source::ContentSource;

/// Fields that hold URLs and get validated (and, for `src`, normalized).
const URL_FIELDS: &[&str] = &["href", "src"];

/// An in-memory [`ContentSource`] with a fixed edit-mode answer.
///
/// Saves are create-or-update per key. Posted values are cleaned on the way
/// in: the reserved `display` field is coerced to a boolean, and URL fields
/// are validated, with the scheme stripped from `src` so stored image
/// references are protocol-relative.
pub struct MemorySource {
    edit_mode: bool,
    items: RwLock<HashMap<String, HashMap<String, ContextValue>>>,
}

impl MemorySource {
    /// Creates an empty store that always answers `edit_mode` for the
    /// edit-mode question.
    pub fn new(edit_mode: bool) -> Self {
        Self {
            edit_mode,
            items: RwLock::new(HashMap::new()),
        }
    }
}

impl ContentSource for MemorySource {
    fn in_edit_mode(&self, _context: &Context) -> bool {
        self.edit_mode
    }

    fn get_content_data(&self, key: &str, _context: &Context) -> HashMap<String, ContextValue> {
        self.items
            .read()
            .expect("content store lock poisoned")
            .get(key)
            .cloned()
            .unwrap_or_default()
    }

    fn save_content_data(
        &self,
        key: &str,
        data: HashMap<String, ContextValue>,
        _context: &Context,
    ) -> Result<(), ValidationError> {
        let cleaned = clean_fields(data)?;
        let mut items = self.items.write().expect("content store lock poisoned");
        items.entry(key.to_string()).or_default().extend(cleaned);
        info!(key, "content saved");
        Ok(())
    }
}

/// An in-memory store scoped by language: the same key can hold different
/// data per language. The active language is the `language` context
/// variable, defaulting to `"en"`. Edit mode is the truthiness of the
/// `edit_mode` context variable.
pub struct TranslationSource {
    items: RwLock<HashMap<(String, String), HashMap<String, ContextValue>>>,
}

impl TranslationSource {
    /// Creates an empty translation store.
    pub fn new() -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
        }
    }

    fn language(context: &Context) -> String {
        context
            .get("language")
            .map_or_else(|| "en".to_string(), ContextValue::to_display_string)
    }
}

impl Default for TranslationSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentSource for TranslationSource {
    fn in_edit_mode(&self, context: &Context) -> bool {
        context.get("edit_mode").is_some_and(ContextValue::is_truthy)
    }

    fn get_content_data(&self, key: &str, context: &Context) -> HashMap<String, ContextValue> {
        let scope = (Self::language(context), key.to_string());
        self.items
            .read()
            .expect("translation store lock poisoned")
            .get(&scope)
            .cloned()
            .unwrap_or_default()
    }

    fn save_content_data(
        &self,
        key: &str,
        data: HashMap<String, ContextValue>,
        context: &Context,
    ) -> Result<(), ValidationError> {
        let cleaned = clean_fields(data)?;
        let language = Self::language(context);
        let mut items = self.items.write().expect("translation store lock poisoned");
        items
            .entry((language.clone(), key.to_string()))
            .or_default()
            .extend(cleaned);
        info!(key, language = %language, "translation saved");
        Ok(())
    }
}

/// Cleans a posted field map, collecting every field failure into one
/// [`ValidationError`].
fn clean_fields(
    data: HashMap<String, ContextValue>,
) -> Result<HashMap<String, ContextValue>, ValidationError> {
    let mut cleaned = HashMap::new();
    let mut errors = HashMap::new();

    for (field, value) in data {
        match clean_field(&field, value) {
            Ok(value) => {
                cleaned.insert(field, value);
            }
            Err(message) => {
                errors.insert(field, message);
            }
        }
    }

    if errors.is_empty() {
        Ok(cleaned)
    } else {
        Err(ValidationError::with_field_errors(errors))
    }
}

fn clean_field(field: &str, value: ContextValue) -> Result<ContextValue, String> {
    if field == "display" {
        return Ok(coerce_display(&value));
    }
    if URL_FIELDS.contains(&field) {
        let text = value.to_display_string();
        let cleaned = clean_url(&text)?;
        let cleaned = if field == "src" { strip_scheme(&cleaned) } else { cleaned };
        return Ok(ContextValue::from(cleaned));
    }
    Ok(value)
}

/// Maps a posted `display` value onto the boolean the renderer tests for.
/// Form posts carry strings, so `"false"`, `"0"`, and `"off"` count as false.
fn coerce_display(value: &ContextValue) -> ContextValue {
    match value {
        ContextValue::Bool(b) => ContextValue::Bool(*b),
        ContextValue::String(s) | ContextValue::Trusted(s) => {
            let off = matches!(s.to_ascii_lowercase().as_str(), "false" | "0" | "off" | "");
            ContextValue::Bool(!off)
        }
        other => ContextValue::Bool(other.is_truthy()),
    }
}

/// Accepts absolute, protocol-relative, site-relative, fragment, and bare
/// relative URLs; rejects anything with whitespace or an unparsable
/// absolute form.
fn clean_url(value: &str) -> Result<String, String> {
    if value.contains(char::is_whitespace) {
        return Err("Enter a valid URL.".to_string());
    }
    if value.is_empty() || value.starts_with('/') || value.starts_with('#') {
        return Ok(value.to_string());
    }
    match Url::parse(value) {
        Ok(_) => Ok(value.to_string()),
        // No scheme: a bare relative reference like "about.html".
        Err(url::ParseError::RelativeUrlWithoutBase) => Ok(value.to_string()),
        Err(_) => Err("Enter a valid URL.".to_string()),
    }
}

/// Rewrites an absolute URL as protocol-relative: `https://h/p` → `//h/p`.
/// Anything without a host passes through untouched.
fn strip_scheme(value: &str) -> String {
    match Url::parse(value) {
        Ok(url) if url.has_host() => {
            let mut out = String::from("//");
            out.push_str(url.host_str().unwrap_or_default());
            if let Some(port) = url.port() {
                out.push_str(&format!(":{port}"));
            }
            out.push_str(url.path());
            if let Some(query) = url.query() {
                out.push('?');
                out.push_str(query);
            }
            if let Some(fragment) = url.fragment() {
                out.push('#');
                out.push_str(fragment);
            }
            out
        }
        _ => value.to_string(),
    }
}
