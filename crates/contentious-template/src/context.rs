//! Template context for variable resolution.
//!
//! [`Context`] holds variables in a stack of scopes; [`ContextValue`] is the
//! dynamic value model. A string can be marked [`ContextValue::Trusted`] to
//! declare it pre-trusted HTML that the escaper must pass through verbatim.

use std::collections::HashMap;
use std::fmt;

/// A dynamic value held in a template context or returned by a content store.
#[derive(Debug, Clone)]
pub enum ContextValue {
    /// A plain string, escaped on output.
    String(String),
    /// A string marked as pre-trusted HTML; escaping passes it through.
    Trusted(String),
    /// A 64-bit integer.
    Integer(i64),
    /// A 64-bit float.
    Float(f64),
    /// A boolean.
    Bool(bool),
    /// An ordered list of values.
    List(Vec<ContextValue>),
    /// A key → value mapping.
    Dict(HashMap<String, ContextValue>),
    /// The absence of a value.
    None,
}

impl ContextValue {
    /// Returns true if this value is truthy in template logic: `None`,
    /// `false`, zero, and empty strings/collections are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::None => false,
            Self::Bool(b) => *b,
            Self::Integer(i) => *i != 0,
            Self::Float(f) => *f != 0.0,
            Self::String(s) | Self::Trusted(s) => !s.is_empty(),
            Self::List(l) => !l.is_empty(),
            Self::Dict(d) => !d.is_empty(),
        }
    }

    /// Returns the string contents if this is a `String` or `Trusted` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::Trusted(s) => Some(s),
            _ => None,
        }
    }

    /// Converts this value to its output string form, without escaping.
    pub fn to_display_string(&self) -> String {
        match self {
            Self::String(s) | Self::Trusted(s) => s.clone(),
            Self::Integer(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Bool(b) => if *b { "true" } else { "false" }.to_string(),
            Self::List(items) => items
                .iter()
                .map(Self::to_display_string)
                .collect::<Vec<_>>()
                .join(","),
            Self::Dict(_) | Self::None => String::new(),
        }
    }

    /// Marks a plain string as pre-trusted HTML. Other variants are returned
    /// unchanged.
    #[must_use]
    pub fn mark_trusted(self) -> Self {
        match self {
            Self::String(s) => Self::Trusted(s),
            other => other,
        }
    }

    /// Returns true if this value bypasses escaping.
    pub fn is_trusted(&self) -> bool {
        matches!(self, Self::Trusted(_))
    }

    /// Resolves one path segment on this value: a dict key or a list index.
    pub fn resolve_segment(&self, segment: &str) -> Option<&Self> {
        match self {
            Self::Dict(map) => map.get(segment),
            Self::List(list) => segment.parse::<usize>().ok().and_then(|i| list.get(i)),
            _ => None,
        }
    }
}

impl fmt::Display for ContextValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_display_string())
    }
}

impl PartialEq for ContextValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::String(a) | Self::Trusted(a), Self::String(b) | Self::Trusted(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Dict(a), Self::Dict(b)) => a == b,
            (Self::None, Self::None) => true,
            _ => false,
        }
    }
}

impl From<&str> for ContextValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for ContextValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for ContextValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<i32> for ContextValue {
    fn from(i: i32) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<f64> for ContextValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<bool> for ContextValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl<T: Into<ContextValue>> From<Vec<T>> for ContextValue {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<ContextValue>> From<HashMap<String, T>> for ContextValue {
    fn from(m: HashMap<String, T>) -> Self {
        Self::Dict(m.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl<T: Into<ContextValue>> From<Option<T>> for ContextValue {
    fn from(o: Option<T>) -> Self {
        o.map_or(Self::None, Into::into)
    }
}

impl From<serde_json::Value> for ContextValue {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Self::None,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => n.as_i64().map_or_else(
                || n.as_f64().map_or(Self::None, Self::Float),
                Self::Integer,
            ),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(arr) => {
                Self::List(arr.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => {
                Self::Dict(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

/// A template context: a stack of variable scopes.
///
/// Lookup searches from the innermost scope outward and supports dot paths
/// into dicts and lists (`user.name`, `items.0`).
///
/// # Examples
///
/// ```
/// use contentious_template::context::{Context, ContextValue};
///
/// let mut ctx = Context::new();
/// ctx.set("title", ContextValue::from("Home"));
/// assert_eq!(ctx.get("title").unwrap().to_display_string(), "Home");
/// ```
#[derive(Default)]
pub struct Context {
    stack: Vec<HashMap<String, ContextValue>>,
}

impl Context {
    /// Creates an empty context with a single scope.
    pub fn new() -> Self {
        Self {
            stack: vec![HashMap::new()],
        }
    }

    /// Creates a context pre-populated with the given variables.
    pub fn with_values(values: HashMap<String, ContextValue>) -> Self {
        Self {
            stack: vec![values],
        }
    }

    /// Pushes a new innermost scope.
    pub fn push(&mut self) {
        self.stack.push(HashMap::new());
    }

    /// Pops the innermost scope. The last remaining scope is never popped.
    pub fn pop(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
    }

    /// Sets a variable in the innermost scope.
    pub fn set(&mut self, key: impl Into<String>, value: ContextValue) {
        if let Some(top) = self.stack.last_mut() {
            top.insert(key.into(), value);
        }
    }

    /// Looks up a variable, resolving dot paths into nested values.
    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        let mut parts = key.split('.');
        let root = parts.next()?;

        let mut current = self.stack.iter().rev().find_map(|scope| scope.get(root))?;
        for part in parts {
            current = current.resolve_segment(part)?;
        }
        Some(current)
    }
}
