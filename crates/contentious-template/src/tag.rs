//! The `{% editable %}` tag: declaration, override merging, and rendering.
//!
//! An editable region is declared as
//! `{% editable <element> <key> editable="..." [optional="..."] [extra=...] attr=value ... %}`
//! with the authored default content as the tag body (omitted for
//! self-closing elements). Rendering merges stored override data from a
//! [`ContentSource`] over the authored defaults and, in edit mode, annotates
//! the element with the `data-cts-*` attributes and `cts-*` classes that the
//! client-side editor consumes.

use std::collections::HashMap;

use tracing::debug;

use contentious_core::constants::{content_is_html, is_self_closing};
use contentious_core::ContentiousError;

use crate::context::{Context, ContextValue};
use crate::escape::escape_value;
use crate::expression::{parse_kwargs, Expression};
use crate::parser::Node;
use crate::source::ContentSource;

/// The assembled element, handed to [`ContentSource::pre_render`] before
/// serialization. The hook may replace it wholesale.
#[derive(Debug, Clone, PartialEq)]
pub struct TagSpec {
    /// The element name.
    pub tag_name: String,
    /// Ordered attribute list; an empty value serializes as a bare name.
    pub attrs: Vec<(String, String)>,
    /// Inner content, or `None` for a self-closing element.
    pub content: Option<String>,
}

impl TagSpec {
    /// Creates an empty spec for `tag_name`.
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            attrs: Vec::new(),
            content: None,
        }
    }

    /// Returns the value of the named attribute.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Sets an attribute, replacing a previous value in place or appending.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(slot) = self.attrs.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value;
        } else {
            self.attrs.push((name, value));
        }
    }
}

/// Read-only facts about a render, passed to [`ContentSource::pre_render`].
#[derive(Debug, Clone)]
pub struct RenderMeta {
    /// The resolved region key.
    pub key: String,
    /// Fields the store may override, in declaration order.
    pub editables: Vec<String>,
    /// Fields the client editor treats as non-mandatory.
    pub optionals: Vec<String>,
    /// Opaque payload passed through to the client, if declared.
    pub extra: Option<String>,
    /// Whether the viewer is in edit mode.
    pub edit_mode: bool,
    /// Whether the store had any data for the key at all.
    pub data_was_provided: bool,
}

/// How a region's reserved `display` field resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visibility {
    /// Render normally.
    Visible,
    /// `display` is false outside edit mode: render nothing.
    Hidden,
    /// `display` is false in edit mode: render with the switched-off markers.
    SwitchedOff,
}

/// A parsed `{% editable %}` declaration, bound into the template tree once
/// per compile and reused across renders.
#[derive(Debug, Clone)]
pub struct EditableNode {
    pub(crate) tag_name: String,
    pub(crate) key: Expression,
    pub(crate) editables: Expression,
    pub(crate) optionals: Option<Expression>,
    pub(crate) extra: Option<Expression>,
    pub(crate) attrs: Vec<(String, Expression)>,
    pub(crate) nodelist: Vec<Node>,
}

impl EditableNode {
    /// Parses the tag arguments: element name, key expression, then kwargs.
    ///
    /// The element name must be a parse-time literal because self-closing-ness
    /// decides whether a body is consumed. The `editable` kwarg is required;
    /// `optional` and `extra` are reserved; everything else becomes a default
    /// attribute. The body nodelist is attached by the template parser.
    ///
    /// # Errors
    ///
    /// Returns a syntax error for a missing element name or key, a quoted or
    /// variable element name, a missing `editable` kwarg, or malformed kwargs.
    pub(crate) fn from_args(args: &[String]) -> Result<Self, ContentiousError> {
        if args.len() < 2 {
            return Err(ContentiousError::syntax(
                "editable tag expects an element name and a key.",
            ));
        }
        let tag_name = args[0].clone();
        if tag_name.starts_with('"') || tag_name.starts_with('\'') || tag_name.contains('=') {
            return Err(ContentiousError::syntax(
                "editable tag expects a literal element name.",
            ));
        }
        let key = Expression::compile(&args[1])?;
        let mut kwargs = parse_kwargs(&args[2..], "editable")?;

        let mut take = |name: &str| {
            kwargs
                .iter()
                .position(|(n, _)| n == name)
                .map(|i| kwargs.remove(i).1)
        };
        let editables = take("editable").ok_or_else(|| {
            ContentiousError::syntax("editable tag expects an 'editable' kwarg.")
        })?;
        let optionals = take("optional");
        let extra = take("extra");

        Ok(Self {
            tag_name,
            key,
            editables,
            optionals,
            extra,
            attrs: kwargs,
            nodelist: Vec::new(),
        })
    }

    /// True if this element is serialized self-closing (and takes no body).
    pub(crate) fn is_self_closing(&self) -> bool {
        is_self_closing(&self.tag_name)
    }

    /// Renders the final element.
    ///
    /// `is_nested` is true when this region renders as the default content of
    /// an enclosing region; it only changes which editable CSS class is used.
    ///
    /// # Panics
    ///
    /// Panics on author contract violations: a `content`-editable region with
    /// nested editable regions in its body, or a stored `content` override
    /// for a self-closing element.
    pub fn render(&self, context: &Context, source: &dyn ContentSource, is_nested: bool) -> String {
        // Nothing on `self` is mutated; everything context-bound resolves
        // into fresh locals so the node stays reusable across renders.
        let key = self.key.resolve(context).to_display_string();
        let editables = resolve_field_list(&self.editables.resolve(context));
        let optionals = self
            .optionals
            .as_ref()
            .map_or_else(Vec::new, |e| resolve_field_list(&e.resolve(context)));
        let extra = self.extra.as_ref().map(|e| e.resolve(context));

        assert!(
            !(editables.iter().any(|f| f == "content")
                && self.nodelist.iter().any(Node::is_editable)),
            "Cannot edit content if editable contains nested editables"
        );

        let edit_mode = source.in_edit_mode(context);
        let data = source.get_content_data(&key, context);
        let data_was_provided = !data.is_empty();
        let mut data = filter_to_editable(data, &editables, &key);

        let visibility = resolve_visibility(&mut data, edit_mode);
        if visibility == Visibility::Hidden {
            return String::new();
        }

        // Start from the authored defaults, in declaration order.
        let mut final_attrs: Vec<(String, ContextValue)> = self
            .attrs
            .iter()
            .map(|(name, expr)| (name.clone(), expr.resolve(context)))
            .collect();

        if edit_mode {
            inject_edit_metadata(
                &mut final_attrs,
                &key,
                &editables,
                &optionals,
                extra.as_ref(),
                is_nested,
                visibility == Visibility::SwitchedOff,
                data_was_provided,
            );
        }

        let content = self.resolve_content(data.remove("content"), context, source);

        // Stored data overrides the defaults (and may introduce attributes
        // the author never declared). Instrumentation names are not editable
        // fields, so they cannot be shadowed here.
        for field in &editables {
            if let Some(value) = data.remove(field) {
                set_attr(&mut final_attrs, field, value);
            }
        }

        // Final, unconditional escaping pass over every attribute value.
        let attrs = final_attrs
            .iter()
            .map(|(name, value)| (name.clone(), escape_value(value).to_display_string()))
            .collect();

        let spec = TagSpec {
            tag_name: self.tag_name.clone(),
            attrs,
            content,
        };
        let meta = RenderMeta {
            key,
            editables,
            optionals,
            extra: extra.map(|v| v.to_display_string()),
            edit_mode,
            data_was_provided,
        };
        let spec = source.pre_render(spec, &meta);

        serialize(&spec, self.is_self_closing())
    }

    /// Resolves the element's inner content: the stored override if present
    /// (escaped unless the element treats content as HTML), otherwise the
    /// rendered default body.
    fn resolve_content(
        &self,
        override_content: Option<ContextValue>,
        context: &Context,
        source: &dyn ContentSource,
    ) -> Option<String> {
        if self.is_self_closing() {
            assert!(
                override_content.is_none(),
                "self-closing element '{}' cannot take a content override",
                self.tag_name
            );
            return None;
        }
        Some(match override_content {
            Some(value) => {
                if content_is_html(&self.tag_name) {
                    value.to_display_string()
                } else {
                    escape_value(&value).to_display_string()
                }
            }
            None => self
                .nodelist
                .iter()
                .map(|node| node.render(context, source, true))
                .collect(),
        })
    }
}

/// The Field Merger: retains exactly the stored keys named in `editables`.
/// Stale or foreign fields are dropped silently.
fn filter_to_editable(
    data: HashMap<String, ContextValue>,
    editables: &[String],
    key: &str,
) -> HashMap<String, ContextValue> {
    let (kept, dropped): (HashMap<_, _>, HashMap<_, _>) = data
        .into_iter()
        .partition(|(field, _)| editables.iter().any(|e| e == field));
    if !dropped.is_empty() {
        debug!(
            key,
            fields = ?dropped.keys().collect::<Vec<_>>(),
            "dropping stored fields not declared editable"
        );
    }
    kept
}

/// The Visibility Resolver: pops the reserved `display` field and maps an
/// explicit `false` to hidden (outside edit mode) or switched-off (in it).
fn resolve_visibility(data: &mut HashMap<String, ContextValue>, edit_mode: bool) -> Visibility {
    let switched_off = matches!(data.remove("display"), Some(ContextValue::Bool(false)));
    match (switched_off, edit_mode) {
        (false, _) => Visibility::Visible,
        (true, true) => Visibility::SwitchedOff,
        (true, false) => Visibility::Hidden,
    }
}

/// The Edit-Metadata Injector: attaches the instrumentation the client-side
/// editor consumes. Only ever called in edit mode.
#[allow(clippy::too_many_arguments)]
fn inject_edit_metadata(
    attrs: &mut Vec<(String, ContextValue)>,
    key: &str,
    editables: &[String],
    optionals: &[String],
    extra: Option<&ContextValue>,
    is_nested: bool,
    switched_off: bool,
    data_was_provided: bool,
) {
    set_attr(attrs, "data-cts-key", ContextValue::from(key));
    set_attr(
        attrs,
        "data-cts-editables",
        ContextValue::from(editables.join(",")),
    );
    set_attr(
        attrs,
        "data-cts-optionals",
        ContextValue::from(optionals.join(",")),
    );
    if let Some(extra) = extra {
        if extra.is_truthy() {
            set_attr(attrs, "data-cts-extra", extra.clone());
        }
    }

    // Append our marker classes, preserving any the author defined.
    let mut classes: Vec<String> = get_attr(attrs, "class")
        .map(|v| v.to_display_string().split(' ').map(String::from).collect())
        .unwrap_or_default();
    classes.push(if is_nested { "cts-nested-editable" } else { "cts-editable" }.to_string());

    set_attr(
        attrs,
        "data-cts-switched-off",
        ContextValue::from(if switched_off { "1" } else { "0" }),
    );
    if switched_off {
        classes.push("cts-switched-off".to_string());
    }
    if !data_was_provided {
        classes.push("cts-default-data".to_string());
    }

    // The region key doubles as the element id unless the author set one.
    if get_attr(attrs, "id").is_none() {
        set_attr(attrs, "id", ContextValue::from(key));
    }

    let class_list = classes
        .iter()
        .filter(|c| !c.is_empty())
        .cloned()
        .collect::<Vec<_>>()
        .join(" ");
    set_attr(attrs, "class", ContextValue::from(class_list));
}

/// Serializes the spec: `<name attrs>content</name>`, or `<name attrs />`
/// for self-closing elements. An attribute with an empty value renders as a
/// bare name.
fn serialize(spec: &TagSpec, self_closing: bool) -> String {
    let attrs = spec
        .attrs
        .iter()
        .map(|(name, value)| {
            if value.is_empty() {
                name.clone()
            } else {
                format!("{name}=\"{value}\"")
            }
        })
        .collect::<Vec<_>>()
        .join(" ");

    let open = format!("<{} {}", spec.tag_name, attrs);
    if self_closing {
        format!("{open} />")
    } else {
        format!(
            "{open}>{}</{}>",
            spec.content.clone().unwrap_or_default(),
            spec.tag_name
        )
    }
}

/// Resolves a declared field list: a comma-separated string splits on commas
/// with empty segments dropped (so `""` yields an empty list, never `[""]`);
/// a list value takes each element's string form.
fn resolve_field_list(value: &ContextValue) -> Vec<String> {
    match value {
        ContextValue::String(s) | ContextValue::Trusted(s) => s
            .split(',')
            .filter(|part| !part.is_empty())
            .map(String::from)
            .collect(),
        ContextValue::List(items) => items.iter().map(ContextValue::to_display_string).collect(),
        _ => Vec::new(),
    }
}

fn set_attr(attrs: &mut Vec<(String, ContextValue)>, name: &str, value: ContextValue) {
    if let Some(slot) = attrs.iter_mut().find(|(n, _)| n == name) {
        slot.1 = value;
    } else {
        attrs.push((name.to_string(), value));
    }
}

fn get_attr<'a>(attrs: &'a [(String, ContextValue)], name: &str) -> Option<&'a ContextValue> {
    attrs.iter().find(|(n, _)| n == name).map(|(_, v)| v)
}

/// The `{% toolbar %}` tag: renders its body only in edit mode.
#[derive(Debug, Clone)]
pub struct ToolbarNode {
    pub(crate) nodelist: Vec<Node>,
}

impl ToolbarNode {
    /// Renders the toolbar body, or nothing outside edit mode.
    pub fn render(&self, context: &Context, source: &dyn ContentSource) -> String {
        if !source.in_edit_mode(context) {
            return String::new();
        }
        self.nodelist
            .iter()
            .map(|node| node.render(context, source, false))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value_map(pairs: &[(&str, ContextValue)]) -> HashMap<String, ContextValue> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_filter_keeps_only_editable_fields() {
        let data = value_map(&[
            ("title", ContextValue::from("t")),
            ("onclick", ContextValue::from("evil()")),
        ]);
        let filtered =
            filter_to_editable(data, &["title".to_string(), "content".to_string()], "k");
        assert_eq!(filtered.len(), 1);
        assert!(filtered.contains_key("title"));
    }

    #[test]
    fn test_filter_is_exact_intersection() {
        let data = value_map(&[("a", ContextValue::from("1")), ("b", ContextValue::from("2"))]);
        let filtered = filter_to_editable(data, &["b".to_string(), "c".to_string()], "k");
        assert_eq!(filtered.keys().collect::<Vec<_>>(), vec!["b"]);
    }

    #[test]
    fn test_visibility_absent_display_is_visible() {
        let mut data = HashMap::new();
        assert_eq!(resolve_visibility(&mut data, false), Visibility::Visible);
        assert_eq!(resolve_visibility(&mut data, true), Visibility::Visible);
    }

    #[test]
    fn test_visibility_false_display() {
        let mut data = value_map(&[("display", ContextValue::Bool(false))]);
        assert_eq!(resolve_visibility(&mut data, false), Visibility::Hidden);
        let mut data = value_map(&[("display", ContextValue::Bool(false))]);
        assert_eq!(resolve_visibility(&mut data, true), Visibility::SwitchedOff);
    }

    #[test]
    fn test_visibility_pops_display() {
        let mut data = value_map(&[("display", ContextValue::Bool(true))]);
        assert_eq!(resolve_visibility(&mut data, false), Visibility::Visible);
        assert!(data.is_empty());
    }

    #[test]
    fn test_visibility_only_explicit_false_counts() {
        // A string "false" from a form post is a store concern, not ours.
        let mut data = value_map(&[("display", ContextValue::from("false"))]);
        assert_eq!(resolve_visibility(&mut data, false), Visibility::Visible);
    }

    #[test]
    fn test_resolve_field_list_from_string() {
        assert_eq!(
            resolve_field_list(&ContextValue::from("content,title")),
            vec!["content", "title"]
        );
    }

    #[test]
    fn test_resolve_field_list_empty_string_is_empty() {
        assert!(resolve_field_list(&ContextValue::from("")).is_empty());
        assert!(resolve_field_list(&ContextValue::from(",,")).is_empty());
    }

    #[test]
    fn test_resolve_field_list_from_list() {
        let v = ContextValue::from(vec!["title", "content", "tabindex"]);
        assert_eq!(
            resolve_field_list(&v),
            vec!["title", "content", "tabindex"]
        );
    }

    #[test]
    fn test_resolve_field_list_none_is_empty() {
        assert!(resolve_field_list(&ContextValue::None).is_empty());
    }

    #[test]
    fn test_inject_metadata_basics() {
        let mut attrs = Vec::new();
        inject_edit_metadata(
            &mut attrs,
            "my_key",
            &["content".to_string(), "title".to_string()],
            &["title".to_string()],
            None,
            false,
            false,
            false,
        );
        assert_eq!(
            get_attr(&attrs, "data-cts-key").unwrap().to_display_string(),
            "my_key"
        );
        assert_eq!(
            get_attr(&attrs, "data-cts-editables")
                .unwrap()
                .to_display_string(),
            "content,title"
        );
        assert_eq!(
            get_attr(&attrs, "data-cts-optionals")
                .unwrap()
                .to_display_string(),
            "title"
        );
        assert_eq!(
            get_attr(&attrs, "data-cts-switched-off")
                .unwrap()
                .to_display_string(),
            "0"
        );
        assert_eq!(
            get_attr(&attrs, "class").unwrap().to_display_string(),
            "cts-editable cts-default-data"
        );
        assert_eq!(get_attr(&attrs, "id").unwrap().to_display_string(), "my_key");
    }

    #[test]
    fn test_inject_metadata_preserves_authored_class_and_id() {
        let mut attrs = vec![
            ("class".to_string(), ContextValue::from("hero wide")),
            ("id".to_string(), ContextValue::from("banner")),
        ];
        inject_edit_metadata(&mut attrs, "k", &[], &[], None, true, true, true);
        assert_eq!(
            get_attr(&attrs, "class").unwrap().to_display_string(),
            "hero wide cts-nested-editable cts-switched-off"
        );
        assert_eq!(get_attr(&attrs, "id").unwrap().to_display_string(), "banner");
        assert_eq!(
            get_attr(&attrs, "data-cts-switched-off")
                .unwrap()
                .to_display_string(),
            "1"
        );
    }

    #[test]
    fn test_inject_metadata_extra_only_when_truthy() {
        let mut attrs = Vec::new();
        inject_edit_metadata(
            &mut attrs,
            "k",
            &[],
            &[],
            Some(&ContextValue::from("")),
            false,
            false,
            true,
        );
        assert!(get_attr(&attrs, "data-cts-extra").is_none());

        let mut attrs = Vec::new();
        inject_edit_metadata(
            &mut attrs,
            "k",
            &[],
            &[],
            Some(&ContextValue::from("payload")),
            false,
            false,
            true,
        );
        assert_eq!(
            get_attr(&attrs, "data-cts-extra")
                .unwrap()
                .to_display_string(),
            "payload"
        );
    }

    #[test]
    fn test_serialize_paired_and_bare_attrs() {
        let spec = TagSpec {
            tag_name: "div".to_string(),
            attrs: vec![
                ("title".to_string(), "cake".to_string()),
                ("hidden".to_string(), String::new()),
            ],
            content: Some("body".to_string()),
        };
        assert_eq!(serialize(&spec, false), "<div title=\"cake\" hidden>body</div>");
    }

    #[test]
    fn test_serialize_self_closing() {
        let spec = TagSpec {
            tag_name: "img".to_string(),
            attrs: vec![("src".to_string(), "/a.png".to_string())],
            content: None,
        };
        assert_eq!(serialize(&spec, true), "<img src=\"/a.png\" />");
    }

    #[test]
    fn test_tag_spec_set_attr_replaces_in_place() {
        let mut spec = TagSpec::new("a");
        spec.set_attr("href", "/x/");
        spec.set_attr("title", "t");
        spec.set_attr("href", "/y/");
        assert_eq!(spec.attrs[0], ("href".to_string(), "/y/".to_string()));
        assert_eq!(spec.attr("title"), Some("t"));
    }

    #[test]
    fn test_from_args_requires_editable_kwarg() {
        let args = vec!["div".to_string(), "\"k\"".to_string()];
        let err = EditableNode::from_args(&args).unwrap_err();
        assert!(err.to_string().contains("'editable' kwarg"));
    }

    #[test]
    fn test_from_args_requires_literal_element() {
        let args = vec![
            "\"div\"".to_string(),
            "\"k\"".to_string(),
            "editable=\"\"".to_string(),
        ];
        assert!(EditableNode::from_args(&args).is_err());
    }

    #[test]
    fn test_from_args_separates_reserved_kwargs() {
        let args = vec![
            "div".to_string(),
            "\"k\"".to_string(),
            "editable=\"content\"".to_string(),
            "optional=\"title\"".to_string(),
            "extra=\"p\"".to_string(),
            "title=\"cake\"".to_string(),
        ];
        let node = EditableNode::from_args(&args).unwrap();
        assert!(node.optionals.is_some());
        assert!(node.extra.is_some());
        assert_eq!(node.attrs.len(), 1);
        assert_eq!(node.attrs[0].0, "title");
    }

    #[test]
    fn test_from_args_too_few() {
        assert!(EditableNode::from_args(&["div".to_string()]).is_err());
    }
}
