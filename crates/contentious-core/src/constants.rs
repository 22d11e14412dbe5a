//! HTML element sets that drive tag serialization decisions.

/// Elements that cannot contain content and are serialized self-closing.
///
/// These are the HTML void elements. An editable region on one of these takes
/// no body, and a stored `content` override for one is a contract violation.
pub const SELF_CLOSING_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose stored `content` is treated as trusted HTML markup.
///
/// Content overrides for these render verbatim; for every other element the
/// stored content is entity-escaped before serialization.
pub const TRUSTED_CONTENT_TAGS: &[&str] = &["div", "section", "article", "blockquote"];

/// Returns true if `tag_name` is serialized self-closing.
pub fn is_self_closing(tag_name: &str) -> bool {
    SELF_CLOSING_TAGS.contains(&tag_name)
}

/// Returns true if stored content for `tag_name` is rendered as raw HTML.
pub fn content_is_html(tag_name: &str) -> bool {
    TRUSTED_CONTENT_TAGS.contains(&tag_name)
}
