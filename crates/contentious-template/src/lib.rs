//! # contentious-template
//!
//! The editable-region tag and the minimal template substrate that hosts it.
//!
//! A page author marks an element editable with a stable key and a list of
//! fields that a content store may override:
//!
//! ```text
//! {% editable a "intro_link" editable="content,href" href="/about/" %}
//!     Learn more
//! {% endeditable %}
//! ```
//!
//! At render time the tag pulls override data for the key from a
//! [`source::ContentSource`], merges it over the authored defaults, and
//! serializes the final element. In edit mode the element is additionally
//! annotated with `data-cts-*` attributes and `cts-*` classes consumed by the
//! client-side editor.

pub mod context;
pub mod escape;
pub mod expression;
pub mod lexer;
pub mod parser;
pub mod source;
pub mod tag;

pub use context::{Context, ContextValue};
pub use parser::Template;
pub use source::ContentSource;
pub use tag::{RenderMeta, TagSpec};
