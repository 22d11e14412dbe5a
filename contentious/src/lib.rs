//! # contentious
//!
//! In-place editable HTML regions for server-rendered pages.
//!
//! This is the meta-crate that re-exports the sub-crates for convenient
//! access. Depend on `contentious` to get the whole stack, or on individual
//! crates for finer-grained control.
//!
//! The pieces:
//!
//! - [`core`]: error types, HTML element tables, logging setup.
//! - [`template`]: the `{% editable %}` tag, its template substrate, and the
//!   [`ContentSource`](template::ContentSource) storage contract.
//! - [`views`]: the save endpoint and reference in-memory content stores.

/// Error types, HTML element tables, and logging setup.
pub use contentious_core as core;

/// The editable tag, template substrate, and the `ContentSource` contract.
#[cfg(feature = "template")]
pub use contentious_template as template;

/// The save endpoint and reference content stores.
#[cfg(feature = "views")]
pub use contentious_views as views;

#[cfg(feature = "template")]
pub use contentious_template::{ContentSource, Context, ContextValue, Template};

#[cfg(feature = "views")]
pub use contentious_views::{router, MemorySource, TranslationSource};
