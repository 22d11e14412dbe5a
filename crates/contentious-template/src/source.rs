//! The collaborator contract the editable tag depends on.
//!
//! A [`ContentSource`] answers three questions: is the current viewer in edit
//! mode, what override data is stored for a key, and how to persist a save.
//! Implementations own storage, caching, and any scoping axis (language,
//! site, ...); the renderer only sees the resulting flat field map.
//!
//! The source is passed explicitly wherever rendering happens — there is no
//! process-wide singleton to configure.

use std::collections::HashMap;

use contentious_core::ValidationError;

use crate::context::{Context, ContextValue};
use crate::tag::{RenderMeta, TagSpec};

/// Storage and permission collaborator for editable regions.
pub trait ContentSource: Send + Sync {
    /// Whether the current viewer may see edit instrumentation and save.
    fn in_edit_mode(&self, context: &Context) -> bool;

    /// Returns the stored field map for `key`. An unknown key yields an
    /// empty map, never an error.
    fn get_content_data(&self, key: &str, context: &Context) -> HashMap<String, ContextValue>;

    /// Persists `data` under `key`. Used by the save endpoint, not by
    /// rendering.
    fn save_content_data(
        &self,
        key: &str,
        data: HashMap<String, ContextValue>,
        context: &Context,
    ) -> Result<(), ValidationError>;

    /// Optional hook: transform the assembled [`TagSpec`] just before it is
    /// serialized. The returned spec replaces the original wholesale. The
    /// default implementation returns the spec unchanged.
    fn pre_render(&self, spec: TagSpec, meta: &RenderMeta) -> TagSpec {
        let _ = meta;
        spec
    }
}
