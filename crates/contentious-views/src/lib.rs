//! # contentious-views
//!
//! The HTTP boundary of the contentious workspace: an [`axum`] router
//! exposing the save endpoint that the client-side editor posts to, the
//! request-context builder handed to the content source, and two reference
//! [`ContentSource`](contentious_template::ContentSource) implementations
//! backed by in-memory storage.

pub mod memory;
pub mod request;
pub mod save;

pub use memory::{MemorySource, TranslationSource};
pub use request::request_context;
pub use save::{router, save_content, ContentiousState};
