//! # contentious-core
//!
//! Foundation types for the contentious workspace: the error hierarchy,
//! the HTML element sets that drive tag serialization decisions, and
//! logging setup.

pub mod constants;
pub mod error;
pub mod logging;

pub use error::{ContentiousError, ValidationError};
