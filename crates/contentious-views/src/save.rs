//! The save endpoint the client-side editor posts edited fields to.
//!
//! A single form-encoded POST carries the content key plus the edited field
//! values. The handler rebuilds a request context, asks the content source
//! whether the viewer is allowed to edit, and forwards the field map to
//! [`ContentSource::save_content_data`]. Validation failures come back as a
//! JSON field → message map with the messages HTML-escaped, since the editor
//! splices them straight into the page.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Form, Json, Router};
use serde_json::json;
use tracing::{info, warn};

use contentious_core::error::NON_FIELD_ERRORS;
use contentious_template::context::ContextValue;
use contentious_template::escape::escape;
use contentious_template::source::ContentSource;

use crate::request::request_context;

/// Form fields that are transport plumbing, not content.
const RESERVED_FORM_FIELDS: &[&str] = &["key", "csrfmiddlewaretoken"];

/// Shared handler state: the content source saves go to.
#[derive(Clone)]
pub struct ContentiousState {
    /// The store backing the save endpoint.
    pub source: Arc<dyn ContentSource>,
}

/// Builds a router exposing `POST /contentious/save/` backed by `source`.
pub fn router(source: Arc<dyn ContentSource>) -> Router {
    Router::new()
        .route("/contentious/save/", post(save_content))
        .with_state(ContentiousState { source })
}

/// Handles a save POST from the client-side editor.
///
/// Responds 403 when the viewer is not in edit mode, 400 with a JSON error
/// map when the key is missing or the store rejects the data, and 200 with a
/// plain `ok` body on success.
pub async fn save_content(
    State(state): State<ContentiousState>,
    method: Method,
    uri: Uri,
    Form(fields): Form<Vec<(String, String)>>,
) -> Response {
    let context = request_context(&method, uri.path());

    if !state.source.in_edit_mode(&context) {
        return StatusCode::FORBIDDEN.into_response();
    }

    let mut key = None;
    let mut data: HashMap<String, ContextValue> = HashMap::new();
    for (name, value) in fields {
        if name == "key" {
            key = Some(value);
        } else if !RESERVED_FORM_FIELDS.contains(&name.as_str()) {
            data.insert(name, ContextValue::from(value));
        }
    }

    let Some(key) = key else {
        let body = json!({ NON_FIELD_ERRORS: "No content key was provided." });
        return (StatusCode::BAD_REQUEST, Json(body)).into_response();
    };

    match state.source.save_content_data(&key, data, &context) {
        Ok(()) => {
            info!(key = %key, "content saved");
            (StatusCode::OK, "ok").into_response()
        }
        Err(err) => {
            warn!(key = %key, error = %err, "content save rejected");
            let escaped: HashMap<String, String> = err
                .field_errors
                .into_iter()
                .map(|(field, message)| (field, escape(&message)))
                .collect();
            (StatusCode::BAD_REQUEST, Json(json!(escaped))).into_response()
        }
    }
}
