//! Request-derived template contexts.
//!
//! The save endpoint builds a [`Context`] so the content source can answer
//! `in_edit_mode` and scope its storage the same way it does during page
//! rendering. Request facts live under a `request` dict, reachable with dot
//! paths (`request.method`, `request.path`).

use std::collections::HashMap;

use contentious_template::context::{Context, ContextValue};

/// Builds a template context describing an incoming request.
pub fn request_context(method: &http::Method, path: &str) -> Context {
    let mut request = HashMap::new();
    request.insert(
        "method".to_string(),
        ContextValue::from(method.as_str()),
    );
    request.insert("path".to_string(), ContextValue::from(path));

    let mut ctx = Context::new();
    ctx.set("request", ContextValue::Dict(request));
    ctx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_context_exposes_method_and_path() {
        let ctx = request_context(&http::Method::POST, "/contentious/save/");
        assert_eq!(ctx.get("request.method").unwrap().to_display_string(), "POST");
        assert_eq!(
            ctx.get("request.path").unwrap().to_display_string(),
            "/contentious/save/"
        );
    }
}
