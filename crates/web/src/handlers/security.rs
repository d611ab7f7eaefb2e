use std::collections::BTreeMap;

use axum::{
    extract::{Request, State},
    http::{HeaderValue, header::CONTENT_TYPE},
    middleware::Next,
    response::Response,
};

use crate::AppState;

/// Build a `Content-Security-Policy` value from directive overrides.
pub fn content_security_policy(directives: &BTreeMap<String, String>) -> String {
    if directives.is_empty() {
        return "default-src 'none'".to_string();
    }
    directives
        .iter()
        .map(|(name, value)| if value.is_empty() { name.clone() } else { format!("{name} {value}") })
        .collect::<Vec<_>>()
        .join("; ")
}

pub async fn security_headers(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    let security = &state.config.security;
    if !security.enabled {
        return response;
    }
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if content_type.starts_with("text/html") {
        let policy = content_security_policy(&security.csp_directives);
        let response_headers = response.headers_mut();
        match HeaderValue::from_str(&policy) {
            Ok(value) => {
                response_headers.insert("Content-Security-Policy", value);
            }
            Err(e) => tracing::warn!("Invalid CSP header {:?}: {}", policy, e),
        }
        response_headers
            .insert("Referrer-Policy", HeaderValue::from_static("strict-origin-when-cross-origin"));
        response_headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));
    }
    let response_headers = response.headers_mut();
    response_headers.insert("X-Content-Type-Options", HeaderValue::from_static("nosniff"));
    response
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
        middleware,
        response::Html,
        routing::get,
    };
    use tower::ServiceExt;

    use super::*;
    use crate::handlers::tests::state;

    fn directives(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|&(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_content_security_policy() {
        assert_eq!(content_security_policy(&BTreeMap::new()), "default-src 'none'");
        assert_eq!(
            content_security_policy(&directives(&[
                ("default-src", "'none'"),
                ("img-src", "'self' https://credly.com"),
                ("upgrade-insecure-requests", ""),
            ])),
            "default-src 'none'; img-src 'self' https://credly.com; upgrade-insecure-requests"
        );
    }

    async fn request(state: AppState, uri: &str) -> Response {
        let router = Router::new()
            .route("/page", get(|| async { Html("<p>hi</p>") }))
            .route("/plain", get(|| async { "hi" }))
            .layer(middleware::from_fn_with_state(state.clone(), security_headers))
            .with_state(state);
        router.oneshot(Request::get(uri).body(Body::empty()).unwrap()).await.unwrap()
    }

    #[tokio::test]
    async fn test_html_headers() {
        let response = request(state(vec![]), "/page").await;
        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers["Content-Security-Policy"], "default-src 'none'");
        assert_eq!(headers["X-Frame-Options"], "DENY");
        assert_eq!(headers["X-Content-Type-Options"], "nosniff");
    }

    #[tokio::test]
    async fn test_non_html_headers() {
        let response = request(state(vec![]), "/plain").await;
        let headers = response.headers();
        assert!(headers.get("Content-Security-Policy").is_none());
        assert_eq!(headers["X-Content-Type-Options"], "nosniff");
    }

    #[tokio::test]
    async fn test_disabled() {
        let mut state = state(vec![]);
        Arc::make_mut(&mut state.config).security.enabled = false;
        let response = request(state, "/page").await;
        assert!(response.headers().get("X-Content-Type-Options").is_none());
    }
}
