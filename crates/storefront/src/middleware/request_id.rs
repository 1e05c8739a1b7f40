//! Request IDs for the shop.
//!
//! An upstream `x-request-id` from the edge proxy is kept when
//! `luxora_core::request_id::accept_upstream` allows it; anything else gets a
//! UUID v4. The ID lands on the request span and the Sentry scope, and is
//! echoed back so shoppers can quote it to support.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Span;
use uuid::Uuid;

use luxora_core::request_id::{REQUEST_ID_HEADER, accept_upstream};

/// Tag every request with an ID.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let upstream = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok());
    let request_id =
        accept_upstream(upstream).map_or_else(|| Uuid::new_v4().to_string(), String::from);

    Span::current().record("request_id", &request_id);
    sentry::configure_scope(|scope| scope.set_tag("request_id", &request_id));

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{Router, body::Body, routing::get};
    use tower::ServiceExt;

    use super::*;

    fn app() -> Router {
        Router::new()
            .route("/api/products", get(|| async { "[]" }))
            .layer(axum::middleware::from_fn(request_id_middleware))
    }

    async fn echoed(header: Option<&str>) -> String {
        let mut request = Request::builder().uri("/api/products");
        if let Some(value) = header {
            request = request.header(REQUEST_ID_HEADER, value);
        }
        let response = app()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();
        response
            .headers()
            .get(REQUEST_ID_HEADER)
            .unwrap()
            .to_str()
            .unwrap()
            .to_owned()
    }

    #[tokio::test]
    async fn test_edge_id_is_echoed() {
        assert_eq!(echoed(Some("cf-7a21")).await, "cf-7a21");
    }

    #[tokio::test]
    async fn test_unusable_ids_are_replaced() {
        for header in [None, Some(""), Some("has spaces")] {
            let id = echoed(header).await;
            assert!(Uuid::parse_str(&id).is_ok(), "{header:?} gave {id}");
        }
    }
}
