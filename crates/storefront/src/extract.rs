//! Request extractors.

use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::AppError;

/// JSON body that is deserialized and then validated with `validator`.
///
/// Malformed JSON and failed validation both become a 400 with an
/// `{ "error": ... }` body.
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e: JsonRejection| AppError::BadRequest(e.body_text()))?;
        value.validate()?;
        Ok(Self(value))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request as HttpRequest, header::CONTENT_TYPE};
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize, Validate)]
    struct Signup {
        #[validate(length(min = 2))]
        name: String,
    }

    fn request(body: &str) -> Request {
        HttpRequest::builder()
            .method("POST")
            .uri("/")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_body() {
        let ValidatedJson(body) = ValidatedJson::<Signup>::from_request(request(r#"{"name":"Ada"}"#), &())
            .await
            .unwrap();
        assert_eq!(body.name, "Ada");
    }

    #[tokio::test]
    async fn test_invalid_body() {
        let err = ValidatedJson::<Signup>::from_request(request(r#"{"name":"A"}"#), &())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("name")));
    }

    #[tokio::test]
    async fn test_malformed_json() {
        let err = ValidatedJson::<Signup>::from_request(request("{"), &())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
