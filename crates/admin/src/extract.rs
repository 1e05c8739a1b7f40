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
/// Malformed JSON, unknown fields on strict bodies and failed validation all
/// become a 400 with an `{ "error": ... }` body.
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

    use crate::models::SettingsPatch;

    use super::*;

    fn request(body: &str) -> Request {
        HttpRequest::builder()
            .method("PUT")
            .uri("/api/merchant/settings")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_patch() {
        let ValidatedJson(patch) =
            ValidatedJson::<SettingsPatch>::from_request(request(r#"{"processingDays":3}"#), &())
                .await
                .unwrap();
        assert_eq!(patch.processing_days, Some(3));
    }

    #[tokio::test]
    async fn test_unknown_field_is_bad_request() {
        let err = ValidatedJson::<SettingsPatch>::from_request(request(r#"{"status":"ACTIVE"}"#), &())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_invalid_value_is_validation_error() {
        let err = ValidatedJson::<SettingsPatch>::from_request(
            request(r#"{"payoutSchedule":"hourly"}"#),
            &(),
        )
        .await
        .err()
        .unwrap();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("payout_schedule")));
    }
}
