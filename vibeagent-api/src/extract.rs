//! Request extractors
//!
//! [`JsonBody`] is `Json` with one relaxation: a request without a body (or
//! with a whitespace-only body) yields `T::default()` instead of a
//! rejection. Bodies that are present but not valid JSON for `T` are still
//! rejected with a 400.

use crate::error::ApiError;
use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

/// JSON request body that defaults when absent
#[derive(Debug, Clone, Default)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e.body_text())))?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(JsonBody(T::default()));
        }

        let Json(value) = Json::<T>::from_bytes(&bytes)?;
        Ok(JsonBody(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use serde::Deserialize;

    #[derive(Debug, Default, PartialEq, Deserialize)]
    struct Payload {
        name: Option<String>,
    }

    async fn extract(body: &'static str) -> Result<Payload, ApiError> {
        let req = Request::builder()
            .method("POST")
            .uri("/")
            .body(Body::from(body))
            .unwrap();
        JsonBody::<Payload>::from_request(req, &()).await.map(|JsonBody(p)| p)
    }

    #[tokio::test]
    async fn test_empty_body_defaults() {
        assert_eq!(extract("").await.unwrap(), Payload::default());
        assert_eq!(extract("  \n").await.unwrap(), Payload::default());
    }

    #[tokio::test]
    async fn test_body_without_content_type_is_parsed() {
        let payload = extract(r#"{"name":"Ada"}"#).await.unwrap();
        assert_eq!(payload.name.as_deref(), Some("Ada"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_rejected() {
        assert!(matches!(
            extract("{not json").await,
            Err(ApiError::BadRequest(msg)) if msg.starts_with("Invalid request body")
        ));
    }
}
