use crate::error::{AppError, AppResult};
use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use validator::Validate;

/// Query string extractor that runs `validator` rules after deserializing.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> AppResult<Self> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        value.validate()?;
        Ok(ValidatedQuery(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct Page {
        #[validate(range(min = 1, max = 500, message = "limit must be between 1 and 500"))]
        limit: u32,
    }

    async fn extract(uri: &str) -> AppResult<ValidatedQuery<Page>> {
        let (mut parts, _) = Request::builder()
            .uri(uri)
            .body(Body::empty())
            .unwrap()
            .into_parts();
        ValidatedQuery::<Page>::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_valid_query() {
        let ValidatedQuery(page) = extract("/events?limit=50").await.unwrap();
        assert_eq!(page.limit, 50);
    }

    #[tokio::test]
    async fn test_out_of_range_query_is_validation_error() {
        match extract("/events?limit=0").await {
            Err(AppError::Validation { field, reason }) => {
                assert_eq!(field, "limit");
                assert!(reason.contains("between 1 and 500"));
            }
            other => panic!("Expected Validation error, got {:?}", other.map(|q| q.0)),
        }
    }

    #[tokio::test]
    async fn test_malformed_query_is_bad_request() {
        let result = extract("/events?limit=many").await;
        assert!(matches!(result, Err(AppError::BadRequest { .. })));
    }
}
