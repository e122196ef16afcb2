//! Request extractors that report malformed input as `AppError`.
//!
//! Axum's own `Query` and `Path` reject with a plain-text 400. These wrappers
//! run the same extraction and turn the rejection into
//! `AppError::InvalidRequest`, so clients always get the JSON error body.

use crate::error::AppError;
use axum::{
    extract::{FromRequestParts, Path, Query},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

/// `Query<T>` with a JSON 400 on failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::InvalidRequest(rejection.body_text()))?;
        Ok(ApiQuery(value))
    }
}

/// `Path<T>` with a JSON 400 on failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::InvalidRequest(rejection.body_text()))?;
        Ok(ApiPath(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::analytics::{TimeSeriesQuery, TopUrlsQuery};
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
        routing::get,
    };
    use tower::ServiceExt;

    fn router() -> Router {
        Router::new()
            .route(
                "/top",
                get(|ApiQuery(q): ApiQuery<TopUrlsQuery>| async move {
                    format!("{:?}", q.limit)
                }),
            )
            .route(
                "/series",
                get(|ApiQuery(q): ApiQuery<TimeSeriesQuery>| async move {
                    format!("{:?} {}", q.days, q.fill_gaps)
                }),
            )
            .route(
                "/url/{url_id}",
                get(|ApiPath(url_id): ApiPath<i32>| async move { url_id.to_string() }),
            )
    }

    async fn call(uri: &str) -> (StatusCode, Vec<u8>) {
        let response = router()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body.to_vec())
    }

    async fn assert_json_bad_request(uri: &str) {
        let (status, body) = call(uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");

        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "invalid_request", "{uri}");
        assert!(json["error"]["message"].is_string(), "{uri}");
    }

    #[tokio::test]
    async fn malformed_query_values_get_json_errors() {
        assert_json_bad_request("/top?limit=abc").await;
        assert_json_bad_request("/series?days=").await;
        assert_json_bad_request("/series?fill_gaps=maybe").await;
    }

    #[tokio::test]
    async fn malformed_path_values_get_json_errors() {
        assert_json_bad_request("/url/abc").await;
    }

    #[tokio::test]
    async fn well_formed_values_pass_through() {
        assert_eq!(call("/top?limit=5").await, (StatusCode::OK, b"Some(5)".to_vec()));
        assert_eq!(
            call("/series?days=3&fill_gaps=true").await,
            (StatusCode::OK, b"Some(3) true".to_vec())
        );
        assert_eq!(call("/url/42").await, (StatusCode::OK, b"42".to_vec()));
    }
}
