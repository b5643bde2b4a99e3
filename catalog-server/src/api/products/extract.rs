use axum::Json;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use http::request::Parts;
use serde::de::DeserializeOwned;

use crate::utils::AppError;

/// Numeric `{id}` path segment; anything else is rejected with 400
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductId(pub i64);

impl<S> FromRequestParts<S> for ProductId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::invalid_request(e.body_text()))?;

        raw.trim().parse().map(ProductId).map_err(|_| {
            AppError::invalid_request(format!("Invalid product id: {raw}")).with_detail("id", raw)
        })
    }
}

/// JSON request body; a body that does not decode is a 400 with the usual
/// error shape instead of axum's plain-text rejection
#[derive(Debug, Clone)]
pub struct ProductBody<T>(pub T);

impl<S, T> FromRequest<S> for ProductBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::invalid_request(e.body_text()))?;
        Ok(Self(value))
    }
}
