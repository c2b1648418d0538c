//! Request extractors.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::WebError;

/// Header carrying the signed-in user, set by the hosted auth layer.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The calling user, taken from the `x-user-id` header.
///
/// Missing or blank headers are rejected with 401.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for UserId
where
    S: Send + Sync,
{
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| WebError::Unauthorized("Missing x-user-id header".to_string()))?;

        Ok(UserId(user_id.to_string()))
    }
}
