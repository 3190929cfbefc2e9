use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

/// Header carrying the caller's claimed participant name.
pub const USER_HEADER: &str = "user";

/// The name a caller claims in the `User` header.
///
/// This is an unauthenticated claim: any client can send any name. Handlers
/// treat it as identity for authorization checks and nothing stronger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimedName(pub Option<String>);

impl ClaimedName {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl<S> FromRequestParts<S> for ClaimedName
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let name = parts
            .headers
            .get(USER_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string);
        Ok(Self(name))
    }
}
