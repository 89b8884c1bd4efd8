use axum::{extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};
use domain::Caller;
use tracing::warn;

use crate::error::ApiError;
use crate::AppState;

/// `Authorization: Bearer <jwt>` から得た呼び出し元
#[derive(Debug, Clone, Copy)]
pub struct CurrentCaller(pub Caller);

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentCaller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        state
            .validator
            .caller_from_header(header)
            .map(CurrentCaller)
            .map_err(|e| {
                warn!(error = %e, "認証に失敗しました");
                ApiError::Unauthorized
            })
    }
}
