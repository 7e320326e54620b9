//! 共享 secret 认证中间件
//!
//! 提供 `RequireSecret` extractor，替代每个 handler 中重复的 secret 校验逻辑

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::HeaderMap, request::Parts},
};
use std::sync::Arc;

use crate::error::ApiError;
use crate::state::AppState;

/// 共享 secret 认证 Extractor
///
/// 在需要认证的 handler 中使用此 extractor，自动验证 `x-api-key` header
///
/// # Example
///
/// ```ignore
/// async fn protected_handler(
///     _auth: RequireSecret,
///     State(state): State<Arc<AppState>>,
/// ) -> impl IntoResponse {
///     // handler 逻辑...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequireSecret;

#[async_trait]
impl FromRequestParts<Arc<AppState>> for RequireSecret {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        verify_secret(&parts.headers, &state.config.secret)
    }
}

/// 验证共享 secret
///
/// 检查 `x-api-key` header 是否与配置的 secret 匹配
pub fn verify_secret(headers: &HeaderMap, expected: &str) -> Result<RequireSecret, ApiError> {
    let provided = headers.get("x-api-key").and_then(|v| v.to_str().ok());

    match provided {
        Some(key) if key == expected => Ok(RequireSecret),
        Some(_) => {
            tracing::warn!("Invalid secret provided");
            Err(ApiError::unauthorized())
        }
        None => {
            tracing::warn!("Missing x-api-key header");
            Err(ApiError::unauthorized())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_verify_secret_success() {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_static("test-secret"));

        let result = verify_secret(&headers, "test-secret");
        assert!(result.is_ok());
    }

    #[test]
    fn test_verify_secret_wrong_key() {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_static("wrong-secret"));

        let result = verify_secret(&headers, "test-secret");
        assert!(result.is_err());
    }

    #[test]
    fn test_verify_secret_missing() {
        let headers = HeaderMap::new();

        let result = verify_secret(&headers, "test-secret");
        assert!(result.is_err());
    }
}
