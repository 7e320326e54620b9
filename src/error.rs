//! 统一错误处理
//!
//! 提供 `ApiError` 枚举实现 `IntoResponse`，替代重复的 `(StatusCode, Json<ErrorResponse>)` 模式

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::services::deploy::DeployError;

/// API 错误响应结构
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// 部分成功时已创建的仓库地址（仅 hosting_error 携带）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_url: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
            repo_url: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_repo_url(mut self, repo_url: impl Into<String>) -> Self {
        self.repo_url = Some(repo_url.into());
        self
    }
}

/// 统一 API 错误类型
#[derive(Debug)]
pub enum ApiError {
    /// 401 - 未授权（secret 无效或缺失）
    Unauthorized,
    /// 400 - 请求校验失败（brief 为空等）
    Validation(String),
    /// 502 - 生成服务调用失败或产出不可用
    Generation(String),
    /// 502 - 仓库创建/更新失败
    Publish(String),
    /// 502 - Pages 托管开启失败（仓库已创建）
    Hosting { message: String, repo_url: String },
    /// 500 - 内部错误
    Internal(String),
}

impl ApiError {
    /// 创建未授权错误
    pub fn unauthorized() -> Self {
        Self::Unauthorized
    }

    /// 创建校验错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl From<DeployError> for ApiError {
    fn from(e: DeployError) -> Self {
        match e {
            DeployError::Validation(msg) => ApiError::Validation(msg),
            DeployError::Generation(msg) => ApiError::Generation(msg),
            DeployError::Publish(msg) => ApiError::Publish(msg),
            DeployError::Hosting { message, repo_url } => {
                ApiError::Hosting { message, repo_url }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                ErrorResponse::new("unauthorized", "Invalid or missing secret"),
            ),
            ApiError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("validation_error", msg),
            ),
            ApiError::Generation(msg) => (
                StatusCode::BAD_GATEWAY,
                ErrorResponse::new("generation_error", msg),
            ),
            ApiError::Publish(msg) => (
                StatusCode::BAD_GATEWAY,
                ErrorResponse::new("publish_error", msg),
            ),
            ApiError::Hosting { message, repo_url } => (
                StatusCode::BAD_GATEWAY,
                ErrorResponse::new("hosting_error", message)
                    .with_details("repository was created but Pages could not be enabled")
                    .with_repo_url(repo_url),
            ),
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new("internal_error", msg),
            ),
        };

        (status, Json(body)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Unauthorized => write!(f, "Unauthorized"),
            ApiError::Validation(m) => write!(f, "Validation error: {}", m),
            ApiError::Generation(m) => write!(f, "Generation error: {}", m),
            ApiError::Publish(m) => write!(f, "Publish error: {}", m),
            ApiError::Hosting { message, repo_url } => {
                write!(f, "Hosting error: {} (repo: {})", message, repo_url)
            }
            ApiError::Internal(m) => write!(f, "Internal error: {}", m),
        }
    }
}

impl std::error::Error for ApiError {}

/// 便捷类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_new() {
        let resp = ErrorResponse::new("test_error", "Test message");
        assert_eq!(resp.error, "test_error");
        assert_eq!(resp.message, "Test message");
        assert!(resp.details.is_none());
        assert!(resp.repo_url.is_none());
    }

    #[test]
    fn test_error_response_with_repo_url() {
        let resp = ErrorResponse::new("hosting_error", "Pages failed")
            .with_repo_url("https://github.com/owner/repo");
        assert_eq!(resp.repo_url, Some("https://github.com/owner/repo".to_string()));
    }

    #[test]
    fn test_hosting_error_carries_repo_url() {
        let err = ApiError::from(DeployError::Hosting {
            message: "Pages API returned 500".to_string(),
            repo_url: "https://github.com/owner/repo".to_string(),
        });
        match err {
            ApiError::Hosting { repo_url, .. } => {
                assert_eq!(repo_url, "https://github.com/owner/repo");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_validation_error_mapping() {
        let err = ApiError::from(DeployError::Validation("brief is empty".to_string()));
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
