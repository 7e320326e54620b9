//! 部署 API
//!
//! 包含 POST /deploy 端点

use axum::{extract::State, response::IntoResponse, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::domain::deploy::DeploymentRequest;
use crate::error::ApiResult;
use crate::middleware::RequireSecret;
use crate::services;
use crate::state::AppState;

/// 部署请求体
#[derive(Debug, Clone, Deserialize)]
pub struct DeployRequestBody {
    /// 部署 brief（缺失或为空时返回 validation_error，不走 extractor 默认拒绝）
    #[serde(default)]
    pub brief: String,
    /// 请求方邮箱
    pub email: Option<String>,
    /// 任务标识（缺省时生成随机名）
    pub task: Option<String>,
    /// 评测轮次
    #[serde(default = "default_round")]
    pub round: u32,
    /// 评测 nonce，原样回传
    pub nonce: Option<String>,
    /// 评测回调地址
    pub evaluation_url: Option<String>,
    /// 仓库名覆盖
    pub repo: Option<String>,
    /// 是否创建私有仓库
    #[serde(default)]
    pub private: bool,
}

fn default_round() -> u32 {
    1
}

/// 部署响应体
#[derive(Debug, Serialize)]
pub struct DeployResponseBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub task: String,
    pub round: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    pub repo_url: String,
    pub commit_sha: String,
    pub pages_url: String,
    pub branch: String,
}

/// 创建部署路由
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/deploy", post(handle_deploy))
}

/// 执行部署
///
/// POST /deploy
/// 需要 secret 认证
///
/// 线性流程：生成 → 发布 → 开启托管，同步返回最终的托管地址。
/// 相同 brief 的重复调用各自独立，不做去重
async fn handle_deploy(
    _auth: RequireSecret,
    State(state): State<Arc<AppState>>,
    Json(body): Json<DeployRequestBody>,
) -> ApiResult<impl IntoResponse> {
    let task = body.task.clone().unwrap_or_else(default_task_name);

    info!(task = %task, round = body.round, "Received deployment request");

    let request = DeploymentRequest {
        brief: body.brief.clone(),
        task: task.clone(),
        round: body.round,
        email: body.email.clone(),
        repo: body.repo.clone(),
        private: body.private,
    };

    let site = services::deploy::execute(&state, &request).await?;

    let response = DeployResponseBody {
        email: body.email,
        task,
        round: body.round,
        nonce: body.nonce,
        repo_url: site.repo_url,
        commit_sha: site.commit_sha,
        pages_url: site.pages_url,
        branch: site.branch,
    };

    // 评测回调：单次尽力而为，失败不影响响应
    if let Some(url) = &body.evaluation_url {
        if let Ok(payload) = serde_json::to_value(&response) {
            state.callback.notify(url, &payload).await;
        }
    }

    Ok(Json(response))
}

/// 生成缺省任务名
fn default_task_name() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("task-{}", &id[..6])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_body_deserialization() {
        let body: DeployRequestBody =
            serde_json::from_str(r#"{"brief": "a single page saying Hello"}"#).unwrap();
        assert_eq!(body.brief, "a single page saying Hello");
        assert_eq!(body.round, 1);
        assert!(body.task.is_none());
        assert!(!body.private);
    }

    #[test]
    fn test_missing_brief_deserializes_to_empty() {
        // 缺失 brief 的请求体进入 handler 后由校验步骤返回 validation_error
        let body: DeployRequestBody = serde_json::from_str(r#"{"task": "counter"}"#).unwrap();
        assert!(body.brief.is_empty());
        assert_eq!(body.round, 1);
    }

    #[test]
    fn test_full_body_deserialization() {
        let body: DeployRequestBody = serde_json::from_str(
            r#"{
                "brief": "a counter app",
                "email": "student@example.com",
                "task": "counter",
                "round": 3,
                "nonce": "abc123",
                "evaluation_url": "https://eval.example.com/hook",
                "private": true
            }"#,
        )
        .unwrap();
        assert_eq!(body.task.as_deref(), Some("counter"));
        assert_eq!(body.round, 3);
        assert!(body.private);
    }

    #[test]
    fn test_response_skips_absent_nonce() {
        let response = DeployResponseBody {
            email: None,
            task: "counter".to_string(),
            round: 1,
            nonce: None,
            repo_url: "https://github.com/octocat/counter-1".to_string(),
            commit_sha: "deadbeef".to_string(),
            pages_url: "https://octocat.github.io/counter-1/".to_string(),
            branch: "main".to_string(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("nonce"));
        assert!(!json.contains("email"));
        assert!(json.contains("pages_url"));
    }

    #[test]
    fn test_default_task_name_shape() {
        let name = default_task_name();
        assert!(name.starts_with("task-"));
        assert_eq!(name.len(), "task-".len() + 6);
    }
}
