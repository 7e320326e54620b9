//! 评测回调 Client
//!
//! 部署成功后将响应 payload 回传给评测服务，单次尽力而为，
//! 失败只记录日志，不影响 HTTP 响应

use reqwest::Client;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::env::constants::CALLBACK_TIMEOUT_SECS;

/// 评测回调客户端
#[derive(Clone)]
pub struct CallbackClient {
    client: Client,
}

impl CallbackClient {
    /// 创建新的回调客户端
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(CALLBACK_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }

    /// 回传部署结果
    pub async fn notify(&self, url: &str, payload: &serde_json::Value) {
        match self.client.post(url).json(payload).send().await {
            Ok(response) if response.status().is_success() => {
                info!(url = %url, "Notified evaluation service");
            }
            Ok(response) => {
                warn!(
                    url = %url,
                    status = %response.status(),
                    "Evaluation service returned non-success status"
                );
            }
            Err(e) => {
                warn!(url = %url, error = %e, "Failed to notify evaluation service");
            }
        }
    }
}

impl Default for CallbackClient {
    fn default() -> Self {
        Self::new()
    }
}
