//! 应用状态

use chrono::{DateTime, Utc};

use crate::config::env::EnvConfig;
use crate::infra::{CallbackClient, GenerationClient, GithubClient};

/// 应用状态
///
/// 只持有配置和共享 HTTP 客户端。请求之间相互独立，
/// 不保留任何跨请求的可变状态
pub struct AppState {
    /// 环境配置
    pub config: EnvConfig,
    /// 生成服务客户端
    pub generation: GenerationClient,
    /// GitHub 客户端
    pub github: GithubClient,
    /// 评测回调客户端
    pub callback: CallbackClient,
    /// 服务启动时间
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// 创建新的应用状态
    pub fn new(config: EnvConfig) -> Self {
        tracing::info!(
            secret_len = config.secret.len(),
            port = config.port,
            owner = %config.github.owner,
            model = %config.generation.model,
            default_branch = %config.github.default_branch,
            "Loaded configuration"
        );

        let generation = GenerationClient::new(config.generation.clone());
        let github = GithubClient::new(config.github.clone());
        let callback = CallbackClient::new();

        Self {
            config,
            generation,
            github,
            callback,
            started_at: Utc::now(),
        }
    }
}
