//! 环境变量配置加载

use std::env;

use thiserror::Error;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Required environment variable {0} is not set")]
    MissingVar(&'static str),
}

/// 环境配置
#[derive(Clone, Debug)]
pub struct EnvConfig {
    /// 共享 secret（用于验证入站请求）
    pub secret: String,
    /// 服务监听端口
    pub port: u16,
    /// 生成服务配置
    pub generation: GenerationConfig,
    /// 仓库托管服务配置
    pub github: GithubConfig,
}

/// 生成服务配置（OpenAI 兼容接口）
#[derive(Clone, Debug)]
pub struct GenerationConfig {
    /// API 密钥
    pub api_key: String,
    /// 接口地址
    pub base_url: String,
    /// 模型名称
    pub model: String,
    /// 生成 token 上限
    pub max_tokens: u32,
}

/// GitHub 配置
#[derive(Clone, Debug)]
pub struct GithubConfig {
    /// 访问令牌
    pub token: String,
    /// 仓库 owner（用户名或组织名）
    pub owner: String,
    /// API 地址
    pub api_url: String,
    /// 默认分支
    pub default_branch: String,
}

impl EnvConfig {
    /// 从环境变量加载配置
    ///
    /// 凭证类变量缺失时返回错误，服务拒绝启动
    pub fn from_env() -> Result<Self, ConfigError> {
        let secret = require_var("AGENT_SECRET")?;

        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(constants::DEFAULT_PORT);

        let generation = GenerationConfig::from_env()?;
        let github = GithubConfig::from_env()?;

        Ok(Self {
            secret,
            port,
            generation,
            github,
        })
    }
}

impl GenerationConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = require_var("OPENAI_API_KEY")?;
        let base_url = env::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
        let model = env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
        let max_tokens = env::var("OPENAI_MAX_TOKENS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(1500);

        Ok(Self {
            api_key,
            base_url,
            model,
            max_tokens,
        })
    }
}

impl GithubConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let token = require_var("GITHUB_TOKEN")?;
        let owner = require_var("GITHUB_USERNAME")?;
        let api_url =
            env::var("GITHUB_API_URL").unwrap_or_else(|_| "https://api.github.com".to_string());
        let default_branch = env::var("DEFAULT_BRANCH").unwrap_or_else(|_| "main".to_string());

        Ok(Self {
            token,
            owner,
            api_url,
            default_branch,
        })
    }
}

/// 读取必填环境变量，空字符串视为未设置
fn require_var(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::MissingVar(name))
}

/// 常量
pub mod constants {
    /// 默认监听端口
    pub const DEFAULT_PORT: u16 = 8743;

    /// 生成服务请求超时（秒）
    pub const GENERATION_TIMEOUT_SECS: u64 = 120;

    /// GitHub API 请求超时（秒）
    pub const GITHUB_TIMEOUT_SECS: u64 = 30;

    /// 评测回调超时（秒）
    pub const CALLBACK_TIMEOUT_SECS: u64 = 10;

    /// 版本号
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_var_missing() {
        env::remove_var("SITEGEN_TEST_MISSING");
        let result = require_var("SITEGEN_TEST_MISSING");
        assert!(matches!(result, Err(ConfigError::MissingVar(_))));
    }

    #[test]
    fn test_require_var_empty_is_missing() {
        env::set_var("SITEGEN_TEST_EMPTY", "");
        let result = require_var("SITEGEN_TEST_EMPTY");
        assert!(result.is_err());
        env::remove_var("SITEGEN_TEST_EMPTY");
    }

    #[test]
    fn test_require_var_present() {
        env::set_var("SITEGEN_TEST_PRESENT", "value");
        assert_eq!(require_var("SITEGEN_TEST_PRESENT").unwrap(), "value");
        env::remove_var("SITEGEN_TEST_PRESENT");
    }
}
