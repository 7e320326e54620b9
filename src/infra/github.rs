//! GitHub REST API Client
//!
//! 封装仓库创建、文件上传、Pages 开启三类调用，复用连接池

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::env::constants::GITHUB_TIMEOUT_SECS;
use crate::config::env::GithubConfig;

/// GitHub 调用错误
#[derive(Debug, Error)]
pub enum GithubError {
    #[error("GitHub request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("GitHub returned {status}: {body}")]
    Status { status: u16, body: String },
}

/// GitHub 客户端
#[derive(Clone)]
pub struct GithubClient {
    client: Client,
    config: GithubConfig,
}

/// contents API 响应（只取提交 SHA）
#[derive(Deserialize)]
struct ContentsResponse {
    commit: CommitInfo,
}

#[derive(Deserialize)]
struct CommitInfo {
    sha: String,
}

/// 已存在文件的元信息
#[derive(Deserialize)]
struct ExistingFile {
    sha: String,
}

impl GithubClient {
    /// 创建新的 GitHub 客户端
    pub fn new(config: GithubConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(GITHUB_TIMEOUT_SECS))
            .pool_max_idle_per_host(5)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    /// 仓库 owner
    pub fn owner(&self) -> &str {
        &self.config.owner
    }

    /// 默认分支
    pub fn default_branch(&self) -> &str {
        &self.config.default_branch
    }

    /// 仓库页面地址
    pub fn repo_url(&self, repo: &str) -> String {
        format!("https://github.com/{}/{}", self.config.owner, repo)
    }

    /// Pages 托管地址
    pub fn pages_url(&self, repo: &str) -> String {
        format!("https://{}.github.io/{}/", self.config.owner, repo)
    }

    /// 创建仓库，已存在视为成功（create or update 语义）
    pub async fn create_repo(&self, repo: &str, private: bool) -> Result<(), GithubError> {
        let url = format!("{}/user/repos", self.config.api_url);
        let response = self
            .request(reqwest::Method::POST, &url)
            .json(&serde_json::json!({
                "name": repo,
                "private": private,
                "auto_init": false,
            }))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            info!(repo = %repo, "Created repository");
            return Ok(());
        }

        // 422 可能是同名仓库已存在（按更新处理），也可能是名称非法等校验失败
        if status == StatusCode::UNPROCESSABLE_ENTITY {
            let body = response.text().await.unwrap_or_default();
            if is_already_exists(&body) {
                info!(repo = %repo, "Repository already exists, will update in place");
                return Ok(());
            }
            return Err(GithubError::Status {
                status: status.as_u16(),
                body: body.chars().take(512).collect(),
            });
        }

        Err(self.status_error(response).await)
    }

    /// 上传或更新单个文件，返回提交 SHA
    ///
    /// 文件已存在时先取现有 blob SHA 再提交，避免 409 冲突
    pub async fn put_file(
        &self,
        repo: &str,
        path: &str,
        content: &str,
        message: &str,
    ) -> Result<String, GithubError> {
        let url = format!(
            "{}/repos/{}/{}/contents/{}",
            self.config.api_url, self.config.owner, repo, path
        );

        let existing_sha = self.get_file_sha(repo, path).await;

        let mut body = serde_json::json!({
            "message": message,
            "content": BASE64.encode(content.as_bytes()),
            "branch": self.config.default_branch,
        });
        if let Some(sha) = existing_sha {
            body["sha"] = serde_json::Value::String(sha);
        }

        let response = self
            .request(reqwest::Method::PUT, &url)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(self.status_error(response).await);
        }

        let parsed: ContentsResponse = response.json().await?;
        info!(repo = %repo, path = %path, commit = %parsed.commit.sha, "Uploaded file");
        Ok(parsed.commit.sha)
    }

    /// 开启 Pages 托管，已开启视为成功
    pub async fn enable_pages(&self, repo: &str) -> Result<(), GithubError> {
        let url = format!(
            "{}/repos/{}/{}/pages",
            self.config.api_url, self.config.owner, repo
        );

        let response = self
            .request(reqwest::Method::POST, &url)
            .json(&serde_json::json!({
                "source": {
                    "branch": self.config.default_branch,
                    "path": "/",
                }
            }))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            info!(repo = %repo, branch = %self.config.default_branch, "Enabled Pages");
            return Ok(());
        }

        // 409: Pages 已开启
        if status == StatusCode::CONFLICT {
            info!(repo = %repo, "Pages already enabled");
            return Ok(());
        }

        Err(self.status_error(response).await)
    }

    /// 查询已存在文件的 blob SHA，不存在返回 None
    async fn get_file_sha(&self, repo: &str, path: &str) -> Option<String> {
        let url = format!(
            "{}/repos/{}/{}/contents/{}?ref={}",
            self.config.api_url, self.config.owner, repo, path, self.config.default_branch
        );

        match self.request(reqwest::Method::GET, &url).send().await {
            Ok(response) if response.status().is_success() => {
                response.json::<ExistingFile>().await.ok().map(|f| f.sha)
            }
            Ok(_) => None,
            Err(e) => {
                warn!(repo = %repo, path = %path, error = %e, "Failed to query existing file");
                None
            }
        }
    }

    /// 带通用请求头的 request builder
    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(&self.config.token)
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", "sitegen-agent")
    }

    /// 把非成功响应转换为错误
    async fn status_error(&self, response: reqwest::Response) -> GithubError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        GithubError::Status {
            status,
            body: body.chars().take(512).collect(),
        }
    }
}

/// 判断 422 响应体是否为“仓库已存在”
fn is_already_exists(body: &str) -> bool {
    body.contains("already exists")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> GithubClient {
        GithubClient::new(GithubConfig {
            token: "test-token".to_string(),
            owner: "octocat".to_string(),
            api_url: "https://api.github.com".to_string(),
            default_branch: "main".to_string(),
        })
    }

    #[test]
    fn test_repo_url() {
        let client = test_client();
        assert_eq!(
            client.repo_url("hello-1"),
            "https://github.com/octocat/hello-1"
        );
    }

    #[test]
    fn test_pages_url() {
        let client = test_client();
        assert_eq!(
            client.pages_url("hello-1"),
            "https://octocat.github.io/hello-1/"
        );
    }

    #[test]
    fn test_default_branch() {
        let client = test_client();
        assert_eq!(client.default_branch(), "main");
    }

    #[test]
    fn test_already_exists_detected() {
        let body = r#"{"message":"Repository creation failed.","errors":[{"resource":"Repository","code":"custom","field":"name","message":"name already exists on this account"}]}"#;
        assert!(is_already_exists(body));
    }

    #[test]
    fn test_other_422_is_not_already_exists() {
        let body = r#"{"message":"Repository creation failed.","errors":[{"resource":"Repository","code":"custom","field":"name","message":"name can only contain ASCII letters, digits, and the characters ., -, and _"}]}"#;
        assert!(!is_already_exists(body));
    }
}
