//! 生成服务 HTTP Client
//!
//! 封装与 OpenAI 兼容 chat completions 接口的交互，复用连接池

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::env::constants::GENERATION_TIMEOUT_SECS;
use crate::config::env::GenerationConfig;

/// 生成调用错误
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Generation request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Generation service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Generation service returned no usable content")]
    EmptyContent,

    #[error("Generated output does not look like an HTML document")]
    NotHtml,
}

/// 生成服务客户端
#[derive(Clone)]
pub struct GenerationClient {
    client: Client,
    config: GenerationConfig,
}

/// chat completions 请求体
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// chat completions 响应体（只取需要的字段）
#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

const SYSTEM_PROMPT: &str = "You are a skilled web app generator.";

impl GenerationClient {
    /// 创建新的生成服务客户端
    pub fn new(config: GenerationConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(GENERATION_TIMEOUT_SECS))
            .pool_max_idle_per_host(5)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    /// 根据 brief 生成单文件 HTML 应用
    ///
    /// 返回完整的 HTML 文档字符串；空产出或非 HTML 产出视为失败
    pub async fn generate_site(&self, brief: &str) -> Result<String, GenerationError> {
        let prompt = build_prompt(brief);
        let url = format!("{}/chat/completions", self.config.base_url);

        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            max_tokens: self.config.max_tokens,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, "Generation service returned non-success status");
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body: truncate(&body, 512),
            });
        }

        let parsed: ChatResponse = response.json().await?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| strip_code_fence(c.trim()).to_string())
            .filter(|c| !c.is_empty())
            .ok_or(GenerationError::EmptyContent)?;

        if !looks_like_html(&content) {
            return Err(GenerationError::NotHtml);
        }

        info!(
            model = %self.config.model,
            bytes = content.len(),
            "Generated site from brief"
        );

        Ok(content)
    }
}

/// 构造生成提示词
fn build_prompt(brief: &str) -> String {
    format!(
        "You are an expert web developer.\n\
         Generate a minimal but functional HTML/JS/CSS application\n\
         that fulfills this brief:\n\n\
         {brief}\n\n\
         Requirements:\n\
         - Must be self-contained in a single HTML file\n\
         - Include minimal inline JS and CSS\n\
         - Use clean and professional structure\n\
         - Display meaningful content or interactivity per the brief\n\
         - Respond with the HTML document only, no explanation"
    )
}

/// 去掉模型包裹产出的 Markdown 代码栅栏
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }

    // 第一行是 ``` 或 ```html，最后一行是 ```
    let without_open = match trimmed.find('\n') {
        Some(pos) => &trimmed[pos + 1..],
        None => return trimmed,
    };
    let without_close = without_open
        .trim_end()
        .strip_suffix("```")
        .unwrap_or(without_open);
    without_close.trim()
}

/// 粗略判断产出是否为 HTML 文档
fn looks_like_html(content: &str) -> bool {
    let lower = content.to_ascii_lowercase();
    lower.contains("<html") || lower.contains("<!doctype html")
}

/// 截断过长的错误响应体
fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        let mut end = max;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}
