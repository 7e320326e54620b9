//! 基础设施模块
//!
//! 外部服务的 HTTP 客户端封装

pub mod callback;
pub mod generation;
pub mod github;

pub use callback::CallbackClient;
pub use generation::GenerationClient;
pub use github::GithubClient;
