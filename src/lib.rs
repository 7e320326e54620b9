//! Sitegen Agent - LLM 静态站点生成与发布代理
//!
//! 接收部署 brief，调用生成服务产出静态站点，
//! 发布到 GitHub 仓库并开启 Pages 托管

pub mod error;
pub mod middleware;
pub mod infra;
pub mod domain;
pub mod config;
pub mod state;
pub mod api;
pub mod services;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::config::env::EnvConfig;
use crate::state::AppState;

/// 运行时配置（命令行覆盖项）
#[derive(Debug, Default, Clone)]
pub struct RuntimeConfig {
    /// 监听端口覆盖（优先于环境变量）
    pub port_override: Option<u16>,
}

/// 初始化并运行代理服务
///
/// 加载环境配置、构建应用状态、启动 HTTP 服务。
/// 凭证缺失时拒绝启动，直接退出进程。
pub async fn init_and_run_agent_with_config(runtime: RuntimeConfig) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut config = match EnvConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load configuration");
            std::process::exit(1);
        }
    };

    if let Some(port) = runtime.port_override {
        config.port = port;
    }

    let port = config.port;
    let state = Arc::new(AppState::new(config));
    let app = api::router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(addr = %addr, error = %e, "Failed to bind listener");
            std::process::exit(1);
        }
    };

    tracing::info!(
        addr = %addr,
        version = config::env::constants::VERSION,
        "Sitegen agent listening"
    );

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "Server exited with error");
        std::process::exit(1);
    }
}
