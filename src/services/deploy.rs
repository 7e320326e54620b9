//! 部署编排服务
//!
//! 单请求线性流程：校验 → 生成 → 发布 → 开启托管。
//! 三步严格串行，任何一步失败立即终止，不重试、不清理已产生的部分状态

use thiserror::Error;
use tracing::{error, info};

use crate::domain::deploy::{DeploymentRequest, GeneratedArtifact, PublishedSite};
use crate::state::AppState;

/// 部署流程错误
///
/// 与四类对外错误一一对应；Hosting 携带已创建的仓库地址，
/// 部分成功必须上报而不是静默吞掉
#[derive(Debug, Error)]
pub enum DeployError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Publish failed: {0}")]
    Publish(String),

    #[error("Hosting failed: {message} (repository created at {repo_url})")]
    Hosting { message: String, repo_url: String },
}

const LICENSE_TEXT: &str = "MIT License\n\nCopyright (c) 2025\n\nPermission is hereby granted, free of charge, to any person obtaining a copy\nof this software and associated documentation files (the \"Software\"), to deal\nin the Software without restriction.\n";

/// 执行一次部署
///
/// 这是编排的主入口点。每次调用都是独立的全新尝试，
/// 相同 brief 的重复调用不做去重
pub async fn execute(
    state: &AppState,
    request: &DeploymentRequest,
) -> Result<PublishedSite, DeployError> {
    // 入站校验，任何外部调用之前完成
    if request.brief.trim().is_empty() {
        return Err(DeployError::Validation("brief must be non-empty".to_string()));
    }

    let repo = request.repo_name();
    if repo.is_empty() {
        return Err(DeployError::Validation(
            "task does not yield a valid repository name".to_string(),
        ));
    }

    info!(task = %request.task, repo = %repo, round = request.round, "Starting deployment");

    // 第一步：生成。失败则不产生任何仓库侧副作用
    let html = state
        .generation
        .generate_site(&request.brief)
        .await
        .map_err(|e| {
            error!(task = %request.task, error = %e, "Generation step failed");
            DeployError::Generation(e.to_string())
        })?;

    let artifact = build_artifact(request, &html);

    // 第二步：发布。创建仓库（已存在则原地更新）并上传全部文件
    state
        .github
        .create_repo(&repo, request.private)
        .await
        .map_err(|e| {
            error!(repo = %repo, error = %e, "Repository creation failed");
            DeployError::Publish(e.to_string())
        })?;

    let commit_message = format!("Publish {} (round {})", request.task, request.round);
    let mut commit_sha = String::new();
    for file in &artifact.files {
        commit_sha = state
            .github
            .put_file(&repo, &file.path, &file.content, &commit_message)
            .await
            .map_err(|e| {
                error!(repo = %repo, path = %file.path, error = %e, "File upload failed");
                DeployError::Publish(e.to_string())
            })?;
    }

    let repo_url = state.github.repo_url(&repo);

    // 第三步：开启 Pages。此处失败属于部分成功，携带仓库地址上报
    state.github.enable_pages(&repo).await.map_err(|e| {
        error!(repo = %repo, error = %e, "Pages enablement failed");
        DeployError::Hosting {
            message: e.to_string(),
            repo_url: repo_url.clone(),
        }
    })?;

    let site = PublishedSite {
        repo: repo.clone(),
        repo_url,
        branch: state.github.default_branch().to_string(),
        pages_url: state.github.pages_url(&repo),
        commit_sha,
    };

    info!(
        repo = %site.repo,
        pages_url = %site.pages_url,
        commit = %site.commit_sha,
        "Deployment complete"
    );

    Ok(site)
}

/// 组装待发布的文件集合
///
/// index.html 来自生成服务，README 和 LICENSE 由代理补齐
fn build_artifact(request: &DeploymentRequest, html: &str) -> GeneratedArtifact {
    let mut artifact = GeneratedArtifact::default();
    artifact.push("index.html", html);

    let readme = match &request.email {
        Some(email) => format!(
            "# {}\n\n{}\n\nAuto-generated for {} (Round {}).\n",
            request.task, request.brief, email, request.round
        ),
        None => format!(
            "# {}\n\n{}\n\nAuto-generated (Round {}).\n",
            request.task, request.brief, request.round
        ),
    };
    artifact.push("README.md", readme);
    artifact.push("LICENSE", LICENSE_TEXT);

    artifact
}
