//! 部署相关领域模型

use serde::Serialize;

/// 部署请求（已通过入站校验的领域表示）
///
/// 每次请求创建一份，流程结束后丢弃，不做去重
#[derive(Clone, Debug)]
pub struct DeploymentRequest {
    /// 部署 brief（非空）
    pub brief: String,
    /// 任务标识（用于仓库命名）
    pub task: String,
    /// 评测轮次
    pub round: u32,
    /// 请求方邮箱（写入 README，可选）
    pub email: Option<String>,
    /// 仓库名覆盖（优先于 task-round 命名）
    pub repo: Option<String>,
    /// 是否创建私有仓库
    pub private: bool,
}

impl DeploymentRequest {
    /// 计算目标仓库名
    ///
    /// 显式指定的 repo 优先，否则按 `{task}-{round}` 规则生成
    pub fn repo_name(&self) -> String {
        match &self.repo {
            Some(repo) => repo_slug(repo),
            None => repo_slug(&format!("{}-{}", self.task, self.round)),
        }
    }
}

/// 生成产物中的单个文件
#[derive(Clone, Debug, PartialEq)]
pub struct ArtifactFile {
    /// 仓库内路径
    pub path: String,
    /// 文件内容
    pub content: String,
}

/// 生成产物：一组待发布的文本文件
#[derive(Clone, Debug, Default)]
pub struct GeneratedArtifact {
    pub files: Vec<ArtifactFile>,
}

impl GeneratedArtifact {
    /// 添加文件
    pub fn push(&mut self, path: impl Into<String>, content: impl Into<String>) {
        self.files.push(ArtifactFile {
            path: path.into(),
            content: content.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// 发布结果：仓库与托管地址
#[derive(Clone, Debug, Serialize)]
pub struct PublishedSite {
    /// 仓库名
    pub repo: String,
    /// 仓库地址
    pub repo_url: String,
    /// 默认分支
    pub branch: String,
    /// Pages 托管地址
    pub pages_url: String,
    /// 最后一次提交的 SHA
    pub commit_sha: String,
}

/// 将任意名称转换为合法的仓库 slug
///
/// 小写、空白替换为 `-`、去掉 URL 不安全字符、折叠连续的 `-`
pub fn repo_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = false;

    for c in name.trim().chars() {
        let mapped = match c {
            'a'..='z' | '0'..='9' | '.' | '_' => Some(c),
            'A'..='Z' => Some(c.to_ascii_lowercase()),
            ' ' | '\t' | '-' | '/' => Some('-'),
            _ => None,
        };
        match mapped {
            Some('-') => {
                if !last_dash && !slug.is_empty() {
                    slug.push('-');
                    last_dash = true;
                }
            }
            Some(c) => {
                slug.push(c);
                last_dash = false;
            }
            None => {}
        }
    }

    // 去掉末尾的 '-'
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
