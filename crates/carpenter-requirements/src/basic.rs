//! 基本要件: 必須ファイルの存在とイメージの命名

use crate::check::{CheckContext, CheckKind, RequirementCheck};
use crate::error::Result;
use async_trait::async_trait;
use carpenter_core::project::CONTAINER_FILE_NAMES;
use carpenter_core::{validate_repository_name, validate_tag};

const LICENSE_FILE_NAMES: [&str; 3] = ["LICENSE", "LICENSE.md", "LICENSE.txt"];

#[derive(Debug, Default, Clone, Copy)]
pub struct BasicRequirements;

impl BasicRequirements {
    pub fn new() -> Self {
        Self
    }

    /// 満たしていない要件の一覧
    pub fn problems(ctx: &CheckContext<'_>) -> Vec<String> {
        let mut problems = Vec::new();

        if !ctx.has_file("README.md") {
            problems.push("README.md がありません".to_string());
        }

        if !LICENSE_FILE_NAMES.iter().any(|name| ctx.has_file(name)) {
            problems.push(format!(
                "ライセンスファイルがありません ({})",
                LICENSE_FILE_NAMES.join(", ")
            ));
        }

        if !CONTAINER_FILE_NAMES.iter().any(|name| ctx.has_file(name)) {
            problems.push(format!(
                "コンテナ定義ファイルがありません ({})",
                CONTAINER_FILE_NAMES.join(", ")
            ));
        }

        if let Err(e) = validate_repository_name(&ctx.image.name) {
            problems.push(e.to_string());
        }

        if let Err(e) = validate_tag(&ctx.image.tag) {
            problems.push(e.to_string());
        }

        problems
    }
}

#[async_trait]
impl RequirementCheck for BasicRequirements {
    fn kind(&self) -> CheckKind {
        CheckKind::Basic
    }

    async fn evaluate(&self, ctx: &CheckContext<'_>) -> Result<bool> {
        let problems = Self::problems(ctx);
        for problem in &problems {
            tracing::warn!("[{}] {}", ctx.image, problem);
        }
        Ok(problems.is_empty())
    }
}
