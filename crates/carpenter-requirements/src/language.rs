//! 言語固有の要件チェック

use crate::check::{CheckContext, CheckKind, RequirementCheck};
use crate::error::Result;
use crate::style::StyleChecker;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// プロジェクトの実装言語
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Python,
    Go,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::Python => f.write_str("python"),
            Language::Go => f.write_str("go"),
        }
    }
}

impl Language {
    /// ファイル一覧から言語を推定する（Go を優先）
    pub fn detect(file_names: &[String]) -> Option<Self> {
        let has = |name: &str| file_names.iter().any(|f| f == name);

        if has("go.mod") {
            return Some(Language::Go);
        }

        if has("pyproject.toml")
            || has("setup.py")
            || has("requirements.txt")
            || file_names.iter().any(|f| f.ends_with(".py"))
        {
            return Some(Language::Python);
        }

        None
    }

    /// 言語ごとに必須のファイル
    pub fn required_files(&self) -> &'static [&'static str] {
        match self {
            Language::Python => &["pyproject.toml"],
            Language::Go => &["go.mod", "go.sum"],
        }
    }
}

pub struct LanguageRequirements {
    style_checker: Arc<dyn StyleChecker>,
}

impl LanguageRequirements {
    pub fn new(style_checker: Arc<dyn StyleChecker>) -> Self {
        Self { style_checker }
    }
}

#[async_trait]
impl RequirementCheck for LanguageRequirements {
    fn kind(&self) -> CheckKind {
        CheckKind::Language
    }

    async fn evaluate(&self, ctx: &CheckContext<'_>) -> Result<bool> {
        let Some(language) = Language::detect(ctx.file_names) else {
            tracing::warn!("[{}] Could not detect a supported language", ctx.image);
            return Ok(false);
        };
        tracing::debug!("[{}] Detected language: {}", ctx.image, language);

        let missing: Vec<&str> = language
            .required_files()
            .iter()
            .copied()
            .filter(|name| !ctx.has_file(name))
            .collect();
        for name in &missing {
            tracing::warn!("[{}] {} project is missing {}", ctx.image, language, name);
        }

        let style_clean = match language {
            Language::Python => {
                let report = self.style_checker.check(ctx.project_path).await?;
                for violation in &report.violations {
                    tracing::warn!("[{}] {}: {}", ctx.image, self.style_checker.name(), violation);
                }
                report.is_clean()
            }
            Language::Go => true,
        };

        Ok(missing.is_empty() && style_clean)
    }
}
