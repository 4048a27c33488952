use crate::error::Result;
use async_trait::async_trait;
use carpenter_core::ImageRef;
use std::fmt;
use std::path::Path;

/// 要件チェックの種類（評価順）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckKind {
    Basic,
    ContainerDefinition,
    Language,
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CheckKind::Basic => "basic",
            CheckKind::ContainerDefinition => "container-definition",
            CheckKind::Language => "language",
        };
        f.write_str(name)
    }
}

/// チェックに渡すプロジェクト情報
#[derive(Debug, Clone, Copy)]
pub struct CheckContext<'a> {
    /// プロジェクトの絶対パス
    pub project_path: &'a Path,

    /// プロジェクト直下のエントリ名
    pub file_names: &'a [String],

    pub image: &'a ImageRef,
}

impl CheckContext<'_> {
    pub fn has_file(&self, name: &str) -> bool {
        self.file_names.iter().any(|f| f == name)
    }
}

/// 独立した要件チェック
///
/// * `Ok(true)` - 要件を満たす
/// * `Ok(false)` - 要件を満たさない（正常な結果）
/// * `Err(e)` - チェック自体を完了できなかった
#[async_trait]
pub trait RequirementCheck: Send + Sync {
    fn kind(&self) -> CheckKind;

    async fn evaluate(&self, ctx: &CheckContext<'_>) -> Result<bool>;
}
