//! 差し替え可能なコードスタイルチェッカー

use crate::error::{RequirementError, Result};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// スタイルチェックの結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleReport {
    /// 違反 1件につき 1行
    pub violations: Vec<String>,
}

impl StyleReport {
    pub fn clean() -> Self {
        Self::default()
    }

    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

/// 言語固有のスタイルチェッカー
///
/// `Err` はツール自体を実行できなかった場合のみ。違反は `StyleReport` で返す。
#[async_trait]
pub trait StyleChecker: Send + Sync {
    fn name(&self) -> &str;

    async fn check(&self, path: &Path) -> Result<StyleReport>;
}

/// flake8 による Python スタイルチェック
#[derive(Debug, Clone)]
pub struct Flake8StyleChecker {
    program: String,
}

impl Default for Flake8StyleChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl Flake8StyleChecker {
    pub fn new() -> Self {
        Self {
            program: "flake8".to_string(),
        }
    }

    /// 実行ファイルを指定して作成（venv 内の flake8 など）
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl StyleChecker for Flake8StyleChecker {
    fn name(&self) -> &str {
        "flake8"
    }

    async fn check(&self, path: &Path) -> Result<StyleReport> {
        tracing::debug!("Running: {} {}", self.program, path.display());

        let output = Command::new(&self.program)
            .arg(path)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| RequirementError::StyleChecker {
                tool: self.program.clone(),
                message: e.to_string(),
            })?;

        // flake8: 0 = 違反なし, 1 = 違反あり, それ以外 = 実行エラー
        let stderr = || String::from_utf8_lossy(&output.stderr).trim().to_string();
        match output.status.code() {
            Some(0) => Ok(StyleReport::clean()),
            Some(1) => {
                let violations: Vec<String> = String::from_utf8_lossy(&output.stdout)
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(str::to_string)
                    .collect();
                // 違反ありの終了コードで違反が1件も読めなければ結果として扱わない
                if violations.is_empty() {
                    return Err(RequirementError::StyleChecker {
                        tool: self.program.clone(),
                        message: format!(
                            "exited with 1 but reported no violations: {}",
                            stderr()
                        ),
                    });
                }
                Ok(StyleReport { violations })
            }
            _ => Err(RequirementError::StyleChecker {
                tool: self.program.clone(),
                message: stderr(),
            }),
        }
    }
}
