//! 要件チェックのエラー型
//!
//! ここに入るのは「チェックを完了できなかった」エラーのみ。
//! 要件を満たしていないことは `Ok(false)` で表す。

use crate::check::CheckKind;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RequirementError {
    #[error("ファイルを読み込めません: {path}\n理由: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("スタイルチェッカー '{tool}' の実行に失敗しました: {message}")]
    StyleChecker { tool: String, message: String },
}

/// ゲート評価を中断させたチェックのエラー
#[derive(Error, Debug)]
#[error("{check} check could not complete: {source}")]
pub struct GateError {
    pub check: CheckKind,
    #[source]
    pub source: RequirementError,
}

pub type Result<T> = std::result::Result<T, RequirementError>;
