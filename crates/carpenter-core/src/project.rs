//! プロジェクトディレクトリの解決と一覧

use crate::error::{ConfigError, Result};
use crate::model::BuildConfig;
use std::path::{Path, PathBuf};

/// コンテナ定義ファイルの候補（優先順）
pub const CONTAINER_FILE_NAMES: [&str; 2] = ["Containerfile", "Dockerfile"];

/// project_filepath を絶対パスに解決する
///
/// 相対パスはカレントディレクトリ基準。ディレクトリでなければエラー。
pub fn resolve_project_path(config: &BuildConfig) -> Result<PathBuf> {
    let absolute = std::path::absolute(&config.project_filepath)?;
    if !absolute.is_dir() {
        return Err(ConfigError::ProjectDirNotFound(absolute));
    }
    Ok(absolute)
}

/// ディレクトリ直下のエントリ名をソートして返す
pub fn list_file_names(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    tracing::debug!("Found {} entries in {}", names.len(), dir.display());
    Ok(names)
}

/// コンテナ定義ファイルを探す（Containerfile > Dockerfile）
pub fn find_container_file(dir: &Path) -> Option<PathBuf> {
    CONTAINER_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}
