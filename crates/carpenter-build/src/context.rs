use crate::error::{EngineError, Result};
use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs;
use std::path::Path;
use tar::Builder;

/// ビルドコンテキストに含めないエントリ
const EXCLUDED_ENTRIES: [&str; 2] = [".git", ".carpenter"];

pub struct ContextBuilder;

impl ContextBuilder {
    /// ビルドコンテキストをtar.gzアーカイブとして作成
    ///
    /// コンテナ定義ファイルは名前に関わらず "Dockerfile" として格納する。
    pub fn create_context(context_path: &Path, container_file: &Path) -> Result<Vec<u8>> {
        tracing::debug!("Creating build context from: {}", context_path.display());

        let mut archive_data = Vec::new();
        {
            let encoder = GzEncoder::new(&mut archive_data, Compression::default());
            let mut tar = Builder::new(encoder);

            let mut entries: Vec<_> = fs::read_dir(context_path)?.collect::<std::io::Result<_>>()?;
            entries.sort_by_key(|entry| entry.file_name());

            for entry in entries {
                let name = entry.file_name();
                let path = entry.path();

                if EXCLUDED_ENTRIES.iter().any(|excluded| name == *excluded) {
                    tracing::debug!("Skipping {} from build context", path.display());
                    continue;
                }
                // コンテナ定義ファイルは後で "Dockerfile" として追加する。
                // 既存の Dockerfile は定義ファイルでなくても格納しない
                if path == container_file || name == "Dockerfile" {
                    continue;
                }

                if entry.file_type()?.is_dir() {
                    tar.append_dir_all(&name, &path)?;
                } else {
                    tar.append_path_with_name(&path, &name)?;
                }
            }

            let container_content = fs::read(container_file)?;
            let mut header = tar::Header::new_gnu();
            header.set_path("Dockerfile").map_err(|e| {
                EngineError::BuildFailed(format!("Failed to set Dockerfile path: {}", e))
            })?;
            header.set_size(container_content.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            tar.append(&header, &container_content[..])?;

            tar.into_inner()?.finish()?;
        }

        tracing::debug!("Build context created: {} bytes", archive_data.len());

        Self::check_context_size(archive_data.len());

        Ok(archive_data)
    }

    /// コンテキストサイズのチェックと警告
    fn check_context_size(size: usize) {
        const MAX_CONTEXT_SIZE: usize = 500 * 1024 * 1024; // 500MB

        if size > MAX_CONTEXT_SIZE {
            tracing::warn!(
                "Build context is very large ({}MB); consider trimming the project directory",
                size / 1024 / 1024
            );
        }
    }
}
