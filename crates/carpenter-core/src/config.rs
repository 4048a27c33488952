//! carpenter.yaml の発見と読み込み

use crate::env::lookup_env_var;
use crate::error::{ConfigError, Result};
use crate::model::{BuildConfig, Credential, RegistryTarget};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// 設定ファイルのパスを直接指定する環境変数
pub const CONFIG_PATH_ENV: &str = "CARPENTER_CONFIG_PATH";

const CANDIDATES: [&str; 4] = [
    "carpenter.local.yaml",
    ".carpenter.local.yaml",
    "carpenter.yaml",
    ".carpenter.yaml",
];

/// carpenter.yaml の構造
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    project_filepath: PathBuf,
    image_name: String,
    image_tag: String,
    #[serde(default)]
    quay_img_exp: Option<String>,
    #[serde(default)]
    registries: Vec<RawRegistry>,
}

/// レジストリエントリ（認証情報は環境変数名で指定）
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRegistry {
    url: String,
    #[serde(default)]
    namespace: String,
    username_envvar: String,
    password_envvar: String,
}

/// プロジェクトの carpenter.yaml を探す
///
/// 以下の優先順位で設定ファイルを検索:
/// 1. 環境変数 CARPENTER_CONFIG_PATH (直接パス指定)
/// 2. カレントディレクトリ: carpenter.local.yaml, .carpenter.local.yaml, carpenter.yaml, .carpenter.yaml
pub fn find_config_file() -> Result<PathBuf> {
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.is_file() {
            return Ok(path);
        }
        tracing::warn!("{} points to a missing file: {}", CONFIG_PATH_ENV, path.display());
    }

    let current_dir = std::env::current_dir()?;
    for filename in &CANDIDATES {
        let path = current_dir.join(filename);
        if path.is_file() {
            return Ok(path);
        }
    }

    Err(ConfigError::ConfigFileNotFound)
}

/// 設定ファイルを読み込み、認証情報を環境変数から解決する
pub fn load_config(path: &Path) -> Result<BuildConfig> {
    tracing::debug!("Loading config from {}", path.display());
    let content = std::fs::read_to_string(path)?;
    parse_config(&content).map_err(|e| match e {
        ConfigError::Parse { source, .. } => ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })
}

/// YAML 文字列から BuildConfig を組み立てる
pub fn parse_config(content: &str) -> Result<BuildConfig> {
    let raw: RawConfig = serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
        path: PathBuf::new(),
        source,
    })?;

    if raw.image_name.trim().is_empty() {
        return Err(ConfigError::InvalidConfig(
            "image_name が空です".to_string(),
        ));
    }
    if raw.image_tag.trim().is_empty() {
        return Err(ConfigError::InvalidConfig("image_tag が空です".to_string()));
    }

    let registries = raw
        .registries
        .into_iter()
        .map(resolve_registry)
        .collect::<Result<Vec<_>>>()?;

    Ok(BuildConfig {
        project_filepath: raw.project_filepath,
        image_name: raw.image_name,
        image_tag: raw.image_tag,
        quay_img_exp: raw.quay_img_exp,
        registries,
    })
}

fn resolve_registry(raw: RawRegistry) -> Result<RegistryTarget> {
    if raw.url.trim().is_empty() {
        return Err(ConfigError::InvalidConfig(
            "registries[].url が空です".to_string(),
        ));
    }

    // 認証情報が無くても設定エラーにはしない（その registry への push が失敗する）
    let username = lookup_env_var(&raw.username_envvar);
    if let Some(msg) = username.message(&raw.username_envvar) {
        tracing::warn!("Registry {}: {}", raw.url, msg);
    }
    let password = lookup_env_var(&raw.password_envvar);
    if let Some(msg) = password.message(&raw.password_envvar) {
        tracing::warn!("Registry {}: {}", raw.url, msg);
    }

    Ok(RegistryTarget {
        url: raw.url,
        namespace: raw.namespace,
        username: username.value().to_string(),
        credential: Credential::new(password.value()),
    })
}
