use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "設定ファイルが見つかりません。以下の場所を確認してください:\n\
        - カレントディレクトリ: carpenter.local.yaml, .carpenter.local.yaml, carpenter.yaml, .carpenter.yaml\n\
        または CARPENTER_CONFIG_PATH 環境変数で直接指定できます"
    )]
    ConfigFileNotFound,

    #[error("設定ファイルのパースに失敗しました: {path}\n理由: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("無効な設定: {0}")]
    InvalidConfig(String),

    #[error("プロジェクトディレクトリが見つかりません: {0}")]
    ProjectDirNotFound(PathBuf),

    #[error("IO エラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
