use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Unknown container engine: {0} (expected: docker, podman)")]
    UnknownEngine(String),

    #[error("Container file not found in {0}")]
    ContainerFileNotFound(PathBuf),

    #[error("Docker connection error: {0}")]
    DockerConnection(#[from] bollard::errors::Error),

    #[error("Build failed: {0}")]
    BuildFailed(String),

    #[error("Push to {reference} failed: {message}")]
    PushFailed { reference: String, message: String },

    #[error("Invalid tag: {0}")]
    InvalidTag(String),

    #[error("Authentication failed for {registry}: {message}")]
    AuthFailed { registry: String, message: String },

    #[error("Command `{command}` failed: {message}")]
    CommandFailed { command: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// ユーザー向けの分かりやすいエラーメッセージ
    pub fn user_message(&self) -> String {
        match self {
            EngineError::UnknownEngine(name) => {
                format!(
                    "コンテナエンジン '{}' には対応していません\n\
                     \n\
                     --engine docker または --engine podman を指定してください",
                    name
                )
            }
            EngineError::ContainerFileNotFound(path) => {
                format!(
                    "Containerfile / Dockerfile が見つかりません: {}\n\
                     \n\
                     project_filepath の設定を確認してください",
                    path.display()
                )
            }
            EngineError::BuildFailed(msg) => {
                format!(
                    "ビルドに失敗しました: {}\n\
                     \n\
                     Containerfile の内容を確認してください。",
                    msg
                )
            }
            EngineError::AuthFailed { registry, message } => {
                format!(
                    "レジストリ {} の認証に失敗しました: {}\n\
                     \n\
                     registries[].username_envvar / password_envvar の環境変数を確認してください",
                    registry, message
                )
            }
            _ => format!("{}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
