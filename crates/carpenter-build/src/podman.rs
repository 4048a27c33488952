//! Podman (CLI) バックエンド
//!
//! podman コマンドをサブプロセスとして実行します。

use crate::engine::ContainerEngineService;
use crate::error::{EngineError, Result};
use crate::progress::StepProgress;
use async_trait::async_trait;
use carpenter_core::{
    ImageRef, QUAY_EXPIRATION_LABEL, RegistryTarget, find_container_file, validate_tag,
};
use std::path::Path;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

pub struct PodmanEngine {
    program: String,
}

impl PodmanEngine {
    pub fn new() -> Self {
        Self::with_program("podman")
    }

    /// 実行ファイルを指定して作成（PATH 外の podman やテスト用）
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// podman が実行できることを確認して作成
    pub async fn detect() -> Result<Self> {
        let engine = Self::new();
        let version = engine.run(&["--version".to_string()]).await?;
        tracing::debug!("Detected {}", version.trim());
        Ok(engine)
    }

    /// コマンドを実行して stdout を返す
    async fn run(&self, args: &[String]) -> Result<String> {
        tracing::debug!("Running: {} {}", self.program, args.join(" "));

        let output = Command::new(&self.program)
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| self.command_failed(args, e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(self.command_failed(args, stderr.trim().to_string()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// パスワードを stdin で渡してログインする
    async fn login(&self, target: &RegistryTarget) -> Result<()> {
        let args = login_args(target);
        tracing::debug!("Running: {} {}", self.program, args.join(" "));

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.command_failed(&args, e.to_string()))?;

        if let Some(mut stdin) = child.stdin.take() {
            // 書き込み失敗はプロセスの終了コードで判定する
            stdin
                .write_all(target.credential.expose().as_bytes())
                .await
                .ok();
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| self.command_failed(&args, e.to_string()))?;

        if !output.status.success() {
            return Err(EngineError::AuthFailed {
                registry: target.url.clone(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }

    fn command_failed(&self, args: &[String], message: String) -> EngineError {
        EngineError::CommandFailed {
            command: format!("{} {}", self.program, args.join(" ")),
            message,
        }
    }
}

impl Default for PodmanEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// `podman build` の引数
pub fn build_args(
    image: &ImageRef,
    container_file: &Path,
    context_path: &Path,
    expiration: Option<&str>,
) -> Vec<String> {
    let mut args = vec![
        "build".to_string(),
        "-t".to_string(),
        image.to_string(),
        "-f".to_string(),
        container_file.display().to_string(),
    ];
    if let Some(exp) = expiration {
        args.push("--label".to_string());
        args.push(format!("{}={}", QUAY_EXPIRATION_LABEL, exp));
    }
    args.push(context_path.display().to_string());
    args
}

/// `podman login` の引数（パスワードは含めない）
pub fn login_args(target: &RegistryTarget) -> Vec<String> {
    vec![
        "login".to_string(),
        "--username".to_string(),
        target.username.clone(),
        "--password-stdin".to_string(),
        target.url.trim_end_matches('/').to_string(),
    ]
}

#[async_trait]
impl ContainerEngineService for PodmanEngine {
    fn name(&self) -> &str {
        "podman"
    }

    async fn build(
        &self,
        image: &ImageRef,
        context_path: &Path,
        expiration: Option<&str>,
    ) -> Result<()> {
        let container_file = find_container_file(context_path)
            .ok_or_else(|| EngineError::ContainerFileNotFound(context_path.to_path_buf()))?;
        let args = build_args(image, &container_file, context_path, expiration);

        tracing::info!("Building image: {}", image);
        let progress = StepProgress::new(&format!("Building {}...", image));
        match self.run(&args).await {
            Ok(_) => {
                progress.finish_success(&format!("Built {}", image));
                Ok(())
            }
            Err(e) => {
                progress.finish_error(&e.to_string());
                Err(e)
            }
        }
    }

    async fn push(&self, image: &ImageRef, target: &RegistryTarget) -> Result<String> {
        validate_tag(&image.tag).map_err(|e| EngineError::InvalidTag(e.to_string()))?;

        if !target.username.is_empty() && !target.credential.is_empty() {
            self.login(target).await?;
        } else {
            tracing::debug!("No credentials for {}, pushing with existing login", target.url);
        }

        let reference = target.image_reference(image);
        self.run(&["tag".to_string(), image.to_string(), reference.clone()])
            .await?;

        let progress = StepProgress::new(&format!("Pushing {}...", reference));
        match self.run(&["push".to_string(), reference.clone()]).await {
            Ok(_) => {
                progress.finish_success(&format!("Pushed {}", reference));
                tracing::info!("Pushed: {}", reference);
                Ok(reference)
            }
            Err(e) => {
                progress.finish_error(&e.to_string());
                Err(EngineError::PushFailed {
                    reference,
                    message: e.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carpenter_core::Credential;
    use std::fs;
    use tempfile::tempdir;

    fn target() -> RegistryTarget {
        RegistryTarget {
            url: "quay.io/".to_string(),
            namespace: "arcalot".to_string(),
            username: "robot".to_string(),
            credential: Credential::new("secret"),
        }
    }

    #[test]
    fn test_build_args_with_expiration() {
        let image = ImageRef::new("plugin", "1.0");
        let args = build_args(
            &image,
            Path::new("/work/Containerfile"),
            Path::new("/work"),
            Some("90d"),
        );
        assert_eq!(
            args,
            vec![
                "build",
                "-t",
                "plugin:1.0",
                "-f",
                "/work/Containerfile",
                "--label",
                "quay.expires-after=90d",
                "/work",
            ]
        );
    }

    #[test]
    fn test_build_args_without_expiration() {
        let image = ImageRef::new("plugin", "1.0");
        let args = build_args(&image, Path::new("/w/Dockerfile"), Path::new("/w"), None);
        assert!(!args.iter().any(|a| a == "--label"));
        assert_eq!(args.last().map(String::as_str), Some("/w"));
    }

    #[test]
    fn test_login_args_keep_password_off_command_line() {
        let args = login_args(&target());
        assert_eq!(
            args,
            vec!["login", "--username", "robot", "--password-stdin", "quay.io"]
        );
        assert!(!args.iter().any(|a| a.contains("secret")));
    }

    #[tokio::test]
    async fn test_missing_program_is_command_failure() {
        let engine = PodmanEngine::with_program("carpenter-no-such-podman");
        let image = ImageRef::new("plugin", "1.0");
        let result = engine.push(&image, &target()).await;
        assert!(matches!(result, Err(EngineError::CommandFailed { .. })));
    }

    #[tokio::test]
    async fn test_build_without_container_file() {
        let temp_dir = tempdir().unwrap();
        let engine = PodmanEngine::with_program("true");
        let result = engine
            .build(&ImageRef::new("plugin", "1.0"), temp_dir.path(), None)
            .await;
        assert!(matches!(result, Err(EngineError::ContainerFileNotFound(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_successful_commands() {
        let temp_dir = tempdir().unwrap();
        fs::write(temp_dir.path().join("Containerfile"), "FROM alpine").unwrap();

        let engine = PodmanEngine::with_program("true");
        let image = ImageRef::new("plugin", "1.0");
        engine.build(&image, temp_dir.path(), Some("1d")).await.unwrap();

        let reference = engine.push(&image, &target()).await.unwrap();
        assert_eq!(reference, "quay.io/arcalot/plugin:1.0");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_build_is_command_failure() {
        let temp_dir = tempdir().unwrap();
        fs::write(temp_dir.path().join("Dockerfile"), "FROM alpine").unwrap();

        let engine = PodmanEngine::with_program("false");
        let result = engine
            .build(&ImageRef::new("plugin", "1.0"), temp_dir.path(), None)
            .await;
        assert!(matches!(result, Err(EngineError::CommandFailed { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_login_is_auth_failure() {
        let engine = PodmanEngine::with_program("false");
        let result = engine.push(&ImageRef::new("plugin", "1.0"), &target()).await;
        assert!(matches!(result, Err(EngineError::AuthFailed { .. })));
    }
}
