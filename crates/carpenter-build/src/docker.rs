//! Docker (bollard) バックエンド

use crate::auth::RegistryAuth;
use crate::context::ContextBuilder;
use crate::engine::ContainerEngineService;
use crate::error::{EngineError, Result};
use async_trait::async_trait;
use bollard::Docker;
use bollard::models::PushImageInfo;
use carpenter_core::{
    ImageRef, QUAY_EXPIRATION_LABEL, RegistryTarget, find_container_file, validate_tag,
};
use colored::Colorize;
use futures_util::stream::StreamExt;
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

pub struct DockerEngine {
    docker: Docker,
    auth: RegistryAuth,
}

impl DockerEngine {
    pub fn new(docker: Docker) -> Self {
        Self {
            docker,
            auth: RegistryAuth::new(),
        }
    }

    pub fn with_auth(docker: Docker, auth: RegistryAuth) -> Self {
        Self { docker, auth }
    }

    /// ローカルの Docker デーモンに接続し、疎通を確認する
    pub async fn connect() -> Result<Self> {
        let docker = Docker::connect_with_local_defaults()?;
        docker.ping().await?;
        Ok(Self::new(docker))
    }

    /// ビルド出力の処理
    fn handle_build_output(&self, output: bollard::models::BuildInfo) -> Result<()> {
        if let Some(stream) = output.stream {
            print!("{}", stream);
        }

        if let Some(error) = output.error {
            return Err(EngineError::BuildFailed(error));
        }

        if let Some(error_detail) = output.error_detail {
            let error_msg = error_detail
                .message
                .unwrap_or_else(|| "Unknown build error".to_string());
            return Err(EngineError::BuildFailed(error_msg));
        }

        if let Some(status) = output.status {
            println!("{}", status.cyan());
        }

        Ok(())
    }

    /// プッシュ進捗を表示
    fn handle_push_progress(&self, info: &PushImageInfo, last_status: &mut String) {
        let Some(status) = &info.status else {
            return;
        };
        let progress = info.progress.as_deref().unwrap_or("");

        match status.as_str() {
            "Pushing" => {
                print!("\r  ↑ {} {}     ", status, progress);
                std::io::stdout().flush().ok();
            }
            "Pushed" => {
                println!("\r  {} Pushed                    ", "✓".green());
            }
            "Layer already exists" => {
                println!("\r  {} Layer already exists      ", "✓".green());
            }
            // 準備中は表示しない
            "Preparing" | "Waiting" => {}
            _ => {
                if status != last_status {
                    println!("\r  ℹ {}                    ", status);
                    *last_status = status.clone();
                }
            }
        }
    }
}

#[async_trait]
impl ContainerEngineService for DockerEngine {
    fn name(&self) -> &str {
        "docker"
    }

    async fn build(
        &self,
        image: &ImageRef,
        context_path: &Path,
        expiration: Option<&str>,
    ) -> Result<()> {
        let tag = image.to_string();
        tracing::info!("Building image: {}", tag);

        let container_file = find_container_file(context_path)
            .ok_or_else(|| EngineError::ContainerFileNotFound(context_path.to_path_buf()))?;
        let context_data = ContextBuilder::create_context(context_path, &container_file)?;

        let mut labels = HashMap::new();
        if let Some(exp) = expiration {
            labels.insert(QUAY_EXPIRATION_LABEL, exp);
        }

        #[allow(deprecated)]
        let options = bollard::image::BuildImageOptions {
            dockerfile: "Dockerfile",
            t: tag.as_str(),
            labels,
            rm: true,
            forcerm: true,
            ..Default::default()
        };
        tracing::debug!("Build options: {:?}", options);

        use bytes::Bytes;
        use http_body_util::{Either, Full};
        let body = Full::new(Bytes::from(context_data));
        let mut stream = self
            .docker
            .build_image(options, None, Some(Either::Left(body)));

        while let Some(msg) = stream.next().await {
            self.handle_build_output(msg?)?;
        }

        tracing::info!("Successfully built: {}", tag);
        Ok(())
    }

    async fn push(&self, image: &ImageRef, target: &RegistryTarget) -> Result<String> {
        validate_tag(&image.tag).map_err(|e| EngineError::InvalidTag(e.to_string()))?;

        let repository = target.repository(&image.name);
        let reference = target.image_reference(image);
        let push_failed = |message: String| EngineError::PushFailed {
            reference: reference.clone(),
            message,
        };

        // ローカルイメージに push 先の名前を付ける
        let tag_options = bollard::query_parameters::TagImageOptions {
            repo: Some(repository.clone()),
            tag: Some(image.tag.clone()),
        };
        self.docker
            .tag_image(&image.to_string(), Some(tag_options))
            .await
            .map_err(|e| push_failed(format!("failed to tag image: {}", e)))?;

        let credentials = self.auth.credentials_for(target).await?;

        #[allow(deprecated)]
        let options = bollard::image::PushImageOptions::<String> {
            tag: image.tag.clone(),
        };

        println!("  → {}", reference.cyan());

        #[allow(deprecated)]
        let mut stream = self.docker.push_image(&repository, Some(options), credentials);

        let mut last_status = String::new();
        let mut error_message: Option<String> = None;

        while let Some(result) = stream.next().await {
            match result {
                Ok(info) => {
                    if let Some(err) = info.error {
                        error_message = Some(err);
                    } else {
                        self.handle_push_progress(&info, &mut last_status);
                    }
                }
                Err(e) => return Err(push_failed(e.to_string())),
            }
        }

        println!();

        if let Some(err) = error_message {
            return Err(push_failed(err));
        }

        tracing::info!("Pushed: {}", reference);
        Ok(reference)
    }
}
