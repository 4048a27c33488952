//! コンテナエンジンの抽象化

use crate::docker::DockerEngine;
use crate::error::{EngineError, Result};
use crate::podman::PodmanEngine;
use async_trait::async_trait;
use carpenter_core::{ImageRef, RegistryTarget};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// イメージのビルドと push を行うコンテナエンジン
///
/// Docker (bollard) と Podman (CLI) が実装する。テストではスタブに差し替える。
#[async_trait]
pub trait ContainerEngineService: Send + Sync {
    /// エンジン名（例: "docker", "podman"）
    fn name(&self) -> &str;

    /// `context_path` の Containerfile からイメージ `image` をビルドする
    ///
    /// `expiration` があれば `quay.expires-after` ラベルを付与する。
    async fn build(
        &self,
        image: &ImageRef,
        context_path: &Path,
        expiration: Option<&str>,
    ) -> Result<()>;

    /// ビルド済みのイメージを `target` に push し、push した参照を返す
    async fn push(&self, image: &ImageRef, target: &RegistryTarget) -> Result<String>;
}

/// 起動時に名前で選択するエンジン
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    Docker,
    Podman,
}

impl FromStr for EngineKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "docker" => Ok(EngineKind::Docker),
            "podman" => Ok(EngineKind::Podman),
            _ => Err(EngineError::UnknownEngine(s.to_string())),
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineKind::Docker => f.write_str("docker"),
            EngineKind::Podman => f.write_str("podman"),
        }
    }
}

/// 選択されたエンジンに接続する
pub async fn connect_engine(kind: EngineKind) -> Result<Box<dyn ContainerEngineService>> {
    tracing::debug!("Connecting to container engine: {}", kind);
    match kind {
        EngineKind::Docker => Ok(Box::new(DockerEngine::connect().await?)),
        EngineKind::Podman => Ok(Box::new(PodmanEngine::detect().await?)),
    }
}

/// 何もしないエンジン（要件チェックのみ実行する場合に使用）
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEngine;

#[async_trait]
impl ContainerEngineService for NoopEngine {
    fn name(&self) -> &str {
        "noop"
    }

    async fn build(
        &self,
        image: &ImageRef,
        _context_path: &Path,
        _expiration: Option<&str>,
    ) -> Result<()> {
        tracing::debug!("noop engine: skipping build of {}", image);
        Ok(())
    }

    async fn push(&self, image: &ImageRef, target: &RegistryTarget) -> Result<String> {
        let reference = target.image_reference(image);
        tracing::debug!("noop engine: skipping push of {}", reference);
        Ok(reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_kind_from_str() {
        assert_eq!("docker".parse::<EngineKind>().unwrap(), EngineKind::Docker);
        assert_eq!("Podman".parse::<EngineKind>().unwrap(), EngineKind::Podman);
        assert_eq!(" DOCKER ".parse::<EngineKind>().unwrap(), EngineKind::Docker);
    }

    #[test]
    fn test_unknown_engine_fails() {
        match "containerd".parse::<EngineKind>() {
            Err(EngineError::UnknownEngine(name)) => assert_eq!(name, "containerd"),
            other => panic!("Expected UnknownEngine, got {:?}", other),
        }
    }

    #[test]
    fn test_engine_kind_display_round_trip() {
        for kind in [EngineKind::Docker, EngineKind::Podman] {
            assert_eq!(kind.to_string().parse::<EngineKind>().unwrap(), kind);
        }
    }

    #[tokio::test]
    async fn test_noop_engine() {
        let engine = NoopEngine;
        let image = ImageRef::new("plugin", "1.0");
        let target = RegistryTarget {
            url: "quay.io".to_string(),
            namespace: "arcalot".to_string(),
            ..Default::default()
        };

        engine.build(&image, Path::new("."), None).await.unwrap();
        assert_eq!(
            engine.push(&image, &target).await.unwrap(),
            "quay.io/arcalot/plugin:1.0"
        );
    }
}
