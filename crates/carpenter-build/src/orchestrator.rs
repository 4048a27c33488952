//! ビルドと push の実行判定
//!
//! ビルドの失敗は致命的、push の失敗は宛先ごとに独立して扱う。

use crate::engine::ContainerEngineService;
use crate::error::{EngineError, Result};
use carpenter_core::{ImageRef, RegistryTarget};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildDecision {
    Built,
    Skipped,
}

/// 1つの宛先への push 失敗
#[derive(Debug, Error)]
#[error("push to {reference} failed: {error}")]
pub struct PushFailure {
    pub target: RegistryTarget,
    pub reference: String,
    #[source]
    pub error: EngineError,
}

/// `want_build` かつ `gate_passed` のときだけビルドする
pub async fn maybe_build(
    want_build: bool,
    gate_passed: bool,
    engine: &dyn ContainerEngineService,
    image: &ImageRef,
    context_path: &Path,
    expiration: Option<&str>,
) -> Result<BuildDecision> {
    if !(want_build && gate_passed) {
        return Ok(BuildDecision::Skipped);
    }

    tracing::debug!("Building {} with {}", image, engine.name());
    engine.build(image, context_path, expiration).await?;
    Ok(BuildDecision::Built)
}

/// 全ての宛先に順番に push し、失敗を集めて返す
///
/// 失敗しても残りの宛先への push は続ける。
pub async fn push_all(
    gate_passed: bool,
    want_build: bool,
    want_push: bool,
    engine: &dyn ContainerEngineService,
    image: &ImageRef,
    registries: &[RegistryTarget],
) -> Vec<PushFailure> {
    let mut failures = Vec::new();

    for target in registries {
        if !(gate_passed && want_build && want_push) {
            continue;
        }

        let reference = target.image_reference(image);
        match engine.push(image, target).await {
            Ok(pushed) => tracing::debug!("Push succeeded: {}", pushed),
            Err(error) => failures.push(PushFailure {
                target: target.clone(),
                reference,
                error,
            }),
        }
    }

    failures
}
