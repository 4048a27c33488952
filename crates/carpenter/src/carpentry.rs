//! 要件チェック、ビルド、push をまとめて実行するコーディネーター
//!
//! ```text
//! START -> BASIC -> CONTAINER -> LANGUAGE -> GATE -> [BUILD] -> [PUSH...] -> DONE
//! ```
//!
//! プロセスを終了させることはなく、結果の解釈は呼び出し側に任せる。

use carpenter_build::{
    BuildDecision, ContainerEngineService, EngineError, PushFailure, maybe_build, push_all,
};
use carpenter_core::BuildConfig;
use carpenter_requirements::{
    CheckContext, Flake8StyleChecker, GateError, RequirementGate, RequirementOutcome,
};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// 実行を完了できなかったエラー
#[derive(Debug, Error)]
pub enum CarpentryError {
    #[error(transparent)]
    Requirements(#[from] GateError),

    #[error("image build failed: {0}")]
    Build(#[from] EngineError),
}

/// 完了した実行の結果
#[derive(Debug)]
pub enum CarpentryOutcome {
    /// 要件を満たした（push の失敗は含まれうる）
    Passed {
        outcome: RequirementOutcome,
        build: BuildDecision,
        push_failures: Vec<PushFailure>,
    },
    /// 要件を満たさなかったため、ビルドも push もしていない
    RequirementsNotMet { outcome: RequirementOutcome },
}

impl CarpentryOutcome {
    pub fn passed(&self) -> bool {
        matches!(self, CarpentryOutcome::Passed { .. })
    }

    pub fn requirements(&self) -> &RequirementOutcome {
        match self {
            CarpentryOutcome::Passed { outcome, .. } => outcome,
            CarpentryOutcome::RequirementsNotMet { outcome } => outcome,
        }
    }

    pub fn push_failures(&self) -> &[PushFailure] {
        match self {
            CarpentryOutcome::Passed { push_failures, .. } => push_failures,
            CarpentryOutcome::RequirementsNotMet { .. } => &[],
        }
    }
}

pub struct Carpentry {
    gate: RequirementGate,
}

impl Default for Carpentry {
    fn default() -> Self {
        Self::new(RequirementGate::standard(Arc::new(Flake8StyleChecker::new())))
    }
}

impl Carpentry {
    pub fn new(gate: RequirementGate) -> Self {
        Self { gate }
    }

    pub async fn run(
        &self,
        want_build: bool,
        want_push: bool,
        engine: &dyn ContainerEngineService,
        config: &BuildConfig,
        project_path: &Path,
        file_names: &[String],
    ) -> Result<CarpentryOutcome, CarpentryError> {
        let image = config.image();
        let ctx = CheckContext {
            project_path,
            file_names,
            image: &image,
        };

        let outcome = self.gate.evaluate(&ctx).await?;
        if !outcome.passed() {
            tracing::warn!(
                "failed requirements check, not building: {} {}",
                image.name,
                image.tag
            );
            return Ok(CarpentryOutcome::RequirementsNotMet { outcome });
        }

        let build = maybe_build(
            want_build,
            true,
            engine,
            &image,
            project_path,
            config.expiration(),
        )
        .await?;

        let push_failures = push_all(
            true,
            want_build,
            want_push,
            engine,
            &image,
            &config.registries,
        )
        .await;
        for failure in &push_failures {
            tracing::warn!("{}", failure);
        }

        Ok(CarpentryOutcome::Passed {
            outcome,
            build,
            push_failures,
        })
    }
}
