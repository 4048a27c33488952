//! 要件ゲート
//!
//! 3つのチェックを basic -> container-definition -> language の固定順で実行し、
//! 結果を1つの合否にまとめます。
//!
//! - チェックが `Err` を返したらその場で中断し、以降のチェックは実行しない
//! - `Ok(false)` は正常な結果なので、残りのチェックも続けて評価する

use crate::basic::BasicRequirements;
use crate::check::{CheckContext, CheckKind, RequirementCheck};
use crate::containerfile::ContainerfileRequirements;
use crate::error::GateError;
use crate::language::LanguageRequirements;
use crate::style::StyleChecker;
use std::sync::Arc;

/// 各チェックの合否
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequirementOutcome {
    pub basic: bool,
    pub container_definition: bool,
    pub language: bool,
}

impl RequirementOutcome {
    /// すべてのチェックを満たしているか
    pub fn passed(&self) -> bool {
        self.basic && self.container_definition && self.language
    }

    /// 満たしていないチェック（評価順）
    pub fn failed_checks(&self) -> Vec<CheckKind> {
        [
            (CheckKind::Basic, self.basic),
            (CheckKind::ContainerDefinition, self.container_definition),
            (CheckKind::Language, self.language),
        ]
        .into_iter()
        .filter(|(_, passed)| !passed)
        .map(|(kind, _)| kind)
        .collect()
    }
}

pub struct RequirementGate {
    basic: Box<dyn RequirementCheck>,
    container_definition: Box<dyn RequirementCheck>,
    language: Box<dyn RequirementCheck>,
}

impl RequirementGate {
    pub fn new(
        basic: Box<dyn RequirementCheck>,
        container_definition: Box<dyn RequirementCheck>,
        language: Box<dyn RequirementCheck>,
    ) -> Self {
        Self {
            basic,
            container_definition,
            language,
        }
    }

    /// 標準のチェック構成でゲートを作成
    pub fn standard(style_checker: Arc<dyn StyleChecker>) -> Self {
        Self::new(
            Box::new(BasicRequirements::new()),
            Box::new(ContainerfileRequirements::new()),
            Box::new(LanguageRequirements::new(style_checker)),
        )
    }

    pub async fn evaluate(&self, ctx: &CheckContext<'_>) -> Result<RequirementOutcome, GateError> {
        let basic = run_check(self.basic.as_ref(), ctx).await?;
        let container_definition = run_check(self.container_definition.as_ref(), ctx).await?;
        let language = run_check(self.language.as_ref(), ctx).await?;

        let outcome = RequirementOutcome {
            basic,
            container_definition,
            language,
        };

        if outcome.passed() {
            tracing::info!("[{}] All requirement checks passed", ctx.image);
        } else {
            tracing::info!(
                "[{}] Requirement checks failed: {:?}",
                ctx.image,
                outcome.failed_checks()
            );
        }

        Ok(outcome)
    }
}

async fn run_check(check: &dyn RequirementCheck, ctx: &CheckContext<'_>) -> Result<bool, GateError> {
    let kind = check.kind();
    tracing::debug!("[{}] Running {} check", ctx.image, kind);

    let passed = check
        .evaluate(ctx)
        .await
        .map_err(|source| GateError { check: kind, source })?;

    tracing::debug!("[{}] {} check passed: {}", ctx.image, kind, passed);
    Ok(passed)
}
