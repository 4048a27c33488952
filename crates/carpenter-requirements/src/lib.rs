//! Carpenter の要件チェック
//!
//! ビルド前にプロジェクトが満たすべき要件（基本ファイル、コンテナ定義、
//! 言語固有のチェック）と、それらを1つの合否にまとめるゲートを提供します。

pub mod basic;
pub mod check;
pub mod containerfile;
pub mod error;
pub mod gate;
pub mod language;
pub mod style;

pub use basic::BasicRequirements;
pub use check::{CheckContext, CheckKind, RequirementCheck};
pub use containerfile::ContainerfileRequirements;
pub use error::{GateError, RequirementError, Result};
pub use gate::{RequirementGate, RequirementOutcome};
pub use language::{Language, LanguageRequirements};
pub use style::{Flake8StyleChecker, StyleChecker, StyleReport};
