//! Carpenter
//!
//! プラグインプロジェクトの要件をチェックし、満たしていればコンテナイメージを
//! ビルドして複数のレジストリに push します。

pub mod carpentry;

pub use carpentry::{Carpentry, CarpentryError, CarpentryOutcome};
