//! Carpenter のイメージビルドと push
//!
//! コンテナエンジン（Docker / Podman）の抽象化と、要件チェックの結果に
//! 応じてビルド・push を実行するオーケストレーションを提供します。

pub mod auth;
pub mod context;
pub mod docker;
pub mod engine;
pub mod error;
pub mod orchestrator;
pub mod podman;
pub mod progress;

pub use auth::RegistryAuth;
pub use context::ContextBuilder;
pub use docker::DockerEngine;
pub use engine::{ContainerEngineService, EngineKind, NoopEngine, connect_engine};
pub use error::{EngineError, Result};
pub use orchestrator::{BuildDecision, PushFailure, maybe_build, push_all};
pub use podman::PodmanEngine;
pub use progress::StepProgress;
