//! Carpenter の設定とデータモデル
//!
//! carpenter.yaml の発見・読み込み、レジストリ認証情報の環境変数解決、
//! プロジェクトディレクトリの一覧を提供します。

pub mod config;
pub mod env;
pub mod error;
pub mod model;
pub mod naming;
pub mod project;

pub use config::{CONFIG_PATH_ENV, find_config_file, load_config, parse_config};
pub use env::{EnvLookup, lookup_env_var};
pub use error::*;
pub use model::*;
pub use naming::{InvalidName, validate_repository_name, validate_tag};
pub use project::{find_container_file, list_file_names, resolve_project_path};
