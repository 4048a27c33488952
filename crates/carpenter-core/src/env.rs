//! 環境変数からの認証情報取得

use std::env::VarError;

/// 環境変数の参照結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvLookup {
    Set(String),
    Empty,
    NotSet,
    /// 値が UTF-8 でない
    NotUnicode,
}

impl EnvLookup {
    /// 値が取れなかった理由（取れた場合は None）
    pub fn message(&self, key: &str) -> Option<String> {
        match self {
            EnvLookup::Set(_) => None,
            EnvLookup::Empty => Some(format!("{} is empty", key)),
            EnvLookup::NotSet => Some(format!("{} not set", key)),
            EnvLookup::NotUnicode => Some(format!("{} is not valid unicode", key)),
        }
    }

    pub fn value(&self) -> &str {
        match self {
            EnvLookup::Set(value) => value,
            EnvLookup::Empty | EnvLookup::NotSet | EnvLookup::NotUnicode => "",
        }
    }
}

/// 環境変数を参照し、未設定と空文字列を区別して返す
pub fn lookup_env_var(key: &str) -> EnvLookup {
    match std::env::var(key) {
        Ok(value) if value.is_empty() => EnvLookup::Empty,
        Ok(value) => EnvLookup::Set(value),
        Err(VarError::NotPresent) => EnvLookup::NotSet,
        Err(VarError::NotUnicode(_)) => EnvLookup::NotUnicode,
    }
}
