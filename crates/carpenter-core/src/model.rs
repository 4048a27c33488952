//! Carpenter データモデル

use std::fmt;
use std::path::PathBuf;

/// Quay 系レジストリが解釈するイメージ有効期限ラベル
pub const QUAY_EXPIRATION_LABEL: &str = "quay.expires-after";

/// ビルド対象のイメージ（名前 + タグ）
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageRef {
    pub name: String,
    pub tag: String,
}

impl ImageRef {
    pub fn new(name: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tag: tag.into(),
        }
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.tag)
    }
}

/// レジストリの認証シークレット
///
/// `Debug` ではマスクされる。値は push 実行時にのみ取り出す。
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("Credential(<empty>)")
        } else {
            f.write_str("Credential(****)")
        }
    }
}

/// push 先のレジストリ
///
/// 重複したエントリも許容され、それぞれ独立して push される。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryTarget {
    /// レジストリのホスト（例: quay.io, localhost:5000）
    pub url: String,

    /// 組織・ユーザー名前空間（空の場合は省略）
    pub namespace: String,

    pub username: String,

    pub credential: Credential,
}

impl RegistryTarget {
    /// push 先の完全なイメージ参照を組み立てる
    ///
    /// # Examples
    /// - `quay.io` + `arcalot` + `plugin:1.0` -> `quay.io/arcalot/plugin:1.0`
    /// - `localhost:5000` + `` + `plugin:1.0` -> `localhost:5000/plugin:1.0`
    pub fn image_reference(&self, image: &ImageRef) -> String {
        format!("{}:{}", self.repository(&image.name), image.tag)
    }

    /// タグを含まないリポジトリパス
    pub fn repository(&self, image_name: &str) -> String {
        let url = self.url.trim_end_matches('/');
        let namespace = self.namespace.trim_matches('/');
        if namespace.is_empty() {
            format!("{}/{}", url, image_name)
        } else {
            format!("{}/{}/{}", url, namespace, image_name)
        }
    }
}

/// 1回のオーケストレーションに必要なビルド設定
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildConfig {
    /// 設定ファイルに書かれたままのプロジェクトパス
    pub project_filepath: PathBuf,

    pub image_name: String,

    pub image_tag: String,

    /// Quay 向けの有効期限（例: "90d"）
    pub quay_img_exp: Option<String>,

    pub registries: Vec<RegistryTarget>,
}

impl BuildConfig {
    pub fn image(&self) -> ImageRef {
        ImageRef::new(&self.image_name, &self.image_tag)
    }

    /// 空文字列の有効期限は未設定として扱う
    pub fn expiration(&self) -> Option<&str> {
        self.quay_img_exp
            .as_deref()
            .map(str::trim)
            .filter(|exp| !exp.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(url: &str, namespace: &str) -> RegistryTarget {
        RegistryTarget {
            url: url.to_string(),
            namespace: namespace.to_string(),
            username: "robot".to_string(),
            credential: Credential::new("hunter2"),
        }
    }

    #[test]
    fn test_image_reference_with_namespace() {
        let image = ImageRef::new("plugin", "1.0");
        assert_eq!(
            target("quay.io", "arcalot").image_reference(&image),
            "quay.io/arcalot/plugin:1.0"
        );
    }

    #[test]
    fn test_image_reference_without_namespace() {
        let image = ImageRef::new("plugin", "dev");
        assert_eq!(
            target("localhost:5000/", "").image_reference(&image),
            "localhost:5000/plugin:dev"
        );
    }

    #[test]
    fn test_credential_is_redacted() {
        let rendered = format!("{:?}", target("quay.io", "arcalot"));
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("****"));
    }

    #[test]
    fn test_expiration_ignores_blank() {
        let mut config = BuildConfig {
            quay_img_exp: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(config.expiration(), None);

        config.quay_img_exp = Some("90d".to_string());
        assert_eq!(config.expiration(), Some("90d"));
    }

    #[test]
    fn test_image_display() {
        assert_eq!(ImageRef::new("app", "latest").to_string(), "app:latest");
    }
}
