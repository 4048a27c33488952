//! レジストリ認証
//!
//! carpenter.yaml の環境変数で認証情報が揃わなかった宛先は、
//! Docker config.json の `auths` に保存済みのログイン情報で push する。

use crate::error::{EngineError, Result};
use base64::Engine;
use bollard::auth::DockerCredentials;
use carpenter_core::RegistryTarget;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;

/// config.json のうち参照する部分
#[derive(Debug, Default, Deserialize)]
struct StoredLogins {
    #[serde(default)]
    auths: HashMap<String, StoredLogin>,
}

#[derive(Debug, Deserialize)]
struct StoredLogin {
    /// base64("username:password")
    auth: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RegistryAuth {
    config_path: PathBuf,
}

impl Default for RegistryAuth {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryAuth {
    /// $DOCKER_CONFIG/config.json、なければ ~/.docker/config.json
    pub fn new() -> Self {
        let docker_dir = std::env::var_os("DOCKER_CONFIG")
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|home| home.join(".docker")))
            .unwrap_or_else(|| PathBuf::from(".docker"));

        Self::with_config_path(docker_dir.join("config.json"))
    }

    pub fn with_config_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    /// push 先の認証情報
    ///
    /// username と credential が両方あればそれを使い、なければ config.json を見る。
    /// どちらにもなければ匿名で push する (`None`)。
    pub async fn credentials_for(
        &self,
        target: &RegistryTarget,
    ) -> Result<Option<DockerCredentials>> {
        if !target.username.is_empty() && !target.credential.is_empty() {
            return Ok(Some(credentials(
                &target.username,
                target.credential.expose(),
                &target.url,
            )));
        }

        let host = registry_host(&target.url);
        tracing::debug!(
            "No configured credentials for {}, looking up {}",
            host,
            self.config_path.display()
        );

        let logins = self.read_stored_logins(host).await?;
        let Some(encoded) = logins
            .auths
            .iter()
            .find(|(key, _)| registry_host(key) == host)
            .and_then(|(_, login)| login.auth.as_deref())
        else {
            tracing::debug!("No stored login for {}, pushing anonymously", host);
            return Ok(None);
        };

        decode_stored_login(encoded, host).map(Some)
    }

    async fn read_stored_logins(&self, host: &str) -> Result<StoredLogins> {
        let content = match tokio::fs::read_to_string(&self.config_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(StoredLogins::default()),
            Err(e) => {
                return Err(auth_failed(
                    host,
                    format!("cannot read {}: {}", self.config_path.display(), e),
                ));
            }
        };

        serde_json::from_str(&content).map_err(|e| {
            auth_failed(
                host,
                format!("cannot parse {}: {}", self.config_path.display(), e),
            )
        })
    }
}

/// URL からスキームとパスを除いたホスト部分
///
/// - `https://quay.io/v2/` -> `quay.io`
/// - `localhost:5000` -> `localhost:5000`
pub fn registry_host(url: &str) -> &str {
    let without_scheme = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    without_scheme.split('/').next().unwrap_or(without_scheme)
}

fn decode_stored_login(encoded: &str, host: &str) -> Result<DockerCredentials> {
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| auth_failed(host, format!("stored login is not base64: {}", e)))?;
    let decoded = String::from_utf8(decoded)
        .map_err(|_| auth_failed(host, "stored login is not UTF-8".to_string()))?;

    let (username, password) = decoded.split_once(':').ok_or_else(|| {
        auth_failed(host, "stored login is not username:password".to_string())
    })?;
    Ok(credentials(username, password, host))
}

fn credentials(username: &str, password: &str, server: &str) -> DockerCredentials {
    DockerCredentials {
        username: Some(username.to_string()),
        password: Some(password.to_string()),
        serveraddress: Some(server.to_string()),
        ..Default::default()
    }
}

fn auth_failed(host: &str, message: String) -> EngineError {
    EngineError::AuthFailed {
        registry: host.to_string(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;
    use carpenter_core::Credential;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    fn target(url: &str, username: &str, secret: &str) -> RegistryTarget {
        RegistryTarget {
            url: url.to_string(),
            namespace: "arcalot".to_string(),
            username: username.to_string(),
            credential: Credential::new(secret),
        }
    }

    fn auth_with_config(content: &str) -> (TempDir, RegistryAuth) {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.json");
        fs::write(&config_path, content).unwrap();
        (temp_dir, RegistryAuth::with_config_path(config_path))
    }

    #[test]
    fn test_registry_host() {
        assert_eq!(registry_host("quay.io"), "quay.io");
        assert_eq!(registry_host("https://quay.io/v2/"), "quay.io");
        assert_eq!(registry_host("localhost:5000"), "localhost:5000");
    }

    #[tokio::test]
    async fn test_configured_credentials_take_priority() {
        let (_dir, auth) = auth_with_config(&format!(
            r#"{{"auths": {{"quay.io": {{"auth": "{}"}}}}}}"#,
            STANDARD.encode("stored:other")
        ));
        let creds = auth
            .credentials_for(&target("quay.io", "robot", "secret"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(creds.username.as_deref(), Some("robot"));
        assert_eq!(creds.password.as_deref(), Some("secret"));
        assert_eq!(creds.serveraddress.as_deref(), Some("quay.io"));
    }

    #[tokio::test]
    async fn test_missing_config_json_means_anonymous() {
        let auth = RegistryAuth::with_config_path(PathBuf::from("/nonexistent/config.json"));
        let creds = auth.credentials_for(&target("quay.io", "", "")).await.unwrap();
        assert!(creds.is_none());
    }

    #[tokio::test]
    async fn test_stored_login_matched_by_host() {
        // config.json のキーはスキーム付きでも一致させる
        let (_dir, auth) = auth_with_config(&format!(
            r#"{{"auths": {{"https://quay.io": {{"auth": "{}"}}}}}}"#,
            STANDARD.encode("robot:s3cret")
        ));
        let creds = auth
            .credentials_for(&target("quay.io/", "robot", ""))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(creds.username.as_deref(), Some("robot"));
        assert_eq!(creds.password.as_deref(), Some("s3cret"));
        assert_eq!(creds.serveraddress.as_deref(), Some("quay.io"));
    }

    #[tokio::test]
    async fn test_other_registry_login_is_not_used() {
        let (_dir, auth) = auth_with_config(&format!(
            r#"{{"auths": {{"ghcr.io": {{"auth": "{}"}}}}}}"#,
            STANDARD.encode("robot:s3cret")
        ));
        let creds = auth.credentials_for(&target("quay.io", "", "")).await.unwrap();
        assert!(creds.is_none());
    }

    #[tokio::test]
    async fn test_stored_login_without_separator_is_error() {
        let (_dir, auth) = auth_with_config(&format!(
            r#"{{"auths": {{"quay.io": {{"auth": "{}"}}}}}}"#,
            STANDARD.encode("just-a-token")
        ));
        let result = auth.credentials_for(&target("quay.io", "", "")).await;
        assert!(matches!(result, Err(EngineError::AuthFailed { .. })));
    }

    #[tokio::test]
    async fn test_broken_config_json_is_error() {
        let (_dir, auth) = auth_with_config("{ not json");
        let result = auth.credentials_for(&target("quay.io", "", "")).await;
        match result {
            Err(EngineError::AuthFailed { registry, .. }) => assert_eq!(registry, "quay.io"),
            other => panic!("Expected AuthFailed, got {:?}", other),
        }
    }
}
