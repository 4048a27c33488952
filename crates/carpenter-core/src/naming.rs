//! イメージ名・タグの命名規則

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct InvalidName(pub String);

/// Docker タグのバリデーション
///
/// - 128文字以下
/// - 英数字、ピリオド、ハイフン、アンダースコアのみ
/// - 先頭はピリオドまたはハイフンではない
pub fn validate_tag(tag: &str) -> Result<(), InvalidName> {
    if tag.is_empty() {
        return Err(InvalidName("Tag is empty".to_string()));
    }

    if tag.len() > 128 {
        return Err(InvalidName(format!(
            "Tag too long ({} characters, max 128)",
            tag.len()
        )));
    }

    if tag.starts_with('.') || tag.starts_with('-') {
        return Err(InvalidName(format!(
            "Tag must not start with '.' or '-': {}",
            tag
        )));
    }

    if let Some(c) = tag
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && *c != '.' && *c != '-' && *c != '_')
    {
        return Err(InvalidName(format!(
            "Invalid character '{}' in tag: {}",
            c, tag
        )));
    }

    Ok(())
}

/// リポジトリ名のバリデーション
///
/// `/` 区切りの各コンポーネントは小文字英数字で始まり・終わり、
/// 間に `.` `_` `-` を含められる。
pub fn validate_repository_name(name: &str) -> Result<(), InvalidName> {
    if name.is_empty() {
        return Err(InvalidName("Image name is empty".to_string()));
    }

    if name.len() > 255 {
        return Err(InvalidName(format!(
            "Image name too long ({} characters, max 255)",
            name.len()
        )));
    }

    for component in name.split('/') {
        let valid_edges = component
            .chars()
            .next()
            .zip(component.chars().last())
            .is_some_and(|(first, last)| is_lower_alnum(first) && is_lower_alnum(last));
        if !valid_edges {
            return Err(InvalidName(format!(
                "Invalid path component '{}' in image name: {}",
                component, name
            )));
        }

        if let Some(c) = component
            .chars()
            .find(|c| !is_lower_alnum(*c) && !matches!(c, '.' | '_' | '-'))
        {
            return Err(InvalidName(format!(
                "Invalid character '{}' in image name: {}",
                c, name
            )));
        }
    }

    Ok(())
}

fn is_lower_alnum(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_tag() {
        assert!(validate_tag("latest").is_ok());
        assert!(validate_tag("v1.0.0-rc_1").is_ok());
        assert!(validate_tag("").is_err());
        assert!(validate_tag("-dev").is_err());
        assert!(validate_tag(".hidden").is_err());
        assert!(validate_tag("feature/x").is_err());
        assert!(validate_tag(&"a".repeat(129)).is_err());
    }

    #[test]
    fn test_validate_repository_name() {
        assert!(validate_repository_name("arcaflow-plugin-example").is_ok());
        assert!(validate_repository_name("arcalot/plugin.v2").is_ok());
        assert!(validate_repository_name("Plugin").is_err());
        assert!(validate_repository_name("plugin-").is_err());
        assert!(validate_repository_name("org//plugin").is_err());
        assert!(validate_repository_name("plug in").is_err());
        assert!(validate_repository_name("").is_err());
    }
}
