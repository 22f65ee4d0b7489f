//! Slipway の設定管理
//!
//! YAML 設定ファイルの読み込みと、アクションごとのスキーマ検証を提供します。
//! 設定は最大 3 つのトップレベルセクション（`Global` / `Docker` / `Ecr`）からなり、
//! 有効化されたアクションに対応するスキーマだけが検証されます。

pub mod error;
pub mod model;
pub mod schema;

pub use error::{ConfigError, Result};
pub use model::{
    Action, ActionSet, ContainerLimits, DockerSection, EcrSection, GlobalSection,
};
pub use schema::{FieldKind, FieldRule, SectionSchema, validate_section};

use serde_yaml::Value;
use std::path::{Path, PathBuf};

/// デフォルトの設定ファイル名
pub const DEFAULT_CONFIG_FILE: &str = ".slipway.yml";

/// デフォルトの設定ファイルパス（カレントディレクトリ直下）
pub fn default_config_path() -> PathBuf {
    PathBuf::from(DEFAULT_CONFIG_FILE)
}

/// 設定ファイルを読み込み、YAML ドキュメントとして返す
///
/// ファイルが存在しない場合は `ConfigError::FileNotFound` を返します。
pub fn load(path: &Path) -> Result<Value> {
    if !path.is_file() {
        return Err(ConfigError::FileNotFound(path.to_path_buf()));
    }
    tracing::debug!("Loading config file: {}", path.display());
    let text = std::fs::read_to_string(path)?;
    let doc: Value = serde_yaml::from_str(&text)?;
    Ok(doc)
}

/// セクションを型付きの構造体として取り出す
///
/// スキーマ検証を通過した後に呼ぶことを想定しています。
pub fn section<T: serde::de::DeserializeOwned>(doc: &Value, name: &str) -> Result<T> {
    let value = doc
        .get(name)
        .ok_or_else(|| ConfigError::SectionMissing(name.to_string()))?;
    Ok(serde_yaml::from_value(value.clone())?)
}

/// push_to_registry アクションが参照するローカルイメージタグを取り出す
///
/// Docker セクションは ECR スキーマの検証対象に含まれないため、ここで明示的に確認します。
pub fn image_tag(doc: &Value) -> Result<String> {
    doc.get("Docker")
        .and_then(|docker| docker.get("tag"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ConfigError::Validation {
            section: "Docker".to_string(),
            message: "push_to_registry には 'tag' が必要です".to_string(),
        })
}

/// Docker デーモンの接続設定
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DaemonSettings {
    /// エンドポイント（未指定ならローカルのデフォルト接続）
    pub endpoint: Option<String>,
    /// 接続タイムアウト（秒）
    pub timeout_secs: Option<u64>,
}

/// Docker デーモンの接続設定を読み取る
///
/// クライアントの生成は検証より前に行うため、ここでは型が合わない値を
/// エラーにせず単に無視します（検証は各アクションのスキーマが行います）。
pub fn daemon_settings(doc: &Value) -> DaemonSettings {
    let docker = doc.get("Docker");
    DaemonSettings {
        endpoint: docker
            .and_then(|section| section.get("daemon"))
            .and_then(Value::as_str)
            .map(str::to_string),
        timeout_secs: docker
            .and_then(|section| section.get("timeout"))
            .and_then(Value::as_u64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join(".slipway.yml");
        let result = load(&path);
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_broken_yaml() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join(".slipway.yml");
        fs::write(&path, "Global: [unclosed\n").unwrap();
        let result = load(&path);
        assert!(matches!(result, Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn test_load_and_extract_section() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join(".slipway.yml");
        fs::write(&path, "Global:\n  actions: [build]\nDocker:\n  tag: app:1.0\n").unwrap();

        let doc = load(&path).unwrap();
        let global: GlobalSection = section(&doc, "Global").unwrap();
        assert_eq!(global.actions, vec!["build"]);

        let docker: DockerSection = section(&doc, "Docker").unwrap();
        assert_eq!(docker.tag, "app:1.0");
    }

    #[test]
    fn test_section_missing() {
        let doc: Value = serde_yaml::from_str("Global:\n  actions: []\n").unwrap();
        let result: Result<DockerSection> = section(&doc, "Docker");
        assert!(matches!(result, Err(ConfigError::SectionMissing(_))));
    }

    #[test]
    fn test_image_tag_checked() {
        let doc: Value = serde_yaml::from_str("Docker:\n  tag: app:1.0\n").unwrap();
        assert_eq!(image_tag(&doc).unwrap(), "app:1.0");

        let doc: Value = serde_yaml::from_str("Ecr:\n  repo_name: myrepo\n").unwrap();
        let err = image_tag(&doc).unwrap_err();
        assert!(err.to_string().contains("tag"));
    }

    #[test]
    fn test_daemon_settings() {
        let doc: Value = serde_yaml::from_str(
            "Docker:\n  daemon: tcp://127.0.0.1:2375\n  timeout: 60\n  tag: app:1.0\n",
        )
        .unwrap();
        let settings = daemon_settings(&doc);
        assert_eq!(settings.endpoint.as_deref(), Some("tcp://127.0.0.1:2375"));
        assert_eq!(settings.timeout_secs, Some(60));
    }

    #[test]
    fn test_daemon_settings_absent() {
        let doc: Value = serde_yaml::from_str("Global:\n  actions: [build]\n").unwrap();
        assert_eq!(daemon_settings(&doc), DaemonSettings::default());
    }
}
