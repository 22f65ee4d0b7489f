use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("設定ファイルが見つかりません: {0}")]
    FileNotFound(PathBuf),

    #[error("IO エラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML の解析に失敗しました: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("設定セクションがありません: {0}")]
    SectionMissing(String),

    #[error("設定の検証エラー [{section}]: {message}")]
    Validation { section: String, message: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;
