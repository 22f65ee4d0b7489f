//! アクションごとのスキーマ検証
//!
//! スキーマをデータ（型付き制約の表）として定義し、単一の検証関数で
//! YAML ドキュメントを検査します。検証は有効化されたアクションに対応する
//! スキーマだけを対象に行い、全スキーマを一括では実行しません。

use crate::error::{ConfigError, Result};
use crate::model::ACTION_NAMES;
use serde_yaml::Value;

/// フィールドの型制約
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// 任意の文字列
    Str,
    /// 真偽値
    Bool,
    /// 非負整数
    UInt,
    /// 整数（負値を含む）
    Int,
    /// 文字列 → 文字列のマッピング
    StrMap,
    /// 許可リストに含まれる文字列
    OneOf(&'static [&'static str]),
    /// 許可リストの値のみからなる配列
    ListOf(&'static [&'static str]),
    /// いずれかの接頭辞で始まる文字列
    Prefixed(&'static [&'static str]),
    /// 入れ子のマッピング
    Nested(&'static [FieldRule]),
}

/// 1 フィールド分の検証ルール
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub key: &'static str,
    pub required: bool,
    pub kind: FieldKind,
}

/// 1 セクション分のスキーマ
#[derive(Debug, Clone, Copy)]
pub struct SectionSchema {
    /// トップレベルのセクション名
    pub section: &'static str,
    /// ルールにないキーを許可するか
    pub allow_unknown: bool,
    pub fields: &'static [FieldRule],
}

/// Docker デーモンエンドポイントに許可される接頭辞
pub const DAEMON_PREFIXES: &[&str] = &["unix:///", "tcp://"];

/// ECR を利用できるリージョンの許可リスト
pub const REGIONS: &[&str] = &[
    "us-east-1",
    "us-east-2",
    "us-west-1",
    "us-west-2",
    "ca-central-1",
    "eu-central-1",
    "eu-west-1",
    "eu-west-2",
    "ap-northeast-1",
    "ap-southeast-1",
    "ap-southeast-2",
];

const LIMIT_FIELDS: &[FieldRule] = &[
    FieldRule { key: "memory", required: false, kind: FieldKind::UInt },
    FieldRule { key: "memswap", required: false, kind: FieldKind::Int },
    FieldRule { key: "cpushares", required: false, kind: FieldKind::UInt },
    FieldRule { key: "cpusetcpus", required: false, kind: FieldKind::Str },
];

/// Global セクションのスキーマ
pub const GLOBAL: SectionSchema = SectionSchema {
    section: "Global",
    allow_unknown: false,
    fields: &[FieldRule { key: "actions", required: true, kind: FieldKind::ListOf(ACTION_NAMES) }],
};

/// build アクションのスキーマ
pub const BUILD: SectionSchema = SectionSchema {
    section: "Docker",
    allow_unknown: false,
    fields: &[
        FieldRule { key: "tag", required: true, kind: FieldKind::Str },
        FieldRule { key: "daemon", required: false, kind: FieldKind::Prefixed(DAEMON_PREFIXES) },
        FieldRule { key: "path", required: false, kind: FieldKind::Str },
        FieldRule { key: "dockerfile", required: false, kind: FieldKind::Str },
        FieldRule { key: "quiet", required: false, kind: FieldKind::Bool },
        FieldRule { key: "nocache", required: false, kind: FieldKind::Bool },
        FieldRule { key: "rm", required: false, kind: FieldKind::Bool },
        FieldRule { key: "pull", required: false, kind: FieldKind::Bool },
        FieldRule { key: "forcerm", required: false, kind: FieldKind::Bool },
        FieldRule { key: "timeout", required: false, kind: FieldKind::UInt },
        FieldRule { key: "shmsize", required: false, kind: FieldKind::UInt },
        FieldRule { key: "buildargs", required: false, kind: FieldKind::StrMap },
        FieldRule { key: "labels", required: false, kind: FieldKind::StrMap },
        FieldRule { key: "container_limits", required: false, kind: FieldKind::Nested(LIMIT_FIELDS) },
    ],
};

/// push アクションのスキーマ
///
/// build 用のキーが同じ Docker セクションに同居できるよう、未知のキーは許可します。
pub const PUSH: SectionSchema = SectionSchema {
    section: "Docker",
    allow_unknown: true,
    fields: &[
        FieldRule { key: "tag", required: true, kind: FieldKind::Str },
        FieldRule { key: "daemon", required: false, kind: FieldKind::Prefixed(DAEMON_PREFIXES) },
    ],
};

/// push_to_registry アクションのスキーマ
pub const REGISTRY: SectionSchema = SectionSchema {
    section: "Ecr",
    allow_unknown: false,
    fields: &[
        FieldRule { key: "access_key_id", required: true, kind: FieldKind::Str },
        FieldRule { key: "secret_access_key", required: true, kind: FieldKind::Str },
        FieldRule { key: "region", required: true, kind: FieldKind::OneOf(REGIONS) },
        FieldRule { key: "repo_name", required: true, kind: FieldKind::Str },
    ],
};

/// ドキュメントをスキーマに照らして検証する
pub fn validate_section(doc: &Value, schema: &SectionSchema) -> Result<()> {
    let section = doc
        .get(schema.section)
        .ok_or_else(|| violation(schema.section, "セクションが定義されていません".to_string()))?;
    let mapping = section.as_mapping().ok_or_else(|| {
        violation(schema.section, "セクションはマッピングである必要があります".to_string())
    })?;

    validate_mapping(schema.section, mapping, schema.fields, schema.allow_unknown)
}

fn validate_mapping(
    section: &str,
    mapping: &serde_yaml::Mapping,
    fields: &[FieldRule],
    allow_unknown: bool,
) -> Result<()> {
    for rule in fields {
        match mapping.get(rule.key) {
            Some(value) => check_kind(section, rule.key, value, rule.kind)?,
            None if rule.required => {
                return Err(violation(section, format!("必須キー '{}' がありません", rule.key)));
            }
            None => {}
        }
    }

    if !allow_unknown {
        for key in mapping.keys() {
            let name = key.as_str().unwrap_or_default();
            if !fields.iter().any(|rule| rule.key == name) {
                return Err(violation(section, format!("未知のキー '{}' が含まれています", name)));
            }
        }
    }

    Ok(())
}

fn check_kind(section: &str, key: &str, value: &Value, kind: FieldKind) -> Result<()> {
    match kind {
        FieldKind::Str => {
            if value.as_str().is_none() {
                return Err(type_violation(section, key, "文字列"));
            }
        }
        FieldKind::Bool => {
            if value.as_bool().is_none() {
                return Err(type_violation(section, key, "真偽値"));
            }
        }
        FieldKind::UInt => {
            if value.as_u64().is_none() {
                return Err(type_violation(section, key, "非負整数"));
            }
        }
        FieldKind::Int => {
            if value.as_i64().is_none() {
                return Err(type_violation(section, key, "整数"));
            }
        }
        FieldKind::StrMap => {
            let mapping = value
                .as_mapping()
                .ok_or_else(|| type_violation(section, key, "マッピング"))?;
            for (map_key, map_value) in mapping {
                if map_key.as_str().is_none() || map_value.as_str().is_none() {
                    return Err(violation(
                        section,
                        format!("'{}' は文字列から文字列へのマッピングである必要があります", key),
                    ));
                }
            }
        }
        FieldKind::OneOf(allowed) => {
            let text = value
                .as_str()
                .ok_or_else(|| type_violation(section, key, "文字列"))?;
            if !allowed.contains(&text) {
                return Err(violation(
                    section,
                    format!("'{}' の値 '{}' は許可されていません", key, text),
                ));
            }
        }
        FieldKind::ListOf(allowed) => {
            let items = value
                .as_sequence()
                .ok_or_else(|| type_violation(section, key, "配列"))?;
            for item in items {
                let text = item.as_str().ok_or_else(|| {
                    violation(section, format!("'{}' の要素は文字列である必要があります", key))
                })?;
                if !allowed.contains(&text) {
                    return Err(violation(
                        section,
                        format!("'{}' の要素 '{}' は許可されていません", key, text),
                    ));
                }
            }
        }
        FieldKind::Prefixed(prefixes) => {
            let text = value
                .as_str()
                .ok_or_else(|| type_violation(section, key, "文字列"))?;
            if !prefixes.iter().any(|prefix| text.starts_with(prefix)) {
                return Err(violation(
                    section,
                    format!("'{}' は {} のいずれかで始まる必要があります", key, prefixes.join(" / ")),
                ));
            }
        }
        FieldKind::Nested(rules) => {
            let mapping = value
                .as_mapping()
                .ok_or_else(|| type_violation(section, key, "マッピング"))?;
            validate_mapping(section, mapping, rules, false)?;
        }
    }
    Ok(())
}

fn violation(section: &str, message: String) -> ConfigError {
    ConfigError::Validation { section: section.to_string(), message }
}

fn type_violation(section: &str, key: &str, expected: &str) -> ConfigError {
    violation(section, format!("'{}' は{}である必要があります", key, expected))
}
