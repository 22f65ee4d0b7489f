//! 設定の型定義
//!
//! スキーマ検証を通過したセクションをデシリアライズする型と、
//! 実行するアクションの集合を定義します。

use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;

/// 設定ファイルで使うアクション名
pub const ACTION_NAMES: &[&str] = &["build", "push", "push_to_registry"];

/// パイプラインが実行できるアクション
///
/// 宣言順がそのまま実行順になります。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Build,
    Push,
    PushToRegistry,
}

impl Action {
    /// 実行順に並んだ全アクション
    pub const ALL: [Action; 3] = [Action::Build, Action::Push, Action::PushToRegistry];

    /// 設定ファイル上の名前
    pub fn name(&self) -> &'static str {
        match self {
            Action::Build => "build",
            Action::Push => "push",
            Action::PushToRegistry => "push_to_registry",
        }
    }

    /// 設定ファイル上の名前から変換
    pub fn from_name(name: &str) -> Option<Action> {
        Action::ALL.into_iter().find(|action| action.name() == name)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Global セクション
#[derive(Debug, Clone, Deserialize)]
pub struct GlobalSection {
    pub actions: Vec<String>,
}

/// 実行するアクションの集合
///
/// `Global.actions` から一度だけ導出し、以後は変更しません。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionSet {
    pub build: bool,
    pub push: bool,
    pub push_to_registry: bool,
}

impl ActionSet {
    /// アクション名の列から導出する
    ///
    /// 未知の名前はスキーマ検証で既に拒否されているため、ここでは無視します。
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = ActionSet::default();
        for name in names {
            match Action::from_name(name.as_ref()) {
                Some(Action::Build) => set.build = true,
                Some(Action::Push) => set.push = true,
                Some(Action::PushToRegistry) => set.push_to_registry = true,
                None => {}
            }
        }
        set
    }

    pub fn contains(&self, action: Action) -> bool {
        match action {
            Action::Build => self.build,
            Action::Push => self.push,
            Action::PushToRegistry => self.push_to_registry,
        }
    }

    /// 有効なアクションを実行順に返す
    pub fn enabled(&self) -> impl Iterator<Item = Action> + '_ {
        Action::ALL.into_iter().filter(|action| self.contains(*action))
    }

    pub fn is_empty(&self) -> bool {
        !(self.build || self.push || self.push_to_registry)
    }
}

impl fmt::Display for ActionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.enabled().map(|action| action.name()).collect();
        f.write_str(&names.join(" "))
    }
}

/// Docker セクション（build / push アクションのパラメータ）
#[derive(Debug, Clone, Deserialize)]
pub struct DockerSection {
    /// イメージのタグ（`repository:tag` 形式）
    pub tag: String,
    /// Docker デーモンのエンドポイント（unix:/// または tcp://）
    pub daemon: Option<String>,
    /// ビルドコンテキストのパス（デフォルトはカレントディレクトリ）
    pub path: Option<String>,
    /// コンテキスト内の Dockerfile のパス
    pub dockerfile: Option<String>,
    #[serde(default)]
    pub quiet: bool,
    #[serde(default)]
    pub nocache: bool,
    #[serde(default)]
    pub rm: bool,
    #[serde(default)]
    pub pull: bool,
    #[serde(default)]
    pub forcerm: bool,
    /// デーモンへの接続タイムアウト（秒）
    pub timeout: Option<u64>,
    /// /dev/shm のサイズ（バイト）
    pub shmsize: Option<u64>,
    #[serde(default)]
    pub buildargs: HashMap<String, String>,
    #[serde(default)]
    pub labels: HashMap<String, String>,
    pub container_limits: Option<ContainerLimits>,
}

/// ビルド時のリソース制限
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ContainerLimits {
    pub memory: Option<u64>,
    pub memswap: Option<i64>,
    pub cpushares: Option<u64>,
    pub cpusetcpus: Option<String>,
}

/// Ecr セクション（push_to_registry アクションの認証情報）
#[derive(Debug, Clone, Deserialize)]
pub struct EcrSection {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: String,
    pub repo_name: String,
}
