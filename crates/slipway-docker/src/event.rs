//! デーモンから届く進捗イベント
//!
//! ビルドとプッシュの進捗は生の JSON ストリームではなく構造化レコードとして
//! 受け渡しします。レコード列はチャネル経由で届くため、テストでは合成した
//! イベント列を流し込めます。

use tokio::sync::mpsc;

use crate::error::DockerError;

/// 進捗イベントのストリーム
pub type EventReceiver<T> = mpsc::Receiver<Result<T, DockerError>>;

/// ビルド進捗の 1 レコード
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildEvent {
    /// ビルドステップの出力行
    pub stream: Option<String>,
    /// ベースイメージの pull などの付帯ステータス
    pub status: Option<String>,
    /// デーモンが報告したエラー
    pub error: Option<String>,
}

/// プッシュ進捗の 1 レコード
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushEvent {
    pub status: Option<String>,
    pub progress: Option<String>,
    pub error: Option<String>,
}

/// レジストリログインの結果ステータス
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginStatus {
    pub status: String,
}

impl LoginStatus {
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
        }
    }

    /// ステータスが成功（`Login ... Succeeded`）を示すか
    pub fn succeeded(&self) -> bool {
        self.status.starts_with("Login") && self.status.ends_with("Succeeded")
    }
}

impl From<bollard::models::BuildInfo> for BuildEvent {
    fn from(info: bollard::models::BuildInfo) -> Self {
        let error = info
            .error
            .or_else(|| info.error_detail.and_then(|detail| detail.message));
        Self {
            stream: info.stream,
            status: info.status,
            error,
        }
    }
}

impl From<bollard::models::PushImageInfo> for PushEvent {
    fn from(info: bollard::models::PushImageInfo) -> Self {
        Self {
            status: info.status,
            progress: info.progress,
            error: info.error,
        }
    }
}
