//! Slipway: YAML 設定で動く Docker ビルド & プッシュのパイプライン
//!
//! バイナリの本体はパイプラインの実行だけで、各能力は以下のクレートが
//! 提供します。
//!
//! - `slipway-config` - 設定の読み込みとスキーマ検証
//! - `slipway-docker` - Docker デーモン操作（build / tag / push / login）
//! - `slipway-ecr` - AWS ECR への認証

pub mod pipeline;

pub use pipeline::{Pipeline, PipelineError};
