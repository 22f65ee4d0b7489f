use clap::Parser;
use colored::Colorize;
use slipway::{Pipeline, PipelineError};
use slipway_docker::DockerDaemon;
use slipway_ecr::AwsRegistryApi;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "slipway")]
#[command(version)]
#[command(about = "YAMLひとつで、ビルドからレジストリへ。", long_about = None)]
struct Cli {
    /// 設定ファイルのパス（デフォルト: ./.slipway.yml）
    #[arg(short = 'c', long = "config", env = "SLIPWAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config_path = cli
        .config
        .unwrap_or_else(slipway_config::default_config_path);

    let doc = match slipway_config::load(&config_path) {
        Ok(doc) => doc,
        Err(error) => fatal(error.into()),
    };

    // 接続設定だけ検証前に読む。クライアントの生成は遅延接続のため、
    // ここではまだデーモンに到達しない。
    let settings = slipway_config::daemon_settings(&doc);
    let daemon = match DockerDaemon::connect(settings.endpoint.as_deref(), settings.timeout_secs) {
        Ok(daemon) => daemon,
        Err(error) => fatal(error.into()),
    };
    let registry = AwsRegistryApi::new();

    match Pipeline::new(&doc, &daemon, &registry).run().await {
        Ok(()) => println!("{}", "✓ すべてのアクションが完了しました！".green()),
        Err(error) => fatal(error),
    }
}

/// 失敗を 1 行のエラーログにまとめ、終了コード 1 で終了する
fn fatal(error: PipelineError) -> ! {
    tracing::error!("{}", error);
    std::process::exit(1);
}
