//! イメージプッシュ処理
//!
//! ビルドしたイメージをコンテナレジストリにプッシュします。

use crate::daemon::{ImageDaemon, RegistryCredentials};
use crate::error::{DockerError, Result};
use colored::Colorize;

/// イメージプッシュを実行するハンドラ
pub struct ImagePublisher<'a> {
    daemon: &'a dyn ImageDaemon,
}

impl<'a> ImagePublisher<'a> {
    pub fn new(daemon: &'a dyn ImageDaemon) -> Self {
        Self { daemon }
    }

    /// レジストリへログインを試み、成功したかどうかを返す
    ///
    /// ステータスが成功を示さない場合も Err ではなく false を返し、
    /// 中断するかどうかは呼び出し側が決めます。
    pub async fn login(&self, credentials: &RegistryCredentials, reauth: bool) -> Result<bool> {
        let status = self.daemon.login(credentials, reauth).await?;

        if status.succeeded() {
            tracing::info!("Login to {} Succeeded!", credentials.serveraddress);
            Ok(true)
        } else {
            tracing::warn!(
                "Login to {} Failed! ({})",
                credentials.serveraddress,
                status.status
            );
            Ok(false)
        }
    }

    /// ローカルイメージに新しいリポジトリ名とタグを付ける
    pub async fn tag(&self, source: &str, repository: &str, tag: &str) -> Result<()> {
        tracing::info!("Tagging {} as {}:{}", source, repository, tag);
        self.daemon.tag(source, repository, tag).await
    }

    /// イメージをレジストリにプッシュ
    ///
    /// # Arguments
    /// * `repository` - イメージ名（レジストリ込み、タグなし）
    /// * `tag` - イメージタグ
    /// * `credentials` - 認証情報（不要なレジストリでは None）
    pub async fn push(
        &self,
        repository: &str,
        tag: &str,
        credentials: Option<RegistryCredentials>,
    ) -> Result<()> {
        let full_image = format!("{}:{}", repository, tag);
        println!("  → {}", full_image.cyan());
        tracing::info!("Pushing Docker image: {}", full_image);

        let mut events = self.daemon.push(repository, tag, credentials).await?;

        let mut last_status: Option<String> = None;
        let mut error_message: Option<String> = None;

        while let Some(event) = events.recv().await {
            let event = event?;

            if let Some(error) = event.error {
                // エラーの後にもイベントが続くことがあるため、読み切ってから報告する
                error_message = Some(error);
                continue;
            }
            if let Some(status) = event.status {
                match &event.progress {
                    Some(progress) => tracing::info!("{} {}", status, progress),
                    None => tracing::info!("{}", status),
                }
                last_status = Some(status);
            }
        }

        if let Some(message) = error_message {
            return Err(DockerError::PushFailed { message });
        }

        if let Some(status) = last_status {
            tracing::info!("Push complete: {}", status);
        }
        Ok(())
    }
}
