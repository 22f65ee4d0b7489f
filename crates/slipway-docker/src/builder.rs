//! イメージビルド処理

use crate::daemon::{BuildRequest, ImageDaemon};
use crate::error::{DockerError, Result};
use slipway_config::DockerSection;

/// イメージビルドを実行するハンドラ
pub struct ImageBuilder<'a> {
    daemon: &'a dyn ImageDaemon,
}

impl<'a> ImageBuilder<'a> {
    pub fn new(daemon: &'a dyn ImageDaemon) -> Self {
        Self { daemon }
    }

    /// Docker セクションの設定でイメージをビルド
    ///
    /// 進捗の各行をログに流し、エラーイベントを検出した時点で中断します。
    pub async fn build(&self, section: &DockerSection) -> Result<()> {
        let request = BuildRequest::from_section(section);
        let tag = request.tag.clone();

        tracing::info!("Building Docker image with tag: {}", tag);

        let mut events = self.daemon.build(request).await?;
        while let Some(event) = events.recv().await {
            let event = event?;

            if let Some(error) = event.error {
                return Err(DockerError::BuildFailed(error));
            }
            if let Some(line) = event.stream {
                let line = line.trim_end();
                if !line.is_empty() {
                    tracing::info!("{}", line);
                }
            }
            if let Some(status) = event.status {
                // ベースイメージの pull 等のステータス
                tracing::info!("{}", status);
            }
        }

        tracing::info!("Successfully built: {}", tag);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daemon::testing::ScriptedDaemon;
    use crate::event::BuildEvent;
    use std::path::PathBuf;

    fn section(yaml: &str) -> DockerSection {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn stream_event(line: &str) -> Result<BuildEvent> {
        Ok(BuildEvent {
            stream: Some(line.to_string()),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_build_consumes_all_events() {
        let daemon = ScriptedDaemon::with_build_events(vec![
            stream_event("Step 1/2 : FROM alpine\n"),
            stream_event("Step 2/2 : RUN echo ok\n"),
            Ok(BuildEvent {
                status: Some("Successfully tagged app:1.0".to_string()),
                ..Default::default()
            }),
        ]);

        let builder = ImageBuilder::new(&daemon);
        builder.build(&section("tag: app:1.0")).await.unwrap();

        let requests = daemon.build_requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].tag, "app:1.0");
        assert_eq!(requests[0].context_dir, PathBuf::from("."));
    }

    #[tokio::test]
    async fn test_build_aborts_on_error_event() {
        let daemon = ScriptedDaemon::with_build_events(vec![
            stream_event("Step 1/2 : FROM alpine\n"),
            Ok(BuildEvent {
                error: Some("The command '/bin/sh -c exit 1' returned a non-zero code: 1".to_string()),
                ..Default::default()
            }),
        ]);

        let builder = ImageBuilder::new(&daemon);
        let result = builder.build(&section("tag: app:1.0")).await;

        match result {
            Err(DockerError::BuildFailed(message)) => {
                assert!(message.contains("non-zero code"));
            }
            other => panic!("expected BuildFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_build_forwards_section_settings() {
        let daemon = ScriptedDaemon::default();
        let builder = ImageBuilder::new(&daemon);

        builder
            .build(&section(
                r#"
tag: registry.example.com/app:2.1
path: ./srv
nocache: true
"#,
            ))
            .await
            .unwrap();

        let requests = daemon.build_requests.lock().unwrap();
        assert_eq!(requests[0].context_dir, PathBuf::from("./srv"));
        assert!(requests[0].nocache);
    }
}
