//! Docker デーモン操作の抽象化
//!
//! パイプラインが必要とする 4 つの能力（build / tag / push / login）を
//! [`ImageDaemon`] トレイトとして切り出します。本番実装は bollard を使う
//! [`DockerDaemon`]、テストでは合成イベントを流すフェイクに差し替えます。

use crate::context::ContextBuilder;
use crate::error::{DockerError, Result};
use crate::event::{BuildEvent, EventReceiver, LoginStatus, PushEvent};
use async_trait::async_trait;
use bollard::Docker;
use bollard::auth::DockerCredentials;
use slipway_config::{ContainerLimits, DockerSection};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;

/// 進捗チャネルの容量
///
/// イベントは受信側が 1 件ずつログに流すため、小さなバッファで足ります。
const EVENT_CHANNEL_CAPACITY: usize = 32;

/// デーモン接続のデフォルトタイムアウト（秒）
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// レジストリ認証情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryCredentials {
    pub username: String,
    pub password: String,
    /// レジストリのアドレス（ECR の場合は proxy endpoint）
    pub serveraddress: String,
}

impl RegistryCredentials {
    fn to_docker(&self) -> DockerCredentials {
        DockerCredentials {
            username: Some(self.username.clone()),
            password: Some(self.password.clone()),
            serveraddress: Some(self.serveraddress.clone()),
            ..Default::default()
        }
    }
}

/// イメージビルドのリクエスト
///
/// `Docker` セクションのビルド関連フィールドをデーモン向けに写し取ったもの。
/// `daemon` と `timeout` は接続設定のため、ここには含まれません。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildRequest {
    pub tag: String,
    pub context_dir: PathBuf,
    /// コンテキスト内の Dockerfile のパス（省略時は `Dockerfile`）
    pub dockerfile: Option<String>,
    pub quiet: bool,
    pub nocache: bool,
    pub rm: bool,
    pub pull: bool,
    pub forcerm: bool,
    pub shmsize: Option<u64>,
    pub buildargs: HashMap<String, String>,
    pub labels: HashMap<String, String>,
    pub limits: Option<ContainerLimits>,
}

impl BuildRequest {
    /// Docker セクションからリクエストを導出
    pub fn from_section(section: &DockerSection) -> Self {
        Self {
            tag: section.tag.clone(),
            context_dir: PathBuf::from(section.path.as_deref().unwrap_or(".")),
            dockerfile: section.dockerfile.clone(),
            quiet: section.quiet,
            nocache: section.nocache,
            rm: section.rm,
            pull: section.pull,
            forcerm: section.forcerm,
            shmsize: section.shmsize,
            buildargs: section.buildargs.clone(),
            labels: section.labels.clone(),
            limits: section.container_limits.clone(),
        }
    }
}

/// Docker デーモンが提供する能力
#[async_trait]
pub trait ImageDaemon: Send + Sync {
    /// イメージをビルドし、進捗イベントのストリームを返す
    async fn build(&self, request: BuildRequest) -> Result<EventReceiver<BuildEvent>>;

    /// ローカルイメージに別のリポジトリ名とタグを付ける
    async fn tag(&self, source: &str, repository: &str, tag: &str) -> Result<()>;

    /// イメージをレジストリにプッシュし、進捗イベントのストリームを返す
    async fn push(
        &self,
        repository: &str,
        tag: &str,
        credentials: Option<RegistryCredentials>,
    ) -> Result<EventReceiver<PushEvent>>;

    /// レジストリへのログインを試みる
    ///
    /// `reauth` はキャッシュ済みの認証情報を無視して再認証することを要求します。
    async fn login(&self, credentials: &RegistryCredentials, reauth: bool) -> Result<LoginStatus>;
}

/// bollard ベースの [`ImageDaemon`] 実装
pub struct DockerDaemon {
    docker: Docker,
    http: reqwest::Client,
}

impl DockerDaemon {
    /// 接続設定からデーモンクライアントを作成
    ///
    /// - `unix://...` - ローカルソケット
    /// - `tcp://...` - TCP 接続
    /// - 未指定 - 環境のデフォルト（`DOCKER_HOST` など）
    ///
    /// クライアントは遅延接続のため、ここではネットワーク I/O を行いません。
    pub fn connect(endpoint: Option<&str>, timeout_secs: Option<u64>) -> Result<Self> {
        let timeout = timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);

        let docker = match endpoint {
            Some(endpoint) if endpoint.starts_with("unix://") => {
                Docker::connect_with_socket(endpoint, timeout, bollard::API_DEFAULT_VERSION)?
            }
            Some(endpoint) if endpoint.starts_with("tcp://") => {
                Docker::connect_with_http(endpoint, timeout, bollard::API_DEFAULT_VERSION)?
            }
            Some(endpoint) => return Err(DockerError::InvalidEndpoint(endpoint.to_string())),
            None => Docker::connect_with_local_defaults()?,
        };

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()?;

        Ok(Self { docker, http })
    }

    fn build_options(request: &BuildRequest) -> bollard::image::BuildImageOptions<String> {
        let limits = request.limits.clone().unwrap_or_default();

        bollard::image::BuildImageOptions {
            dockerfile: request
                .dockerfile
                .clone()
                .unwrap_or_else(|| "Dockerfile".to_string()),
            t: request.tag.clone(),
            q: request.quiet,
            nocache: request.nocache,
            pull: request.pull,
            rm: request.rm,
            forcerm: request.forcerm,
            shmsize: request.shmsize,
            buildargs: request.buildargs.clone(),
            labels: request.labels.clone(),
            memory: limits.memory,
            memswap: limits.memswap,
            cpushares: limits.cpushares,
            cpusetcpus: limits.cpusetcpus.unwrap_or_default(),
            ..Default::default()
        }
    }
}

#[async_trait]
impl ImageDaemon for DockerDaemon {
    async fn build(&self, request: BuildRequest) -> Result<EventReceiver<BuildEvent>> {
        // コンテキストの作成はストリーム開始前に失敗させる
        let archive = ContextBuilder::create_context(&request.context_dir)?;
        let options = Self::build_options(&request);
        tracing::debug!("Build options: {:?}", options);

        let docker = self.docker.clone();
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        tokio::spawn(async move {
            use bytes::Bytes;
            use futures_util::StreamExt;
            use http_body_util::{Either, Full};

            let body = Full::new(Bytes::from(archive));
            let mut stream = docker.build_image(options, None, Some(Either::Left(body)));

            while let Some(message) = stream.next().await {
                let event = message.map(BuildEvent::from).map_err(DockerError::from);
                if tx.send(event).await.is_err() {
                    // 受信側が先に終了した
                    break;
                }
            }
        });

        Ok(rx)
    }

    async fn tag(&self, source: &str, repository: &str, tag: &str) -> Result<()> {
        #[allow(deprecated)]
        let options = bollard::image::TagImageOptions {
            repo: repository.to_string(),
            tag: tag.to_string(),
        };

        #[allow(deprecated)]
        self.docker.tag_image(source, Some(options)).await?;
        Ok(())
    }

    async fn push(
        &self,
        repository: &str,
        tag: &str,
        credentials: Option<RegistryCredentials>,
    ) -> Result<EventReceiver<PushEvent>> {
        #[allow(deprecated)]
        let options = bollard::image::PushImageOptions::<String> {
            tag: tag.to_string(),
        };

        let docker = self.docker.clone();
        let repository = repository.to_string();
        let credentials = credentials.as_ref().map(RegistryCredentials::to_docker);
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        tokio::spawn(async move {
            use futures_util::StreamExt;

            #[allow(deprecated)]
            let mut stream = docker.push_image(&repository, Some(options), credentials);

            while let Some(message) = stream.next().await {
                let event = message.map(PushEvent::from).map_err(DockerError::from);
                if tx.send(event).await.is_err() {
                    break;
                }
            }
        });

        Ok(rx)
    }

    async fn login(&self, credentials: &RegistryCredentials, reauth: bool) -> Result<LoginStatus> {
        let endpoint = credentials.serveraddress.trim_end_matches('/');
        let url = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            format!("{}/v2/", endpoint)
        } else {
            format!("https://{}/v2/", endpoint)
        };

        tracing::debug!("Probing registry auth: {} (reauth: {})", url, reauth);

        let response = self
            .http
            .get(&url)
            .basic_auth(&credentials.username, Some(&credentials.password))
            .send()
            .await?;

        if response.status().is_success() {
            Ok(LoginStatus::new("Login Succeeded"))
        } else {
            Ok(LoginStatus::new(format!(
                "Login Failed: registry returned {}",
                response.status()
            )))
        }
    }
}
