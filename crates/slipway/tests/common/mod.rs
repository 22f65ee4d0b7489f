use async_trait::async_trait;
use base64::Engine;
use slipway_docker::{
    BuildEvent, BuildRequest, DockerError, EventReceiver, ImageDaemon, LoginStatus, PushEvent,
    RegistryCredentials,
};
use slipway_ecr::{AuthError, CloudCredentials, RegistryAuthApi, RegistryAuthorization};
use std::sync::Mutex;
use tokio::sync::mpsc;

/// 呼び出しを記録し、台本どおりのイベントを流すテスト用デーモン
#[derive(Default)]
pub struct RecordingDaemon {
    pub login_status: Mutex<Option<LoginStatus>>,
    pub build_events: Mutex<Vec<Result<BuildEvent, DockerError>>>,
    pub push_events: Mutex<Vec<Result<PushEvent, DockerError>>>,
    /// 操作名を呼び出し順に記録（"build" / "tag" / "push" / "login"）
    pub operations: Mutex<Vec<String>>,
    pub build_requests: Mutex<Vec<BuildRequest>>,
    pub tag_calls: Mutex<Vec<(String, String, String)>>,
    pub push_calls: Mutex<Vec<(String, String, Option<RegistryCredentials>)>>,
    pub login_calls: Mutex<Vec<(RegistryCredentials, bool)>>,
}

impl RecordingDaemon {
    #[allow(dead_code)]
    pub fn rejecting_login() -> Self {
        let daemon = Self::default();
        *daemon.login_status.lock().unwrap() = Some(LoginStatus::new("Login Failed"));
        daemon
    }

    #[allow(dead_code)]
    pub fn with_build_events(events: Vec<Result<BuildEvent, DockerError>>) -> Self {
        let daemon = Self::default();
        *daemon.build_events.lock().unwrap() = events;
        daemon
    }
}

async fn feed<T: Send + 'static>(events: Vec<Result<T, DockerError>>) -> EventReceiver<T> {
    let (tx, rx) = mpsc::channel(events.len().max(1));
    for event in events {
        tx.send(event).await.unwrap();
    }
    rx
}

#[async_trait]
impl ImageDaemon for RecordingDaemon {
    async fn build(&self, request: BuildRequest) -> Result<EventReceiver<BuildEvent>, DockerError> {
        self.operations.lock().unwrap().push("build".to_string());
        self.build_requests.lock().unwrap().push(request);
        let events = std::mem::take(&mut *self.build_events.lock().unwrap());
        Ok(feed(events).await)
    }

    async fn tag(&self, source: &str, repository: &str, tag: &str) -> Result<(), DockerError> {
        self.operations.lock().unwrap().push("tag".to_string());
        self.tag_calls.lock().unwrap().push((
            source.to_string(),
            repository.to_string(),
            tag.to_string(),
        ));
        Ok(())
    }

    async fn push(
        &self,
        repository: &str,
        tag: &str,
        credentials: Option<RegistryCredentials>,
    ) -> Result<EventReceiver<PushEvent>, DockerError> {
        self.operations.lock().unwrap().push("push".to_string());
        self.push_calls
            .lock()
            .unwrap()
            .push((repository.to_string(), tag.to_string(), credentials));
        let events = std::mem::take(&mut *self.push_events.lock().unwrap());
        Ok(feed(events).await)
    }

    async fn login(
        &self,
        credentials: &RegistryCredentials,
        reauth: bool,
    ) -> Result<LoginStatus, DockerError> {
        self.operations.lock().unwrap().push("login".to_string());
        self.login_calls
            .lock()
            .unwrap()
            .push((credentials.clone(), reauth));
        let status = self.login_status.lock().unwrap().clone();
        Ok(status.unwrap_or_else(|| LoginStatus::new("Login Succeeded")))
    }
}

/// 固定の ARN とトークンを返すテスト用レジストリ API
pub struct RecordingRegistry {
    pub arn: String,
    pub token: String,
    pub proxy_endpoint: String,
    pub identity_calls: Mutex<Vec<CloudCredentials>>,
    pub token_calls: Mutex<Vec<(CloudCredentials, String)>>,
}

impl Default for RecordingRegistry {
    fn default() -> Self {
        Self {
            arn: "arn:aws:iam::123456789012:user/ci".to_string(),
            token: base64::engine::general_purpose::STANDARD.encode("AWS:secretpass"),
            proxy_endpoint: "https://123456789012.dkr.ecr.us-east-1.amazonaws.com".to_string(),
            identity_calls: Mutex::new(Vec::new()),
            token_calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl RegistryAuthApi for RecordingRegistry {
    async fn caller_identity(&self, credentials: &CloudCredentials) -> Result<String, AuthError> {
        self.identity_calls.lock().unwrap().push(credentials.clone());
        Ok(self.arn.clone())
    }

    async fn authorization_token(
        &self,
        credentials: &CloudCredentials,
        registry_id: &str,
    ) -> Result<RegistryAuthorization, AuthError> {
        self.token_calls
            .lock()
            .unwrap()
            .push((credentials.clone(), registry_id.to_string()));
        Ok(RegistryAuthorization {
            token: self.token.clone(),
            proxy_endpoint: self.proxy_endpoint.clone(),
        })
    }
}
