//! アクションの実行パイプライン
//!
//! `Global.actions` で有効化されたアクションを宣言順（build → push →
//! push_to_registry）に実行します。デーモンとレジストリ API はトレイト参照で
//! 受け取るため、テストでは記録用のフェイクに差し替えられます。

use slipway_config::{Action, ActionSet, DockerSection, EcrSection, GlobalSection, schema};
use slipway_docker::{ImageBuilder, ImageDaemon, ImagePublisher, RegistryCredentials, split_image_tag};
use slipway_ecr::{CloudCredentials, RegistryAuthApi, RegistryAuthenticator, registry_image};
use thiserror::Error;

/// パイプライン実行中に起こりうる失敗
///
/// main が最後にまとめてログに出して終了コードを決めるため、
/// 各アクションは途中でプロセスを終了しません。
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] slipway_config::ConfigError),

    #[error(transparent)]
    Auth(#[from] slipway_ecr::AuthError),

    #[error(transparent)]
    Docker(#[from] slipway_docker::DockerError),

    #[error("Cannot login to ECR. Aborting")]
    LoginRejected,
}

/// 設定ドキュメントに基づいてアクションを順に実行するパイプライン
pub struct Pipeline<'a> {
    doc: &'a serde_yaml::Value,
    daemon: &'a dyn ImageDaemon,
    registry: &'a dyn RegistryAuthApi,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        doc: &'a serde_yaml::Value,
        daemon: &'a dyn ImageDaemon,
        registry: &'a dyn RegistryAuthApi,
    ) -> Self {
        Self {
            doc,
            daemon,
            registry,
        }
    }

    /// 有効化された全アクションを実行
    ///
    /// アクションごとに対応するスキーマを実行直前に検証します。
    /// あるアクションで使わないセクションの不備は、そのアクションの
    /// 成否に影響しません。
    pub async fn run(&self) -> Result<(), PipelineError> {
        schema::validate_section(self.doc, &schema::GLOBAL)?;
        let global: GlobalSection = slipway_config::section(self.doc, "Global")?;
        let actions = ActionSet::from_names(&global.actions);

        tracing::info!("Initializing slipway with actions: {}", actions);

        for action in actions.enabled() {
            tracing::info!("Starting action: \"{}\"", action);
            match action {
                Action::Build => self.run_build().await?,
                Action::Push => self.run_push().await?,
                Action::PushToRegistry => self.run_push_to_registry().await?,
            }
        }

        tracing::info!("All it's done.");
        Ok(())
    }

    /// build アクション: コンテキストを詰めてイメージをビルドする
    async fn run_build(&self) -> Result<(), PipelineError> {
        schema::validate_section(self.doc, &schema::BUILD)?;
        let section: DockerSection = slipway_config::section(self.doc, "Docker")?;

        ImageBuilder::new(self.daemon).build(&section).await?;
        Ok(())
    }

    /// push アクション: 設定されたタグのままレジストリへプッシュする
    ///
    /// 認証情報は渡しません。認証が必要なレジストリへは push_to_registry を
    /// 使います。
    async fn run_push(&self) -> Result<(), PipelineError> {
        schema::validate_section(self.doc, &schema::PUSH)?;
        let image = slipway_config::image_tag(self.doc)?;
        let (repository, tag) = split_image_tag(&image);

        ImagePublisher::new(self.daemon)
            .push(&repository, &tag, None)
            .await?;
        Ok(())
    }

    /// push_to_registry アクション: ECR に認証してタグ付けとプッシュを行う
    async fn run_push_to_registry(&self) -> Result<(), PipelineError> {
        schema::validate_section(self.doc, &schema::REGISTRY)?;
        let ecr: EcrSection = slipway_config::section(self.doc, "Ecr")?;
        let local_image = slipway_config::image_tag(self.doc)?;

        let credentials = CloudCredentials {
            access_key_id: ecr.access_key_id.clone(),
            secret_access_key: ecr.secret_access_key.clone(),
            region: ecr.region.clone(),
        };

        let authenticator = RegistryAuthenticator::new(self.registry);
        let account_id = authenticator.resolve_account_id(&credentials).await?;
        let token = authenticator.authenticate(&credentials, &account_id).await?;

        let registry_credentials = RegistryCredentials {
            username: token.username.clone(),
            password: token.password.clone(),
            serveraddress: token.endpoint.clone(),
        };

        let publisher = ImagePublisher::new(self.daemon);
        if !publisher.login(&registry_credentials, true).await? {
            return Err(PipelineError::LoginRejected);
        }

        let remote_repository = registry_image(&account_id, &ecr.region, &ecr.repo_name);
        let (_, tag) = split_image_tag(&local_image);

        publisher.tag(&local_image, &remote_repository, &tag).await?;
        publisher
            .push(&remote_repository, &tag, Some(registry_credentials))
            .await?;
        Ok(())
    }
}
