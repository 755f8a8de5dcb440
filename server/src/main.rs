use std::net::TcpListener;
use std::sync::Arc;

use anyhow::Context as _;

use configurations::env::validate_app_settings;
use configurations::settings::{
    retrieve_app_settings, AppEnvironment, ENV_APP_ENVIRONMENT, ENV_APP_ENVIRONMENT_DEFAULT,
    SETTINGS_DIR_NAME,
};
use domain::repositories::farcaster::FarcasterUserRepository;
use infra::neynar::NeynarClient;
use infra::{ManifestSettings, RequestContext};
use server::startup::build_http_server;
use server::telemetry::{generate_log_subscriber, init_log_subscriber, LOG_SUBSCRIBER_NAME};
use use_cases::error_handlers::ErrorHandlers;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 環境変数を設定
    dotenvx::dotenv().ok();

    // 環境変数からアプリケーションの動作環境を取得
    let app_env: AppEnvironment = std::env::var(ENV_APP_ENVIRONMENT)
        .unwrap_or_else(|_| String::from(ENV_APP_ENVIRONMENT_DEFAULT))
        .into();
    // アプリケーション設定を取得
    let app_settings = retrieve_app_settings(app_env, SETTINGS_DIR_NAME)?;

    // サブスクライバを初期化
    let subscriber = generate_log_subscriber(
        LOG_SUBSCRIBER_NAME.into(),
        app_settings.logging.level,
        std::io::stdout,
    );
    init_log_subscriber(subscriber)?;

    // 環境変数を検証
    let validation = validate_app_settings(&app_settings);
    validation.log_warnings(app_env);
    validation.ensure_valid()?;

    // Neynar APIキーが設定されている場合のみ、Farcaster機能を有効にする
    let farcaster_repository = NeynarClient::from_settings(&app_settings.neynar)
        .context("failed to build neynar client")?
        .map(|client| Arc::new(client) as Arc<dyn FarcasterUserRepository>);
    if farcaster_repository.is_none() {
        tracing::warn!("farcaster features are disabled because NEYNAR_API_KEY is not set");
    }

    // リクエスト・コンテキストを構築
    let context = RequestContext::new(
        ErrorHandlers::new(app_env.is_development()),
        ManifestSettings::from(&app_settings.application),
        farcaster_repository,
    );

    // HTTPサーバーを起動
    let address = format!("0.0.0.0:{}", app_settings.http_server.port);
    let listener =
        TcpListener::bind(&address).with_context(|| format!("failed to bind {address}"))?;
    tracing::info!(app_env = %app_env, address = %address, "starting http server");
    build_http_server(listener, context)?.await?;

    Ok(())
}
