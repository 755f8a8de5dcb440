use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Context as _;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;

use domain::models::errors::RawError;
use domain::models::farcaster::NeynarUser;
use domain::models::primitives::{Fid, WalletAddress};
use domain::repositories::farcaster::FarcasterUserRepository;
use domain::{DomainError, DomainResult};
use infra::{ManifestSettings, RequestContext};
use server::startup::build_http_server;
use server::telemetry::{generate_log_subscriber, init_log_subscriber};
use use_cases::error_handlers::ErrorHandlers;

/// Farcasterアカウントで検証済みのウォレット・アドレス
pub const VERIFIED_ADDRESS: &str = "0xd7029BDEa1c17493893AAfE29AAD69EF892B8ff2";

/// Farcasterアカウントに紐付いているが、検証されていないウォレット・アドレス
pub const UNVERIFIED_ADDRESS: &str = "0x1234567890123456789012345678901234567890";

/// どのFarcasterアカウントにも紐付いていないウォレット・アドレス
pub const UNKNOWN_ADDRESS: &str = "0xabcdefabcdefabcdefabcdefabcdefabcdefabcd";

/// ログ・サブスクライバ
static TRACING: Lazy<()> = Lazy::new(|| {
    let default_level = log::Level::Info;
    let subscriber_name = String::from("test");

    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = generate_log_subscriber(subscriber_name, default_level, std::io::stdout);
        init_log_subscriber(subscriber).expect("failed to initialize log subscriber");
    } else {
        let subscriber = generate_log_subscriber(subscriber_name, default_level, std::io::sink);
        init_log_subscriber(subscriber).expect("failed to initialize log subscriber");
    }
});

/// 統合テスト用アプリ
pub struct TestApp {
    /// アプリのルートURI
    pub root_uri: String,
}

/// 統合テスト用のHTTPサーバーを起動する。
///
/// Farcasterユーザー・リポジトリを指定しない場合は、Farcaster機能が構成されていない
/// サーバーを起動する。
///
/// # 引数
///
/// * `repository` - Farcasterユーザー・リポジトリ
///
/// # 戻り値
///
/// 統合テスト用アプリ
pub async fn spawn_test_app(
    repository: Option<Arc<dyn FarcasterUserRepository>>,
) -> anyhow::Result<TestApp> {
    Lazy::force(&TRACING);

    let listener = TcpListener::bind("localhost:0").context("failed to bind random port")?;
    let port = listener.local_addr()?.port();
    let manifest = ManifestSettings {
        app_url: String::from("https://raffles.example"),
        base_builder_address: None,
    };
    let context = RequestContext::new(ErrorHandlers::new(true), manifest, repository);
    let server = build_http_server(listener, context)?;
    tokio::spawn(server);

    Ok(TestApp {
        root_uri: format!("http://localhost:{}", port),
    })
}

/// 既定のユーザーを登録したFarcasterユーザー・リポジトリを持つHTTPサーバーを起動する。
pub async fn spawn_farcaster_app() -> anyhow::Result<(TestApp, Arc<FakeFarcasterRepository>)> {
    let repository = Arc::new(FakeFarcasterRepository::with_default_user());
    let shared: Arc<dyn FarcasterUserRepository> = repository.clone();
    let app = spawn_test_app(Some(shared)).await?;

    Ok((app, repository))
}

/// 常に失敗するFarcasterユーザー・リポジトリを持つHTTPサーバーを起動する。
pub async fn spawn_failing_app(error: RawError) -> anyhow::Result<TestApp> {
    let repository: Arc<dyn FarcasterUserRepository> =
        Arc::new(FakeFarcasterRepository::failing(error));

    spawn_test_app(Some(repository)).await
}

/// テスト用のFarcasterユーザーを構築する。
pub fn farcaster_user(fid: u64, username: &str, verified: &[&str]) -> NeynarUser {
    NeynarUser {
        fid: Fid::new(fid).unwrap(),
        username: username.to_string(),
        display_name: format!("{} display", username),
        pfp_url: format!("https://example.com/{}.png", username),
        bio: String::from("gm"),
        follower_count: 100,
        following_count: 10,
        verified_addresses: verified
            .iter()
            .map(|a| WalletAddress::new(*a).unwrap())
            .collect(),
    }
}

/// テスト用のFarcasterユーザー・リポジトリ
///
/// Neynar APIの代わりに、登録したユーザーを返す。
#[derive(Debug, Default)]
pub struct FakeFarcasterRepository {
    users: Vec<NeynarUser>,
    /// ウォレット・アドレスに紐付いているが、検証されていないユーザー
    custody: Vec<(String, NeynarUser)>,
    failure: Option<RawError>,
    calls: AtomicUsize,
}

impl FakeFarcasterRepository {
    /// Farcaster ID 3の`dwr`と、未検証のアドレスを持つ`alice`を登録したリポジトリを構築する。
    pub fn with_default_user() -> Self {
        let alice = farcaster_user(42, "alice", &[]);
        Self {
            users: vec![farcaster_user(3, "dwr", &[VERIFIED_ADDRESS])],
            custody: vec![(UNVERIFIED_ADDRESS.to_lowercase(), alice)],
            ..Default::default()
        }
    }

    /// 常に失敗するリポジトリを構築する。
    pub fn failing(error: RawError) -> Self {
        Self {
            failure: Some(error),
            ..Default::default()
        }
    }

    /// リポジトリが呼び出された回数を返す。
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn begin(&self) -> DomainResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.failure {
            Some(error) => Err(DomainError::Repository(error.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl FarcasterUserRepository for FakeFarcasterRepository {
    async fn user_by_fid(&self, fid: Fid) -> DomainResult<Option<NeynarUser>> {
        self.begin()?;
        Ok(self.users.iter().find(|u| u.fid == fid).cloned())
    }

    async fn user_by_address(&self, address: &WalletAddress) -> DomainResult<Option<NeynarUser>> {
        self.begin()?;
        let verified = self
            .users
            .iter()
            .find(|u| u.has_verified_address(address))
            .cloned();
        let custody = self
            .custody
            .iter()
            .find(|(a, _)| *a == address.to_lowercase())
            .map(|(_, u)| u.clone());

        Ok(verified.or(custody))
    }
}

/// レスポンスを分割した結果
pub struct ResponseParts {
    pub status_code: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

/// レスポンスをステータス・コード、ヘッダ及びボディに分割する。
pub async fn split_response(response: reqwest::Response) -> anyhow::Result<ResponseParts> {
    let status_code = response.status();
    let headers = response.headers().clone();
    let body = response.text().await?;

    Ok(ResponseParts {
        status_code,
        headers,
        body,
    })
}

/// レスポンスのContent-TypeがJSONであることを確認する。
pub fn assert_json_content_type(response: &ResponseParts) {
    let content_type = response
        .headers
        .get(reqwest::header::CONTENT_TYPE)
        .expect("content type is not set");
    assert_eq!(mime::APPLICATION_JSON.as_ref(), content_type.to_str().unwrap());
}
