pub mod api_client;
mod http;
pub mod neynar;
pub mod routes;

use std::sync::Arc;

use configurations::settings::ApplicationSettings;
use domain::repositories::farcaster::FarcasterUserRepository;
use use_cases::error_handlers::ErrorHandlers;

/// アプリケーションのURLが設定されていない場合に使用するURL
const DEFAULT_APP_URL: &str = "https://your-app.vercel.app";

/// リクエスト・コンテキスト
#[derive(Clone)]
pub struct RequestContext {
    /// エラー・ハンドラ
    pub error_handlers: ErrorHandlers,
    /// ミニ・アプリ・マニフェスト設定
    pub manifest: ManifestSettings,
    /// Farcasterユーザー・リポジトリ
    ///
    /// Neynar APIキーが設定されていない場合は`None`
    farcaster_repository: Option<Arc<dyn FarcasterUserRepository>>,
}

impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("error_handlers", &self.error_handlers)
            .field("manifest", &self.manifest)
            .field(
                "farcaster_repository",
                &self.farcaster_repository.as_ref().map(|_| "configured"),
            )
            .finish()
    }
}

impl RequestContext {
    /// リクエスト・コンテキストを構築する。
    ///
    /// # 引数
    ///
    /// * `error_handlers` - エラー・ハンドラ
    /// * `manifest` - ミニ・アプリ・マニフェスト設定
    /// * `farcaster_repository` - Farcasterユーザー・リポジトリ
    ///
    /// # 戻り値
    ///
    /// リクエスト・コンテキスト
    pub fn new(
        error_handlers: ErrorHandlers,
        manifest: ManifestSettings,
        farcaster_repository: Option<Arc<dyn FarcasterUserRepository>>,
    ) -> Self {
        Self {
            error_handlers,
            manifest,
            farcaster_repository,
        }
    }

    /// Farcasterユーザー・リポジトリを返す。
    ///
    /// # 戻り値
    ///
    /// Farcasterユーザー・リポジトリ、Farcaster機能が構成されていない場合は`None`
    pub fn farcaster_repository(&self) -> Option<&dyn FarcasterUserRepository> {
        self.farcaster_repository.as_deref()
    }
}

/// ミニ・アプリ・マニフェスト設定
#[derive(Debug, Clone, Default)]
pub struct ManifestSettings {
    /// アプリケーションを公開するURL
    pub app_url: String,
    /// Base Builderの所有者アドレス
    pub base_builder_address: Option<String>,
}

impl ManifestSettings {
    /// アプリケーションのURLを返す。
    ///
    /// 末尾のスラッシュを取り除き、設定されていない場合は既定のURLを返す。
    pub fn app_url(&self) -> &str {
        match self.app_url.trim_end_matches('/') {
            "" => DEFAULT_APP_URL,
            url => url,
        }
    }
}

impl From<&ApplicationSettings> for ManifestSettings {
    fn from(value: &ApplicationSettings) -> Self {
        Self {
            app_url: value.url.clone(),
            base_builder_address: value.base_builder_address.clone(),
        }
    }
}
