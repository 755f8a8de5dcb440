use std::path::Path;

use config::{Config, FileFormat, FileSourceFile};
use enum_display::EnumDisplay;
use secrecy::{ExposeSecret as _, SecretString};

use use_cases::settings::{ProfileCacheSettings, SignInSettings};

/// 設定ファイルディレクトリ・パス
pub const SETTINGS_DIR_NAME: &str = "settings";

/// 動作環境を表現する環境変数とそのデフォルト値
pub const ENV_APP_ENVIRONMENT: &str = "APP_ENVIRONMENT";
pub const ENV_APP_ENVIRONMENT_DEFAULT: &str = "development";

/// 設定の項目に読み込む、接頭辞`APP`を持たない環境変数
///
/// 既存のデプロイ環境で使用している環境変数の名前をそのまま受け付ける。
pub const ENV_ALIASES: [(&str, &str); 11] = [
    ("NEYNAR_API_KEY", "neynar.api_key"),
    ("NEXT_PUBLIC_NEYNAR_CLIENT_ID", "neynar.client_id"),
    ("NEXT_PUBLIC_APP_URL", "application.url"),
    ("NEXT_PUBLIC_CHAIN_ID", "application.chain_id"),
    ("NEXT_PUBLIC_RAFFLE_CORE_ADDRESS", "application.raffle_core_address"),
    ("NEXT_PUBLIC_RAFFLE_FACTORY_ADDRESS", "application.raffle_factory_address"),
    ("NEXT_PUBLIC_BASE_BUILDER_ADDRESS", "application.base_builder_address"),
    ("NEXT_PUBLIC_ALCHEMY_API_KEY", "application.alchemy_api_key"),
    ("NEXT_PUBLIC_CDP_API_KEY", "application.cdp_api_key"),
    (
        "NEXT_PUBLIC_WALLETCONNECT_PROJECT_ID",
        "application.walletconnect_project_id",
    ),
    ("BASESCAN_API_KEY", "application.basescan_api_key"),
];

/// アプリの動作環境
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumDisplay)]
#[enum_display(case = "Lower")]
pub enum AppEnvironment {
    /// 開発環境
    Development,
    /// 運用環境
    Production,
}

impl From<String> for AppEnvironment {
    /// アプリの動作環境を表現する文字列から、アプリの動作環境を判定する。
    ///
    /// アプリの動作環境を表現する文字列が`development`の場合は開発環境、
    /// `production`の場合は運用環境と判定する。
    ///
    /// 上記以外の場合、開発環境と判定する。
    /// なお、大文字と小文字は無視する。
    ///
    /// # 引数
    ///
    /// * `value` - アプリの動作環境を表現する文字列
    ///
    /// # 戻り値
    ///
    /// アプリの動作環境
    fn from(value: String) -> Self {
        match value.to_lowercase().as_str() {
            "production" => Self::Production,
            _ => Self::Development,
        }
    }
}

impl AppEnvironment {
    pub fn is_development(&self) -> bool {
        *self == Self::Development
    }
}

/// アプリケーション設定
#[derive(Debug, Clone, serde::Deserialize)]
pub struct AppSettings {
    /// HTTPサーバー設定
    pub http_server: HttpServerSettings,
    /// ロギング設定
    pub logging: LoggingSettings,
    /// アプリケーション設定
    pub application: ApplicationSettings,
    /// Neynar設定
    pub neynar: NeynarSettings,
    /// Farcasterサインイン設定
    pub sign_in: SignInSettings,
    /// プロフィール・キャッシュ設定
    #[serde(default)]
    pub profile_cache: ProfileCacheSettings,
}

/// HTTPサーバー設定
#[derive(Debug, Clone, serde::Deserialize)]
pub struct HttpServerSettings {
    /// リスニングポート番号
    pub port: u16,
}

/// ロギング設定
#[derive(Debug, Clone, serde::Deserialize)]
pub struct LoggingSettings {
    /// ログレベル
    pub level: log::Level,
}

/// アプリケーション設定
///
/// ブラウザに公開する値と、ウォレットやチェーンに接続するための値を含む。
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ApplicationSettings {
    /// アプリケーションを公開するURL
    pub url: String,
    /// チェーンID
    pub chain_id: u64,
    /// ラッフル・コントラクトのアドレス
    pub raffle_core_address: String,
    /// ラッフル・ファクトリー・コントラクトのアドレス
    pub raffle_factory_address: Option<String>,
    /// Base Builderの所有者アドレス
    pub base_builder_address: Option<String>,
    /// Alchemy APIキー
    pub alchemy_api_key: Option<SecretString>,
    /// Coinbase Developer Platform APIキー
    pub cdp_api_key: Option<SecretString>,
    /// WalletConnectプロジェクトID
    pub walletconnect_project_id: Option<String>,
    /// Basescan APIキー
    pub basescan_api_key: Option<SecretString>,
}

/// Neynar設定
#[derive(Debug, Clone, serde::Deserialize)]
pub struct NeynarSettings {
    /// APIキー
    pub api_key: Option<SecretString>,
    /// クライアントID
    pub client_id: Option<String>,
    /// APIのベースURL
    pub base_url: String,
    /// リクエスト・タイムアウト秒
    pub timeout_seconds: u64,
}

impl NeynarSettings {
    /// 空でないAPIキーを返す。
    pub fn api_key(&self) -> Option<&SecretString> {
        self.api_key
            .as_ref()
            .filter(|key| !key.expose_secret().trim().is_empty())
    }

    /// Farcaster機能が有効であるか確認する。
    ///
    /// APIキーとクライアントIDの両方が設定されている場合に有効である。
    pub fn is_farcaster_enabled(&self) -> bool {
        self.api_key().is_some() && !is_blank(self.client_id.as_deref())
    }
}

/// 値が設定されていないか、空白のみであるか確認する。
pub(crate) fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

/// アプリケーション設定を取得する。
///
/// # 引数
///
/// * `app_env` - アプリケーションの動作環境
/// * `settings_dir` - アプリケーション設定ファイルを格納しているディレクトリのパス
///
/// # 戻り値
///
/// アプリケーション設定
pub fn retrieve_app_settings<P: AsRef<Path>>(
    app_env: AppEnvironment,
    settings_dir: P,
) -> anyhow::Result<AppSettings> {
    // デフォルト及び動作環境別設定ファイルのパスを生成
    let settings_dir = settings_dir.as_ref();
    let default_settings_file = config_file_source(settings_dir, "default.yml");
    let env_settings_file = config_file_source(settings_dir, &format!("{app_env}.yml"));

    // アプリケーション設定のビルダーを構築
    let mut builder = Config::builder()
        // デフォルトの設定ファイルをロード
        .add_source(default_settings_file)
        // 環境別の設定ファイルをロード
        .add_source(env_settings_file)
        // 環境変数に記録された設定をロード
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        );
    // 接頭辞を持たない環境変数で上書き
    for (var, key) in ENV_ALIASES {
        let value = std::env::var(var).ok().filter(|v| !v.trim().is_empty());
        builder = builder.set_override_option(key, value)?;
    }

    // アプリケーション設定を読み込み
    let settings = builder.build()?.try_deserialize::<AppSettings>()?;
    settings.profile_cache.validate()?;

    Ok(settings)
}

/// `Config`がロードする設定ファイルのパスを構築する。
///
/// # 引数
///
/// * `settings_dir` - 設定ファイルディレクトリ・パス
/// * `file_name` - 設定ファイルの名前
///
/// # 戻り値
///
/// 設定ファイルのパス
fn config_file_source(
    settings_dir: &Path,
    file_name: &str,
) -> config::File<FileSourceFile, FileFormat> {
    config::File::from(settings_dir.join(file_name))
}
