//! 環境変数の検証
//!
//! 必須の設定が不足している場合は起動を中止して、任意の設定が不足している場合は
//! 開発環境でのみ警告する。

use secrecy::ExposeSecret as _;

use crate::settings::{is_blank, AppEnvironment, AppSettings};

/// サポートしているチェーンID（Base、Base Sepolia）
pub const SUPPORTED_CHAIN_IDS: [u64; 2] = [8453, 84532];

/// 環境変数の検証結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvValidation {
    /// 設定されていない必須の環境変数
    pub missing: Vec<&'static str>,
    /// 設定されていない任意の環境変数
    pub warnings: Vec<&'static str>,
}

impl EnvValidation {
    pub fn is_valid(&self) -> bool {
        self.missing.is_empty()
    }

    /// 必須の環境変数が設定されていない場合にエラーを返す。
    pub fn ensure_valid(&self) -> anyhow::Result<()> {
        if !self.is_valid() {
            anyhow::bail!(
                "missing required environment variables: {}; copy .env.example to .env and fill in the values",
                self.missing.join(", ")
            );
        }

        Ok(())
    }

    /// 設定されていない任意の環境変数を、開発環境でのみ警告する。
    pub fn log_warnings(&self, app_env: AppEnvironment) {
        if self.warnings.is_empty() || !app_env.is_development() {
            return;
        }
        for key in &self.warnings {
            tracing::warn!(
                key = *key,
                feature = optional_feature(key),
                "optional environment variable is not set"
            );
        }
    }
}

/// アプリケーション設定を検証する。
///
/// # 引数
///
/// * `settings` - アプリケーション設定
///
/// # 戻り値
///
/// 環境変数の検証結果
pub fn validate_app_settings(settings: &AppSettings) -> EnvValidation {
    let app = &settings.application;
    let mut validation = EnvValidation::default();

    let required = [
        (
            "NEXT_PUBLIC_ALCHEMY_API_KEY",
            is_blank(app.alchemy_api_key.as_ref().map(|k| k.expose_secret().as_str())),
        ),
        (
            "NEXT_PUBLIC_CDP_API_KEY",
            is_blank(app.cdp_api_key.as_ref().map(|k| k.expose_secret().as_str())),
        ),
        (
            "NEXT_PUBLIC_WALLETCONNECT_PROJECT_ID",
            is_blank(app.walletconnect_project_id.as_deref()),
        ),
        (
            "NEXT_PUBLIC_RAFFLE_CORE_ADDRESS",
            is_blank(Some(app.raffle_core_address.as_str())),
        ),
        ("NEXT_PUBLIC_APP_URL", is_blank(Some(app.url.as_str()))),
        ("NEXT_PUBLIC_CHAIN_ID", app.chain_id == 0),
    ];
    validation.missing = required
        .into_iter()
        .filter_map(|(key, missing)| missing.then_some(key))
        .collect();

    let optional = [
        ("NEYNAR_API_KEY", settings.neynar.api_key().is_none()),
        (
            "NEXT_PUBLIC_NEYNAR_CLIENT_ID",
            is_blank(settings.neynar.client_id.as_deref()),
        ),
        (
            "BASESCAN_API_KEY",
            is_blank(app.basescan_api_key.as_ref().map(|k| k.expose_secret().as_str())),
        ),
        (
            "NEXT_PUBLIC_RAFFLE_FACTORY_ADDRESS",
            is_blank(app.raffle_factory_address.as_deref()),
        ),
    ];
    validation.warnings = optional
        .into_iter()
        .filter_map(|(key, missing)| missing.then_some(key))
        .collect();

    if app.chain_id != 0 && !SUPPORTED_CHAIN_IDS.contains(&app.chain_id) {
        tracing::warn!(
            "chain id {} is not Base mainnet (8453) or Base Sepolia (84532)",
            app.chain_id
        );
    }

    validation
}

fn optional_feature(key: &str) -> &'static str {
    match key {
        "NEYNAR_API_KEY" | "NEXT_PUBLIC_NEYNAR_CLIENT_ID" => {
            "Farcaster integration (sign in, user profiles)"
        }
        "BASESCAN_API_KEY" => "contract verification on Basescan",
        "NEXT_PUBLIC_RAFFLE_FACTORY_ADDRESS" => "raffle factory features",
        _ => "optional feature",
    }
}
