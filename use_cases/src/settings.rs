use std::time::Duration;

use crate::{UseCaseError, UseCaseResult};

/// Farcasterサインイン設定
#[derive(Debug, Clone, serde::Deserialize)]
pub struct SignInSettings {
    /// 署名を要求するドメイン
    pub domain: String,
    /// 署名を要求するURI
    pub uri: String,
    /// ステートメント
    pub statement: String,
    /// チェーンID
    pub chain_id: u64,
}

/// プロフィール・キャッシュ設定
#[derive(Debug, Clone, Copy, serde::Deserialize)]
pub struct ProfileCacheSettings {
    /// 取得したプロフィールを新鮮とみなす期間（秒）
    pub stale_seconds: u64,
    /// 使用されていないプロフィールをキャッシュから削除するまでの期間（秒）
    pub gc_seconds: u64,
    /// 取得に失敗したときの再試行回数
    pub retry_count: u32,
    /// 再試行するまでの待機時間（ミリ秒）
    pub retry_delay_millis: u64,
}

impl Default for ProfileCacheSettings {
    fn default() -> Self {
        Self {
            stale_seconds: 5 * 60,
            gc_seconds: 10 * 60,
            retry_count: 1,
            retry_delay_millis: 1000,
        }
    }
}

impl ProfileCacheSettings {
    /// プロフィール・キャッシュ設定を検証する。
    pub fn validate(&self) -> UseCaseResult<()> {
        if self.gc_seconds < self.stale_seconds {
            tracing::error!("{} ({}:{})", INVALID_CACHE_DURATIONS, file!(), line!());
            return Err(UseCaseError::unexpected(INVALID_CACHE_DURATIONS));
        }

        Ok(())
    }

    pub fn stale_time(&self) -> Duration {
        Duration::from_secs(self.stale_seconds)
    }

    pub fn gc_time(&self) -> Duration {
        Duration::from_secs(self.gc_seconds)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_millis)
    }
}

const INVALID_CACHE_DURATIONS: &str =
    "キャッシュから削除するまでの期間は、新鮮とみなす期間以上でなければなりません。";

#[cfg(test)]
pub mod tests {
    use super::*;

    /// デフォルトのプロフィール・キャッシュ設定が適切であることを確認
    #[test]
    fn default_profile_cache_settings_is_valid() {
        let settings = ProfileCacheSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(Duration::from_secs(300), settings.stale_time());
        assert_eq!(Duration::from_secs(600), settings.gc_time());
        assert_eq!(Duration::from_secs(1), settings.retry_delay());
    }

    /// プロフィール・キャッシュ設定が適切でないことを検証できるか確認
    #[test]
    fn profile_cache_settings_is_invalid() {
        let settings = ProfileCacheSettings {
            stale_seconds: 600,
            gc_seconds: 300,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }
}
