//! Farcasterプロフィール・キャッシュ
//!
//! 取得したプロフィールは、新鮮とみなす期間はキャッシュから返す。使用されないまま
//! 削除するまでの期間を経過したプロフィールは、次にキャッシュを参照したときに削除する。

use std::collections::HashMap;

use tokio::sync::RwLock;
use tokio::time::Instant;

use domain::models::farcaster::{NeynarUser, UserLookup};
use domain::repositories::farcaster::FarcasterUserSource;
use domain::DomainResult;

use crate::settings::ProfileCacheSettings;

#[derive(Debug, Clone)]
struct CacheEntry {
    user: Option<NeynarUser>,
    fetched_at: Instant,
    last_used: Instant,
}

/// Farcasterプロフィール・キャッシュ
///
/// 見つからなかったこともキャッシュする。
pub struct ProfileCache<S> {
    source: S,
    settings: ProfileCacheSettings,
    entries: RwLock<HashMap<UserLookup, CacheEntry>>,
}

impl<S> ProfileCache<S>
where
    S: FarcasterUserSource,
{
    /// プロフィール・キャッシュを構築する。
    ///
    /// # 引数
    ///
    /// * `source` - Farcasterユーザー取得元
    /// * `settings` - プロフィール・キャッシュ設定
    ///
    /// # 戻り値
    ///
    /// プロフィール・キャッシュ
    pub fn new(source: S, settings: ProfileCacheSettings) -> Self {
        Self {
            source,
            settings,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// プロフィールを取得する。
    ///
    /// 検索条件が指定されていない場合は、取得せずに`None`を返す。
    /// 取得に失敗した場合は、設定された回数だけ待機してから再試行する。
    ///
    /// # 引数
    ///
    /// * `lookup` - 検索条件
    ///
    /// # 戻り値
    ///
    /// Farcasterユーザー、見つからない場合は`None`
    #[tracing::instrument(name = "fetch cached profile", skip(self))]
    pub async fn fetch(&self, lookup: &UserLookup) -> DomainResult<Option<NeynarUser>> {
        if lookup.is_empty() {
            return Ok(None);
        }
        self.collect_garbage().await;
        if let Some(user) = self.fresh(lookup).await {
            return Ok(user);
        }

        let user = self.fetch_with_retry(lookup).await?;
        self.store(lookup, user.clone()).await;

        Ok(user)
    }

    /// プロフィールを事前に取得する。
    ///
    /// 新鮮なプロフィールがキャッシュにある場合は何もしない。取得に失敗しても無視する。
    pub async fn prefetch(&self, lookup: &UserLookup) {
        if lookup.is_empty() {
            return;
        }
        self.collect_garbage().await;
        if self.fresh(lookup).await.is_some() {
            return;
        }
        match self.source.fetch_user(lookup).await {
            Ok(user) => self.store(lookup, user).await,
            Err(e) => tracing::debug!("failed to prefetch profile: {}", e),
        }
    }

    /// キャッシュしたプロフィールを破棄して、次に参照したときに取得し直す。
    pub async fn invalidate(&self, lookup: &UserLookup) {
        self.entries.write().await.remove(lookup);
    }

    /// キャッシュしているプロフィールの数を返す。
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    async fn fresh(&self, lookup: &UserLookup) -> Option<Option<NeynarUser>> {
        let mut entries = self.entries.write().await;
        let entry = entries.get_mut(lookup)?;
        let now = Instant::now();
        if now.duration_since(entry.fetched_at) >= self.settings.stale_time() {
            return None;
        }
        entry.last_used = now;

        Some(entry.user.clone())
    }

    async fn fetch_with_retry(&self, lookup: &UserLookup) -> DomainResult<Option<NeynarUser>> {
        let mut remaining = self.settings.retry_count;
        loop {
            match self.source.fetch_user(lookup).await {
                Ok(user) => return Ok(user),
                Err(e) if remaining > 0 => {
                    tracing::warn!("failed to fetch profile, retrying: {}", e);
                    remaining -= 1;
                    tokio::time::sleep(self.settings.retry_delay()).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn store(&self, lookup: &UserLookup, user: Option<NeynarUser>) {
        let now = Instant::now();
        self.entries.write().await.insert(
            lookup.clone(),
            CacheEntry {
                user,
                fetched_at: now,
                last_used: now,
            },
        );
    }

    async fn collect_garbage(&self) {
        let gc_time = self.settings.gc_time();
        let now = Instant::now();
        self.entries
            .write()
            .await
            .retain(|_, entry| now.duration_since(entry.last_used) < gc_time);
    }
}
