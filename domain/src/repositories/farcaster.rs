use async_trait::async_trait;

use crate::models::farcaster::{NeynarUser, UserLookup};
use crate::models::primitives::{Fid, WalletAddress};
use crate::DomainResult;

/// Farcasterユーザー・リポジトリ
///
/// サーバー側でNeynar APIからFarcasterユーザーを取得する。
#[async_trait]
pub trait FarcasterUserRepository: Send + Sync {
    /// Farcaster IDでFarcasterユーザーを取得する。
    ///
    /// # 引数
    ///
    /// * `fid` - Farcaster ID
    ///
    /// # 戻り値
    ///
    /// Farcasterユーザー、見つからない場合は`None`
    async fn user_by_fid(&self, fid: Fid) -> DomainResult<Option<NeynarUser>>;

    /// ウォレット・アドレスでFarcasterユーザーを取得する。
    ///
    /// # 引数
    ///
    /// * `address` - ウォレット・アドレス
    ///
    /// # 戻り値
    ///
    /// Farcasterユーザー、見つからない場合は`None`
    async fn user_by_address(&self, address: &WalletAddress) -> DomainResult<Option<NeynarUser>>;
}

/// Farcasterユーザー・ソース
///
/// クライアント側でアプリケーションのAPIからFarcasterユーザーを取得する。
#[async_trait]
pub trait FarcasterUserSource: Send + Sync {
    /// Farcasterユーザーを取得する。
    ///
    /// # 引数
    ///
    /// * `lookup` - 検索条件
    ///
    /// # 戻り値
    ///
    /// Farcasterユーザー、見つからない場合は`None`
    async fn fetch_user(&self, lookup: &UserLookup) -> DomainResult<Option<NeynarUser>>;
}
