use crate::models::primitives::{Fid, WalletAddress};

/// Farcasterユーザー
///
/// Neynar APIから取得したFarcasterのプロフィールを、アプリケーションで必要な項目に絞って
/// 表現する。外部が管理する読み取り専用のデータである。
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NeynarUser {
    /// Farcaster ID
    pub fid: Fid,
    /// ユーザー名
    pub username: String,
    /// 表示名
    pub display_name: String,
    /// プロフィール画像のURL
    pub pfp_url: String,
    /// 自己紹介
    pub bio: String,
    /// フォロワー数
    pub follower_count: u64,
    /// フォロー数
    pub following_count: u64,
    /// 検証済みのウォレット・アドレス
    pub verified_addresses: Vec<WalletAddress>,
}

impl NeynarUser {
    /// ウォレット・アドレスが検証済みであるか確認する。
    ///
    /// # 引数
    ///
    /// * `address` - ウォレット・アドレス
    ///
    /// # 戻り値
    ///
    /// 検証済みの場合は`true`
    pub fn has_verified_address(&self, address: &WalletAddress) -> bool {
        self.verified_addresses.iter().any(|a| a == address)
    }
}

/// Farcasterユーザーの検索条件
///
/// Farcaster IDとウォレット・アドレスの両方が指定された場合は、Farcaster IDを優先する。
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct UserLookup {
    /// ウォレット・アドレス
    pub address: Option<WalletAddress>,
    /// Farcaster ID
    pub fid: Option<Fid>,
}

impl UserLookup {
    pub fn by_address(address: WalletAddress) -> Self {
        Self {
            address: Some(address),
            fid: None,
        }
    }

    pub fn by_fid(fid: Fid) -> Self {
        Self {
            address: None,
            fid: Some(fid),
        }
    }

    /// 検索条件が指定されていないか確認する。
    pub fn is_empty(&self) -> bool {
        self.address.is_none() && self.fid.is_none()
    }
}
