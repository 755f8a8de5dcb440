use async_trait::async_trait;

use crate::models::errors::RawError;
use crate::models::farcaster::NeynarUser;
use crate::models::sign_in::SignInRequest;

/// メッセージ署名者
///
/// 接続しているウォレットにメッセージの署名を要求する。
#[async_trait]
pub trait MessageSigner: Send + Sync {
    /// メッセージに署名する。
    ///
    /// # 引数
    ///
    /// * `message` - 署名するメッセージ
    ///
    /// # 戻り値
    ///
    /// 署名
    async fn sign_message(&self, message: &str) -> Result<String, RawError>;
}

/// サインイン検証者
#[async_trait]
pub trait SignInVerifier: Send + Sync {
    /// 署名したメッセージを検証して、Farcasterユーザーを取得する。
    ///
    /// # 引数
    ///
    /// * `request` - サインイン検証リクエスト
    ///
    /// # 戻り値
    ///
    /// Farcasterユーザー
    async fn verify(&self, request: &SignInRequest) -> Result<NeynarUser, RawError>;
}
