//! Farcasterサインイン
//!
//! ウォレットでサインイン・メッセージに署名して、署名をサーバーで検証し、Farcasterアカウントと
//! ウォレットを紐付ける。

use std::sync::Arc;

use rand::distributions::Alphanumeric;
use rand::Rng;
use tokio::sync::watch;

use domain::models::errors::{ErrorResult, RawError, Severity};
use domain::models::farcaster::NeynarUser;
use domain::models::primitives::WalletAddress;
use domain::models::sign_in::{AuthState, SignInMessage, SignInRequest};
use domain::now_utc;
use domain::repositories::wallet::{MessageSigner, SignInVerifier};

use crate::error_handlers::{dispatch, ErrorHandlers, Notifier};
use crate::settings::SignInSettings;

/// ノンスの文字数
const NONCE_LENGTH: usize = 16;

/// ウォレットが接続されていないときの通知
pub const CONNECT_WALLET_FIRST: &str = "Please connect your wallet first";

/// サインインのエラーを記録するときの呼び出し元
const CONTEXT: &str = "FarcasterAuth";

type SuccessCallback = Box<dyn Fn(&NeynarUser) + Send + Sync>;
type ErrorCallback = Box<dyn Fn(&ErrorResult) + Send + Sync>;

/// キャンセル・トークン
///
/// クローンしたトークンは同じ状態を共有する。一度キャンセルしたトークンは元に戻らない。
#[derive(Debug, Clone)]
pub struct CancellationToken {
    sender: Arc<watch::Sender<bool>>,
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationToken {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// キャンセルする。
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }

    /// キャンセルされるまで待機する。
    pub async fn cancelled(&self) {
        let mut receiver = self.sender.subscribe();
        loop {
            if *receiver.borrow_and_update() {
                return;
            }
            if receiver.changed().await.is_err() {
                // 送信者は`self`が保持しているため、ここには到達しない
                std::future::pending::<()>().await;
            }
        }
    }
}

/// Farcasterサインイン
///
/// サインインの途中で`start`のフューチャーを破棄した場合は待機中に戻る。
pub struct FarcasterSignIn<S, V> {
    signer: S,
    verifier: V,
    settings: SignInSettings,
    handlers: ErrorHandlers,
    state: AuthState,
    on_success: Option<SuccessCallback>,
    on_error: Option<ErrorCallback>,
}

impl<S, V> FarcasterSignIn<S, V>
where
    S: MessageSigner,
    V: SignInVerifier,
{
    /// Farcasterサインインを構築する。
    ///
    /// # 引数
    ///
    /// * `signer` - メッセージ署名者
    /// * `verifier` - サインイン検証者
    /// * `settings` - サインイン設定
    /// * `handlers` - エラー・ハンドラ
    ///
    /// # 戻り値
    ///
    /// Farcasterサインイン
    pub fn new(signer: S, verifier: V, settings: SignInSettings, handlers: ErrorHandlers) -> Self {
        Self {
            signer,
            verifier,
            settings,
            handlers,
            state: AuthState::Idle,
            on_success: None,
            on_error: None,
        }
    }

    /// サインインに成功したときに呼び出す関数を登録する。
    pub fn on_success(mut self, callback: impl Fn(&NeynarUser) + Send + Sync + 'static) -> Self {
        self.on_success = Some(Box::new(callback));
        self
    }

    /// サインインに失敗したときに呼び出す関数を登録する。
    pub fn on_error(mut self, callback: impl Fn(&ErrorResult) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Box::new(callback));
        self
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    /// 待機中に戻す。
    pub fn reset(&mut self) {
        self.state = AuthState::Idle;
    }

    /// サインインする。
    ///
    /// # 引数
    ///
    /// * `address` - 接続しているウォレット・アドレス
    /// * `notifier` - 通知者
    /// * `cancel` - キャンセル・トークン
    ///
    /// # 戻り値
    ///
    /// サインイン後の状態
    pub async fn start(
        &mut self,
        address: Option<&WalletAddress>,
        notifier: &dyn Notifier,
        cancel: &CancellationToken,
    ) -> &AuthState {
        let Some(address) = address else {
            notifier.notify(CONNECT_WALLET_FIRST, Severity::Warning);
            return &self.state;
        };

        let Self {
            signer,
            verifier,
            settings,
            handlers,
            state,
            on_success,
            on_error,
        } = &mut *self;
        let mut guard = InFlight::new(state);
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = authenticate(&*signer, &*verifier, settings, address) => Some(result),
        };

        match outcome {
            None => {
                tracing::info!(address = %address, "sign in was cancelled");
                *guard.state = AuthState::Idle;
            }
            Some(Ok(user)) => {
                notifier.notify(
                    &format!("Successfully linked Farcaster account @{}", user.username),
                    Severity::Success,
                );
                if let Some(callback) = on_success.as_ref() {
                    callback(&user);
                }
                *guard.state = AuthState::Authenticated(user);
            }
            Some(Err(error)) => {
                let handlers = *handlers;
                let result = dispatch(
                    &error,
                    |e| handlers.classify_social_api_error(e),
                    CONTEXT,
                    notifier,
                );
                if let Some(callback) = on_error.as_ref() {
                    callback(&result);
                }
                *guard.state = AuthState::Failed(result.message);
            }
        }
        drop(guard);

        &self.state
    }

    /// サインイン・メッセージを生成する。
    ///
    /// # 引数
    ///
    /// * `address` - 署名するウォレット・アドレス
    ///
    /// # 戻り値
    ///
    /// サインイン・メッセージ
    pub fn build_message(&self, address: &WalletAddress) -> SignInMessage {
        sign_in_message(&self.settings, address)
    }
}

/// 認証中の状態
///
/// サインインの完了前に破棄された場合は待機中に戻す。
struct InFlight<'a> {
    state: &'a mut AuthState,
}

impl<'a> InFlight<'a> {
    fn new(state: &'a mut AuthState) -> Self {
        *state = AuthState::Authenticating;
        Self { state }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.state.is_authenticating() {
            tracing::info!("sign in was abandoned");
            *self.state = AuthState::Idle;
        }
    }
}

fn sign_in_message(settings: &SignInSettings, address: &WalletAddress) -> SignInMessage {
    let nonce: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(NONCE_LENGTH)
        .map(char::from)
        .collect();

    SignInMessage {
        domain: settings.domain.clone(),
        uri: settings.uri.clone(),
        address: address.clone(),
        statement: settings.statement.clone(),
        chain_id: settings.chain_id,
        nonce,
        issued_at: now_utc(),
    }
}

async fn authenticate<S, V>(
    signer: &S,
    verifier: &V,
    settings: &SignInSettings,
    address: &WalletAddress,
) -> Result<NeynarUser, RawError>
where
    S: MessageSigner,
    V: SignInVerifier,
{
    let message = sign_in_message(settings, address)
        .to_message_text()
        .map_err(|e| RawError::thrown(e.to_string()))?;
    let signature = signer.sign_message(&message).await?;
    let request = SignInRequest {
        message,
        signature,
        address: address.clone(),
    };

    verifier.verify(&request).await
}
