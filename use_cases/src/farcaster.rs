use domain::models::errors::ErrorKind;
use domain::models::farcaster::NeynarUser;
use domain::models::primitives::{Fid, WalletAddress};
use domain::models::sign_in::SignInRequest;
use domain::repositories::farcaster::FarcasterUserRepository;
use domain::{DomainError, DomainResult};

use crate::error_handlers::{log_error, ErrorHandlers};
use crate::{UseCaseError, UseCaseResult};

/// Farcaster機能が設定されていないときのエラー
pub const FARCASTER_NOT_CONFIGURED: &str = "Farcaster features are not configured";

/// Farcaster機能が設定されていない理由
pub const NEYNAR_API_KEY_NOT_SET: &str = "NEYNAR_API_KEY is not set";

/// Farcasterユーザー・リポジトリが構築されていることを確認する。
///
/// Neynar APIキーが設定されていない場合、リポジトリは構築されない。
///
/// # 引数
///
/// * `repository` - Farcasterユーザー・リポジトリ
///
/// # 戻り値
///
/// Farcasterユーザー・リポジトリ
pub fn require_repository(
    repository: Option<&dyn FarcasterUserRepository>,
) -> UseCaseResult<&dyn FarcasterUserRepository> {
    repository.ok_or_else(|| {
        UseCaseError::unavailable(FARCASTER_NOT_CONFIGURED).with_message(NEYNAR_API_KEY_NOT_SET)
    })
}

/// Farcaster IDでFarcasterユーザーを取得する。
///
/// # 引数
///
/// * `fid` - Farcaster ID
/// * `repository` - Farcasterユーザー・リポジトリ
/// * `handlers` - エラー・ハンドラ
/// * `context` - ログに記録する呼び出し元
///
/// # 戻り値
///
/// Farcasterユーザー、見つからない場合は`None`
#[tracing::instrument(name = "get farcaster user by fid use case", skip(repository, handlers))]
pub async fn get_user_by_fid(
    fid: Fid,
    repository: &dyn FarcasterUserRepository,
    handlers: ErrorHandlers,
    context: &str,
) -> UseCaseResult<Option<NeynarUser>> {
    let result = repository.user_by_fid(fid).await;

    not_found_as_none(result, handlers, context)
}

/// ウォレット・アドレスでFarcasterユーザーを取得する。
///
/// # 引数
///
/// * `address` - ウォレット・アドレス
/// * `repository` - Farcasterユーザー・リポジトリ
/// * `handlers` - エラー・ハンドラ
/// * `context` - ログに記録する呼び出し元
///
/// # 戻り値
///
/// Farcasterユーザー、見つからない場合は`None`
#[tracing::instrument(
    name = "get farcaster user by address use case",
    skip(address, repository, handlers),
    fields(address = %address)
)]
pub async fn get_user_by_address(
    address: &WalletAddress,
    repository: &dyn FarcasterUserRepository,
    handlers: ErrorHandlers,
    context: &str,
) -> UseCaseResult<Option<NeynarUser>> {
    let result = repository.user_by_address(address).await;

    not_found_as_none(result, handlers, context)
}

/// サインインを検証して、Farcasterユーザーを返す。
///
/// 署名したウォレット・アドレスが、Farcasterアカウントの検証済みアドレスに含まれているかのみを
/// 確認する。署名そのものは暗号学的に検証していない。
///
/// # 引数
///
/// * `request` - サインイン検証リクエスト
/// * `repository` - Farcasterユーザー・リポジトリ
/// * `handlers` - エラー・ハンドラ
///
/// # 戻り値
///
/// Farcasterユーザー
#[tracing::instrument(
    name = "verify farcaster sign in use case",
    skip(request, repository, handlers),
    fields(address = %request.address)
)]
pub async fn verify_sign_in(
    request: &SignInRequest,
    repository: &dyn FarcasterUserRepository,
    handlers: ErrorHandlers,
) -> UseCaseResult<NeynarUser> {
    if request.message.trim().is_empty() || request.signature.trim().is_empty() {
        return Err(UseCaseError::validation(MISSING_SIGN_IN_FIELDS));
    }

    let user = get_user_by_address(
        &request.address,
        repository,
        handlers,
        "FarcasterAuthAPI:POST",
    )
    .await?
    .ok_or_else(|| {
        UseCaseError::unauthorized("No Farcaster account found for this address")
            .with_message("This wallet address is not linked to a Farcaster account")
    })?;

    if !user.has_verified_address(&request.address) {
        return Err(UseCaseError::unauthorized("Address not verified")
            .with_message("This address is not verified on the Farcaster account"));
    }

    Ok(user)
}

/// サインイン検証リクエストの必須項目が不足しているときのエラー
pub const MISSING_SIGN_IN_FIELDS: &str =
    "Missing required fields: message, signature, and address are required";

/// 見つからないことを示すエラーを`None`に変換する。
///
/// それ以外のエラーは分類してログに記録し、ユーザーに表示するメッセージを持つエラーに変換する。
fn not_found_as_none(
    result: DomainResult<Option<NeynarUser>>,
    handlers: ErrorHandlers,
    context: &str,
) -> UseCaseResult<Option<NeynarUser>> {
    match result {
        Ok(user) => Ok(user),
        Err(DomainError::Repository(raw)) => {
            let classified = handlers.classify_social_api_error(&raw);
            if classified.kind == ErrorKind::NotFound {
                return Ok(None);
            }
            log_error(context, &classified);
            Err(UseCaseError::repository(classified.message))
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use domain::models::errors::RawError;

    use super::*;
    use crate::test_helpers::{neynar_user, wallet_address, ADDRESS, OTHER_ADDRESS};
    use crate::UseCaseErrorKind;

    /// 指定した結果を返すFarcasterユーザー・リポジトリ
    struct FakeRepository {
        result: Mutex<Option<DomainResult<Option<NeynarUser>>>>,
    }

    impl FakeRepository {
        fn returning(result: DomainResult<Option<NeynarUser>>) -> Self {
            Self {
                result: Mutex::new(Some(result)),
            }
        }

        fn take(&self) -> DomainResult<Option<NeynarUser>> {
            self.result.lock().unwrap().take().unwrap_or(Ok(None))
        }
    }

    #[async_trait]
    impl FarcasterUserRepository for FakeRepository {
        async fn user_by_fid(&self, _fid: Fid) -> DomainResult<Option<NeynarUser>> {
            self.take()
        }

        async fn user_by_address(
            &self,
            _address: &WalletAddress,
        ) -> DomainResult<Option<NeynarUser>> {
            self.take()
        }
    }

    fn handlers() -> ErrorHandlers {
        ErrorHandlers::new(false)
    }

    fn sign_in_request(address: &str) -> SignInRequest {
        SignInRequest {
            message: String::from("message"),
            signature: String::from("0xsignature"),
            address: wallet_address(address),
        }
    }

    /// リポジトリが構築されていない場合は、利用できないエラーを返すことを確認
    #[test]
    fn require_repository_without_repository() {
        let error = require_repository(None).err().unwrap();
        assert_eq!(UseCaseErrorKind::Unavailable, error.kind);
        assert_eq!(FARCASTER_NOT_CONFIGURED, error.error);
        assert_eq!(Some(NEYNAR_API_KEY_NOT_SET.into()), error.message);
    }

    /// 見つからないエラーを`None`として扱うことを確認
    #[tokio::test]
    async fn not_found_error_becomes_none() -> anyhow::Result<()> {
        let repository = FakeRepository::returning(Err(DomainError::Repository(
            RawError::thrown("User not found"),
        )));
        let fid = Fid::new(1)?;
        let user = get_user_by_fid(fid, &repository, handlers(), "test").await?;
        assert!(user.is_none());

        Ok(())
    }

    /// 見つからない以外のエラーは、分類したメッセージを持つエラーに変換することを確認
    #[tokio::test]
    async fn other_errors_are_classified() -> anyhow::Result<()> {
        let repository = FakeRepository::returning(Err(DomainError::Repository(
            RawError::thrown("Rate limit exceeded"),
        )));
        let error = get_user_by_address(&wallet_address(ADDRESS), &repository, handlers(), "test")
            .await
            .err()
            .unwrap();
        assert_eq!(UseCaseErrorKind::Repository, error.kind);
        assert_eq!(
            "Too many requests. Please try again in a few moments",
            error.error
        );

        Ok(())
    }

    /// 検証済みのアドレスで署名した場合に、サインインを検証できることを確認
    #[tokio::test]
    async fn verify_sign_in_with_verified_address() -> anyhow::Result<()> {
        let repository = FakeRepository::returning(Ok(Some(neynar_user(&[ADDRESS]))));
        let user = verify_sign_in(&sign_in_request(ADDRESS), &repository, handlers()).await?;
        assert_eq!("testuser", user.username);

        Ok(())
    }

    /// Farcasterアカウントがない場合に、認証エラーを返すことを確認
    #[tokio::test]
    async fn verify_sign_in_without_account() {
        let repository = FakeRepository::returning(Ok(None));
        let error = verify_sign_in(&sign_in_request(ADDRESS), &repository, handlers())
            .await
            .err()
            .unwrap();
        assert_eq!(UseCaseErrorKind::Unauthorized, error.kind);
        assert_eq!("No Farcaster account found for this address", error.error);
    }

    /// 検証済みでないアドレスで署名した場合に、認証エラーを返すことを確認
    #[tokio::test]
    async fn verify_sign_in_with_unverified_address() {
        let repository = FakeRepository::returning(Ok(Some(neynar_user(&[OTHER_ADDRESS]))));
        let error = verify_sign_in(&sign_in_request(ADDRESS), &repository, handlers())
            .await
            .err()
            .unwrap();
        assert_eq!(UseCaseErrorKind::Unauthorized, error.kind);
        assert_eq!("Address not verified", error.error);
    }

    /// メッセージまたは署名が空の場合に、検証エラーを返すことを確認
    #[tokio::test]
    async fn verify_sign_in_with_missing_fields() {
        let repository = FakeRepository::returning(Ok(Some(neynar_user(&[ADDRESS]))));
        let mut request = sign_in_request(ADDRESS);
        request.signature = String::from("  ");
        let error = verify_sign_in(&request, &repository, handlers())
            .await
            .err()
            .unwrap();
        assert_eq!(UseCaseErrorKind::Validation, error.kind);
        assert_eq!(MISSING_SIGN_IN_FIELDS, error.error);
    }
}
