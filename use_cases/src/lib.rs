use std::borrow::Cow;

use domain::DomainError;

pub mod error_handlers;
pub mod farcaster;
pub mod farcaster_auth;
pub mod profile_cache;
pub mod raffles;
pub mod settings;

pub type UseCaseResult<T> = Result<T, UseCaseError>;

/// ユース・ケース・エラー分類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UseCaseErrorKind {
    /// 予期していないエラー
    ///
    /// アプリケーション・エラー・コードは常に0とする。
    Unexpected,

    /// 検証エラー
    ///
    /// アプリケーション・エラー・コードは常に1とする。
    Validation,

    /// ドメイン・ルール・エラー
    ///
    /// アプリケーションエラーコードは常に2とする。
    DomainRule,

    /// リポジトリ・エラー
    ///
    /// アプリケーションエラーコードは常に3とする。
    Repository,

    /// 見つからない
    ///
    /// アプリケーションエラーコードは常に4とする。
    NotFound,

    /// 認証エラー
    ///
    /// アプリケーションエラーコードは常に5とする。
    Unauthorized,

    /// 機能が設定されていない
    ///
    /// アプリケーションエラーコードは常に6とする。
    Unavailable,
}

impl std::fmt::Display for UseCaseErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match *self {
            UseCaseErrorKind::Unexpected => "unexpected",
            UseCaseErrorKind::Validation => "validation",
            UseCaseErrorKind::DomainRule => "domain_rule",
            UseCaseErrorKind::Repository => "repository",
            UseCaseErrorKind::NotFound => "not_found",
            UseCaseErrorKind::Unauthorized => "unauthorized",
            UseCaseErrorKind::Unavailable => "unavailable",
        };
        write!(f, "{}", s)
    }
}

/// ユース・ケース・エラー
///
/// 一般的なエラーの場合は、`unexpected`、`validation`など、それぞれのユース・ケース・エラー分類
/// 別のメソッドを呼び出して、ユース・ケース・エラーを構築する。
///
/// `error`はレスポンスの`error`フィールド、`message`は補足の`message`フィールドに対応する。
#[derive(Debug, Clone, thiserror::Error)]
#[error("{error}")]
pub struct UseCaseError {
    /// ユース・ケース・エラー分類
    pub kind: UseCaseErrorKind,
    /// アプリケーション・エラー・コード
    pub error_code: u32,
    /// エラー
    pub error: Cow<'static, str>,
    /// 補足メッセージ
    pub message: Option<Cow<'static, str>>,
}

impl UseCaseError {
    /// ユース・ケース・エラーを構築する。
    ///
    /// # 引数
    ///
    /// * `kind` - ユース・ケース・エラー分類
    /// * `error` - エラー
    ///
    /// # 戻り値
    ///
    /// ユース・ケース・エラー
    pub fn new(kind: UseCaseErrorKind, error: impl Into<Cow<'static, str>>) -> Self {
        let error_code = match kind {
            UseCaseErrorKind::Unexpected => 0,
            UseCaseErrorKind::Validation => 1,
            UseCaseErrorKind::DomainRule => 2,
            UseCaseErrorKind::Repository => 3,
            UseCaseErrorKind::NotFound => 4,
            UseCaseErrorKind::Unauthorized => 5,
            UseCaseErrorKind::Unavailable => 6,
        };
        Self {
            kind,
            error_code,
            error: error.into(),
            message: None,
        }
    }

    /// 補足メッセージを設定する。
    pub fn with_message(mut self, message: impl Into<Cow<'static, str>>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn unexpected(error: impl Into<Cow<'static, str>>) -> Self {
        Self::new(UseCaseErrorKind::Unexpected, error)
    }

    pub fn validation(error: impl Into<Cow<'static, str>>) -> Self {
        Self::new(UseCaseErrorKind::Validation, error)
    }

    pub fn domain_rule(error: impl Into<Cow<'static, str>>) -> Self {
        Self::new(UseCaseErrorKind::DomainRule, error)
    }

    pub fn repository(error: impl Into<Cow<'static, str>>) -> Self {
        Self::new(UseCaseErrorKind::Repository, error)
    }

    pub fn not_found(error: impl Into<Cow<'static, str>>) -> Self {
        Self::new(UseCaseErrorKind::NotFound, error)
    }

    pub fn unauthorized(error: impl Into<Cow<'static, str>>) -> Self {
        Self::new(UseCaseErrorKind::Unauthorized, error)
    }

    pub fn unavailable(error: impl Into<Cow<'static, str>>) -> Self {
        Self::new(UseCaseErrorKind::Unavailable, error)
    }
}

impl From<DomainError> for UseCaseError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(message) => Self::validation(message),
            DomainError::DomainRule(message) => Self::domain_rule(message),
            DomainError::Repository(raw) => Self::repository(raw.to_string()),
            DomainError::Unexpected(e) => Self::unexpected(e.to_string()),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_helpers {
    use domain::models::farcaster::NeynarUser;
    use domain::models::primitives::{Fid, WalletAddress};

    pub const ADDRESS: &str = "0x1234567890123456789012345678901234567890";
    pub const OTHER_ADDRESS: &str = "0xabcdefabcdefabcdefabcdefabcdefabcdefabcd";

    pub fn wallet_address(value: &str) -> WalletAddress {
        WalletAddress::new(value).unwrap()
    }

    /// テスト用のFarcasterユーザーを返す。
    pub fn neynar_user(verified: &[&str]) -> NeynarUser {
        NeynarUser {
            fid: Fid::new(12345).unwrap(),
            username: String::from("testuser"),
            display_name: String::from("Test User"),
            pfp_url: String::from("https://example.com/avatar.png"),
            bio: String::from("Test bio"),
            follower_count: 100,
            following_count: 50,
            verified_addresses: verified.iter().map(|a| wallet_address(a)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use domain::models::errors::RawError;

    use super::*;

    /// ユース・ケース・エラー分類毎にアプリケーション・エラー・コードが決まることを確認
    #[test]
    fn error_code_is_determined_by_kind() {
        assert_eq!(0, UseCaseError::unexpected("x").error_code);
        assert_eq!(1, UseCaseError::validation("x").error_code);
        assert_eq!(4, UseCaseError::not_found("x").error_code);
        assert_eq!(6, UseCaseError::unavailable("x").error_code);
    }

    /// ドメイン・エラーをユース・ケース・エラーに変換できることを確認
    #[test]
    fn convert_domain_error_into_use_case_error() {
        let error: UseCaseError = DomainError::Validation("invalid".into()).into();
        assert_eq!(UseCaseErrorKind::Validation, error.kind);
        assert_eq!("invalid", error.error);

        let error: UseCaseError = DomainError::Repository(RawError::thrown("boom")).into();
        assert_eq!(UseCaseErrorKind::Repository, error.kind);
        assert_eq!("boom", error.error);
    }
}
