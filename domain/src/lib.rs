pub mod models;
pub mod repositories;

use std::borrow::Cow;

use time::OffsetDateTime;

/// ドメイン・エラー
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    /// 予期していないエラー
    #[error("{0}")]
    Unexpected(anyhow::Error),

    /// 検証エラー
    ///
    /// 文字列を数値に変換できない場合など、ドメイン・ルールを伴わない検証エラーを表現する。
    #[error("{0}")]
    Validation(Cow<'static, str>),

    /// ドメイン・ルールエラー
    ///
    /// ドメイン・ルールに違反したことを表現する。
    #[error("{0}")]
    DomainRule(Cow<'static, str>),

    /// リポジトリ・エラー
    ///
    /// 外部APIやコントラクトなど、リポジトリで発生したエラーを表現する。
    /// 分類器に渡せるように、元のエラーを保持する。
    #[error("{0}")]
    Repository(models::errors::RawError),
}

/// ドメイン層の結果型
pub type DomainResult<T> = Result<T, DomainError>;

/// 現在の日時を協定世界時で返す。
///
/// # 戻り値
///
/// 協定世界時の現在日時
pub fn now_utc() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

#[cfg(test)]
mod tests {
    use time::{Duration, UtcOffset};

    use super::now_utc;

    const DATE_TIME_DIFF_ALLOWABLE_SECONDS: i64 = 60;

    /// 現在の日時を協定世界時で返すことを確認
    #[test]
    fn retrieve_current_date_time_at_utc() {
        let expected = time::OffsetDateTime::now_utc();
        let actual = now_utc();

        assert_eq!(UtcOffset::UTC, actual.offset());
        assert!(actual - expected < Duration::seconds(DATE_TIME_DIFF_ALLOWABLE_SECONDS));
    }
}
