//! エラー分類と通知
//!
//! 外部依存から受け取ったエラーを分類して、ユーザーに表示するメッセージ、ログに記録するか、
//! 再試行できるかを決定する。
//!
//! 分類は次の2段階で判定する。
//!
//! 1. ライブラリが提供する構造化されたエラー・コードやHTTPステータス・コード
//! 2. 構造化されていないエラーのためのメッセージの部分一致
//!
//! どちらの段階も、分類ごとに決められた優先順位で判定して、最初に一致した分類を採用する。
//! 分類器は全域関数で、一致する分類がない場合は`UnknownError`または`ApiError`を返す。

use domain::models::errors::{ErrorCode, ErrorKind, ErrorResult, RawError, Severity};

/// ウォレットがユーザーの拒否を示すエラー・コード（EIP-1193）
const USER_REJECTED_CODE: i64 = 4001;

/// ウォレットの未認可、切断を示すエラー・コード（EIP-1193）
const WALLET_CODES: [i64; 3] = [4100, 4900, 4901];

/// JSON-RPCでコントラクトの実行が巻き戻されたことを示すエラー・コード
const EXECUTION_REVERTED_CODE: i64 = 3;

const USER_REJECTED_PHRASES: [&str; 3] = ["user rejected", "user denied", "user cancelled"];
const INSUFFICIENT_FUNDS_PHRASES: [&str; 3] =
    ["insufficient funds", "insufficient balance", "exceeds balance"];
const NETWORK_PHRASES: [&str; 4] = ["network", "connection", "timeout", "fetch failed"];
const CONTRACT_PHRASES: [&str; 3] = ["execution reverted", "contract", "revert"];
const WALLET_PHRASES: [&str; 3] = ["wallet", "connector", "not connected"];

const CONFIGURATION_PHRASES: [&str; 3] = ["api key", "unauthorized", "authentication"];
const RATE_LIMIT_PHRASES: [&str; 3] = ["rate limit", "too many requests", "429"];
const NOT_FOUND_PHRASES: [&str; 3] = ["not found", "404", "no user"];
const SIGNATURE_PHRASES: [&str; 3] = ["signature", "verification", "invalid"];
const SIGNATURE_REJECTED_PHRASES: [&str; 2] = ["user rejected", "cancelled"];

/// 通知者
///
/// ユーザーにトースト通知を表示する。
pub trait Notifier: Send + Sync {
    /// 通知する。
    ///
    /// # 引数
    ///
    /// * `message` - ユーザーに表示するメッセージ
    /// * `severity` - 重要度
    fn notify(&self, message: &str, severity: Severity);
}

impl<F> Notifier for F
where
    F: Fn(&str, Severity) + Send + Sync,
{
    fn notify(&self, message: &str, severity: Severity) {
        self(message, severity)
    }
}

/// エラー・ハンドラ
///
/// 開発環境では、想定内の失敗もログに記録する。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorHandlers {
    /// 開発環境で動作しているか
    development: bool,
}

impl ErrorHandlers {
    /// エラー・ハンドラを構築する。
    ///
    /// # 引数
    ///
    /// * `development` - 開発環境で動作しているか
    ///
    /// # 戻り値
    ///
    /// エラー・ハンドラ
    pub fn new(development: bool) -> Self {
        Self { development }
    }

    /// トランザクションとウォレットのエラーを分類する。
    ///
    /// 判定の優先順位は、ユーザーの拒否、残高不足、ネットワーク、コントラクト、ウォレットの順である。
    ///
    /// # 引数
    ///
    /// * `error` - 分類前のエラー
    ///
    /// # 戻り値
    ///
    /// エラーの分類結果
    pub fn classify_transaction_error(&self, error: &RawError) -> ErrorResult {
        if error.detail().is_some() {
            let message = error.lowercase_message();

            if has_code(error, &[USER_REJECTED_CODE])
                || has_text_code(error, "ACTION_REJECTED")
                || contains_any(&message, &USER_REJECTED_PHRASES)
            {
                return result(
                    ErrorKind::UserRejected,
                    "Transaction was cancelled",
                    false,
                    true,
                    error,
                );
            }

            if has_text_code(error, "INSUFFICIENT_FUNDS")
                || contains_any(&message, &INSUFFICIENT_FUNDS_PHRASES)
            {
                return result(
                    ErrorKind::InsufficientFunds,
                    "Insufficient funds to complete transaction",
                    self.development,
                    false,
                    error,
                );
            }

            if has_text_code(error, "NETWORK_ERROR")
                || has_text_code(error, "TIMEOUT")
                || contains_any(&message, &NETWORK_PHRASES)
            {
                return result(
                    ErrorKind::NetworkError,
                    "Network error. Please check your connection and try again",
                    self.development,
                    true,
                    error,
                );
            }

            if has_code(error, &[EXECUTION_REVERTED_CODE])
                || has_text_code(error, "CALL_EXCEPTION")
                || contains_any(&message, &CONTRACT_PHRASES)
            {
                return result(
                    ErrorKind::ContractError,
                    "Transaction failed. Please check the transaction details and try again",
                    true,
                    false,
                    error,
                );
            }

            if has_code(error, &WALLET_CODES) || contains_any(&message, &WALLET_PHRASES) {
                return result(
                    ErrorKind::WalletError,
                    "Wallet connection error. Please reconnect your wallet",
                    self.development,
                    true,
                    error,
                );
            }

            // 送出されたエラーのみ、より緩い条件でネットワーク・エラーと判定する
            if error.is_thrown() && message.contains("fetch") {
                return result(
                    ErrorKind::NetworkError,
                    "Network error. Please try again",
                    self.development,
                    true,
                    error,
                );
            }
        }

        result(
            ErrorKind::UnknownError,
            "An unexpected error occurred. Please try again",
            true,
            true,
            error,
        )
    }

    /// Farcaster（Neynar API）のエラーを分類する。
    ///
    /// 判定の優先順位は、設定、レート制限、見つからない、ネットワーク、署名、ユーザーの拒否の順
    /// である。見つからない場合は想定内の状態のため、ログに記録しない。
    ///
    /// # 引数
    ///
    /// * `error` - 分類前のエラー
    ///
    /// # 戻り値
    ///
    /// エラーの分類結果
    pub fn classify_social_api_error(&self, error: &RawError) -> ErrorResult {
        if !error.is_thrown() {
            return result(
                ErrorKind::UnknownError,
                "An unexpected error occurred with Farcaster. Please try again",
                true,
                true,
                error,
            );
        }
        let message = error.lowercase_message();

        if has_status(error, &[401, 403]) || contains_any(&message, &CONFIGURATION_PHRASES) {
            return result(
                ErrorKind::ConfigurationError,
                "Farcaster features are not configured. Please contact support",
                true,
                false,
                error,
            );
        }

        if has_status(error, &[429]) || contains_any(&message, &RATE_LIMIT_PHRASES) {
            return result(
                ErrorKind::RateLimit,
                "Too many requests. Please try again in a few moments",
                self.development,
                true,
                error,
            );
        }

        if has_status(error, &[404]) || contains_any(&message, &NOT_FOUND_PHRASES) {
            return result(
                ErrorKind::NotFound,
                "Farcaster profile not found for this address",
                false,
                false,
                error,
            );
        }

        if has_text_code(error, "ETIMEDOUT")
            || has_text_code(error, "ECONNREFUSED")
            || has_text_code(error, "ECONNRESET")
            || contains_any(&message, &NETWORK_PHRASES)
        {
            return result(
                ErrorKind::NetworkError,
                "Network error. Please check your connection and try again",
                self.development,
                true,
                error,
            );
        }

        if contains_any(&message, &SIGNATURE_PHRASES) {
            return result(
                ErrorKind::AuthenticationError,
                "Authentication failed. Please try signing in again",
                self.development,
                true,
                error,
            );
        }

        if has_code(error, &[USER_REJECTED_CODE])
            || contains_any(&message, &SIGNATURE_REJECTED_PHRASES)
        {
            return result(
                ErrorKind::UserRejected,
                "Signature request was cancelled",
                false,
                true,
                error,
            );
        }

        // APIのメッセージをそのまま伝える
        let message = match error.message() {
            Some(m) if !m.is_empty() => m.to_string(),
            _ => String::from("Failed to connect to Farcaster. Please try again"),
        };
        ErrorResult {
            kind: ErrorKind::ApiError,
            message,
            should_log: self.development,
            should_retry: true,
            original: error.clone(),
        }
    }
}

/// エラー分類に対応する通知の重要度を返す。
///
/// # 引数
///
/// * `kind` - エラー分類
///
/// # 戻り値
///
/// 通知の重要度
pub fn severity_of(kind: ErrorKind) -> Severity {
    match kind {
        ErrorKind::UserRejected => Severity::Info,
        ErrorKind::RateLimit | ErrorKind::ConfigurationError => Severity::Warning,
        _ => Severity::Error,
    }
}

/// 記録するべきエラーをログに記録する。
///
/// # 引数
///
/// * `context` - エラーが発生した場所
/// * `result` - エラーの分類結果
pub fn log_error(context: &str, result: &ErrorResult) {
    if result.should_log {
        tracing::error!(
            context = context,
            kind = %result.kind,
            user_message = %result.message,
            error = %result.original,
            "[{}] error was handled",
            context
        );
    }
}

/// エラーを分類して、ログに記録し、ユーザーに通知する。
///
/// 通知は呼び出し毎に1回だけ行い、分類結果を変更せずに返す。
///
/// # 引数
///
/// * `error` - 分類前のエラー
/// * `classifier` - エラー分類器
/// * `context` - エラーが発生した場所
/// * `notifier` - 通知者
///
/// # 戻り値
///
/// エラーの分類結果
pub fn dispatch<C>(
    error: &RawError,
    classifier: C,
    context: &str,
    notifier: &dyn Notifier,
) -> ErrorResult
where
    C: FnOnce(&RawError) -> ErrorResult,
{
    let result = classifier(error);
    log_error(context, &result);
    notifier.notify(&result.message, severity_of(result.kind));

    result
}

fn result(
    kind: ErrorKind,
    message: &str,
    should_log: bool,
    should_retry: bool,
    error: &RawError,
) -> ErrorResult {
    ErrorResult {
        kind,
        message: message.to_string(),
        should_log,
        should_retry,
        original: error.clone(),
    }
}

fn contains_any(message: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|phrase| message.contains(phrase))
}

fn has_code(error: &RawError, codes: &[i64]) -> bool {
    error
        .code()
        .map(|code| codes.iter().any(|expected| code.is(*expected)))
        .unwrap_or(false)
}

fn has_text_code(error: &RawError, expected: &str) -> bool {
    matches!(
        error.code(),
        Some(ErrorCode::Text(code)) if code.eq_ignore_ascii_case(expected)
    )
}

fn has_status(error: &RawError, statuses: &[u16]) -> bool {
    error
        .status()
        .map(|status| statuses.contains(&status))
        .unwrap_or(false)
}
