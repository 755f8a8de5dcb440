//! 外部HTTP呼び出しの失敗を、分類前のエラーに変換する。

use domain::models::errors::{ErrorCode, ErrorDetail, RawError};

/// `reqwest`のエラーを分類前のエラーに変換する。
///
/// タイムアウトと接続の失敗には、ネットワーク・エラーを示すエラー・コードを付ける。
pub(crate) fn raw_error_from_reqwest(error: &reqwest::Error) -> RawError {
    let mut detail = ErrorDetail::with_message(error.to_string());
    if error.is_timeout() {
        detail = detail.code(ErrorCode::Text(String::from("ETIMEDOUT")));
    } else if error.is_connect() {
        detail = detail.code(ErrorCode::Text(String::from("ECONNREFUSED")));
    }
    if let Some(status) = error.status() {
        detail = detail.status(status.as_u16());
    }

    RawError::Thrown(detail)
}

/// エラー・レスポンスのボディからメッセージを取り出す。
///
/// `message`、`error`の順に探して、見つからない場合は`None`を返す。
pub(crate) fn message_from_body(body: &serde_json::Value) -> Option<String> {
    ["message", "error"]
        .iter()
        .filter_map(|key| body.get(key).and_then(|v| v.as_str()))
        .find(|m| !m.is_empty())
        .map(String::from)
}
