pub mod auth;
pub mod farcaster;
pub mod manifest;

use std::{borrow::Cow, str::FromStr as _};

use actix_web::dev::ServiceResponse;
use actix_web::http::header::{self, HeaderMap};
use actix_web::http::StatusCode;
use actix_web::middleware::ErrorHandlerResponse;
use actix_web::{HttpResponse, Responder, ResponseError};
use mime::Mime;

use domain::DomainError;
use use_cases::{UseCaseError, UseCaseErrorKind};

/// リクエスト処理結果
pub type ProcessRequestResult<T> = Result<T, ProcessRequestError>;

/// 処理中に予期しないエラーが発生したときのエラー
pub const INTERNAL_SERVER_ERROR: &str = "Internal server error";

/// リクエスト処理エラー
///
/// * ドメイン層で発生したエラーは、`DomainError` -> `ProcessRequestError`に変換する。
/// * ユースケース層で発生したエラーは、次のように変換する。
///   * ユースケースでエラーが発生した場合、`UseCaseError` -> `ProcessRequestError`
///   * ユースケースがドメイン層のエラーを取得した場合、`DomainError` -> `UseCaseError` -> `ProcessRequestError`
#[derive(Debug, Clone, thiserror::Error)]
pub struct ProcessRequestError {
    /// HTTPステータスコード
    pub status_code: StatusCode,
    /// レスポンスボディ
    pub body: ErrorResponseBody,
}

/// リクエスト処理エラーを、`actix-web`のエラーレスポンスとして扱えるように`ResponseError`を実装する。
impl ResponseError for ProcessRequestError {
    fn status_code(&self) -> StatusCode {
        self.status_code
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(&self.body)
    }
}

impl std::fmt::Display for ProcessRequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status_code.canonical_reason() {
            Some(reason) => {
                write!(
                    f,
                    "status_code={}, reason={}, {}",
                    self.status_code, reason, self.body
                )
            }
            None => {
                write!(f, "status_code={}, {}", self.status_code, self.body)
            }
        }
    }
}

impl ProcessRequestError {
    pub fn new(status_code: StatusCode, error: impl Into<Cow<'static, str>>) -> Self {
        Self {
            status_code,
            body: ErrorResponseBody::new(error, None::<String>),
        }
    }

    /// 補足メッセージを設定する。
    pub fn with_message(mut self, message: impl Into<Cow<'static, str>>) -> Self {
        self.body.message = Some(message.into());
        self
    }

    /// サーバー内部のエラーを、補足メッセージに元のエラーを持つエラーに置き換える。
    ///
    /// サーバー内部のエラーでない場合は、そのまま返す。
    pub fn masked(self) -> Self {
        if self.status_code != StatusCode::INTERNAL_SERVER_ERROR {
            return self;
        }
        Self::new(self.status_code, INTERNAL_SERVER_ERROR).with_message(self.body.error)
    }
}

/// エラーレスポンス・ボディ
///
/// アプリケーションから返されるエラーレスポンスのボディを表現する。
///
/// ```json
/// {"error": "Address not verified", "message": "This address is not verified on the Farcaster account"}
/// ```
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ErrorResponseBody {
    /// エラー
    pub error: Cow<'static, str>,

    /// 補足メッセージ
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<Cow<'static, str>>,
}

impl std::fmt::Display for ErrorResponseBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.message {
            Some(message) => {
                write!(f, r#"error="{}", message="{}""#, self.error, message)
            }
            None => {
                write!(f, r#"error="{}""#, self.error)
            }
        }
    }
}

impl ErrorResponseBody {
    pub fn new<E, M>(error: E, message: Option<M>) -> Self
    where
        E: Into<Cow<'static, str>>,
        M: Into<Cow<'static, str>>,
    {
        Self {
            error: error.into(),
            message: message.map(Into::into),
        }
    }
}

impl From<DomainError> for ProcessRequestError {
    fn from(value: DomainError) -> Self {
        let status_code = match value {
            DomainError::Unexpected(_) | DomainError::Repository(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::BAD_REQUEST,
        };

        Self::new(status_code, value.to_string())
    }
}

impl From<UseCaseError> for ProcessRequestError {
    fn from(value: UseCaseError) -> Self {
        let status_code = match value.kind {
            UseCaseErrorKind::Unexpected | UseCaseErrorKind::Repository => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            UseCaseErrorKind::Validation | UseCaseErrorKind::DomainRule => StatusCode::BAD_REQUEST,
            UseCaseErrorKind::NotFound => StatusCode::NOT_FOUND,
            UseCaseErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            UseCaseErrorKind::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        };

        Self {
            status_code,
            body: ErrorResponseBody {
                error: value.error,
                message: value.message,
            },
        }
    }
}

/// HTTPヘッダからContent-Typeを取得する。
///
/// # 引数
///
/// * `headers` - HTTPヘッダ
///
/// # 戻り値
///
/// * `Mime`
/// * Content-Typeが設定されていない場合は`None`
fn retrieve_content_type(headers: &HeaderMap) -> Option<Mime> {
    let content_type = headers.get(header::CONTENT_TYPE)?;
    let content_type = content_type.to_str().ok()?;
    Mime::from_str(content_type).ok()
}

/// カスタムデフォルト・エラー・ハンドラ
///
/// `actix-web`が処理したエラーのレスポンスを、JSONのエラーレスポンスに置き換える。
pub fn default_error_handler<B>(
    res: ServiceResponse<B>,
) -> actix_web::Result<ErrorHandlerResponse<B>> {
    // コンテンツタイプがapplication/jsonの場合はそのまま返す
    if retrieve_content_type(res.headers()).is_some_and(|m| m == mime::APPLICATION_JSON) {
        return Ok(ErrorHandlerResponse::Response(res.map_into_left_body()));
    }
    // レスポンスボディを生成
    let error = res
        .status()
        .canonical_reason()
        .unwrap_or("Unexpected error raised");
    let body = ErrorResponseBody::new(error, None::<String>);
    let (req, res) = res.into_parts();
    let res = HttpResponse::build(res.status()).json(body);
    // レスポンスを構築
    let res = ServiceResponse::new(req, res).map_into_right_body();

    Ok(ErrorHandlerResponse::Response(res))
}

/// ヘルスチェック
#[tracing::instrument(name = "health check")]
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({"message": "It works!"}))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// ユース・ケース・エラー分類に対応するHTTPステータスコードに変換することを確認
    #[test]
    fn use_case_error_status_codes() {
        let candidates = [
            (StatusCode::BAD_REQUEST, UseCaseError::validation("x")),
            (StatusCode::NOT_FOUND, UseCaseError::not_found("x")),
            (StatusCode::UNAUTHORIZED, UseCaseError::unauthorized("x")),
            (
                StatusCode::SERVICE_UNAVAILABLE,
                UseCaseError::unavailable("x"),
            ),
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                UseCaseError::repository("x"),
            ),
        ];
        for (expected, error) in candidates {
            assert_eq!(expected, ProcessRequestError::from(error).status_code);
        }
    }

    /// 補足メッセージがない場合は、`message`を出力しないことを確認
    #[test]
    fn error_body_omits_missing_message() {
        let body = serde_json::to_value(ErrorResponseBody::new("Bad Request", None::<String>))
            .unwrap();
        assert_eq!(serde_json::json!({"error": "Bad Request"}), body);
    }

    /// サーバー内部のエラーだけを置き換えることを確認
    #[test]
    fn mask_internal_server_errors_only() {
        let error = ProcessRequestError::new(StatusCode::INTERNAL_SERVER_ERROR, "boom").masked();
        assert_eq!(INTERNAL_SERVER_ERROR, error.body.error);
        assert_eq!(Some("boom".into()), error.body.message);

        let error = ProcessRequestError::new(StatusCode::NOT_FOUND, "User not found").masked();
        assert_eq!("User not found", error.body.error);
        assert!(error.body.message.is_none());
    }
}
