use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};

use domain::models::farcaster::NeynarUser;
use domain::models::primitives::{Fid, WalletAddress};
use domain::models::sign_in::SignInRequest;
use use_cases::farcaster::{
    get_user_by_fid, require_repository, verify_sign_in, MISSING_SIGN_IN_FIELDS,
};

use crate::routes::{ProcessRequestError, ProcessRequestResult};
use crate::RequestContext;

/// 認証スコープを返却する。
pub fn auth_scope() -> actix_web::Scope {
    web::scope("/api/auth").service(
        web::resource("/farcaster")
            .route(web::get().to(get_user))
            .route(web::post().to(verify)),
    )
}

/// Farcasterユーザー取得クエリ
#[derive(Debug, Clone, serde::Deserialize)]
pub struct FidQuery {
    /// Farcaster ID
    pub fid: Option<String>,
}

/// Farcasterユーザー・レスポンス・ボディ
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AuthUserResponseBody {
    pub success: bool,
    pub user: NeynarUser,
}

/// サインイン検証リクエスト・ボディ
///
/// ```json
/// {"message": "example.com wants you to sign in ...", "signature": "0x...", "address": "0x..."}
/// ```
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct VerifyRequestBody {
    pub message: Option<String>,
    pub signature: Option<String>,
    pub address: Option<String>,
}

/// サインイン検証レスポンス・ボディ
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct VerifyResponseBody {
    pub success: bool,
    pub user: Option<NeynarUser>,
    pub message: Option<String>,
}

/// Farcaster IDでFarcasterユーザーを取得する。
///
/// ```text
/// GET /api/auth/farcaster?fid=3
/// ```
#[tracing::instrument(name = "get farcaster user for auth", skip(context))]
pub async fn get_user(
    context: web::Data<RequestContext>,
    query: web::Query<FidQuery>,
) -> ProcessRequestResult<HttpResponse> {
    let repository = require_repository(context.farcaster_repository())?;

    let fid = match query.fid.as_deref().filter(|f| !f.is_empty()) {
        Some(fid) => Fid::parse(fid).map_err(|_| {
            ProcessRequestError::new(
                StatusCode::BAD_REQUEST,
                "Invalid FID: must be a positive integer",
            )
        })?,
        None => {
            return Err(ProcessRequestError::new(
                StatusCode::BAD_REQUEST,
                "Missing required parameter: fid",
            ))
        }
    };

    let user = get_user_by_fid(
        fid,
        repository,
        context.error_handlers,
        "FarcasterAuthAPI:GET",
    )
    .await
    .map_err(|e| ProcessRequestError::from(e).masked())?
    .ok_or_else(|| ProcessRequestError::new(StatusCode::NOT_FOUND, "User not found"))?;

    Ok(HttpResponse::Ok().json(AuthUserResponseBody {
        success: true,
        user,
    }))
}

/// サインインを検証する。
///
/// 署名したウォレット・アドレスが、Farcasterアカウントで検証済みであるかを確認する。
#[tracing::instrument(name = "verify farcaster sign in", skip(context, body))]
pub async fn verify(
    context: web::Data<RequestContext>,
    body: web::Json<VerifyRequestBody>,
) -> ProcessRequestResult<HttpResponse> {
    let repository = require_repository(context.farcaster_repository())?;

    let body = body.into_inner();
    let (message, signature, address) = match (body.message, body.signature, body.address) {
        (Some(message), Some(signature), Some(address))
            if !message.is_empty() && !signature.is_empty() && !address.is_empty() =>
        {
            (message, signature, address)
        }
        _ => {
            return Err(ProcessRequestError::new(
                StatusCode::BAD_REQUEST,
                MISSING_SIGN_IN_FIELDS,
            ))
        }
    };
    let address = WalletAddress::new(address).map_err(|_| {
        ProcessRequestError::new(StatusCode::BAD_REQUEST, "Invalid address")
            .with_message("The address must be a 0x-prefixed 20 byte hex string")
    })?;
    let request = SignInRequest {
        message,
        signature,
        address,
    };

    let user = verify_sign_in(&request, repository, context.error_handlers)
        .await
        .map_err(|e| ProcessRequestError::from(e).masked())?;

    Ok(HttpResponse::Ok().json(VerifyResponseBody {
        success: true,
        user: Some(user),
        message: Some(String::from("Authentication verified")),
    }))
}
