use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};

use domain::models::farcaster::NeynarUser;
use domain::models::primitives::{Fid, WalletAddress};
use use_cases::farcaster::{get_user_by_address, get_user_by_fid, require_repository};

use crate::routes::{ProcessRequestError, ProcessRequestResult};
use crate::RequestContext;

/// Farcasterスコープを返却する。
pub fn farcaster_scope() -> actix_web::Scope {
    web::scope("/api/farcaster").service(web::resource("/user").route(web::get().to(get_user)))
}

/// Farcasterユーザー取得クエリ
///
/// `fid`と`address`の両方が指定された場合は、`fid`を優先する。
#[derive(Debug, Clone, serde::Deserialize)]
pub struct UserQuery {
    /// ウォレット・アドレス
    pub address: Option<String>,
    /// Farcaster ID
    pub fid: Option<String>,
}

/// Farcasterユーザー・レスポンス・ボディ
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct UserResponseBody {
    pub user: NeynarUser,
}

/// Farcasterユーザーを取得する。
///
/// ```text
/// GET /api/farcaster/user?address=0x...
/// GET /api/farcaster/user?fid=3
/// ```
#[tracing::instrument(name = "get farcaster user", skip(context))]
pub async fn get_user(
    context: web::Data<RequestContext>,
    query: web::Query<UserQuery>,
) -> ProcessRequestResult<HttpResponse> {
    let repository = require_repository(context.farcaster_repository())
        // 利用できない理由は返さない
        .map_err(|e| ProcessRequestError::new(StatusCode::SERVICE_UNAVAILABLE, e.error))?;

    // 数値でない、または0のFarcaster IDは指定されていないものとみなす
    let fid = query.fid.as_deref().and_then(|f| Fid::parse(f).ok());
    let address = query.address.as_deref().filter(|a| !a.is_empty());
    if fid.is_none() && address.is_none() {
        return Err(ProcessRequestError::new(
            StatusCode::BAD_REQUEST,
            "Either address or fid parameter is required",
        ));
    }

    let handlers = context.error_handlers;
    let user = match (fid, address) {
        (Some(fid), _) => get_user_by_fid(fid, repository, handlers, CONTEXT).await?,
        (None, Some(address)) => match WalletAddress::new(address) {
            Ok(address) => get_user_by_address(&address, repository, handlers, CONTEXT).await?,
            // 形式が正しくないアドレスに紐付くユーザーは存在しない
            Err(_) => None,
        },
        (None, None) => None,
    };

    match user {
        Some(user) => Ok(HttpResponse::Ok().json(UserResponseBody { user })),
        None => Err(ProcessRequestError::new(
            StatusCode::NOT_FOUND,
            "Farcaster user not found",
        )),
    }
}

const CONTEXT: &str = "FarcasterUserAPI";
