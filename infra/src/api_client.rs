//! アプリケーションのAPIクライアント
//!
//! サインイン・フローとプロフィール・キャッシュが、サーバーのAPIを呼び出すときに使用する。

use async_trait::async_trait;
use reqwest::StatusCode;

use domain::models::errors::RawError;
use domain::models::farcaster::{NeynarUser, UserLookup};
use domain::models::sign_in::SignInRequest;
use domain::repositories::farcaster::FarcasterUserSource;
use domain::repositories::wallet::SignInVerifier;
use domain::{DomainError, DomainResult};

use crate::http::{message_from_body, raw_error_from_reqwest};
use crate::routes::auth::VerifyResponseBody;
use crate::routes::farcaster::UserResponseBody;

/// アプリケーションのAPIクライアント
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// APIクライアントを構築する。
    ///
    /// # 引数
    ///
    /// * `client` - HTTPクライアント
    /// * `base_url` - APIのベースURL
    ///
    /// # 戻り値
    ///
    /// APIクライアント
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl SignInVerifier for ApiClient {
    #[tracing::instrument(name = "verify sign in via api", skip(self, request), fields(address = %request.address))]
    async fn verify(&self, request: &SignInRequest) -> Result<NeynarUser, RawError> {
        let response = self
            .client
            .post(format!("{}/api/auth/farcaster", self.base_url))
            .json(request)
            .send()
            .await
            .map_err(|e| raw_error_from_reqwest(&e))?;

        if !response.status().is_success() {
            let body = response
                .json::<serde_json::Value>()
                .await
                .unwrap_or(serde_json::Value::Null);
            let message =
                message_from_body(&body).unwrap_or_else(|| String::from("Authentication failed"));
            return Err(RawError::thrown(message));
        }

        let body = response
            .json::<VerifyResponseBody>()
            .await
            .map_err(|_| RawError::thrown(INVALID_RESPONSE))?;
        match body {
            VerifyResponseBody {
                success: true,
                user: Some(user),
                ..
            } => Ok(user),
            _ => Err(RawError::thrown(INVALID_RESPONSE)),
        }
    }
}

const INVALID_RESPONSE: &str = "Invalid response from server";

#[async_trait]
impl FarcasterUserSource for ApiClient {
    #[tracing::instrument(name = "fetch farcaster user via api", skip(self))]
    async fn fetch_user(&self, lookup: &UserLookup) -> DomainResult<Option<NeynarUser>> {
        let mut query = vec![];
        if let Some(address) = &lookup.address {
            query.push(("address", address.to_string()));
        }
        if let Some(fid) = lookup.fid {
            query.push(("fid", fid.to_string()));
        }
        if query.is_empty() {
            return Ok(None);
        }

        let response = self
            .client
            .get(format!("{}/api/farcaster/user", self.base_url))
            .query(&query)
            .send()
            .await
            .map_err(|e| DomainError::Repository(raw_error_from_reqwest(&e)))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(DomainError::Repository(RawError::thrown(format!(
                "Failed to fetch Farcaster user: {}",
                status.canonical_reason().unwrap_or("unknown status")
            ))));
        }

        let body = response
            .json::<UserResponseBody>()
            .await
            .map_err(|e| DomainError::Repository(raw_error_from_reqwest(&e)))?;

        Ok(Some(body.user))
    }
}
