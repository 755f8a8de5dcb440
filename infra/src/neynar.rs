//! Neynar APIクライアント

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::{ExposeSecret as _, SecretString};

use configurations::settings::NeynarSettings;
use domain::models::errors::{ErrorDetail, RawError};
use domain::models::farcaster::NeynarUser;
use domain::models::primitives::{Fid, WalletAddress};
use domain::repositories::farcaster::FarcasterUserRepository;
use domain::{DomainError, DomainResult};

use crate::http::{message_from_body, raw_error_from_reqwest};

/// APIキーを送信するヘッダ
const API_KEY_HEADER: &str = "x-api-key";

/// Neynar APIクライアント
#[derive(Debug, Clone)]
pub struct NeynarClient {
    client: reqwest::Client,
    base_url: String,
    api_key: SecretString,
}

impl NeynarClient {
    /// Neynar APIクライアントを構築する。
    ///
    /// # 引数
    ///
    /// * `settings` - Neynar設定
    ///
    /// # 戻り値
    ///
    /// Neynar APIクライアント、APIキーが設定されていない場合は`None`
    pub fn from_settings(settings: &NeynarSettings) -> anyhow::Result<Option<Self>> {
        let api_key = match settings.api_key() {
            Some(api_key) => api_key.clone(),
            None => return Ok(None),
        };
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()?;

        Ok(Some(Self::new(client, &settings.base_url, api_key)))
    }

    pub fn new(client: reqwest::Client, base_url: &str, api_key: SecretString) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    async fn get<T>(&self, path: &str, query: &[(&str, String)]) -> DomainResult<Option<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .header(API_KEY_HEADER, self.api_key.expose_secret())
            .query(query)
            .send()
            .await
            .map_err(|e| DomainError::Repository(raw_error_from_reqwest(&e)))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response
                .json::<serde_json::Value>()
                .await
                .unwrap_or(serde_json::Value::Null);
            let message = message_from_body(&body).unwrap_or_else(|| {
                format!(
                    "Neynar API responded with {}",
                    status.canonical_reason().unwrap_or("an error")
                )
            });
            let detail = ErrorDetail::with_message(message).status(status.as_u16());
            tracing::debug!(status = status.as_u16(), "neynar api request failed");
            return Err(DomainError::Repository(RawError::Thrown(detail)));
        }

        response
            .json::<T>()
            .await
            .map(Some)
            .map_err(|e| DomainError::Repository(raw_error_from_reqwest(&e)))
    }
}

#[async_trait]
impl FarcasterUserRepository for NeynarClient {
    #[tracing::instrument(name = "fetch neynar user by fid", skip(self))]
    async fn user_by_fid(&self, fid: Fid) -> DomainResult<Option<NeynarUser>> {
        let response: Option<BulkUsersResponse> = self
            .get("/v2/farcaster/user/bulk", &[("fids", fid.to_string())])
            .await?;

        response
            .and_then(|r| r.users.into_iter().next())
            .map(NeynarUser::try_from)
            .transpose()
    }

    #[tracing::instrument(
        name = "fetch neynar user by address",
        skip(self, address),
        fields(address = %address)
    )]
    async fn user_by_address(&self, address: &WalletAddress) -> DomainResult<Option<NeynarUser>> {
        let response: Option<HashMap<String, Vec<ApiUser>>> = self
            .get(
                "/v2/farcaster/user/bulk-by-address",
                &[("addresses", address.to_string())],
            )
            .await?;

        // レスポンスのキーは小文字のアドレスである
        response
            .and_then(|mut users| {
                users
                    .remove(&address.to_lowercase())
                    .or_else(|| users.remove(address.value()))
            })
            .and_then(|users| users.into_iter().next())
            .map(NeynarUser::try_from)
            .transpose()
    }
}

#[derive(Debug, serde::Deserialize)]
struct BulkUsersResponse {
    #[serde(default)]
    users: Vec<ApiUser>,
}

/// Neynar APIが返すユーザー
#[derive(Debug, Clone, serde::Deserialize)]
struct ApiUser {
    fid: u64,
    username: String,
    display_name: Option<String>,
    pfp_url: Option<String>,
    profile: Option<ApiProfile>,
    follower_count: Option<u64>,
    following_count: Option<u64>,
    verified_addresses: Option<ApiVerifiedAddresses>,
}

#[derive(Debug, Clone, serde::Deserialize)]
struct ApiProfile {
    bio: Option<ApiBio>,
}

#[derive(Debug, Clone, serde::Deserialize)]
struct ApiBio {
    text: Option<String>,
}

#[derive(Debug, Clone, serde::Deserialize)]
struct ApiVerifiedAddresses {
    #[serde(default)]
    eth_addresses: Vec<String>,
}

impl TryFrom<ApiUser> for NeynarUser {
    type Error = DomainError;

    /// 表示名が空の場合はユーザー名を使用する。
    fn try_from(value: ApiUser) -> Result<Self, Self::Error> {
        let display_name = value
            .display_name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| value.username.clone());
        let bio = value
            .profile
            .and_then(|p| p.bio)
            .and_then(|b| b.text)
            .unwrap_or_default();
        // イーサリアム以外の形式のアドレスは除外する
        let verified_addresses = value
            .verified_addresses
            .map(|v| v.eth_addresses)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|a| WalletAddress::new(a).ok())
            .collect();

        Ok(NeynarUser {
            fid: Fid::new(value.fid)?,
            username: value.username,
            display_name,
            pfp_url: value.pfp_url.unwrap_or_default(),
            bio,
            follower_count: value.follower_count.unwrap_or(0),
            following_count: value.following_count.unwrap_or(0),
            verified_addresses,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Neynar APIのユーザーを、アプリケーションのユーザーに変換できることを確認
    #[test]
    fn transform_api_user() {
        let json = serde_json::json!({
            "fid": 3,
            "username": "dwr.eth",
            "display_name": "Dan Romero",
            "pfp_url": "https://example.com/dwr.png",
            "profile": {"bio": {"text": "Working on Farcaster"}},
            "follower_count": 1000,
            "following_count": 200,
            "verified_addresses": {
                "eth_addresses": ["0xd7029bdea1c17493893aafe29aad69ef892b8ff2", "not-an-address"],
                "sol_addresses": []
            }
        });
        let api_user: ApiUser = serde_json::from_value(json).unwrap();
        let user = NeynarUser::try_from(api_user).unwrap();

        assert_eq!(3, user.fid.value());
        assert_eq!("Dan Romero", user.display_name);
        assert_eq!("Working on Farcaster", user.bio);
        assert_eq!(1000, user.follower_count);
        assert_eq!(1, user.verified_addresses.len());
    }

    /// 省略された項目を既定値で補うことを確認
    #[test]
    fn transform_api_user_with_missing_fields() {
        let json = serde_json::json!({"fid": 42, "username": "alice", "display_name": ""});
        let api_user: ApiUser = serde_json::from_value(json).unwrap();
        let user = NeynarUser::try_from(api_user).unwrap();

        assert_eq!("alice", user.display_name);
        assert_eq!("", user.pfp_url);
        assert_eq!("", user.bio);
        assert_eq!(0, user.follower_count);
        assert_eq!(0, user.following_count);
        assert!(user.verified_addresses.is_empty());
    }

    /// Farcaster IDが0のユーザーは変換できないことを確認
    #[test]
    fn transform_api_user_with_invalid_fid() {
        let json = serde_json::json!({"fid": 0, "username": "nobody"});
        let api_user: ApiUser = serde_json::from_value(json).unwrap();
        assert!(NeynarUser::try_from(api_user).is_err());
    }

    /// APIキーが設定されていない場合は、クライアントを構築しないことを確認
    #[test]
    fn client_is_not_built_without_api_key() -> anyhow::Result<()> {
        let settings = NeynarSettings {
            api_key: None,
            client_id: None,
            base_url: String::from("https://api.neynar.com"),
            timeout_seconds: 10,
        };
        assert!(NeynarClient::from_settings(&settings)?.is_none());

        let settings = NeynarSettings {
            api_key: Some(SecretString::new(String::from("key"))),
            ..settings
        };
        assert!(NeynarClient::from_settings(&settings)?.is_some());

        Ok(())
    }
}
