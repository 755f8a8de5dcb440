use actix_web::http::header;
use actix_web::{web, HttpResponse};
use serde_json::{json, Map, Value};

use crate::{ManifestSettings, RequestContext};

/// マニフェストのキャッシュ制御
const CACHE_CONTROL: &str = "public, max-age=3600, s-maxage=3600";

/// ミニ・アプリ・マニフェストのパス
pub const MANIFEST_PATH: &str = "/.well-known/farcaster.json";

const DESCRIPTION: &str = "Create and enter raffles for NFTs, tokens, and ETH on Base blockchain. Fully decentralized and non-custodial with zero platform custody.";
const OG_DESCRIPTION: &str = "Create and enter raffles for NFTs, tokens, and ETH on Base blockchain. Fully decentralized and non-custodial.";
const TAGS: [&str; 7] = [
    "raffle",
    "base",
    "web3",
    "blockchain",
    "non-custodial",
    "nft",
    "defi",
];

/// ミニ・アプリ・マニフェストを返却する。
#[tracing::instrument(name = "farcaster manifest", skip(context))]
pub async fn manifest(context: web::Data<RequestContext>) -> HttpResponse {
    HttpResponse::Ok()
        .insert_header((header::CACHE_CONTROL, CACHE_CONTROL))
        .json(build_manifest(&context.manifest))
}

/// ミニ・アプリ・マニフェストを構築する。
///
/// # 引数
///
/// * `settings` - マニフェスト設定
///
/// # 戻り値
///
/// マニフェストのJSON
pub fn build_manifest(settings: &ManifestSettings) -> Value {
    let url = settings.app_url();
    let owner = settings
        .base_builder_address
        .as_deref()
        .filter(|a| !a.is_empty())
        .unwrap_or("0x");

    let miniapp = with_valid_properties(vec![
        ("version", json!("1")),
        ("name", json!("Raffles")),
        ("homeUrl", json!(url)),
        ("iconUrl", json!(format!("{url}/icon.png"))),
        ("splashImageUrl", json!(format!("{url}/splash.png"))),
        ("splashBackgroundColor", json!("#000000")),
        ("webhookUrl", json!(format!("{url}/api/webhook"))),
        ("subtitle", json!("Non-Custodial Raffle Platform")),
        ("description", json!(DESCRIPTION)),
        (
            "screenshotUrls",
            json!((1..=3)
                .map(|n| format!("{url}/screenshot{n}.png"))
                .collect::<Vec<_>>()),
        ),
        ("primaryCategory", json!("utility")),
        ("tags", json!(TAGS)),
        ("heroImageUrl", json!(format!("{url}/hero.png"))),
        ("tagline", json!("Raffle Anything on Base")),
        (
            "ogTitle",
            json!("Raffles - Non-Custodial Raffle Platform on Base"),
        ),
        ("ogDescription", json!(OG_DESCRIPTION)),
        ("ogImageUrl", json!(format!("{url}/og-image.png"))),
        ("noindex", json!(false)),
    ]);

    json!({
        "accountAssociation": {
            "header": "",
            "payload": "",
            "signature": ""
        },
        "baseBuilder": {
            "ownerAddress": owner
        },
        "miniapp": miniapp
    })
}

/// 空の文字列、空の配列、`false`及び`null`のプロパティを除外する。
fn with_valid_properties(properties: Vec<(&str, Value)>) -> Map<String, Value> {
    properties
        .into_iter()
        .filter(|(_, value)| match value {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::String(s) => !s.is_empty(),
            Value::Array(a) => !a.is_empty(),
            _ => true,
        })
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}
