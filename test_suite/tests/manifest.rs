use reqwest::header::CACHE_CONTROL;
use reqwest::StatusCode;

use crate::helpers::{assert_json_content_type, spawn_test_app, split_response};

/// ミニ・アプリ・マニフェストを返却することを確認
#[tokio::test]
async fn manifest_works() -> anyhow::Result<()> {
    // 準備
    let app = spawn_test_app(None).await?;
    let client = reqwest::Client::new();

    // 実行
    let response = client
        .get(&format!("{}/.well-known/farcaster.json", app.root_uri))
        .send()
        .await
        .expect("Failed to execute request.");
    let response = split_response(response).await?;
    let body: serde_json::Value = serde_json::from_str(&response.body)?;

    // 検証
    assert_eq!(StatusCode::OK, response.status_code);
    assert_json_content_type(&response);
    assert_eq!(
        "public, max-age=3600, s-maxage=3600",
        response.headers.get(CACHE_CONTROL).unwrap().to_str()?
    );
    assert_eq!(serde_json::json!("0x"), body["baseBuilder"]["ownerAddress"]);
    let miniapp = &body["miniapp"];
    assert_eq!(serde_json::json!("Raffles"), miniapp["name"]);
    assert_eq!(
        serde_json::json!("https://raffles.example/icon.png"),
        miniapp["iconUrl"]
    );
    assert_eq!(serde_json::json!("utility"), miniapp["primaryCategory"]);
    assert!(miniapp.get("noindex").is_none());

    Ok(())
}
