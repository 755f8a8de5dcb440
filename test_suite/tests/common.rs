use crate::helpers::{assert_json_content_type, spawn_test_app, split_response};

/// ヘルスチェック・ハンドラ
#[tokio::test]
async fn health_check_works() -> anyhow::Result<()> {
    // 準備
    let app = spawn_test_app(None).await?;
    let client = reqwest::Client::new();

    // 実行
    let response = client
        .get(&format!("{}/health-check", app.root_uri))
        .send()
        .await
        .expect("Failed to execute request.");
    let response = split_response(response).await?;
    let body: serde_json::Value = serde_json::from_str(&response.body)?;

    // 検証
    assert_eq!(reqwest::StatusCode::OK, response.status_code);
    assert_json_content_type(&response);
    assert_eq!(serde_json::json!("It works!"), body["message"]);

    Ok(())
}

/// 存在しないURIにアクセスしたときに、JSONのエラーレスポンスが得られるか確認
#[tokio::test]
async fn not_found_works() -> anyhow::Result<()> {
    // 準備
    let app = spawn_test_app(None).await?;
    let client = reqwest::Client::new();

    // 実行
    let response = client
        .get(&format!("{}/non-existent-uri", app.root_uri))
        .send()
        .await
        .expect("Failed to execute request.");
    let response = split_response(response).await?;
    let body: serde_json::Value = serde_json::from_str(&response.body)?;

    // 検証
    assert_eq!(reqwest::StatusCode::NOT_FOUND, response.status_code);
    assert_json_content_type(&response);
    assert_eq!(serde_json::json!({"error": "Not Found"}), body);

    Ok(())
}

/// 許可されていないメソッドでアクセスしたときに、JSONのエラーレスポンスが得られるか確認
#[tokio::test]
async fn method_not_allowed_works() -> anyhow::Result<()> {
    // 準備
    let app = spawn_test_app(None).await?;
    let client = reqwest::Client::new();

    // 実行
    let response = client
        .delete(&format!("{}/api/auth/farcaster", app.root_uri))
        .send()
        .await
        .expect("Failed to execute request.");
    let response = split_response(response).await?;
    let body: serde_json::Value = serde_json::from_str(&response.body)?;

    // 検証
    assert_eq!(reqwest::StatusCode::METHOD_NOT_ALLOWED, response.status_code);
    assert_json_content_type(&response);
    assert_eq!(serde_json::json!("Method Not Allowed"), body["error"]);

    Ok(())
}
