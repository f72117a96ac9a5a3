mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

use common::TestServer;

#[tokio::test]
async fn create_then_get_returns_every_field() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.sign_up("owner@example.com").await?;

    let (status, body) = server
        .post(
            Some(&token),
            "/api/clients",
            json!({
                "name": "Ana Diaz",
                "email": "ana@example.com",
                "phone": "555-0101",
                "company": "Acme",
                "position": "CTO"
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["redirect"], format!("/api/clients/{}", id));
    assert_eq!(body["data"]["status"], "active");

    let (status, body) = server.get(Some(&token), &format!("/api/clients/{}", id)).await?;
    assert_eq!(status, StatusCode::OK);
    let client = &body["data"]["client"];
    assert_eq!(client["name"], "Ana Diaz");
    assert_eq!(client["email"], "ana@example.com");
    assert_eq!(client["phone"], "555-0101");
    assert_eq!(client["company"], "Acme");
    assert_eq!(client["position"], "CTO");
    assert_eq!(body["data"]["summary"]["total_opportunities"], 0);
    Ok(())
}

#[tokio::test]
async fn invalid_form_echoes_values_and_writes_nothing() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.sign_up("owner@example.com").await?;

    let (status, body) = server
        .post(Some(&token), "/api/clients", json!({ "name": "A", "email": "bad", "company": "Acme" }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["field_errors"]["name"].is_string());
    assert!(body["field_errors"]["email"].is_string());
    assert_eq!(body["values"]["company"], "Acme");

    let (_, body) = server.get(Some(&token), "/api/clients").await?;
    assert_eq!(body["data"]["summary"]["total"], 0);
    Ok(())
}

#[tokio::test]
async fn list_filters_by_search_and_status() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.sign_up("owner@example.com").await?;
    server.create_client(&token, "Ana", "active").await?;
    server.create_client(&token, "Bob", "inactive").await?;

    let (_, body) = server.get(Some(&token), "/api/clients?search=an&status=all").await?;
    let names: Vec<&str> = body["data"]["records"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Ana"]);
    assert_eq!(body["data"]["summary"]["total"], 2);
    assert_eq!(body["data"]["summary"]["matched"], 1);

    let (_, body) = server.get(Some(&token), "/api/clients?status=inactive").await?;
    assert_eq!(body["data"]["records"][0]["name"], "Bob");
    assert_eq!(body["data"]["summary"]["by_status"]["inactive"], 1);

    let (_, body) = server.get(Some(&token), "/api/clients?order=name%20asc").await?;
    assert_eq!(body["data"]["records"][0]["name"], "Ana");
    assert_eq!(body["data"]["records"][1]["name"], "Bob");
    Ok(())
}

#[tokio::test]
async fn unknown_order_column_is_a_bad_request() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.sign_up("owner@example.com").await?;

    let (status, body) = server.get(Some(&token), "/api/clients?order=password%20asc").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
    Ok(())
}

#[tokio::test]
async fn update_with_current_values_only_moves_updated_at() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.sign_up("owner@example.com").await?;
    let id = server.create_client(&token, "Ana", "prospect").await?;
    let path = format!("/api/clients/{}", id);

    let (_, before) = server.get(Some(&token), &path).await?;
    let before = &before["data"]["client"];

    let (status, after) = server
        .put(
            Some(&token),
            &path,
            json!({ "name": "Ana", "email": "ana@example.com", "status": "prospect" }),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    let after = &after["data"];
    for field in ["id", "name", "email", "phone", "company", "position", "status", "created_at"] {
        assert_eq!(before[field], after[field], "{} changed", field);
    }
    assert!(after["updated_at"].as_str() >= before["updated_at"].as_str());
    Ok(())
}

#[tokio::test]
async fn other_users_client_is_not_found_with_redirect() -> Result<()> {
    let server = TestServer::start().await?;
    let owner = server.sign_up("owner@example.com").await?;
    let intruder = server.sign_up("intruder@example.com").await?;
    let id = server.create_client(&owner, "Ana", "active").await?;
    let path = format!("/api/clients/{}", id);

    let (status, body) = server.get(Some(&intruder), &path).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["redirect"], "/api/clients");

    let (status, _) = server
        .put(Some(&intruder), &path, json!({ "name": "Mallory", "email": "m@example.com" }))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    server.delete(Some(&intruder), &format!("{}?confirm=true", path)).await?;
    let (status, body) = server.get(Some(&owner), &path).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["client"]["name"], "Ana");

    let (_, body) = server.get(Some(&intruder), "/api/clients").await?;
    assert_eq!(body["data"]["summary"]["total"], 0);
    Ok(())
}

#[tokio::test]
async fn delete_requires_confirmation_and_is_idempotent() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.sign_up("owner@example.com").await?;
    let id = server.create_client(&token, "Ana", "active").await?;
    let path = format!("/api/clients/{}", id);

    let (status, body) = server.delete(Some(&token), &path).await?;
    assert_eq!(status, StatusCode::PRECONDITION_REQUIRED);
    assert_eq!(body["code"], "CONFIRMATION_REQUIRED");
    let (status, _) = server.get(Some(&token), &path).await?;
    assert_eq!(status, StatusCode::OK);

    let confirmed = format!("{}?confirm=true", path);
    let (status, body) = server.delete(Some(&token), &confirmed).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["redirect"], "/api/clients");

    let (status, _) = server.delete(Some(&token), &confirmed).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = server.get(Some(&token), &path).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn malformed_id_is_a_bad_request() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.sign_up("owner@example.com").await?;

    let (status, body) = server.get(Some(&token), "/api/clients/not-a-uuid").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    Ok(())
}

#[tokio::test]
async fn wrongly_typed_field_is_a_field_error_with_values() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.sign_up("owner@example.com").await?;

    let (status, body) = server
        .post(Some(&token), "/api/clients", json!({ "name": 5, "email": "ana@example.com" }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["field_errors"]["name"].is_string());
    assert!(body["field_errors"]["email"].is_null());
    assert_eq!(body["values"]["name"], 5);
    assert_eq!(body["values"]["email"], "ana@example.com");

    let (_, body) = server.get(Some(&token), "/api/clients").await?;
    assert_eq!(body["data"]["records"].as_array().unwrap().len(), 0);
    Ok(())
}
