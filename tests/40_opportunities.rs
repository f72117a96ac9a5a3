mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

use common::TestServer;

#[tokio::test]
async fn opportunity_round_trip_with_amount_and_close_date() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.sign_up("owner@example.com").await?;
    let client = server.create_client(&token, "Ana", "active").await?;

    let (status, body) = server
        .post(
            Some(&token),
            "/api/opportunities",
            json!({
                "clientId": client,
                "title": "Renewal",
                "amount": "1250.50",
                "stage": "negotiation",
                "probability": 60,
                "expectedCloseDate": "2024-06-30"
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["redirect"], format!("/api/opportunities/{}", id));

    let (status, body) = server.get(Some(&token), &format!("/api/opportunities/{}", id)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["amount"], 1250.5);
    assert_eq!(body["data"]["probability"], 60);
    assert_eq!(body["data"]["expected_close_date"], "2024-06-30");
    assert_eq!(body["data"]["client_id"], client);
    Ok(())
}

#[tokio::test]
async fn probability_out_of_range_is_rejected() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.sign_up("owner@example.com").await?;
    let client = server.create_client(&token, "Ana", "active").await?;

    for probability in [json!(-1), json!(101), json!("lots")] {
        let (status, body) = server
            .post(
                Some(&token),
                "/api/opportunities",
                json!({ "clientId": client, "title": "Renewal", "stage": "prospecting", "probability": probability }),
            )
            .await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["field_errors"]["probability"].is_string());
    }

    let (_, body) = server.get(Some(&token), "/api/opportunities").await?;
    assert_eq!(body["data"]["summary"]["count"], 0);
    Ok(())
}

#[tokio::test]
async fn oversized_amount_is_a_field_error() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.sign_up("owner@example.com").await?;
    let client = server.create_client(&token, "Ana", "active").await?;

    let (status, body) = server
        .post(
            Some(&token),
            "/api/opportunities",
            json!({
                "clientId": client,
                "title": "Renewal",
                "amount": "1000000000000000.005",
                "stage": "prospecting",
                "probability": 10
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["field_errors"]["amount"].is_string());
    assert_eq!(body["values"]["amount"], "1000000000000000.005");
    Ok(())
}

#[tokio::test]
async fn listing_totals_skip_missing_amounts() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.sign_up("owner@example.com").await?;
    let client = server.create_client(&token, "Ana", "active").await?;

    for (title, amount, stage) in [
        ("Renewal", json!(100), "prospecting"),
        ("Pilot", json!(null), "closed"),
        ("Upsell", json!(250), "negotiation"),
    ] {
        let (status, _) = server
            .post(
                Some(&token),
                "/api/opportunities",
                json!({ "clientId": client, "title": title, "amount": amount, "stage": stage, "probability": 10 }),
            )
            .await?;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, body) = server.get(Some(&token), "/api/opportunities?stage=negotiation").await?;
    assert_eq!(body["data"]["records"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["summary"]["total_value"], 350.0);
    assert_eq!(body["data"]["summary"]["active"], 2);

    let (_, body) = server.get(Some(&token), &format!("/api/clients/{}", client)).await?;
    assert_eq!(body["data"]["summary"]["total_value"], 350.0);
    assert_eq!(body["data"]["summary"]["active_opportunities"], 2);
    Ok(())
}

#[tokio::test]
async fn deleting_a_client_cascades_to_its_opportunities() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.sign_up("owner@example.com").await?;
    let client = server.create_client(&token, "Ana", "active").await?;

    let (_, body) = server
        .post(
            Some(&token),
            "/api/opportunities",
            json!({ "clientId": client, "title": "Renewal", "stage": "prospecting", "probability": 10 }),
        )
        .await?;
    let opportunity = body["data"]["id"].as_str().unwrap().to_string();
    server
        .post(
            Some(&token),
            &format!("/api/clients/{}/interactions", client),
            json!({ "type": "call", "date": "2024-01-05" }),
        )
        .await?;

    let (status, _) = server
        .delete(Some(&token), &format!("/api/clients/{}?confirm=true", client))
        .await?;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = server.get(Some(&token), &format!("/api/opportunities/{}", opportunity)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, body) = server.get(Some(&token), "/api/dashboard").await?;
    assert_eq!(body["data"]["total_opportunities"], 0);
    Ok(())
}

#[tokio::test]
async fn cannot_attach_to_another_users_client() -> Result<()> {
    let server = TestServer::start().await?;
    let owner = server.sign_up("owner@example.com").await?;
    let intruder = server.sign_up("intruder@example.com").await?;
    let client = server.create_client(&owner, "Ana", "active").await?;

    let (status, body) = server
        .post(
            Some(&intruder),
            "/api/opportunities",
            json!({ "clientId": client, "title": "Renewal", "stage": "prospecting", "probability": 10 }),
        )
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
    Ok(())
}
