mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

use common::TestServer;

#[tokio::test]
async fn dashboard_totals_for_the_signed_in_user() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.sign_up("owner@example.com").await?;
    let other = server.sign_up("other@example.com").await?;

    let ana = server.create_client(&token, "Ana", "active").await?;
    server.create_client(&token, "Bob", "prospect").await?;
    server.create_client(&other, "Eve", "active").await?;

    for amount in [json!(100), json!(null), json!(250)] {
        server
            .post(
                Some(&token),
                "/api/opportunities",
                json!({ "clientId": ana, "title": "Deal", "amount": amount, "stage": "prospecting", "probability": 20 }),
            )
            .await?;
    }
    for (title, due) in [("Later", "2024-09-01"), ("Sooner", "2024-03-01")] {
        server
            .post(Some(&token), "/api/tasks", json!({ "title": title, "dueDate": due }))
            .await?;
    }

    let (status, body) = server.get(Some(&token), "/api/dashboard").await?;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["total_clients"], 2);
    assert_eq!(data["total_opportunities"], 3);
    assert_eq!(data["total_tasks"], 2);
    assert_eq!(data["pending_tasks"], 2);
    assert_eq!(data["total_revenue"], 350.0);
    assert_eq!(data["recent_clients"].as_array().unwrap().len(), 2);
    assert_eq!(data["upcoming_tasks"][0]["title"], "Sooner");

    let (_, body) = server.get(Some(&other), "/api/dashboard").await?;
    assert_eq!(body["data"]["total_clients"], 1);
    assert_eq!(body["data"]["total_revenue"], 0.0);
    Ok(())
}
