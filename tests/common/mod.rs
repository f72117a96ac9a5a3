#![allow(dead_code)]

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

use crm_api::config::AppConfig;
use crm_api::state::AppState;

/// The real router served in-process on a free port, backed by the memory store
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    client: reqwest::Client,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        Self::with_config(AppConfig::development()).await
    }

    pub async fn with_config(config: AppConfig) -> Result<Self> {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let state = AppState::in_memory(&config.security)?;
        let app = crm_api::app(state, &config);
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("test server stopped: {}", e);
            }
        });

        let server = Self {
            port,
            base_url,
            client: reqwest::Client::new(),
        };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Register a fresh user and return its bearer token
    pub async fn sign_up(&self, email: &str) -> Result<String> {
        let (status, body) = self
            .post(
                None,
                "/auth/signup",
                json!({ "email": email, "password": "secret1", "fullName": "Test User" }),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "sign-up failed: {} {}", status, body);
        body["data"]["session"]["access_token"]
            .as_str()
            .map(str::to_string)
            .context("sign-up returned no session")
    }

    pub async fn get(&self, token: Option<&str>, path: &str) -> Result<(StatusCode, Value)> {
        self.send(token, self.client.get(self.url(path))).await
    }

    pub async fn post(&self, token: Option<&str>, path: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.send(token, self.client.post(self.url(path)).json(&body)).await
    }

    pub async fn put(&self, token: Option<&str>, path: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.send(token, self.client.put(self.url(path)).json(&body)).await
    }

    pub async fn delete(&self, token: Option<&str>, path: &str) -> Result<(StatusCode, Value)> {
        self.send(token, self.client.delete(self.url(path))).await
    }

    async fn send(&self, token: Option<&str>, request: reqwest::RequestBuilder) -> Result<(StatusCode, Value)> {
        let request = match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let res = request.send().await?;
        let status = res.status();
        let body = res.json::<Value>().await?;
        Ok((status, body))
    }

    /// Create a client and return its id
    pub async fn create_client(&self, token: &str, name: &str, status: &str) -> Result<String> {
        let email = format!("{}@example.com", name.to_lowercase());
        let (code, body) = self
            .post(
                Some(token),
                "/api/clients",
                json!({ "name": name, "email": email, "status": status }),
            )
            .await?;
        anyhow::ensure!(code == StatusCode::CREATED, "create client failed: {} {}", code, body);
        body["data"]["id"].as_str().map(str::to_string).context("client without id")
    }
}
