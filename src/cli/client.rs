use std::time::Duration;

use anyhow::Context;
use reqwest::StatusCode;
use serde_json::Value;

/// Thin HTTP client for the Campus API
pub struct ApiClient {
    base_url: String,
    token: Option<String>,
    http: reqwest::Client,
}

/// Decoded response: status plus the JSON envelope
#[derive(Debug)]
pub struct ApiReply {
    pub status: StatusCode,
    pub body: Value,
}

impl ApiReply {
    pub fn is_success(&self) -> bool {
        self.status.is_success() && self.body.get("success").and_then(Value::as_bool).unwrap_or(false)
    }

    /// Server-provided error message, falling back to the status text
    pub fn error_message(&self) -> String {
        self.body
            .get("message")
            .or_else(|| self.body.get("error"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| self.status.to_string())
    }

    pub fn error_code(&self) -> Option<&str> {
        self.body.get("code").and_then(Value::as_str)
    }
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: std::env::var("CAMPUS_API_TOKEN").ok().filter(|t| !t.is_empty()),
            http: reqwest::Client::new(),
        }
    }

    pub async fn get(&self, path: &str) -> anyhow::Result<ApiReply> {
        let request = self.http.get(self.url(path)).timeout(Duration::from_secs(5));
        self.send(request).await
    }

    pub async fn post(&self, path: &str, query: &[(&str, String)]) -> anyhow::Result<ApiReply> {
        let mut request = self.http.post(self.url(path)).query(query);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        self.send(request).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> anyhow::Result<ApiReply> {
        let response = request
            .send()
            .await
            .with_context(|| format!("failed to reach {}", self.base_url))?;
        let status = response.status();
        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        Ok(ApiReply { status, body })
    }
}
