use crate::{ClientError, ControlClientResult};

use reqwest::{Client as ReqwestClient, Method};
use serde_json::Value;

/// HTTP client for the daemon control routes
pub struct Client {
    pub base_url: String,
    client: ReqwestClient,
}

impl Client {
    /// Create a new client
    ///
    /// # Arguments
    /// * `base_url` - Control URL (e.g., "http://127.0.0.1:8090")
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: ReqwestClient::new(),
        }
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client.request(method, &url)
    }

    /// Execute request and turn error bodies into `ClientError::Api`
    async fn execute(&self, req: reqwest::RequestBuilder) -> ControlClientResult<Value> {
        let response = req.send().await?;
        let status = response.status();
        let text = response.text().await?;
        let body: Value = serde_json::from_str(&text).unwrap_or(Value::String(text));

        if status.is_success() {
            return Ok(body);
        }

        let error = body.get("error");
        let code = error
            .and_then(|e| e.get("code"))
            .and_then(|v| v.as_str())
            .unwrap_or("UNKNOWN")
            .to_string();
        let message = error
            .and_then(|e| e.get("message"))
            .and_then(|v| v.as_str())
            .map(String::from)
            .unwrap_or_else(|| status.to_string());

        Err(ClientError::api_error(status.as_u16(), code, message))
    }

    /// Ask the daemon for a graceful (counted down) shutdown
    pub async fn shutdown(&self) -> ControlClientResult<Value> {
        let req = self.request(Method::POST, "/shutdown");
        self.execute(req).await
    }

    /// Ask the daemon to stop the server immediately
    pub async fn terminate(&self) -> ControlClientResult<Value> {
        let req = self.request(Method::POST, "/terminate");
        self.execute(req).await
    }

    pub async fn healthcheck(&self) -> ControlClientResult<Value> {
        let req = self.request(Method::GET, "/healthcheck");
        self.execute(req).await
    }
}
