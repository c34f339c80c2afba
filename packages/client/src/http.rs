use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

/// JSON-over-HTTP client rooted at an API base url
#[derive(Debug, Clone)]
pub struct Client {
    client: reqwest::Client,
    base_url: String,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;
        Ok(Client {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute url for an API path
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn get<T>(&self, path: &str) -> anyhow::Result<T>
    where
        T: DeserializeOwned,
    {
        let response = self.client.get(self.url(path)).send().await?;
        Self::read_json(response).await
    }

    #[instrument(level = "debug", skip(self, request))]
    pub async fn post<S, T>(&self, path: &str, request: &S) -> anyhow::Result<T>
    where
        S: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.client.post(self.url(path)).json(request).send().await?;
        Self::read_json(response).await
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn delete(&self, path: &str) -> anyhow::Result<()> {
        let response = self.client.delete(self.url(path)).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> anyhow::Result<T> {
        let text = Self::check(response).await?.text().await?;
        debug!(response = %text);
        // Empty bodies read as JSON null
        let body = if text.trim().is_empty() { "null" } else { text.as_str() };
        Ok(serde_json::from_str::<T>(body)?)
    }

    async fn check(response: reqwest::Response) -> anyhow::Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(anyhow::anyhow!(
            "Request failed with status: {} - {}",
            status,
            body
        ))
    }
}
