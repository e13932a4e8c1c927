use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::{ApiError, ApiResult};

#[derive(Clone, Debug)]
pub struct ClientSettings {
    /// Per-request timeout. `None` leaves requests unbounded.
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            timeout: None,
            user_agent: concat!("fossrust-suite/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Thin JSON-over-HTTP client. One attempt per call, no retries.
#[derive(Clone, Debug)]
pub struct RestClient {
    http: reqwest::Client,
}

impl RestClient {
    pub fn new(settings: &ClientSettings) -> ApiResult<Self> {
        let mut builder = reqwest::Client::builder().user_agent(settings.user_agent.clone());
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(ApiError::transport)?;
        Ok(Self { http })
    }

    pub async fn get_json(&self, url: &str) -> ApiResult<Value> {
        debug!(%url, "GET");
        let response = self.http.get(url).send().await?;
        decode(response).await
    }

    pub async fn post_json<B>(&self, url: &str, body: &B) -> ApiResult<Value>
    where
        B: Serialize + ?Sized,
    {
        debug!(%url, "POST");
        let response = self.http.post(url).json(body).send().await?;
        decode(response).await
    }
}

async fn decode(response: reqwest::Response) -> ApiResult<Value> {
    let status = response.status();
    if !status.is_success() {
        return Err(ApiError::Status {
            status: status.as_u16(),
        });
    }
    let bytes = response.bytes().await?;
    if bytes.is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_slice(&bytes)?)
}
