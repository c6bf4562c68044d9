use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

use super::models::{ChatRequest, ChatResponse};
use crate::error::{BenchError, Result};

/// Chat-completion endpoint as seen by the agent loop. The HTTP client is
/// the only production implementation; tests script responses instead.
#[async_trait]
pub trait ChatApi: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse>;
}

pub struct HttpChatApi {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpChatApi {
    pub fn new(api_key: &str, endpoint: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key)).map_err(|e| {
                BenchError::Other(format!("Invalid authorization header: {}", e))
            })?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }
}

#[async_trait]
impl ChatApi for HttpChatApi {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(BenchError::ApiError { status, message });
        }

        Ok(response.json::<ChatResponse>().await?)
    }
}
