//! Backend gateway client
//!
//! Both providers take the same request; only the response shape differs, so
//! the per-provider code lives in the `openai` and `gemini` adapters.

pub mod gemini;
pub mod openai;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::GatewayError;
use crate::provider::Provider;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Anything that can turn a prompt into a reply from one of the providers.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn send(&self, prompt: &str, provider: Provider) -> Result<String, GatewayError>;
}

#[derive(Serialize)]
struct PromptRequest<'a> {
    prompt: &'a str,
}

#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, provider: Provider) -> String {
        format!("{}{}", self.base_url, provider.endpoint())
    }

    async fn post(&self, prompt: &str, provider: Provider) -> Result<String, GatewayError> {
        let url = self.url_for(provider);
        debug!(%url, prompt_len = prompt.len(), "sending prompt");

        let response = self
            .client
            .post(&url)
            .json(&PromptRequest { prompt })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::HttpStatus(status.as_u16()));
        }

        let body = response.bytes().await?;
        provider.extract_reply(&body)
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn send(&self, prompt: &str, provider: Provider) -> Result<String, GatewayError> {
        let result = self.post(prompt, provider).await;
        if let Err(e) = &result {
            warn!(%provider, error = %e, "gateway request failed");
        }
        result
    }
}
