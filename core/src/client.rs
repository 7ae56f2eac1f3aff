use async_stream::try_stream;
use futures_util::{Stream, StreamExt};
use reqwest::Client;
use tracing::debug;

use crate::config::ZettelConfig;
use crate::errors::{ZettelError, ZettelResult};
use crate::stream::StreamDecoder;
use crate::types::{ChatMessage, ChatRequest, ChatResponse};

/// Client for the chat-completions API
#[derive(Debug, Clone)]
pub struct ChatClient {
    client: Client,
    config: ZettelConfig,
    api_key: String,
}

impl ChatClient {
    /// Create a new chat API client. Fails fast when no API key is
    /// configured, before any network call is attempted.
    pub fn new(config: ZettelConfig) -> ZettelResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                ZettelError::ConfigError(
                    "API key is required to initialize the chat client".to_string(),
                )
            })?;

        let client = Client::new();

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    fn build_request(&self, messages: Vec<ChatMessage>, stream: bool) -> ChatRequest {
        ChatRequest {
            messages,
            model: self.config.model_name().to_string(),
            max_tokens: self.config.max_tokens(),
            stream,
        }
    }

    async fn post(&self, request: &ChatRequest) -> ZettelResult<reqwest::Response> {
        let response = self
            .client
            .post(self.config.api_url())
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| ZettelError::RequestError(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.map_err(|e| {
                ZettelError::ResponseError(format!("Failed to read error response: {}", e))
            })?;

            return Err(ZettelError::HttpError {
                status_code: status.as_u16(),
                message: format!("API request failed: {}", error_body),
            });
        }

        Ok(response)
    }

    /// Single-shot completion: send the conversation, return the full
    /// assistant reply once it is ready.
    pub async fn chat(&self, messages: Vec<ChatMessage>) -> ZettelResult<String> {
        let request = self.build_request(messages, false);
        let response = self.post(&request).await?;

        let body = response
            .json::<ChatResponse>()
            .await
            .map_err(|e| ZettelError::ParsingError(format!("Failed to parse response: {}", e)))?;

        body.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| ZettelError::ResponseError("No choices in response".to_string()))
    }

    /// Streaming completion: send the conversation and yield each content
    /// fragment of the assistant reply as it arrives, in order.
    ///
    /// The caller drives the stream and may drop it at any point to cancel
    /// the request; nothing is buffered beyond the fragment in flight.
    /// Transport failures and non-success statuses surface as errors on
    /// the stream, never silently.
    pub fn stream_chat(
        &self,
        messages: Vec<ChatMessage>,
    ) -> impl Stream<Item = ZettelResult<String>> + '_ {
        try_stream! {
            let request = self.build_request(messages, true);
            let response = self.post(&request).await?;

            let mut decoder = StreamDecoder::new();
            let mut body = response.bytes_stream();

            while let Some(chunk) = body.next().await {
                let bytes = chunk
                    .map_err(|e| ZettelError::RequestError(format!("Stream read failed: {}", e)))?;
                for fragment in decoder.feed(&bytes)? {
                    yield fragment;
                }
                if decoder.is_done() {
                    break;
                }
            }

            let message = decoder.finish();
            debug!(
                "Stream complete: {} characters of {} content",
                message.content.len(),
                message.role
            );
        }
    }
}
