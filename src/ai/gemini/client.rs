use super::stream::sse_text_stream;
use super::types::{GenerateContentRequest, GenerateContentResponse};
use crate::ai::TextStream;
use crate::{Error, Result};
use reqwest::{Client, RequestBuilder, Response};
use std::time::Duration;

/// Lightweight Gemini REST client. One instance serves every model.
#[derive(Debug, Clone)]
pub struct GeminiHttpClient {
    client: Client,
    api_key: String,
    base_url: String,
    timeout: Option<Duration>,
}

impl GeminiHttpClient {
    pub fn new(api_key: String, base_url: String, timeout: Option<Duration>) -> Self {
        Self::new_with_client(api_key, base_url, timeout, Client::new())
    }

    pub fn new_with_client(
        api_key: String,
        base_url: String,
        timeout: Option<Duration>,
        client: Client,
    ) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `model` may be a bare ID or `models/`-prefixed.
    fn model_url(&self, model: &str, method: &str) -> String {
        let model = model.strip_prefix("models/").unwrap_or(model);
        format!("{}/v1beta/models/{}:{}", self.base_url, model, method)
    }

    fn post(&self, url: &str, request: &GenerateContentRequest) -> RequestBuilder {
        let builder = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(request);

        match self.timeout {
            Some(timeout) => builder.timeout(timeout),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await.map_err(|e| {
            tracing::error!("Failed to send request to Gemini: {}", e);
            e
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            tracing::error!("Gemini API error (status {}): {}", status, error_text);
            return Err(Error::AiProvider(format!(
                "Gemini API error (status {}): {}",
                status, error_text
            )));
        }

        Ok(response)
    }

    /// Calls `generateContent` and decodes the response envelope.
    pub async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let url = self.model_url(model, "generateContent");
        tracing::debug!("Sending generateContent request to {}", url);

        let response = self.send(self.post(&url, request)).await?;

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse Gemini response: {}\nBody: {}", e, body);
            Error::AiProvider(format!("Failed to parse Gemini response: {}", e))
        })
    }

    /// Calls `streamGenerateContent` over SSE and hands back the text chunks
    /// as they arrive. Nothing is read from the body before returning.
    pub async fn stream_generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<TextStream> {
        let url = self.model_url(model, "streamGenerateContent");
        tracing::debug!("Opening streamGenerateContent request to {}", url);

        let builder = self.post(&url, request).query(&[("alt", "sse")]);
        let response = self.send(builder).await?;

        Ok(Box::pin(sse_text_stream(response.bytes_stream())))
    }
}
