use super::gemini::types::{GenerateContentRequest, Part};
use super::gemini::GeminiHttpClient;
use super::image::image_part;
use super::{GenerativeService, TextStream};
use crate::config::{Config, KeyChain, KeySlot};
use crate::schemas::Schema;
use crate::{Error, Result};
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};

const MISSING_KEY_MESSAGE: &str =
    "Gemini API Key is not configured. Please ensure API_KEY is set in your environment.";

/// Gemini-backed [`GenerativeService`].
///
/// The HTTP client is built on the first call that finds an API key and is
/// reused afterwards. Until then every call re-checks the key providers, so a
/// key supplied after startup is picked up. A key change after construction
/// does not rebuild the client.
pub struct GenerativeContentClient {
    config: Config,
    keys: KeyChain,
    http: reqwest::Client,
    client: OnceCell<GeminiHttpClient>,
    constructions: AtomicUsize,
}

impl GenerativeContentClient {
    pub fn new(config: Config, keys: KeyChain) -> Self {
        Self::new_with_client(config, keys, reqwest::Client::new())
    }

    pub fn new_with_client(config: Config, keys: KeyChain, http: reqwest::Client) -> Self {
        Self {
            config,
            keys,
            http,
            client: OnceCell::new(),
            constructions: AtomicUsize::new(0),
        }
    }

    /// Environment configuration with the standard key chain: `slot` first,
    /// then `API_KEY`.
    pub fn from_env(slot: KeySlot) -> Result<Self> {
        let config = Config::from_env()?;
        let keys = KeyChain::standard(slot, &config);
        Ok(Self::new(config, keys))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Whether the underlying HTTP client has been built yet.
    pub fn is_connected(&self) -> bool {
        self.client.get().is_some()
    }

    /// Number of times the underlying HTTP client has been built.
    pub fn construction_count(&self) -> usize {
        self.constructions.load(Ordering::SeqCst)
    }

    fn ensure_client(&self) -> Option<&GeminiHttpClient> {
        if let Some(client) = self.client.get() {
            return Some(client);
        }

        let api_key = self.keys.resolve()?;
        Some(self.client.get_or_init(|| {
            self.constructions.fetch_add(1, Ordering::SeqCst);
            tracing::info!("Initializing Gemini client ({})", self.config.base_url);
            GeminiHttpClient::new_with_client(
                api_key,
                self.config.base_url.clone(),
                self.config.timeout,
                self.http.clone(),
            )
        }))
    }

    fn get_client(&self) -> Result<&GeminiHttpClient> {
        self.ensure_client()
            .ok_or_else(|| Error::Configuration(MISSING_KEY_MESSAGE.to_string()))
    }

    async fn generate_json(&self, model: &str, request: GenerateContentRequest) -> Result<Value> {
        let client = self.get_client()?;
        let response = client.generate_content(model, &request).await?;
        parse_response_text(&response.text())
    }
}

/// Blank text parses as `{}`; anything else must be valid JSON.
fn parse_response_text(text: &str) -> Result<Value> {
    let text = if text.is_empty() { "{}" } else { text };
    Ok(serde_json::from_str(text)?)
}

#[async_trait]
impl GenerativeService for GenerativeContentClient {
    async fn generate_structured_content(
        &self,
        prompt: &str,
        schema: &Schema,
        model: Option<&str>,
    ) -> Result<Value> {
        let model = model.unwrap_or(&self.config.model);
        let request = GenerateContentRequest::user(vec![Part::text(prompt)]).with_json_schema(schema);

        self.generate_json(model, request).await.map_err(|e| {
            tracing::error!("Gemini Error: {}", e);
            e
        })
    }

    async fn analyze_images(
        &self,
        images: &[String],
        prompt: &str,
        schema: &Schema,
    ) -> Result<Value> {
        tracing::debug!("Analyzing {} image(s) via Gemini", images.len());

        let mut parts: Vec<Part> = images.iter().map(|image| image_part(image)).collect();
        parts.push(Part::text(prompt));
        let request = GenerateContentRequest::user(parts).with_json_schema(schema);

        self.generate_json(&self.config.model, request)
            .await
            .map_err(|e| {
                tracing::error!("Gemini Vision Error: {}", e);
                e
            })
    }

    async fn stream_text(&self, prompt: &str, system_instruction: &str) -> Result<TextStream> {
        let mut request = GenerateContentRequest::user(vec![Part::text(prompt)]);
        if !system_instruction.trim().is_empty() {
            request = request.with_system_instruction(system_instruction);
        }

        let opened = match self.get_client() {
            Ok(client) => {
                client
                    .stream_generate_content(&self.config.model, &request)
                    .await
            }
            Err(e) => Err(e),
        };

        opened.map_err(|e| {
            tracing::error!("Gemini Stream Error: {}", e);
            e
        })
    }
}
