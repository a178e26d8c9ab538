use super::{GenerativeService, TextStream};
use crate::schemas::Schema;
use crate::{Error, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard};

/// A call received by [`MockGenerativeClient`].
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    Structured {
        prompt: String,
        model: Option<String>,
    },
    Images {
        payloads: usize,
        prompt: String,
    },
    Stream {
        prompt: String,
        system_instruction: String,
    },
}

/// In-memory [`GenerativeService`] serving canned responses in rotation.
///
/// Clones share responses and the call log.
#[derive(Clone)]
pub struct MockGenerativeClient {
    json_responses: Arc<Mutex<Vec<Value>>>,
    stream_chunks: Arc<Mutex<Vec<String>>>,
    calls: Arc<Mutex<Vec<MockCall>>>,
    configured: bool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockGenerativeClient {
    pub fn new() -> Self {
        Self {
            json_responses: Arc::new(Mutex::new(Vec::new())),
            stream_chunks: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            configured: true,
        }
    }

    pub fn with_json_response(self, response: Value) -> Self {
        lock(&self.json_responses).push(response);
        self
    }

    pub fn with_stream_chunk(self, chunk: impl Into<String>) -> Self {
        lock(&self.stream_chunks).push(chunk.into());
        self
    }

    /// Behave as if no API key is available.
    pub fn without_api_key(mut self) -> Self {
        self.configured = false;
        self
    }

    pub fn get_call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    pub fn calls(&self) -> Vec<MockCall> {
        lock(&self.calls).clone()
    }

    fn check_configured(&self) -> Result<()> {
        if self.configured {
            Ok(())
        } else {
            Err(Error::Configuration(
                "Gemini API Key is not configured.".to_string(),
            ))
        }
    }

    /// Records the call and returns the next canned JSON (or `{}`).
    fn next_json(&self, call: MockCall) -> Value {
        let mut calls = lock(&self.calls);
        calls.push(call);

        let responses = lock(&self.json_responses);
        if responses.is_empty() {
            Value::Object(Default::default())
        } else {
            let json_calls = calls
                .iter()
                .filter(|c| !matches!(c, MockCall::Stream { .. }))
                .count();
            responses[(json_calls - 1) % responses.len()].clone()
        }
    }
}

impl Default for MockGenerativeClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerativeService for MockGenerativeClient {
    async fn generate_structured_content(
        &self,
        prompt: &str,
        _schema: &Schema,
        model: Option<&str>,
    ) -> Result<Value> {
        self.check_configured()?;
        Ok(self.next_json(MockCall::Structured {
            prompt: prompt.to_string(),
            model: model.map(str::to_string),
        }))
    }

    async fn analyze_images(
        &self,
        images: &[String],
        prompt: &str,
        _schema: &Schema,
    ) -> Result<Value> {
        self.check_configured()?;
        Ok(self.next_json(MockCall::Images {
            payloads: images.len(),
            prompt: prompt.to_string(),
        }))
    }

    async fn stream_text(&self, prompt: &str, system_instruction: &str) -> Result<TextStream> {
        self.check_configured()?;
        lock(&self.calls).push(MockCall::Stream {
            prompt: prompt.to_string(),
            system_instruction: system_instruction.to_string(),
        });

        let chunks: Vec<Result<String>> = lock(&self.stream_chunks).iter().cloned().map(Ok).collect();
        Ok(Box::pin(futures::stream::iter(chunks)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemas::SchemaName;
    use futures::StreamExt;
    use serde_json::json;

    #[tokio::test]
    async fn test_mock_default_response_is_empty_object() {
        let client = MockGenerativeClient::new();
        let value = client
            .generate_structured_content("p", SchemaName::PromptGen.descriptor(), None)
            .await
            .unwrap();
        assert_eq!(value, json!({}));
    }

    #[tokio::test]
    async fn test_mock_cycles_responses() {
        let client = MockGenerativeClient::new()
            .with_json_response(json!({ "n": 1 }))
            .with_json_response(json!({ "n": 2 }));
        let schema = SchemaName::PromptGen.descriptor();

        let first = client.generate_structured_content("a", schema, None).await.unwrap();
        let second = client.analyze_images(&[], "b", schema).await.unwrap();
        let third = client.generate_structured_content("c", schema, None).await.unwrap();

        assert_eq!(first["n"], 1);
        assert_eq!(second["n"], 2);
        assert_eq!(third["n"], 1);
    }

    #[tokio::test]
    async fn test_mock_records_calls() {
        let client = MockGenerativeClient::new().with_stream_chunk("hi");
        let schema = SchemaName::PromptGen.descriptor();

        client
            .generate_structured_content("p", schema, Some("gemini-2.5-pro"))
            .await
            .unwrap();
        client
            .analyze_images(&["a".to_string(), "b".to_string()], "look", schema)
            .await
            .unwrap();
        let stream = client.stream_text("s", "sys").await.unwrap();
        let chunks: Vec<Result<String>> = stream.collect().await;

        assert_eq!(chunks.len(), 1);
        assert_eq!(client.get_call_count(), 3);
        assert_eq!(
            client.calls(),
            vec![
                MockCall::Structured {
                    prompt: "p".to_string(),
                    model: Some("gemini-2.5-pro".to_string()),
                },
                MockCall::Images {
                    payloads: 2,
                    prompt: "look".to_string(),
                },
                MockCall::Stream {
                    prompt: "s".to_string(),
                    system_instruction: "sys".to_string(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_mock_without_key_records_nothing() {
        let client = MockGenerativeClient::new().without_api_key();
        let err = client
            .generate_structured_content("p", SchemaName::PromptGen.descriptor(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert_eq!(client.get_call_count(), 0);
    }
}
