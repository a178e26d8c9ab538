//! Command orchestration shared by the CLI and tests.

use crate::ai::image::read_data_uri;
use crate::ai::{GenerativeContentClient, GenerativeService};
use crate::config::KeySlot;
use crate::models::AnalysisResult;
use crate::schemas::SchemaName;
use crate::Result;
use futures::StreamExt;
use std::path::PathBuf;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{info, warn};

/// Runs analysis commands against a [`GenerativeService`].
pub struct App {
    service: Box<dyn GenerativeService>,
}

impl App {
    /// Build an app around any service implementation, typically a mock.
    pub fn with_service(service: Box<dyn GenerativeService>) -> Self {
        Self { service }
    }

    /// Construct an app from environment configuration (`Config::from_env`).
    ///
    /// `slot` is consulted before the `API_KEY` environment variable.
    pub fn new(slot: KeySlot) -> Result<Self> {
        let client = GenerativeContentClient::from_env(slot)?;
        info!("Default model: {}", client.config().model);
        Ok(Self::with_service(Box::new(client)))
    }

    pub fn service(&self) -> &dyn GenerativeService {
        self.service.as_ref()
    }

    /// Structured generation for `schema`, decoded into its typed result.
    pub async fn generate(
        &self,
        schema: SchemaName,
        prompt: &str,
        model: Option<&str>,
    ) -> Result<AnalysisResult> {
        info!("Generating {}", schema);
        let value = self
            .service
            .generate_structured_content(prompt, schema.descriptor(), model)
            .await?;
        let result = AnalysisResult::from_value(schema, value)?;
        report_copy_issues(&result);
        Ok(result)
    }

    /// Reads each image file, encodes it as a data URI and runs image analysis.
    pub async fn analyze_images(
        &self,
        schema: SchemaName,
        prompt: &str,
        paths: &[PathBuf],
    ) -> Result<AnalysisResult> {
        let images = paths
            .iter()
            .map(|path| read_data_uri(path))
            .collect::<Result<Vec<_>>>()?;

        info!("Analyzing {} image(s) for {}", images.len(), schema);
        let value = self
            .service
            .analyze_images(&images, prompt, schema.descriptor())
            .await?;
        let result = AnalysisResult::from_value(schema, value)?;
        report_copy_issues(&result);
        Ok(result)
    }

    /// Streams generated text into `out` as it arrives; returns the number of
    /// chunks written.
    pub async fn stream<W: AsyncWrite + Unpin>(
        &self,
        prompt: &str,
        system_instruction: &str,
        out: &mut W,
    ) -> Result<usize> {
        let mut stream = self.service.stream_text(prompt, system_instruction).await?;

        let mut chunks = 0;
        while let Some(chunk) = stream.next().await {
            out.write_all(chunk?.as_bytes()).await?;
            out.flush().await?;
            chunks += 1;
        }
        Ok(chunks)
    }
}

fn report_copy_issues(result: &AnalysisResult) {
    if let AnalysisResult::ListingAnalysis(listing) = result {
        for issue in listing.check_copy() {
            warn!("Listing copy: {}", issue);
        }
    }
}
