//! Typed wrappers over [`GenerativeService`]: send the request with the
//! result type's schema, then validate and decode the reply.

use crate::ai::GenerativeService;
use crate::models::{decode, StructuredOutput};
use crate::Result;

pub async fn generate<T: StructuredOutput>(
    service: &dyn GenerativeService,
    prompt: &str,
) -> Result<T> {
    let value = service
        .generate_structured_content(prompt, T::SCHEMA.descriptor(), None)
        .await?;
    decode(value)
}

pub async fn generate_with_model<T: StructuredOutput>(
    service: &dyn GenerativeService,
    prompt: &str,
    model: &str,
) -> Result<T> {
    let value = service
        .generate_structured_content(prompt, T::SCHEMA.descriptor(), Some(model))
        .await?;
    decode(value)
}

pub async fn analyze_images<T: StructuredOutput>(
    service: &dyn GenerativeService,
    images: &[String],
    prompt: &str,
) -> Result<T> {
    let value = service
        .analyze_images(images, prompt, T::SCHEMA.descriptor())
        .await?;
    decode(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{MockCall, MockGenerativeClient};
    use crate::models::{KeywordClusters, ListingAnalysis, PromptIdeas};
    use crate::Error;
    use serde_json::json;

    #[tokio::test]
    async fn test_generate_decodes_typed_result() {
        let mock = MockGenerativeClient::new().with_json_response(json!({
            "clusters": [{
                "intent": "gift",
                "keywords": ["birthday dress", "party dress"],
                "strategy": "Exact match"
            }]
        }));

        let clusters: KeywordClusters = generate(&mock, "cluster these").await.unwrap();
        assert_eq!(clusters.clusters.len(), 1);
        assert_eq!(clusters.clusters[0].keywords[1], "party dress");
    }

    #[tokio::test]
    async fn test_generate_with_model_passes_model_through() {
        let mock = MockGenerativeClient::new();
        let _: PromptIdeas = generate_with_model(&mock, "ideas", "gemini-2.5-pro")
            .await
            .unwrap();

        assert_eq!(
            mock.calls(),
            vec![MockCall::Structured {
                prompt: "ideas".to_string(),
                model: Some("gemini-2.5-pro".to_string()),
            }]
        );
    }

    #[tokio::test]
    async fn test_nonconforming_reply_is_validation_error() {
        let mock = MockGenerativeClient::new().with_json_response(json!({ "clusters": "none" }));
        let err = generate::<KeywordClusters>(&mock, "p").await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_analyze_images_requires_listing_fields() {
        let mock = MockGenerativeClient::new();
        let err = analyze_images::<ListingAnalysis>(
            &mock,
            &["data:image/jpeg;base64,AAAA".to_string()],
            "write a listing",
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_configuration_error_propagates() {
        let mock = MockGenerativeClient::new().without_api_key();
        let err = generate::<PromptIdeas>(&mock, "p").await.unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }
}
