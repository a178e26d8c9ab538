//! Typed results for each analysis task
//!
//! Field names follow the camelCase keys of the matching schema descriptor.
//! Only `ListingAnalysis` has required fields; everything else defaults when
//! the model leaves it out.

use crate::schemas::SchemaName;
use crate::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A result type bound to the schema descriptor that produces it.
pub trait StructuredOutput: DeserializeOwned {
    const SCHEMA: SchemaName;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingAnalysis {
    pub title: String,
    pub bullets: Vec<String>,
    pub keywords: Vec<String>,
    pub description: String,
    pub backend_keywords: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fabric_guess: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_type: Option<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AdsWaste {
    #[serde(default)]
    pub negatives: Vec<NegativeKeyword>,
}

/// A search term recommended as a negative keyword.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NegativeKeyword {
    pub keyword: String,
    pub reason: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct KeywordClusters {
    #[serde(default)]
    pub clusters: Vec<KeywordCluster>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordCluster {
    pub intent: String,
    pub keywords: Vec<String>,
    pub strategy: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReviewInsights {
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    pub size_issues: Vec<String>,
    pub new_ad_angles: Vec<String>,
    pub product_ideas: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BusinessInsights {
    pub summary: String,
    pub action_items: Vec<String>,
    pub metrics_interpretation: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReelPlan {
    pub hooks: Vec<String>,
    pub scripts: Vec<ReelScript>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReelScript {
    pub duration: String,
    pub script: String,
    pub cta: String,
}

/// Image and video generation prompts.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptIdeas {
    pub image: Vec<String>,
    pub video: Vec<String>,
}

impl StructuredOutput for ListingAnalysis {
    const SCHEMA: SchemaName = SchemaName::ListingAnalysis;
}

impl StructuredOutput for AdsWaste {
    const SCHEMA: SchemaName = SchemaName::AdsWaste;
}

impl StructuredOutput for KeywordClusters {
    const SCHEMA: SchemaName = SchemaName::KeywordClusters;
}

impl StructuredOutput for ReviewInsights {
    const SCHEMA: SchemaName = SchemaName::ReviewInsights;
}

impl StructuredOutput for BusinessInsights {
    const SCHEMA: SchemaName = SchemaName::BusinessInsights;
}

impl StructuredOutput for ReelPlan {
    const SCHEMA: SchemaName = SchemaName::ReelPlanner;
}

impl StructuredOutput for PromptIdeas {
    const SCHEMA: SchemaName = SchemaName::PromptGen;
}

/// Validates `value` against `T`'s descriptor, then deserializes it.
///
/// Validation treats a `null` optional property as absent, so such keys are
/// dropped before deserializing and the field takes its default.
pub fn decode<T: StructuredOutput>(mut value: Value) -> Result<T> {
    T::SCHEMA.descriptor().validate(&value)?;
    strip_null_properties(&mut value);
    Ok(serde_json::from_value(value)?)
}

fn strip_null_properties(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, v| !v.is_null());
            map.values_mut().for_each(strip_null_properties);
        }
        Value::Array(items) => items.iter_mut().for_each(strip_null_properties),
        _ => {}
    }
}

/// Result of any analysis task, tagged with the schema that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "task", content = "result", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnalysisResult {
    ListingAnalysis(ListingAnalysis),
    AdsWaste(AdsWaste),
    KeywordClusters(KeywordClusters),
    ReviewInsights(ReviewInsights),
    BusinessInsights(BusinessInsights),
    ReelPlanner(ReelPlan),
    PromptGen(PromptIdeas),
}

impl AnalysisResult {
    pub fn from_value(name: SchemaName, value: Value) -> Result<Self> {
        Ok(match name {
            SchemaName::ListingAnalysis => AnalysisResult::ListingAnalysis(decode(value)?),
            SchemaName::AdsWaste => AnalysisResult::AdsWaste(decode(value)?),
            SchemaName::KeywordClusters => AnalysisResult::KeywordClusters(decode(value)?),
            SchemaName::ReviewInsights => AnalysisResult::ReviewInsights(decode(value)?),
            SchemaName::BusinessInsights => AnalysisResult::BusinessInsights(decode(value)?),
            SchemaName::ReelPlanner => AnalysisResult::ReelPlanner(decode(value)?),
            SchemaName::PromptGen => AnalysisResult::PromptGen(decode(value)?),
        })
    }

    pub fn schema_name(&self) -> SchemaName {
        match self {
            AnalysisResult::ListingAnalysis(_) => SchemaName::ListingAnalysis,
            AnalysisResult::AdsWaste(_) => SchemaName::AdsWaste,
            AnalysisResult::KeywordClusters(_) => SchemaName::KeywordClusters,
            AnalysisResult::ReviewInsights(_) => SchemaName::ReviewInsights,
            AnalysisResult::BusinessInsights(_) => SchemaName::BusinessInsights,
            AnalysisResult::ReelPlanner(_) => SchemaName::ReelPlanner,
            AnalysisResult::PromptGen(_) => SchemaName::PromptGen,
        }
    }

    /// The bare result as JSON, without the task tag.
    pub fn to_json(&self) -> Result<Value> {
        let value = match self {
            AnalysisResult::ListingAnalysis(r) => serde_json::to_value(r)?,
            AnalysisResult::AdsWaste(r) => serde_json::to_value(r)?,
            AnalysisResult::KeywordClusters(r) => serde_json::to_value(r)?,
            AnalysisResult::ReviewInsights(r) => serde_json::to_value(r)?,
            AnalysisResult::BusinessInsights(r) => serde_json::to_value(r)?,
            AnalysisResult::ReelPlanner(r) => serde_json::to_value(r)?,
            AnalysisResult::PromptGen(r) => serde_json::to_value(r)?,
        };
        Ok(value)
    }
}
