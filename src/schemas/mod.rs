//! Response schema descriptors sent to Gemini as `responseSchema`
//!
//! Each analysis task has one named, immutable descriptor. The `description`
//! strings are instructions for the model (length limits, formatting rules for
//! generated copy) and are part of the request contract, so they must stay
//! word-for-word stable.

mod validate;

use crate::Error;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SchemaType {
    Object,
    Array,
    String,
    Number,
}

/// One node of a Gemini OpenAPI-subset schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(rename = "type")]
    pub schema_type: SchemaType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Kept in declaration order on the wire.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, Schema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

impl Schema {
    fn node(schema_type: SchemaType) -> Self {
        Self {
            schema_type,
            description: None,
            properties: IndexMap::new(),
            items: None,
            required: Vec::new(),
        }
    }

    pub fn string() -> Self {
        Self::node(SchemaType::String)
    }

    pub fn number() -> Self {
        Self::node(SchemaType::Number)
    }

    pub fn array(items: Schema) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::node(SchemaType::Array)
        }
    }

    pub fn object<'a>(properties: impl IntoIterator<Item = (&'a str, Schema)>) -> Self {
        Self {
            properties: properties
                .into_iter()
                .map(|(name, schema)| (name.to_string(), schema))
                .collect(),
            ..Self::node(SchemaType::Object)
        }
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn require(mut self, fields: &[&str]) -> Self {
        self.required = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    /// Serialized form as sent in `generationConfig.responseSchema`.
    pub fn to_json(&self) -> serde_json::Value {
        // Only derived string-keyed maps and enums; serialization cannot fail.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Names of the supported analysis tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaName {
    ListingAnalysis,
    AdsWaste,
    KeywordClusters,
    ReviewInsights,
    BusinessInsights,
    ReelPlanner,
    PromptGen,
}

impl SchemaName {
    pub const ALL: [SchemaName; 7] = [
        SchemaName::ListingAnalysis,
        SchemaName::AdsWaste,
        SchemaName::KeywordClusters,
        SchemaName::ReviewInsights,
        SchemaName::BusinessInsights,
        SchemaName::ReelPlanner,
        SchemaName::PromptGen,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaName::ListingAnalysis => "LISTING_ANALYSIS",
            SchemaName::AdsWaste => "ADS_WASTE",
            SchemaName::KeywordClusters => "KEYWORD_CLUSTERS",
            SchemaName::ReviewInsights => "REVIEW_INSIGHTS",
            SchemaName::BusinessInsights => "BUSINESS_INSIGHTS",
            SchemaName::ReelPlanner => "REEL_PLANNER",
            SchemaName::PromptGen => "PROMPT_GEN",
        }
    }

    /// The process-wide descriptor for this task.
    pub fn descriptor(&self) -> &'static Schema {
        match self {
            SchemaName::ListingAnalysis => &*LISTING_ANALYSIS,
            SchemaName::AdsWaste => &*ADS_WASTE,
            SchemaName::KeywordClusters => &*KEYWORD_CLUSTERS,
            SchemaName::ReviewInsights => &*REVIEW_INSIGHTS,
            SchemaName::BusinessInsights => &*BUSINESS_INSIGHTS,
            SchemaName::ReelPlanner => &*REEL_PLANNER,
            SchemaName::PromptGen => &*PROMPT_GEN,
        }
    }
}

impl fmt::Display for SchemaName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemaName {
    type Err = Error;

    /// Accepts `LISTING_ANALYSIS`, `listing_analysis` or `listing-analysis`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        SchemaName::ALL
            .into_iter()
            .find(|name| name.as_str() == normalized)
            .ok_or_else(|| Error::Validation(format!("Unknown schema '{}'", s)))
    }
}

static LISTING_ANALYSIS: Lazy<Schema> = Lazy::new(|| {
    Schema::object([
        (
            "title",
            Schema::string().describe(
                "Optimized Title. MUST be 150-200 characters. Start with Brand Name. If a size range is provided, the title MUST include the age coverage in format 'Ages X to Y Years'. NO symbols or emojis. NO word repeated more than twice.",
            ),
        ),
        (
            "bullets",
            Schema::array(Schema::string()).describe(
                "Exactly 5 detailed bullet points. Each MUST be between 160 and 199 characters long. Must include detected color, fabric, and size details.",
            ),
        ),
        ("keywords", Schema::array(Schema::string())),
        (
            "description",
            Schema::string().describe(
                "A long-form SEO optimized product description. Strict limit of 1500 characters.",
            ),
        ),
        (
            "backendKeywords",
            Schema::string().describe(
                "Amazon backend search terms. STRICT LIMIT: MUST BE LESS THAN 200 CHARACTERS. Combine detected Color, Size, Length, and Fabric with unique words from the target SEO list. NO REPEATED WORDS. NO COMMAS. ONLY SPACES.",
            ),
        ),
        ("fabricGuess", Schema::string()),
        ("styleType", Schema::string()),
        ("recommendations", Schema::array(Schema::string())),
    ])
    .require(&[
        "title",
        "bullets",
        "keywords",
        "description",
        "backendKeywords",
    ])
});

static ADS_WASTE: Lazy<Schema> = Lazy::new(|| {
    Schema::object([(
        "negatives",
        Schema::array(Schema::object([
            ("keyword", Schema::string()),
            ("reason", Schema::string()),
            ("confidence", Schema::number()),
        ])),
    )])
});

static KEYWORD_CLUSTERS: Lazy<Schema> = Lazy::new(|| {
    Schema::object([(
        "clusters",
        Schema::array(Schema::object([
            ("intent", Schema::string()),
            ("keywords", Schema::array(Schema::string())),
            ("strategy", Schema::string()),
        ])),
    )])
});

static REVIEW_INSIGHTS: Lazy<Schema> = Lazy::new(|| {
    Schema::object([
        ("pros", Schema::array(Schema::string())),
        ("cons", Schema::array(Schema::string())),
        ("sizeIssues", Schema::array(Schema::string())),
        ("newAdAngles", Schema::array(Schema::string())),
        ("productIdeas", Schema::array(Schema::string())),
    ])
});

static BUSINESS_INSIGHTS: Lazy<Schema> = Lazy::new(|| {
    Schema::object([
        ("summary", Schema::string()),
        ("actionItems", Schema::array(Schema::string())),
        ("metricsInterpretation", Schema::array(Schema::string())),
    ])
});

static REEL_PLANNER: Lazy<Schema> = Lazy::new(|| {
    Schema::object([
        ("hooks", Schema::array(Schema::string())),
        (
            "scripts",
            Schema::array(Schema::object([
                ("duration", Schema::string()),
                ("script", Schema::string()),
                ("cta", Schema::string()),
            ])),
        ),
    ])
});

static PROMPT_GEN: Lazy<Schema> = Lazy::new(|| {
    Schema::object([
        ("image", Schema::array(Schema::string())),
        ("video", Schema::array(Schema::string())),
    ])
});

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_listing_analysis_required_fields() {
        let schema = SchemaName::ListingAnalysis.descriptor();
        assert_eq!(
            schema.required,
            vec![
                "title",
                "bullets",
                "keywords",
                "description",
                "backendKeywords"
            ]
        );
        assert_eq!(schema.properties.len(), 8);
    }

    #[test]
    fn test_only_listing_analysis_has_required_fields() {
        for name in SchemaName::ALL {
            if name != SchemaName::ListingAnalysis {
                assert!(name.descriptor().required.is_empty(), "{}", name);
            }
        }
    }

    #[test]
    fn test_descriptor_is_a_single_static_instance() {
        let first = SchemaName::AdsWaste.descriptor();
        let second = SchemaName::AdsWaste.descriptor();
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn test_descriptors_round_trip_through_serde() {
        for name in SchemaName::ALL {
            let schema = name.descriptor();
            let encoded = serde_json::to_string(schema).unwrap();
            let decoded: Schema = serde_json::from_str(&encoded).unwrap();
            assert_eq!(&decoded, schema, "{}", name);
        }
    }

    #[test]
    fn test_ads_waste_wire_shape() {
        assert_eq!(
            SchemaName::AdsWaste.descriptor().to_json(),
            json!({
                "type": "OBJECT",
                "properties": {
                    "negatives": {
                        "type": "ARRAY",
                        "items": {
                            "type": "OBJECT",
                            "properties": {
                                "confidence": { "type": "NUMBER" },
                                "keyword": { "type": "STRING" },
                                "reason": { "type": "STRING" }
                            }
                        }
                    }
                }
            })
        );
    }

    #[test]
    fn test_listing_properties_serialize_in_declaration_order() {
        let encoded = serde_json::to_string(SchemaName::ListingAnalysis.descriptor()).unwrap();
        let positions: Vec<usize> = [
            "title",
            "bullets",
            "keywords",
            "description",
            "backendKeywords",
            "fabricGuess",
            "styleType",
            "recommendations",
        ]
        .iter()
        .map(|key| encoded.find(&format!("\"{}\":{{", key)).unwrap())
        .collect();

        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]), "{}", encoded);
    }

    #[test]
    fn test_backend_keywords_guidance_is_verbatim() {
        let schema = SchemaName::ListingAnalysis.descriptor();
        let description = schema.properties["backendKeywords"]
            .description
            .as_deref()
            .unwrap();
        assert!(description.contains("MUST BE LESS THAN 200 CHARACTERS"));
        assert!(description.ends_with("NO COMMAS. ONLY SPACES."));
    }

    #[test]
    fn test_schema_name_parsing() {
        assert_eq!(
            "listing-analysis".parse::<SchemaName>().unwrap(),
            SchemaName::ListingAnalysis
        );
        assert_eq!(
            "REEL_PLANNER".parse::<SchemaName>().unwrap(),
            SchemaName::ReelPlanner
        );
        assert!(matches!(
            "nope".parse::<SchemaName>(),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_schema_name_display_round_trips() {
        for name in SchemaName::ALL {
            assert_eq!(name.to_string().parse::<SchemaName>().unwrap(), name);
        }
    }
}
