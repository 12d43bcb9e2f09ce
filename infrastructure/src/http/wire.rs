//! Backend wire format
//!
//! Request and response bodies of the generation backend, plus the error
//! body convention (`{"detail": ...}`).

use council_domain::{Metadata, PerspectiveId};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

pub const PERSPECTIVES_PATH: &str = "/api/perspectives/perspectives";
pub const LOCAL_INSTANCE_PATH: &str = "/api/system/check-local-instance";
pub const API_KEYS_PATH: &str = "/api/system/check-api-keys";
pub const MODELS_PATH: &str = "/api/models/models";
pub const ANSWER_PATH: &str = "/api/generator/answer";
pub const CONCLUSION_PATH: &str = "/api/generator/conclusion";

/// Longest raw error body quoted in a gateway error
const MAX_ERROR_BODY_CHARS: usize = 200;

/// `{id: description}`
pub type PerspectivesResponse = BTreeMap<String, String>;

#[derive(Debug, Deserialize)]
pub struct LocalInstanceResponse {
    pub available: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiKeysResponse {
    #[serde(default)]
    pub openrouter: bool,
}

#[derive(Debug, Serialize)]
pub struct AnswerBody<'a> {
    pub question: &'a str,
    pub perspective: &'a str,
    pub model: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct AnswerResponse {
    #[serde(default)]
    pub perspective: Option<String>,
    pub answer: String,
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

/// `(perspective, text)` pairs serialized as a JSON object in their
/// insertion order
pub struct OrderedAnswers<'a>(pub &'a [(PerspectiveId, String)]);

impl Serialize for OrderedAnswers<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (perspective, text) in self.0 {
            map.serialize_entry(perspective.as_str(), text)?;
        }
        map.end()
    }
}

#[derive(Serialize)]
pub struct ConclusionBody<'a> {
    pub answers: OrderedAnswers<'a>,
    pub model: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ConclusionResponse {
    pub conclusion: String,
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

/// Human-readable message from an error response body
pub fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            detail: serde_json::Value::String(detail),
        }) => detail,
        Ok(ErrorBody { detail }) => detail.to_string(),
        Err(_) if body.trim().is_empty() => "empty response body".to_string(),
        Err(_) => council_domain::util::preview(body.trim(), MAX_ERROR_BODY_CHARS),
    }
}
