//! AI providers and their models

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// Upstream AI integration (Value Object)
///
/// Known providers are enumerated; any other identifier is carried verbatim
/// in [`Provider::Other`] and labelled by its raw id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Provider {
    /// LM Studio running on the backend host
    Local,
    /// OpenRouter aggregator
    OpenRouter,
    /// Hugging Face inference
    HuggingFace,
    /// Unrecognized identifier
    Other(String),
}

impl Provider {
    /// Parse a wire identifier; never fails
    pub fn from_id(id: &str) -> Self {
        match id {
            "local" => Provider::Local,
            "openrouter" => Provider::OpenRouter,
            "huggingface" => Provider::HuggingFace,
            other => Provider::Other(other.to_string()),
        }
    }

    /// Wire identifier
    pub fn as_str(&self) -> &str {
        match self {
            Provider::Local => "local",
            Provider::OpenRouter => "openrouter",
            Provider::HuggingFace => "huggingface",
            Provider::Other(id) => id,
        }
    }

    /// Human readable name
    pub fn label(&self) -> &str {
        match self {
            Provider::Local => "Local (LM Studio)",
            Provider::OpenRouter => "OpenRouter",
            Provider::HuggingFace => "Hugging Face",
            Provider::Other(id) => id,
        }
    }

    /// Whether prompts leave the user's infrastructure
    pub fn sends_data_to_third_party(&self) -> bool {
        matches!(self, Provider::OpenRouter | Provider::HuggingFace)
    }

    /// Providers whose availability the backend can report
    pub fn checked_providers() -> Vec<Provider> {
        vec![Provider::Local, Provider::OpenRouter]
    }
}

impl Default for Provider {
    fn default() -> Self {
        Provider::Local
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Provider {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Provider::from_id(s))
    }
}

impl Serialize for Provider {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Provider {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Provider::from_id(&s))
    }
}

/// Identifier of a model offered by a provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelId(String);

impl ModelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ModelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ModelId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ModelId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Provider availability plus per-provider model lists
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderCatalog {
    availability: Vec<(Provider, bool)>,
    models: BTreeMap<Provider, Vec<ModelId>>,
}

impl ProviderCatalog {
    /// Create from the availability report, keeping its order
    pub fn new(availability: impl IntoIterator<Item = (Provider, bool)>) -> Self {
        let mut entries: Vec<(Provider, bool)> = Vec::new();
        for (provider, available) in availability {
            match entries.iter_mut().find(|(p, _)| *p == provider) {
                Some(entry) => entry.1 = available,
                None => entries.push((provider, available)),
            }
        }
        Self {
            availability: entries,
            models: BTreeMap::new(),
        }
    }

    pub fn with_models(mut self, provider: Provider, models: Vec<ModelId>) -> Self {
        self.set_models(provider, models);
        self
    }

    /// Replace the cached model list of `provider`
    pub fn set_models(&mut self, provider: Provider, models: Vec<ModelId>) {
        self.models.insert(provider, models);
    }

    pub fn availability(&self) -> &[(Provider, bool)] {
        &self.availability
    }

    pub fn is_available(&self, provider: &Provider) -> bool {
        self.availability
            .iter()
            .any(|(p, available)| p == provider && *available)
    }

    /// Providers reported as available, in report order
    pub fn usable(&self) -> impl Iterator<Item = &Provider> {
        self.availability
            .iter()
            .filter(|(_, available)| *available)
            .map(|(p, _)| p)
    }

    pub fn has_usable(&self) -> bool {
        self.usable().next().is_some()
    }

    pub fn first_usable(&self) -> Option<&Provider> {
        self.usable().next()
    }

    /// Cached models for `provider` (empty when none are known)
    pub fn models_for(&self, provider: &Provider) -> &[ModelId] {
        self.models.get(provider).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn offers_model(&self, provider: &Provider, model: &ModelId) -> bool {
        self.models_for(provider).contains(model)
    }
}
