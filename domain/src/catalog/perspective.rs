//! Philosophical perspectives offered by the backend

use serde::{Deserialize, Serialize};

/// Description shown when the catalog has no text for a perspective.
pub const FALLBACK_DESCRIPTION: &str =
    "A unique philosophical approach to life and decision-making";

/// Identifier of a perspective, e.g. `"Stoicism"` (Value Object)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PerspectiveId(String);

impl PerspectiveId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PerspectiveId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PerspectiveId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for PerspectiveId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// A named viewpoint the backend can answer from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Perspective {
    pub id: PerspectiveId,
    pub description: String,
}

impl Perspective {
    pub fn new(id: impl Into<PerspectiveId>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
        }
    }
}

/// The set of perspectives loaded for a session
///
/// Order is the backend's order. Duplicate ids keep their first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PerspectiveCatalog {
    perspectives: Vec<Perspective>,
}

impl PerspectiveCatalog {
    pub fn new(perspectives: impl IntoIterator<Item = Perspective>) -> Self {
        let mut unique: Vec<Perspective> = Vec::new();
        for perspective in perspectives {
            if !unique.iter().any(|p| p.id == perspective.id) {
                unique.push(perspective);
            }
        }
        Self {
            perspectives: unique,
        }
    }

    /// Build from `(id, description)` pairs as returned by the backend
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<PerspectiveId>,
        V: Into<String>,
    {
        Self::new(pairs.into_iter().map(|(k, v)| Perspective::new(k, v)))
    }

    pub fn len(&self) -> usize {
        self.perspectives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.perspectives.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Perspective> {
        self.perspectives.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &PerspectiveId> {
        self.perspectives.iter().map(|p| &p.id)
    }

    pub fn contains(&self, id: &PerspectiveId) -> bool {
        self.perspectives.iter().any(|p| &p.id == id)
    }

    pub fn first(&self) -> Option<&PerspectiveId> {
        self.perspectives.first().map(|p| &p.id)
    }

    pub fn get(&self, id: &PerspectiveId) -> Option<&Perspective> {
        self.perspectives.iter().find(|p| &p.id == id)
    }

    /// Description of `id`, or [`FALLBACK_DESCRIPTION`] when missing or empty
    pub fn description(&self, id: &PerspectiveId) -> &str {
        self.get(id)
            .map(|p| p.description.as_str())
            .filter(|d| !d.trim().is_empty())
            .unwrap_or(FALLBACK_DESCRIPTION)
    }

    /// Case-insensitive lookup, used by the command line front end
    pub fn find(&self, name: &str) -> Option<&PerspectiveId> {
        self.ids().find(|id| id.as_str().eq_ignore_ascii_case(name.trim()))
    }
}
