//! Session configuration from TOML (`[session]` section)

use council_domain::{ExportFormat, ModelId, Provider};
use serde::{Deserialize, Serialize};

/// Raw session configuration from TOML
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSessionConfig {
    /// Provider to select once the catalog is loaded (`local`, `openrouter`)
    pub default_provider: Option<String>,
    /// Model to select for that provider
    pub default_model: Option<String>,
    /// Format used by `/export` and `--export` without an explicit format
    pub export_format: ExportFormat,
}

impl FileSessionConfig {
    pub fn provider(&self) -> Option<Provider> {
        self.default_provider.as_deref().map(Provider::from_id)
    }

    pub fn model(&self) -> Option<ModelId> {
        self.default_model.as_deref().map(ModelId::from)
    }
}
