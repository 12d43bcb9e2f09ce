//! Output configuration from TOML (`[output]` section)

use council_domain::EscapePolicy;
use serde::{Deserialize, Serialize};

/// Raw output configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    /// Enable colored terminal output
    pub color: bool,
    /// Escape answer text in HTML exports
    pub escape_html: bool,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            color: true,
            escape_html: false,
        }
    }
}

impl FileOutputConfig {
    pub fn escape_policy(&self) -> EscapePolicy {
        if self.escape_html {
            EscapePolicy::Html
        } else {
            EscapePolicy::Verbatim
        }
    }
}
