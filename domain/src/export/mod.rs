//! Export value objects

mod format;

pub use format::{EscapePolicy, ExportFormat, UnknownExportFormat};
