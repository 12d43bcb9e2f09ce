//! Use cases

pub mod generate_answer;
pub mod load_catalogs;
pub mod session_runtime;
pub mod synthesize_conclusion;

#[cfg(test)]
pub(crate) mod mock_gateway;
