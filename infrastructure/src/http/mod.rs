//! HTTP gateway to the generation backend

mod gateway;
pub mod wire;

pub use gateway::HttpCouncilGateway;
