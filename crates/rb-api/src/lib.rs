//! # rb-api
//!
//! The request routing and orchestration layer for Runeterra Board.
//! `MockApiGateway` implements `ApiClient` entirely in-process over an
//! injected `BoardRepo` and `AuthProvider`.

pub mod config;
mod gateway;
mod listing;
pub mod routes;
mod upload;

pub use config::GatewayConfig;
pub use gateway::MockApiGateway;
