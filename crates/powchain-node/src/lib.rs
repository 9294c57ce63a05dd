//! HTTP surface of a powchain node: the axum router, the reqwest peer client
//! and TCP port-scan discovery.

pub mod api;
pub mod client;
pub mod config;
pub mod discovery;
