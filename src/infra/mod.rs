//! Infrastructure adapters: HTTP transport and telemetry bootstrap.

pub mod error;
pub mod http;
pub mod telemetry;
