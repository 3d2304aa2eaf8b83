//! HTTP plumbing towards the Choplink backend.

mod error;
mod transport;

pub use error::TransportError;
pub use transport::{RequestOptions, Transport};
