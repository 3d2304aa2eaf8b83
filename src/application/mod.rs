//! Application layer: domain client, query bindings and their error type.

pub mod api;
pub mod error;
pub mod queries;

pub use api::{ChoplinkApi, HttpChoplinkApi, find_menu_item, find_restaurant};
pub use error::ApiError;
pub use queries::Queries;
