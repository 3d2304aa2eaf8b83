#![deny(clippy::all, clippy::pedantic)]

use std::sync::Arc;

use choplink::application::{ApiError, ChoplinkApi, HttpChoplinkApi, Queries};
use choplink::cache::{CacheConfig, QueryCache};
use choplink::config::{LoadError, Settings};
use choplink::infra::error::InfraError;
use choplink::infra::http::Transport;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] LoadError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("failed to read input file {path}: {source}")]
    InputFile {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("failed to render output: {0}")]
    Output(String),
}

#[derive(Clone)]
pub struct Ctx {
    pub queries: Queries,
}

impl Ctx {
    pub fn new(settings: &Settings) -> Result<Self, CliError> {
        let transport = Transport::new(&settings.api)
            .map_err(|err| InfraError::configuration(format!("invalid api settings: {err}")))?;
        let api: Arc<dyn ChoplinkApi> = Arc::new(HttpChoplinkApi::new(transport));
        let cache = QueryCache::new(CacheConfig::from(&settings.cache));
        Ok(Self {
            queries: Queries::new(cache, api),
        })
    }
}
