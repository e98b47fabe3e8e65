use std::{fmt, sync::Arc};

use anyhow::Context;
use flipbook_config::{Config, FetchConfig, SvgStrategyKind};
use flipbook_core::dimensions::{
    PatternStrategy, SvgDimensionStrategy, XmlStrategy,
};

use crate::transcode::Transcoder;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Client for URL sources and the upload backend.
    pub http: reqwest::Client,
    pub transcoder: Arc<dyn Transcoder>,
    pub svg_strategy: Arc<dyn SvgDimensionStrategy>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("transcoder", &self.transcoder.backend())
            .field("svg_strategy", &self.svg_strategy)
            .finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(
        config: Config,
        http: reqwest::Client,
        transcoder: Arc<dyn Transcoder>,
    ) -> Self {
        let svg_strategy = svg_strategy_for(config.sniff.svg_strategy);
        Self {
            config: Arc::new(config),
            http,
            transcoder,
            svg_strategy,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

pub fn svg_strategy_for(kind: SvgStrategyKind) -> Arc<dyn SvgDimensionStrategy> {
    match kind {
        SvgStrategyKind::Xml => Arc::new(XmlStrategy),
        SvgStrategyKind::Pattern => Arc::new(PatternStrategy),
    }
}

/// Shared HTTP client honouring the fetch timeout and user agent.
pub fn build_http_client(fetch: &FetchConfig) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(fetch.timeout)
        .user_agent(fetch.user_agent.clone())
        .build()
        .context("failed to build HTTP client")
}
