//! Shared configuration library for Flipbook.
//!
//! Configuration is layered: built-in defaults, then an optional TOML file,
//! then environment variables (after a `.env` file, if any, has been loaded
//! with `dotenvy`). The composed [`Config`] is passed through guard rails
//! that reject unsafe combinations and collect non-fatal warnings.

pub mod loader;
pub mod models;
pub mod sources;
pub mod validation;

pub use loader::{ConfigLoad, ConfigLoadError, ConfigLoader, ConfigLoaderOptions};
pub use models::{
    Config, ConfigMetadata, CorsConfig, FetchConfig, FfmpegConfig, LimitsConfig,
    ServerConfig, SniffConfig, SvgStrategyKind, TranscoderBackend,
    TranscoderConfig, UploadApiConfig,
};
pub use sources::{EnvConfig, FileConfig};
pub use validation::{ConfigGuardRailError, ConfigWarning, ConfigWarnings};
