use once_cell::sync::Lazy;
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;
use tracing::debug;

use crate::{
    models::{
        Config, ConfigMetadata, CorsConfig, DEFAULT_FETCH_TIMEOUT,
        DEFAULT_MAX_SOURCE_BYTES, DEFAULT_MAX_UPLOAD_BYTES,
        DEFAULT_TRANSCODE_TIMEOUT, DEFAULT_UPLOAD_API_BASE,
        DEFAULT_UPLOAD_DELIVERY_BASE, FetchConfig, FfmpegConfig, LimitsConfig,
        ServerConfig, SniffConfig, SvgStrategyKind, TranscoderBackend,
        TranscoderConfig, UploadApiConfig,
    },
    sources::{EnvConfig, FileConfig, FileUploadApiConfig},
    validation::{self, ConfigGuardRailError, ConfigWarnings},
};

static DEFAULT_CONFIG_LOCATIONS: Lazy<Vec<PathBuf>> = Lazy::new(|| {
    vec![
        PathBuf::from("flipbook.toml"),
        PathBuf::from("config/flipbook.toml"),
    ]
});

#[derive(Debug, Default, Clone)]
pub struct ConfigLoaderOptions {
    pub config_path: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
}

#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ConfigLoaderOptions) -> Self {
        Self { options }
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.env_file = Some(path.into());
        self
    }

    /// Loads `.env`, gathers the process environment and composes the final
    /// configuration.
    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let env_file_loaded = match &self.options.env_file {
            Some(path) => dotenvy::from_path(path).map(|_| true).or_else(
                |err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                },
            )?,
            None => {
                dotenvy::dotenv().map(|_| true).or_else(|err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                })?
            }
        };

        let mut load = self.load_with_env(EnvConfig::gather())?;
        load.config.metadata.env_file_loaded = env_file_loaded;
        Ok(load)
    }

    /// Composes configuration from an already-gathered environment layer.
    /// Does not touch `.env` files or the process environment.
    pub fn load_with_env(
        &self,
        env: EnvConfig,
    ) -> Result<ConfigLoad, ConfigLoadError> {
        let (file_config, config_path) = self.load_file_config(&env)?;
        let (config, warnings) =
            self.compose_config(file_config, env, config_path)?;
        Ok(ConfigLoad { config, warnings })
    }

    fn load_file_config(
        &self,
        env: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        let (path, explicit) = match (&self.options.config_path, &env.config_path)
        {
            (Some(path), _) | (None, Some(path)) => (Some(path.clone()), true),
            (None, None) => (
                DEFAULT_CONFIG_LOCATIONS
                    .iter()
                    .find(|candidate| candidate.exists())
                    .cloned(),
                false,
            ),
        };

        let Some(path) = path else {
            return Ok((None, None));
        };

        if !path.exists() {
            if explicit {
                return Err(ConfigLoadError::MissingConfig { path });
            }
            return Ok((None, None));
        }

        let contents =
            fs::read_to_string(&path).map_err(|err| ConfigLoadError::Io {
                path: path.clone(),
                source: err,
            })?;
        let file_config: FileConfig =
            toml::from_str(&contents).map_err(|err| ConfigLoadError::Parse {
                path: path.clone(),
                source: err,
            })?;

        debug!(path = %path.display(), "loaded configuration file");
        Ok((Some(file_config), Some(path)))
    }

    fn compose_config(
        &self,
        file_config: Option<FileConfig>,
        env: EnvConfig,
        config_path: Option<PathBuf>,
    ) -> Result<(Config, ConfigWarnings), ConfigLoadError> {
        let mut warnings = ConfigWarnings::default();

        if config_path.is_none() {
            warnings.push_with_hint(
                "No flipbook.toml detected; using defaults and environment variables",
                "Create flipbook.toml or point FLIPBOOK_CONFIG at a configuration file",
            );
        }

        let FileConfig {
            server: file_server,
            cors: file_cors,
            limits: file_limits,
            fetch: file_fetch,
            sniff: file_sniff,
            transcoder: file_transcoder,
            dev_mode: file_dev_mode,
        } = file_config.unwrap_or_default();

        let server = ServerConfig {
            host: env
                .server_host
                .clone()
                .or(file_server.host)
                .unwrap_or_else(|| "0.0.0.0".to_string()),
            port: env.server_port.or(file_server.port).unwrap_or(3000),
        };

        let cors = CorsConfig {
            allowed_origins: env
                .cors_allowed_origins
                .clone()
                .or(file_cors.allowed_origins)
                .unwrap_or_else(default_cors_origins),
            allowed_methods: env
                .cors_allowed_methods
                .clone()
                .or(file_cors.allowed_methods)
                .unwrap_or_else(default_cors_methods),
            allowed_headers: env
                .cors_allowed_headers
                .clone()
                .or(file_cors.allowed_headers)
                .unwrap_or_else(default_cors_headers),
            allow_credentials: env
                .cors_allow_credentials
                .or(file_cors.allow_credentials)
                .unwrap_or(false),
        };

        let limits = LimitsConfig {
            max_upload_bytes: env
                .max_upload_bytes
                .or(file_limits.max_upload_bytes)
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            max_source_bytes: env
                .max_source_bytes
                .or(file_limits.max_source_bytes)
                .unwrap_or(DEFAULT_MAX_SOURCE_BYTES),
        };

        let fetch = FetchConfig {
            timeout: resolve_duration(
                "fetch.timeout",
                env.fetch_timeout.as_deref().or(file_fetch.timeout.as_deref()),
                DEFAULT_FETCH_TIMEOUT,
            )?,
            user_agent: env
                .fetch_user_agent
                .clone()
                .or(file_fetch.user_agent)
                .unwrap_or_else(|| {
                    format!("flipbook/{}", env!("CARGO_PKG_VERSION"))
                }),
        };

        let svg_strategy = match env.svg_strategy.as_deref() {
            Some(raw) => raw.parse::<SvgStrategyKind>().map_err(|value| {
                ConfigLoadError::InvalidValue {
                    field: "SVG_DIMENSION_STRATEGY",
                    value,
                }
            })?,
            None => file_sniff.svg_strategy.unwrap_or_default(),
        };

        let backend = match env.transcoder_backend.as_deref() {
            Some(raw) => raw.parse::<TranscoderBackend>().map_err(|value| {
                ConfigLoadError::InvalidValue {
                    field: "TRANSCODER_BACKEND",
                    value,
                }
            })?,
            None => file_transcoder.backend.unwrap_or_default(),
        };

        let transcoder = TranscoderConfig {
            backend,
            timeout: resolve_duration(
                "transcoder.timeout",
                env.transcoder_timeout
                    .as_deref()
                    .or(file_transcoder.timeout.as_deref()),
                DEFAULT_TRANSCODE_TIMEOUT,
            )?,
            ffmpeg: FfmpegConfig {
                ffmpeg_path: env
                    .ffmpeg_path
                    .clone()
                    .or(file_transcoder.ffmpeg_path)
                    .unwrap_or_else(|| "ffmpeg".into()),
            },
            upload: Self::resolve_upload(&env, file_transcoder.upload)?,
        };

        let dev_mode = env.dev_mode.or(file_dev_mode).unwrap_or(false);

        let config = Config {
            server,
            cors,
            limits,
            fetch,
            sniff: SniffConfig { svg_strategy },
            transcoder,
            dev_mode,
            metadata: ConfigMetadata {
                config_path,
                env_file_loaded: false,
            },
        };

        let guard_warnings = validation::apply_guard_rails(&config)?;
        warnings.extend(guard_warnings);

        Ok((config, warnings))
    }

    /// Upload credentials are only materialized when cloud name, key and
    /// secret are all present; partial sets are reported by the guard rails
    /// when the upload backend is selected.
    fn resolve_upload(
        env: &EnvConfig,
        file: FileUploadApiConfig,
    ) -> Result<Option<UploadApiConfig>, ConfigLoadError> {
        let secret = match env.upload_api_secret.clone() {
            Some(secret) => Some(secret),
            None => match env
                .upload_api_secret_file
                .as_ref()
                .or(file.api_secret_file.as_ref())
            {
                Some(path) => Self::read_secret_file(path)?,
                None => None,
            },
        };

        let cloud_name = env.upload_cloud_name.clone().or(file.cloud_name);
        let api_key = env.upload_api_key.clone().or(file.api_key);

        let (Some(cloud_name), Some(api_key), Some(api_secret)) =
            (cloud_name, api_key, secret)
        else {
            return Ok(None);
        };

        Ok(Some(UploadApiConfig {
            api_base: env
                .upload_api_base
                .clone()
                .or(file.api_base)
                .unwrap_or_else(|| DEFAULT_UPLOAD_API_BASE.to_string()),
            delivery_base: env
                .upload_delivery_base
                .clone()
                .or(file.delivery_base)
                .unwrap_or_else(|| DEFAULT_UPLOAD_DELIVERY_BASE.to_string()),
            cloud_name,
            api_key,
            api_secret,
            folder: env.upload_folder.clone().or(file.folder),
        }))
    }

    fn read_secret_file(
        path: &Path,
    ) -> Result<Option<String>, ConfigLoadError> {
        let contents = fs::read_to_string(path).map_err(|source| {
            ConfigLoadError::SecretFileIo {
                path: path.to_path_buf(),
                source,
            }
        })?;
        let trimmed = contents.trim();
        if trimmed.is_empty() {
            Ok(None)
        } else {
            Ok(Some(trimmed.to_string()))
        }
    }
}

fn resolve_duration(
    field: &'static str,
    raw: Option<&str>,
    default: Duration,
) -> Result<Duration, ConfigLoadError> {
    match raw {
        Some(value) => humantime::parse_duration(value.trim()).map_err(|source| {
            ConfigLoadError::InvalidDuration {
                field,
                value: value.to_string(),
                source,
            }
        }),
        None => Ok(default),
    }
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("configuration file missing: {path}")]
    MissingConfig { path: PathBuf },
    #[error("failed to read configuration {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value '{value}' for {field}")]
    InvalidValue { field: &'static str, value: String },
    #[error("invalid duration '{value}' for {field}")]
    InvalidDuration {
        field: &'static str,
        value: String,
        #[source]
        source: humantime::DurationError,
    },
    #[error("failed to read secret file {path}")]
    SecretFileIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    GuardRail(#[from] ConfigGuardRailError),
    #[error(transparent)]
    EnvFile(#[from] dotenvy::Error),
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://localhost:5173".to_string(),
    ]
}

fn default_cors_methods() -> Vec<String> {
    vec!["GET".to_string(), "POST".to_string(), "OPTIONS".to_string()]
}

fn default_cors_headers() -> Vec<String> {
    vec!["Content-Type".to_string(), "Authorization".to_string()]
}

#[derive(Debug)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: ConfigWarnings,
}
