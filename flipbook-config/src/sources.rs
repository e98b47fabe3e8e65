use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::models::{SvgStrategyKind, TranscoderBackend};

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FileConfig {
    #[serde(default)]
    pub server: FileServerConfig,
    #[serde(default)]
    pub cors: FileCorsConfig,
    #[serde(default)]
    pub limits: FileLimitsConfig,
    #[serde(default)]
    pub fetch: FileFetchConfig,
    #[serde(default)]
    pub sniff: FileSniffConfig,
    #[serde(default)]
    pub transcoder: FileTranscoderConfig,
    pub dev_mode: Option<bool>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileServerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileCorsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_origins: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_methods: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_headers: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_credentials: Option<bool>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileLimitsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_upload_bytes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_source_bytes: Option<usize>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileFetchConfig {
    /// Human-readable duration, e.g. `"15s"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileSniffConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub svg_strategy: Option<SvgStrategyKind>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileTranscoderConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<TranscoderBackend>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ffmpeg_path: Option<String>,
    #[serde(default)]
    pub upload: FileUploadApiConfig,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileUploadApiConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_base: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_secret_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
}

/// Environment-derived configuration values.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub server_host: Option<String>,
    pub server_port: Option<u16>,
    pub cors_allowed_origins: Option<Vec<String>>,
    pub cors_allowed_methods: Option<Vec<String>>,
    pub cors_allowed_headers: Option<Vec<String>>,
    pub cors_allow_credentials: Option<bool>,
    pub max_upload_bytes: Option<usize>,
    pub max_source_bytes: Option<usize>,
    pub fetch_timeout: Option<String>,
    pub fetch_user_agent: Option<String>,
    pub svg_strategy: Option<String>,
    pub transcoder_backend: Option<String>,
    pub transcoder_timeout: Option<String>,
    pub ffmpeg_path: Option<String>,
    pub upload_api_base: Option<String>,
    pub upload_delivery_base: Option<String>,
    pub upload_cloud_name: Option<String>,
    pub upload_api_key: Option<String>,
    pub upload_api_secret: Option<String>,
    pub upload_api_secret_file: Option<PathBuf>,
    pub upload_folder: Option<String>,
    pub dev_mode: Option<bool>,
}

impl EnvConfig {
    pub fn gather() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the environment layer from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let csv = |name: &str| var(name).map(|raw| parse_csv(&raw));
        let flag = |name: &str| var(name).and_then(|raw| parse_bool(&raw));
        let number = |name: &str| var(name).and_then(|raw| raw.trim().parse().ok());

        Self {
            config_path: var("FLIPBOOK_CONFIG").map(PathBuf::from),
            server_host: var("SERVER_HOST"),
            server_port: var("SERVER_PORT").and_then(|s| s.trim().parse().ok()),
            cors_allowed_origins: csv("CORS_ALLOWED_ORIGINS"),
            cors_allowed_methods: csv("CORS_ALLOWED_METHODS"),
            cors_allowed_headers: csv("CORS_ALLOWED_HEADERS"),
            cors_allow_credentials: flag("CORS_ALLOW_CREDENTIALS"),
            max_upload_bytes: number("MAX_UPLOAD_BYTES"),
            max_source_bytes: number("MAX_SOURCE_BYTES"),
            fetch_timeout: var("FETCH_TIMEOUT"),
            fetch_user_agent: var("FETCH_USER_AGENT"),
            svg_strategy: var("SVG_DIMENSION_STRATEGY"),
            transcoder_backend: var("TRANSCODER_BACKEND"),
            transcoder_timeout: var("TRANSCODER_TIMEOUT"),
            ffmpeg_path: var("FFMPEG_PATH"),
            upload_api_base: var("UPLOAD_API_BASE"),
            upload_delivery_base: var("UPLOAD_DELIVERY_BASE"),
            upload_cloud_name: var("UPLOAD_CLOUD_NAME"),
            upload_api_key: var("UPLOAD_API_KEY"),
            upload_api_secret: var("UPLOAD_API_SECRET"),
            upload_api_secret_file: var("UPLOAD_API_SECRET_FILE").map(PathBuf::from),
            upload_folder: var("UPLOAD_FOLDER"),
            dev_mode: flag("DEV_MODE"),
        }
    }
}

fn parse_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .filter_map(|part| {
            let trimmed = part.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
        .collect()
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
