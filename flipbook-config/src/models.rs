use std::{fmt, path::PathBuf, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;
pub const DEFAULT_MAX_SOURCE_BYTES: usize = 20 * 1024 * 1024;
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_TRANSCODE_TIMEOUT: Duration = Duration::from_secs(120);
pub const DEFAULT_UPLOAD_API_BASE: &str = "https://api.cloudinary.com/v1_1";
pub const DEFAULT_UPLOAD_DELIVERY_BASE: &str = "https://res.cloudinary.com";

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub limits: LimitsConfig,
    pub fetch: FetchConfig,
    pub sniff: SniffConfig,
    pub transcoder: TranscoderConfig,
    pub dev_mode: bool,
    pub metadata: ConfigMetadata,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<String>,
    pub allowed_headers: Vec<String>,
    pub allow_credentials: bool,
}

impl CorsConfig {
    pub fn is_wildcard_included(&self) -> bool {
        self.allowed_origins
            .iter()
            .any(|origin| origin.trim() == "*")
    }
}

/// Size ceilings for request bodies and fetched sources.
#[derive(Debug, Clone)]
pub struct LimitsConfig {
    pub max_upload_bytes: usize,
    pub max_source_bytes: usize,
}

/// Settings for downloading sources given by URL.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub timeout: Duration,
    pub user_agent: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SniffConfig {
    pub svg_strategy: SvgStrategyKind,
}

/// Which SVG attribute reader the server uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SvgStrategyKind {
    /// Structured parse with a pattern-scan fallback.
    #[default]
    Xml,
    /// Regular-expression scan only.
    Pattern,
}

impl FromStr for SvgStrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xml" => Ok(SvgStrategyKind::Xml),
            "pattern" | "regex" => Ok(SvgStrategyKind::Pattern),
            other => Err(other.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TranscoderConfig {
    pub backend: TranscoderBackend,
    pub timeout: Duration,
    pub ffmpeg: FfmpegConfig,
    pub upload: Option<UploadApiConfig>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscoderBackend {
    /// Local `ffmpeg` child process.
    #[default]
    Ffmpeg,
    /// Remote upload-and-transform media API.
    Upload,
}

impl TranscoderBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            TranscoderBackend::Ffmpeg => "ffmpeg",
            TranscoderBackend::Upload => "upload",
        }
    }
}

impl fmt::Display for TranscoderBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TranscoderBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ffmpeg" => Ok(TranscoderBackend::Ffmpeg),
            "upload" | "upload-api" => Ok(TranscoderBackend::Upload),
            other => Err(other.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FfmpegConfig {
    pub ffmpeg_path: String,
}

/// Credentials and endpoints for the remote upload-and-transform API.
#[derive(Clone)]
pub struct UploadApiConfig {
    pub api_base: String,
    pub delivery_base: String,
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub folder: Option<String>,
}

impl fmt::Debug for UploadApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadApiConfig")
            .field("api_base", &self.api_base)
            .field("delivery_base", &self.delivery_base)
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("folder", &self.folder)
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfigMetadata {
    pub config_path: Option<PathBuf>,
    pub env_file_loaded: bool,
}
