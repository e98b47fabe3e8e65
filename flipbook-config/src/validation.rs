use axum::http::{Method, header::HeaderName};
use thiserror::Error;
use url::Url;

use crate::models::{Config, CorsConfig, TranscoderBackend, UploadApiConfig};

#[derive(Debug, Error)]
pub enum ConfigGuardRailError {
    #[error("upload transcoder selected but {field} is not configured")]
    MissingUploadCredentials { field: &'static str },
    #[error("CORS wildcard origins are not allowed when DEV_MODE is false")]
    DangerousCorsWildcard,
    #[error("CORS_ALLOWED_ORIGINS must list at least one origin when DEV_MODE is false")]
    MissingCorsOrigins,
    #[error("invalid CORS configuration: {reason}")]
    InvalidCorsConfig { reason: String },
    #[error("invalid URL '{value}' for {field}")]
    InvalidUrl { field: &'static str, value: String },
    #[error("{field} must be greater than zero")]
    ZeroLimit { field: &'static str },
}

#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct ConfigWarnings {
    pub items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    pub fn push<S: Into<String>>(&mut self, message: S) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: None,
        });
    }

    pub fn push_with_hint<S: Into<String>, H: Into<String>>(
        &mut self,
        message: S,
        hint: H,
    ) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn extend(&mut self, other: ConfigWarnings) {
        self.items.extend(other.items);
    }
}

pub fn apply_guard_rails(
    config: &Config,
) -> Result<ConfigWarnings, ConfigGuardRailError> {
    let mut warnings = ConfigWarnings::default();

    if !config.dev_mode && config.cors.is_wildcard_included() {
        return Err(ConfigGuardRailError::DangerousCorsWildcard);
    }
    if !config.dev_mode && config.cors.allowed_origins.is_empty() {
        return Err(ConfigGuardRailError::MissingCorsOrigins);
    }

    validate_cors(&config.cors)?;

    if config.limits.max_upload_bytes == 0 {
        return Err(ConfigGuardRailError::ZeroLimit {
            field: "MAX_UPLOAD_BYTES",
        });
    }
    if config.limits.max_source_bytes == 0 {
        return Err(ConfigGuardRailError::ZeroLimit {
            field: "MAX_SOURCE_BYTES",
        });
    }
    if config.limits.max_source_bytes > config.limits.max_upload_bytes {
        warnings.push_with_hint(
            "MAX_SOURCE_BYTES exceeds MAX_UPLOAD_BYTES; uploaded files are capped by the smaller request body limit",
            "Raise MAX_UPLOAD_BYTES to accept uploads as large as fetched sources",
        );
    }

    if config.fetch.timeout.is_zero() {
        warnings.push_with_hint(
            "FETCH_TIMEOUT is zero; every URL fetch will time out immediately",
            "Use a humantime value such as \"15s\"",
        );
    }
    if config.transcoder.timeout.is_zero() {
        warnings.push_with_hint(
            "TRANSCODER_TIMEOUT is zero; every conversion will time out immediately",
            "Use a humantime value such as \"2m\"",
        );
    }

    match (config.transcoder.backend, &config.transcoder.upload) {
        (TranscoderBackend::Upload, None) => {
            return Err(ConfigGuardRailError::MissingUploadCredentials {
                field: "UPLOAD_CLOUD_NAME, UPLOAD_API_KEY and UPLOAD_API_SECRET",
            });
        }
        (TranscoderBackend::Upload, Some(upload)) => {
            validate_upload(upload, config.dev_mode, &mut warnings)?;
        }
        (TranscoderBackend::Ffmpeg, Some(_)) => {
            warnings.push_with_hint(
                "Upload API credentials are configured but TRANSCODER_BACKEND is ffmpeg",
                "Set TRANSCODER_BACKEND=upload to convert through the remote API",
            );
        }
        (TranscoderBackend::Ffmpeg, None) => {}
    }

    if config.cors.allow_credentials && config.cors.is_wildcard_included() {
        warnings.push(
            "CORS credentials allowed alongside wildcard origin; browsers will reject such configuration",
        );
    }

    Ok(warnings)
}

fn validate_upload(
    upload: &UploadApiConfig,
    dev_mode: bool,
    warnings: &mut ConfigWarnings,
) -> Result<(), ConfigGuardRailError> {
    for (field, value) in [
        ("UPLOAD_API_BASE", &upload.api_base),
        ("UPLOAD_DELIVERY_BASE", &upload.delivery_base),
    ] {
        let url = Url::parse(value).map_err(|_| {
            ConfigGuardRailError::InvalidUrl {
                field,
                value: value.clone(),
            }
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigGuardRailError::InvalidUrl {
                field,
                value: value.clone(),
            });
        }

        if url.scheme() == "http" && !dev_mode {
            warnings.push_with_hint(
                format!("{field} uses plain http; credentials travel unencrypted"),
                "Use an https endpoint outside of DEV_MODE",
            );
        }
    }

    Ok(())
}

fn validate_cors(cors: &CorsConfig) -> Result<(), ConfigGuardRailError> {
    if cors.allowed_methods.is_empty() {
        return Err(ConfigGuardRailError::InvalidCorsConfig {
            reason:
                "CORS_ALLOWED_METHODS must include at least one HTTP method"
                    .into(),
        });
    }

    for method in &cors.allowed_methods {
        Method::from_bytes(method.as_bytes()).map_err(|_| {
            ConfigGuardRailError::InvalidCorsConfig {
                reason: format!(
                    "invalid HTTP method `{}` in CORS_ALLOWED_METHODS",
                    method
                ),
            }
        })?;
    }

    if cors.allowed_headers.is_empty() {
        return Err(ConfigGuardRailError::InvalidCorsConfig {
            reason:
                "CORS_ALLOWED_HEADERS must include at least one header name"
                    .into(),
        });
    }

    for header in &cors.allowed_headers {
        HeaderName::from_bytes(header.as_bytes()).map_err(|_| {
            ConfigGuardRailError::InvalidCorsConfig {
                reason: format!(
                    "invalid header name `{}` in CORS_ALLOWED_HEADERS",
                    header
                ),
            }
        })?;
    }

    Ok(())
}
