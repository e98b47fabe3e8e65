//! Request intake: turns a multipart upload or a URL reference into a
//! [`SourceImage`] with a resolved [`MediaKind`].
//!
//! The kind is always taken from what the client declared: an explicit
//! `kind` field, the part or response content type, or the file name / URL
//! extension, in that order. Buffers are never sniffed to guess their kind.

pub mod fetch;

use axum::{
    Json,
    body::Bytes,
    extract::{FromRequest, Multipart, Request, multipart::MultipartError},
    http::{StatusCode, header},
};
use flipbook_core::{MediaKind, SniffError};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::infra::{app_state::AppState, errors::AppError};

pub use fetch::{FetchedSource, fetch_source};

const DEFAULT_STEM: &str = "output";

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("request body is empty")]
    EmptyPayload,
    #[error("expected a `file` part or a `url` field")]
    MissingSource,
    #[error("unsupported request content type '{0}', expected multipart/form-data or application/json")]
    UnsupportedContentType(String),
    #[error("malformed multipart body: {0}")]
    Multipart(String),
    #[error("malformed JSON body: {0}")]
    InvalidJson(String),
    #[error("invalid source URL '{0}'")]
    InvalidUrl(String),
    #[error("unsupported URL scheme '{0}', expected http or https")]
    UnsupportedScheme(String),
    #[error("source exceeds the {limit} byte limit")]
    TooLarge { limit: usize },
    #[error("upstream returned HTTP {status} for {url}")]
    Upstream { status: u16, url: String },
    #[error("failed to fetch source: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error(transparent)]
    Kind(#[from] SniffError),
}

/// JSON body accepted by the conversion endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct UrlRequest {
    pub url: String,
    #[serde(default)]
    pub kind: Option<String>,
}

/// A source as the client described it, before any network access.
#[derive(Debug, Clone)]
pub enum SourceRequest {
    Upload {
        bytes: Bytes,
        content_type: Option<String>,
        file_name: Option<String>,
        kind: Option<String>,
    },
    Url {
        url: String,
        kind: Option<String>,
    },
}

/// Source bytes ready for sniffing.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub bytes: Bytes,
    pub kind: MediaKind,
    /// File stem used for the `Content-Disposition` of the converted output.
    pub stem: String,
}

impl SourceRequest {
    /// Resolves the declared kind and, for URL sources, downloads the bytes.
    pub async fn resolve(
        self,
        state: &AppState,
    ) -> Result<SourceImage, IntakeError> {
        match self {
            SourceRequest::Upload {
                bytes,
                content_type,
                file_name,
                kind,
            } => {
                let limit = state.config().limits.max_upload_bytes;
                if bytes.len() > limit {
                    return Err(IntakeError::TooLarge { limit });
                }
                if bytes.is_empty() {
                    return Err(IntakeError::EmptyPayload);
                }
                let kind = resolve_kind(
                    kind.as_deref(),
                    content_type.as_deref(),
                    file_name.as_deref(),
                )?;
                Ok(SourceImage {
                    bytes,
                    kind,
                    stem: file_stem(file_name.as_deref()),
                })
            }
            SourceRequest::Url { url, kind } => {
                let fetched = fetch_source(
                    &state.http,
                    &url,
                    state.config().limits.max_source_bytes,
                )
                .await?;
                if fetched.bytes.is_empty() {
                    return Err(IntakeError::EmptyPayload);
                }
                let kind = resolve_kind(
                    kind.as_deref(),
                    fetched.content_type.as_deref(),
                    Some(fetched.url.path()),
                )?;
                Ok(SourceImage {
                    stem: file_stem(fetched.url.path_segments().and_then(
                        |mut segments| segments.next_back(),
                    )),
                    bytes: fetched.bytes,
                    kind,
                })
            }
        }
    }
}

impl FromRequest<AppState> for SourceRequest {
    type Rejection = AppError;

    async fn from_request(
        req: Request,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|rejection| {
                    IntakeError::Multipart(rejection.body_text())
                })?;
            let limit = state.config().limits.max_upload_bytes;
            Ok(read_multipart(multipart, limit).await?)
        } else if content_type.starts_with("application/json") {
            let Json(body) = Json::<UrlRequest>::from_request(req, state)
                .await
                .map_err(|rejection| {
                    IntakeError::InvalidJson(rejection.body_text())
                })?;
            if body.url.trim().is_empty() {
                return Err(IntakeError::MissingSource.into());
            }
            Ok(SourceRequest::Url {
                url: body.url.trim().to_string(),
                kind: body.kind,
            })
        } else if content_type.is_empty() {
            Err(IntakeError::EmptyPayload.into())
        } else {
            Err(IntakeError::UnsupportedContentType(content_type).into())
        }
    }
}

async fn read_multipart(
    mut multipart: Multipart,
    limit: usize,
) -> Result<SourceRequest, IntakeError> {
    let multipart_error = |err: MultipartError| {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            IntakeError::TooLarge { limit }
        } else {
            IntakeError::Multipart(err.body_text())
        }
    };

    let mut upload: Option<(Bytes, Option<String>, Option<String>)> = None;
    let mut url: Option<String> = None;
    let mut kind: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let content_type = field.content_type().map(str::to_string);
                let file_name = field.file_name().map(str::to_string);
                let bytes = field.bytes().await.map_err(multipart_error)?;
                upload = Some((bytes, content_type, file_name));
            }
            Some("url") => {
                let text = field.text().await.map_err(multipart_error)?;
                if !text.trim().is_empty() {
                    url = Some(text.trim().to_string());
                }
            }
            Some("kind") => {
                let text = field.text().await.map_err(multipart_error)?;
                if !text.trim().is_empty() {
                    kind = Some(text.trim().to_string());
                }
            }
            other => {
                debug!(field = ?other, "ignoring multipart field");
            }
        }
    }

    match (upload, url) {
        (Some((bytes, content_type, file_name)), _) => Ok(SourceRequest::Upload {
            bytes,
            content_type,
            file_name,
            kind,
        }),
        (None, Some(url)) => Ok(SourceRequest::Url { url, kind }),
        (None, None) => Err(IntakeError::MissingSource),
    }
}

/// Picks the kind from the first declaration that names SVG or GIF.
///
/// An explicit `kind` is authoritative and fails when it names anything
/// else. Generic content types such as `application/octet-stream` defer to
/// the file name.
pub fn resolve_kind(
    explicit: Option<&str>,
    content_type: Option<&str>,
    path: Option<&str>,
) -> Result<MediaKind, SniffError> {
    if let Some(explicit) = explicit {
        return MediaKind::parse_declared(explicit);
    }

    if let Some(kind) = content_type.and_then(MediaKind::from_content_type) {
        return Ok(kind);
    }

    if let Some(kind) = path.and_then(MediaKind::from_path) {
        return Ok(kind);
    }

    let declared = content_type
        .or(path)
        .filter(|value| !value.trim().is_empty())
        .unwrap_or("unknown");
    Err(SniffError::InvalidFormat(declared.to_string()))
}

/// File stem for the converted output: the name without its extension,
/// restricted to characters that are safe inside a quoted header value.
pub fn file_stem(name: Option<&str>) -> String {
    let Some(name) = name else {
        return DEFAULT_STEM.to_string();
    };

    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let stem = match base.rsplit_once('.') {
        Some((stem, _)) => stem,
        None => base,
    };

    let cleaned: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.trim_matches(['_', '.']).is_empty() {
        DEFAULT_STEM.to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_kind_wins_over_content_type() {
        let kind =
            resolve_kind(Some("gif"), Some("image/svg+xml"), Some("a.svg")).unwrap();
        assert_eq!(kind, MediaKind::Gif);
    }

    #[test]
    fn explicit_kind_must_be_supported() {
        let err = resolve_kind(Some("png"), Some("image/gif"), None).unwrap_err();
        assert_eq!(err, SniffError::InvalidFormat("png".into()));
    }

    #[test]
    fn generic_content_type_defers_to_file_name() {
        let kind = resolve_kind(
            None,
            Some("application/octet-stream"),
            Some("/files/logo.SVG"),
        )
        .unwrap();
        assert_eq!(kind, MediaKind::Svg);
    }

    #[test]
    fn content_type_parameters_are_ignored() {
        let kind =
            resolve_kind(None, Some("image/svg+xml; charset=utf-8"), None).unwrap();
        assert_eq!(kind, MediaKind::Svg);
    }

    #[test]
    fn undeclared_kind_is_invalid_format() {
        let err = resolve_kind(None, Some("image/png"), Some("photo.png")).unwrap_err();
        assert_eq!(err, SniffError::InvalidFormat("image/png".into()));

        let err = resolve_kind(None, None, None).unwrap_err();
        assert_eq!(err, SniffError::InvalidFormat("unknown".into()));
    }

    #[test]
    fn stems_are_sanitized() {
        assert_eq!(file_stem(Some("spinner.gif")), "spinner");
        assert_eq!(file_stem(Some("dir/sub/logo.v2.svg")), "logo.v2");
        assert_eq!(file_stem(Some("my \"file\".svg")), "my__file_");
        assert_eq!(file_stem(Some(".svg")), "output");
        assert_eq!(file_stem(Some("")), "output");
        assert_eq!(file_stem(None), "output");
    }
}
