//! Declared source formats and output containers.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{error::SniffError, sniff::AnimationVerdict};

/// Source formats Flipbook accepts.
///
/// The kind always comes from what the caller declared (a content type, a
/// file name or an explicit `svg`/`gif` token). Buffers are never sniffed to
/// guess their kind; the GIF signature check in the sniffer only guards the
/// frame scan.
#[derive(
    Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Scalable Vector Graphics, handled as UTF-8 text.
    Svg,
    /// Graphics Interchange Format, handled as raw bytes.
    Gif,
}

impl MediaKind {
    /// Canonical lowercase token.
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Svg => "svg",
            MediaKind::Gif => "gif",
        }
    }

    /// MIME type of the source format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            MediaKind::Svg => "image/svg+xml",
            MediaKind::Gif => "image/gif",
        }
    }

    /// Parses a `Content-Type` header value, ignoring parameters such as
    /// `; charset=utf-8`.
    pub fn from_content_type(value: &str) -> Option<Self> {
        let essence = value.split(';').next().unwrap_or_default().trim();
        if essence.eq_ignore_ascii_case("image/svg+xml") {
            Some(MediaKind::Svg)
        } else if essence.eq_ignore_ascii_case("image/gif") {
            Some(MediaKind::Gif)
        } else {
            None
        }
    }

    /// Resolves a kind from the extension of a file name or URL path.
    pub fn from_path(path: &str) -> Option<Self> {
        let trimmed = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim_end_matches('/');
        let (_, ext) = trimmed.rsplit_once('.')?;
        if ext.contains('/') {
            return None;
        }
        Self::from_token(ext)
    }

    fn from_token(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case("svg") {
            Some(MediaKind::Svg)
        } else if value.eq_ignore_ascii_case("gif") {
            Some(MediaKind::Gif)
        } else {
            None
        }
    }

    /// Accepts any of the declared forms: a bare token (`svg`), a MIME type
    /// (`image/gif`) or a file name (`logo.svg`).
    pub fn parse_declared(value: &str) -> Result<Self, SniffError> {
        let trimmed = value.trim();
        Self::from_token(trimmed)
            .or_else(|| Self::from_content_type(trimmed))
            .or_else(|| Self::from_path(trimmed))
            .ok_or_else(|| SniffError::InvalidFormat(trimmed.to_string()))
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = SniffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MediaKind::parse_declared(s)
    }
}

/// Container the converted output is written in.
#[derive(
    Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputContainer {
    /// Single still frame.
    Png,
    /// H.264 video for animated sources.
    Mp4,
}

impl OutputContainer {
    /// Static sources become PNG, animated sources become MP4.
    pub fn for_verdict(verdict: AnimationVerdict) -> Self {
        if verdict.animated {
            OutputContainer::Mp4
        } else {
            OutputContainer::Png
        }
    }

    /// MIME type sent with the converted output.
    pub fn content_type(&self) -> &'static str {
        match self {
            OutputContainer::Png => "image/png",
            OutputContainer::Mp4 => "video/mp4",
        }
    }

    /// File extension without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputContainer::Png => "png",
            OutputContainer::Mp4 => "mp4",
        }
    }
}

impl fmt::Display for OutputContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_tokens_case_insensitively() {
        assert_eq!(MediaKind::parse_declared("SVG"), Ok(MediaKind::Svg));
        assert_eq!(MediaKind::parse_declared(" gif "), Ok(MediaKind::Gif));
    }

    #[test]
    fn parses_content_types_with_parameters() {
        assert_eq!(
            MediaKind::from_content_type("image/svg+xml; charset=utf-8"),
            Some(MediaKind::Svg)
        );
        assert_eq!(
            MediaKind::from_content_type("IMAGE/GIF"),
            Some(MediaKind::Gif)
        );
        assert_eq!(MediaKind::from_content_type("image/png"), None);
    }

    #[test]
    fn resolves_extensions_from_names_and_url_paths() {
        assert_eq!(MediaKind::from_path("logo.svg"), Some(MediaKind::Svg));
        assert_eq!(
            MediaKind::from_path("/media/loop.GIF?v=3#top"),
            Some(MediaKind::Gif)
        );
        assert_eq!(MediaKind::from_path("/dir.svg/file"), None);
        assert_eq!(MediaKind::from_path("noext"), None);
    }

    #[test]
    fn rejects_unsupported_kinds() {
        assert_eq!(
            "image/png".parse::<MediaKind>(),
            Err(SniffError::InvalidFormat("image/png".to_string()))
        );
        assert!(matches!(
            MediaKind::parse_declared("photo.jpeg"),
            Err(SniffError::InvalidFormat(_))
        ));
    }

    #[test]
    fn container_follows_verdict() {
        let animated = AnimationVerdict { animated: true };
        let still = AnimationVerdict { animated: false };
        assert_eq!(OutputContainer::for_verdict(animated), OutputContainer::Mp4);
        assert_eq!(OutputContainer::for_verdict(still), OutputContainer::Png);
        assert_eq!(OutputContainer::Mp4.content_type(), "video/mp4");
        assert_eq!(OutputContainer::Png.content_type(), "image/png");
    }
}
