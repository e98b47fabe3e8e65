//! Error taxonomy shared by the sniffer and the dimension extractor.

use thiserror::Error;

use crate::kind::MediaKind;

/// Failures surfaced by the sniffing and dimension routines.
///
/// Missing SVG sizing attributes are not errors: they fall back to the
/// documented 800x600 default instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SniffError {
    /// The declared content type or extension is neither SVG nor GIF.
    #[error("unsupported media kind '{0}', expected svg or gif")]
    InvalidFormat(String),

    /// The buffer ends before the header bytes the format requires.
    #[error("{kind} buffer too short: need {needed} bytes, got {actual}")]
    MalformedInput {
        /// Format whose header was being read.
        kind: MediaKind,
        /// Minimum buffer length for the read.
        needed: usize,
        /// Length actually supplied.
        actual: usize,
    },

    /// A sizing value was present but did not parse to a usable number.
    #[error("{dimension} is not a usable size: {value}")]
    AmbiguousParse {
        /// `"width"` or `"height"`.
        dimension: &'static str,
        /// The value that was rejected, possibly `NaN`.
        value: f64,
    },
}

/// Result alias for sniffing and dimension routines.
pub type Result<T> = std::result::Result<T, SniffError>;
