//! # Flipbook Core
//!
//! Format sniffing and intrinsic dimension extraction for the two source
//! formats Flipbook converts: SVG and GIF.
//!
//! ## Overview
//!
//! - **Sniffing**: [`sniff::classify`] decides whether a buffer of a given
//!   [`MediaKind`] is animated. The verdict picks the output container
//!   (PNG for static sources, MP4 for animated ones).
//! - **Dimensions**: [`dimensions::extract_dimensions`] recovers the
//!   width/height the source declares so the transcode keeps its aspect
//!   ratio. [`ScaleDirective`] turns them into the `scale=W:H` form encoders
//!   consume.
//!
//! Every routine here is a pure function over an in-memory buffer. Nothing
//! in this crate performs I/O, allocates shared state or suspends.
//!
//! ## Examples
//!
//! ```
//! use flipbook_core::{MediaKind, OutputContainer, ScaleDirective};
//!
//! let svg = br#"<svg viewBox="0 0 120 80"><circle r="4"/></svg>"#;
//! let verdict = flipbook_core::classify(svg, MediaKind::Svg);
//! assert_eq!(OutputContainer::for_verdict(verdict), OutputContainer::Png);
//!
//! let dims = flipbook_core::extract_dimensions(svg, MediaKind::Svg).unwrap();
//! let scale = ScaleDirective::try_from(&dims).unwrap();
//! assert_eq!(scale.to_string(), "scale=120:80");
//! ```

pub mod dimensions;
pub mod error;
pub mod kind;
pub mod scale;
pub mod sniff;

pub use dimensions::{
    DEFAULT_HEIGHT, DEFAULT_WIDTH, DimensionSource, Dimensions,
    extract_dimensions, extract_dimensions_declared,
};
pub use error::{Result, SniffError};
pub use kind::{MediaKind, OutputContainer};
pub use scale::ScaleDirective;
pub use sniff::{AnimationVerdict, classify, classify_declared};
