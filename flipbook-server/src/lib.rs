//! # Flipbook Server
//!
//! HTTP front end that turns SVG and GIF sources into PNG stills or MP4
//! clips.
//!
//! ## Overview
//!
//! - **Intake**: multipart uploads (`file`) or URL references (`url`, as a
//!   multipart field or a JSON body)
//! - **Analysis**: `flipbook-core` decides animated vs static and extracts
//!   the intrinsic size
//! - **Transcoding**: a local `ffmpeg` process or a remote upload API,
//!   chosen in configuration
//!
//! Routes are nested under `/api/v1`; `/ping` and `/health` sit at the root.

pub mod analysis;
pub mod app;
pub mod handlers;
pub mod infra;
pub mod intake;
pub mod routes;
pub mod transcode;

pub use app::create_app;
pub use infra::app_state::AppState;
