#![allow(dead_code)]

use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use axum::{Router, body::Bytes};
use axum_test::TestServer;
use flipbook_config::{Config, ConfigLoader, EnvConfig};
use flipbook_server::{
    AppState, create_app,
    infra::app_state::build_http_client,
    transcode::{
        BackendHealth, TranscodeError, TranscodeJob, TranscodeOutput,
        Transcoder,
    },
};

const GRAPHIC_CONTROL: [u8; 8] = [0x21, 0xF9, 0x04, 0x00, 0x05, 0x00, 0x00, 0x00];
const FRAME: [u8; 15] = [
    0x2C, 0x00, 0x00, 0x00, 0x00, 0x0A, 0x00, 0x1E, 0x00, 0x00, 0x02, 0x02, 0x4C,
    0x01, 0x00,
];

/// A 10x30 GIF with `frames` graphic-control/image pairs.
pub fn gif(frames: usize) -> Vec<u8> {
    let mut out = b"GIF89a".to_vec();
    out.extend_from_slice(&[0x0A, 0x00, 0x1E, 0x00, 0x00, 0x00, 0x00]);
    for _ in 0..frames {
        out.extend_from_slice(&GRAPHIC_CONTROL);
        out.extend_from_slice(&FRAME);
    }
    out.push(0x3B);
    out
}

pub const STATIC_SVG: &str =
    r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 120 80"><rect width="10" height="10"/></svg>"#;

pub const ANIMATED_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="64" height="48"><circle r="4"><animate attributeName="r" to="9" dur="1s"/></circle></svg>"#;

/// Fake backend that records every job and echoes a marker payload.
#[derive(Debug, Default)]
pub struct RecordingTranscoder {
    pub jobs: Mutex<Vec<TranscodeJob>>,
    pub unhealthy: bool,
    pub reject_with: Option<&'static str>,
}

impl RecordingTranscoder {
    pub fn jobs(&self) -> Vec<TranscodeJob> {
        self.jobs.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transcoder for RecordingTranscoder {
    fn backend(&self) -> &'static str {
        "recording"
    }

    async fn health(&self) -> BackendHealth {
        if self.unhealthy {
            BackendHealth::unavailable("switched off for the test")
        } else {
            BackendHealth::ready("recording")
        }
    }

    async fn transcode(
        &self,
        job: TranscodeJob,
    ) -> Result<TranscodeOutput, TranscodeError> {
        if let Some(reason) = self.reject_with {
            return Err(TranscodeError::Failed(reason.to_string()));
        }
        let container = job.container;
        let body = format!("converted:{}:{}", container.extension(), job.scale);
        self.jobs.lock().unwrap().push(job);
        Ok(TranscodeOutput {
            bytes: Bytes::from(body),
            container,
        })
    }
}

pub fn test_config(pairs: &[(&str, &str)]) -> Config {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    ConfigLoader::new()
        .load_with_env(EnvConfig::from_lookup(|name| map.get(name).cloned()))
        .expect("test configuration loads")
        .config
}

pub fn build_state(config: Config, transcoder: Arc<dyn Transcoder>) -> AppState {
    let http = build_http_client(&config.fetch).expect("http client");
    AppState::new(config, http, transcoder)
}

pub fn test_server(state: AppState) -> TestServer {
    TestServer::builder()
        .build(create_app(state))
        .expect("test server builds")
}

/// Serves `router` on an ephemeral localhost port for URL-source tests.
pub async fn spawn_upstream(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind upstream");
    let addr = listener.local_addr().expect("upstream address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("upstream serves");
    });
    addr
}
