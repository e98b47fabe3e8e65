use std::sync::Arc;

use axum::{
    Router,
    http::{StatusCode, header},
    routing::get,
};
use axum_test::multipart::MultipartForm;
use flipbook_core::{MediaKind, OutputContainer};
use flipbook_server::routes::v1;
use serde_json::{Value, json};

mod common;
use common::{
    RecordingTranscoder, STATIC_SVG, build_state, gif, spawn_upstream,
    test_config, test_server,
};

fn upstream() -> Router {
    Router::new()
        .route(
            "/typed",
            get(|| async { ([(header::CONTENT_TYPE, "image/gif")], gif(4)) }),
        )
        .route(
            "/assets/badge.svg",
            get(|| async {
                ([(header::CONTENT_TYPE, "application/octet-stream")], STATIC_SVG)
            }),
        )
        .route(
            "/photo.png",
            get(|| async { ([(header::CONTENT_TYPE, "image/png")], vec![0u8; 8]) }),
        )
        .route("/large.gif", get(|| async { gif(64) }))
        .route("/missing.gif", get(|| async { StatusCode::NOT_FOUND }))
}

#[tokio::test]
async fn json_url_source_uses_response_content_type() {
    let addr = spawn_upstream(upstream()).await;
    let recorder = Arc::new(RecordingTranscoder::default());
    let server = test_server(build_state(test_config(&[]), recorder.clone()));

    let response = server
        .post(v1::CONVERT)
        .json(&json!({ "url": format!("http://{addr}/typed") }))
        .await;

    response.assert_status_ok();
    assert_eq!(response.header(header::CONTENT_TYPE), "video/mp4");
    assert_eq!(
        response.header(header::CONTENT_DISPOSITION),
        "inline; filename=\"typed.mp4\""
    );
    let jobs = recorder.jobs();
    assert_eq!(jobs[0].kind, MediaKind::Gif);
    assert_eq!(jobs[0].container, OutputContainer::Mp4);
}

#[tokio::test]
async fn multipart_url_field_falls_back_to_path_extension() {
    let addr = spawn_upstream(upstream()).await;
    let server = test_server(build_state(
        test_config(&[]),
        Arc::new(RecordingTranscoder::default()),
    ));

    let form = MultipartForm::new()
        .add_text("url", format!("http://{addr}/assets/badge.svg?v=2"));
    let response = server.post(v1::INSPECT).multipart(form).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["kind"], "svg");
    assert_eq!(body["scale"], "scale=120:80");
}

#[tokio::test]
async fn explicit_kind_overrides_upstream_type() {
    let addr = spawn_upstream(upstream()).await;
    let server = test_server(build_state(
        test_config(&[]),
        Arc::new(RecordingTranscoder::default()),
    ));

    let response = server
        .post(v1::INSPECT)
        .json(&json!({ "url": format!("http://{addr}/photo.png"), "kind": "gif" }))
        .await;

    // Eight zero bytes declared as GIF: too short for a logical screen.
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn unsupported_upstream_type_is_415() {
    let addr = spawn_upstream(upstream()).await;
    let server = test_server(build_state(
        test_config(&[]),
        Arc::new(RecordingTranscoder::default()),
    ));

    let response = server
        .post(v1::INSPECT)
        .json(&json!({ "url": format!("http://{addr}/photo.png") }))
        .await;

    response.assert_status(StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn upstream_error_is_502() {
    let addr = spawn_upstream(upstream()).await;
    let server = test_server(build_state(
        test_config(&[]),
        Arc::new(RecordingTranscoder::default()),
    ));

    let response = server
        .post(v1::CONVERT)
        .json(&json!({ "url": format!("http://{addr}/missing.gif") }))
        .await;

    response.assert_status(StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn source_larger_than_limit_is_413() {
    let addr = spawn_upstream(upstream()).await;
    let server = test_server(build_state(
        test_config(&[("MAX_SOURCE_BYTES", "256")]),
        Arc::new(RecordingTranscoder::default()),
    ));

    let response = server
        .post(v1::CONVERT)
        .json(&json!({ "url": format!("http://{addr}/large.gif") }))
        .await;

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn non_http_scheme_is_400() {
    let server = test_server(build_state(
        test_config(&[]),
        Arc::new(RecordingTranscoder::default()),
    ));

    let response = server
        .post(v1::CONVERT)
        .json(&json!({ "url": "ftp://example.test/a.gif" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}
