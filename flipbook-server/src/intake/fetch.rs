use axum::body::Bytes;
use reqwest::{Client, header};
use tracing::{debug, info};
use url::Url;

use super::IntakeError;

/// Bytes downloaded from a source URL, with the response's declared type.
#[derive(Debug, Clone)]
pub struct FetchedSource {
    pub url: Url,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Downloads `raw_url`, refusing anything but `http`/`https` and bodies
/// larger than `max_bytes`.
///
/// The limit is checked against `Content-Length` up front and again while
/// streaming, since the header may be absent or wrong.
pub async fn fetch_source(
    client: &Client,
    raw_url: &str,
    max_bytes: usize,
) -> Result<FetchedSource, IntakeError> {
    let url = Url::parse(raw_url)
        .map_err(|_| IntakeError::InvalidUrl(raw_url.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(IntakeError::UnsupportedScheme(url.scheme().to_string()));
    }

    debug!(url = %url, "fetching source");
    let mut response = client.get(url.clone()).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(IntakeError::Upstream {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    if let Some(length) = response.content_length()
        && length > max_bytes as u64
    {
        return Err(IntakeError::TooLarge { limit: max_bytes });
    }

    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        if body.len() + chunk.len() > max_bytes {
            return Err(IntakeError::TooLarge { limit: max_bytes });
        }
        body.extend_from_slice(&chunk);
    }

    info!(
        url = %url,
        bytes = body.len(),
        content_type = content_type.as_deref().unwrap_or("-"),
        "fetched source"
    );

    Ok(FetchedSource {
        url,
        content_type,
        bytes: Bytes::from(body),
    })
}
