use std::time::Duration;

use async_trait::async_trait;
use flipbook_config::UploadApiConfig;
use flipbook_core::{OutputContainer, ScaleDirective};
use reqwest::{Client, multipart};
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

use super::{
    BackendHealth, TranscodeError, TranscodeJob, TranscodeOutput, Transcoder,
    signature::sign_params,
};

const BACKEND: &str = "upload";

/// Uploads the source to a remote media API, then downloads a scaled
/// derivative in the requested container.
#[derive(Debug, Clone)]
pub struct UploadApiTranscoder {
    client: Client,
    config: UploadApiConfig,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct UploadReply {
    public_id: String,
}

impl UploadApiTranscoder {
    pub fn new(client: Client, config: UploadApiConfig, timeout: Duration) -> Self {
        Self {
            client,
            config,
            timeout,
        }
    }

    pub fn upload_url(&self) -> String {
        format!(
            "{}/{}/image/upload",
            self.config.api_base.trim_end_matches('/'),
            self.config.cloud_name
        )
    }

    /// `{delivery_base}/{cloud}/image/upload/w_W,h_H,c_scale/{public_id}.{ext}`
    pub fn delivery_url(
        &self,
        public_id: &str,
        scale: ScaleDirective,
        container: OutputContainer,
    ) -> String {
        format!(
            "{}/{}/image/upload/w_{},h_{},c_scale/{}.{}",
            self.config.delivery_base.trim_end_matches('/'),
            self.config.cloud_name,
            scale.width,
            scale.height,
            public_id,
            container.extension()
        )
    }

    /// Text fields of the signed upload form, `signature` included.
    pub fn signed_fields(
        &self,
        public_id: &str,
        timestamp: i64,
    ) -> Vec<(&'static str, String)> {
        let mut params: Vec<(&'static str, String)> = vec![
            ("public_id", public_id.to_string()),
            ("timestamp", timestamp.to_string()),
        ];
        if let Some(folder) = &self.config.folder {
            params.push(("folder", folder.clone()));
        }

        let signature = sign_params(
            params.iter().map(|(key, value)| (*key, value.as_str())),
            &self.config.api_secret,
        );

        params.push(("api_key", self.config.api_key.clone()));
        params.push(("signature", signature));
        params.push(("signature_algorithm", "sha256".to_string()));
        params
    }
}

#[async_trait]
impl Transcoder for UploadApiTranscoder {
    fn backend(&self) -> &'static str {
        BACKEND
    }

    async fn health(&self) -> BackendHealth {
        BackendHealth::ready(format!("cloud {}", self.config.cloud_name))
    }

    async fn transcode(
        &self,
        job: TranscodeJob,
    ) -> Result<TranscodeOutput, TranscodeError> {
        let public_id = format!("{}-{}", job.stem, Uuid::new_v4().simple());
        let timestamp = chrono::Utc::now().timestamp();

        let file = multipart::Part::bytes(job.source.to_vec())
            .file_name(format!("{}.{}", job.stem, job.kind.as_str()))
            .mime_str(job.kind.mime_type())?;
        let form = self
            .signed_fields(&public_id, timestamp)
            .into_iter()
            .fold(multipart::Form::new().part("file", file), |form, (key, value)| {
                form.text(key, value)
            });

        let upload_url = self.upload_url();
        debug!(url = %upload_url, public_id = %public_id, "uploading source");
        let response = self
            .client
            .post(&upload_url)
            .multipart(form)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(err) => {
                    debug!(error = %err, "could not read upload error body");
                    String::new()
                }
            };
            return Err(TranscodeError::UnexpectedResponse(format!(
                "upload returned {status}: {}",
                body.trim()
            )));
        }

        let reply: UploadReply = response.json().await.map_err(|err| {
            TranscodeError::UnexpectedResponse(format!(
                "upload reply missing public_id: {err}"
            ))
        })?;

        let delivery_url =
            self.delivery_url(&reply.public_id, job.scale, job.container);
        let response = self
            .client
            .get(&delivery_url)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranscodeError::UnexpectedResponse(format!(
                "delivery returned {status} for {delivery_url}"
            )));
        }

        let bytes = response.bytes().await?;
        info!(
            public_id = %reply.public_id,
            container = %job.container,
            scale = %job.scale,
            bytes = bytes.len(),
            "upload transcode complete"
        );

        Ok(TranscodeOutput {
            bytes,
            container: job.container,
        })
    }
}
