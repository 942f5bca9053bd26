//! Image ingestion through the Cloudinary upload API.
//!
//! Product payloads carry `images` as a list of strings. Entries that are
//! already `http(s)` URLs are kept as they are; `data:` URIs are uploaded and
//! replaced with the durable `secure_url` the CDN returns.

use chrono::Utc;
use futures::{StreamExt, TryStreamExt, stream};
use reqwest::{Client, multipart::Form};
use secrecy::ExposeSecret;
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::{
    config::MediaConfig,
    error::{AppError, AppResult},
};

const CLOUDINARY_API_BASE: &str = "https://api.cloudinary.com/v1_1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    Hosted,
    Payload,
}

pub fn classify_image(image: &str) -> AppResult<ImageSource> {
    let image = image.trim();
    if image.starts_with("https://") || image.starts_with("http://") {
        Ok(ImageSource::Hosted)
    } else if image.starts_with("data:") {
        Ok(ImageSource::Payload)
    } else {
        Err(AppError::bad_request(
            "Each image must be an http(s) URL or a data URI",
        ))
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

#[derive(Clone)]
pub struct MediaClient {
    client: Client,
    config: MediaConfig,
}

impl std::fmt::Debug for MediaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaClient")
            .field("cloud_name", &self.config.cloud_name)
            .field("api_secret", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl MediaClient {
    pub fn new(config: MediaConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Hex SHA-256 over the sorted, signed parameters followed by the secret.
    fn sign(&self, timestamp: i64) -> String {
        let to_sign = format!(
            "timestamp={timestamp}{}",
            self.config.api_secret.expose_secret()
        );
        hex::encode(Sha256::digest(to_sign.as_bytes()))
    }

    #[tracing::instrument(skip(self, payload), fields(cloud = %self.config.cloud_name))]
    pub async fn upload(&self, payload: String) -> AppResult<String> {
        let timestamp = Utc::now().timestamp();
        let form = Form::new()
            .text("file", payload)
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp.to_string())
            .text("signature_algorithm", "sha256")
            .text("signature", self.sign(timestamp));

        let response = self
            .client
            .post(format!(
                "{CLOUDINARY_API_BASE}/{}/image/upload",
                self.config.cloud_name
            ))
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("image upload failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "image upload rejected with status {}",
                response.status()
            )));
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("invalid upload response: {e}")))?;
        tracing::debug!(url = %body.secure_url, "image uploaded");
        Ok(body.secure_url)
    }
}

/// Resolve every image to a durable URL, uploading payloads with at most
/// `upload_concurrency` requests in flight. Output order matches input order.
pub async fn ingest_images(media: Option<&MediaClient>, images: Vec<String>) -> AppResult<Vec<String>> {
    let mut needs_upload = false;
    for image in &images {
        if classify_image(image)? == ImageSource::Payload {
            needs_upload = true;
        }
    }
    if !needs_upload {
        return Ok(images.into_iter().map(|i| i.trim().to_string()).collect());
    }

    let media = media.ok_or_else(|| AppError::bad_request("Image hosting is not configured"))?;
    let limit = media.config.upload_concurrency.max(1);

    stream::iter(images)
        .map(|image| async move {
            match classify_image(&image)? {
                ImageSource::Hosted => Ok(image.trim().to_string()),
                ImageSource::Payload => media.upload(image).await,
            }
        })
        .buffered(limit)
        .try_collect()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_urls_and_payloads() {
        assert_eq!(
            classify_image("https://res.cloudinary.com/demo/image/upload/a.jpg").unwrap(),
            ImageSource::Hosted
        );
        assert_eq!(
            classify_image("data:image/png;base64,iVBORw0KGgo=").unwrap(),
            ImageSource::Payload
        );
        assert!(classify_image("not an image").is_err());
    }

    #[tokio::test]
    async fn hosted_urls_pass_through_without_a_client() {
        let images = vec![
            "https://cdn.example.com/a.jpg".to_string(),
            " https://cdn.example.com/b.jpg ".to_string(),
        ];
        let out = ingest_images(None, images).await.unwrap();
        assert_eq!(
            out,
            vec!["https://cdn.example.com/a.jpg", "https://cdn.example.com/b.jpg"]
        );
    }

    #[tokio::test]
    async fn payloads_require_a_configured_host() {
        let err = ingest_images(None, vec!["data:image/png;base64,AAAA".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn signature_is_hex_sha256() {
        let client = MediaClient::new(MediaConfig {
            cloud_name: "demo".into(),
            api_key: "key".into(),
            api_secret: secrecy::SecretString::from("secret".to_string()),
            upload_concurrency: 2,
        });
        let signature = client.sign(1_700_000_000);
        assert_eq!(signature.len(), 64);
        assert_eq!(
            signature,
            hex::encode(Sha256::digest(b"timestamp=1700000000secret"))
        );
    }
}
