//! Image uploads to the third-party asset host.

use reqwest::multipart::{Form, Part};
use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;

use crate::config::AssetHostConfig;

/// Errors that can occur uploading an asset.
#[derive(Debug, Error)]
pub enum AssetError {
    /// HTTP request failed.
    #[error("asset host request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The asset host rejected the upload.
    #[error("asset host returned {status}: {message}")]
    Rejected { status: u16, message: String },

    /// The response body was not in the expected shape.
    #[error("invalid asset host response: {0}")]
    InvalidResponse(String),
}

/// A stored asset, as reported by the host.
#[derive(Debug, Clone, Deserialize)]
pub struct StoredAsset {
    /// Public URL of the uploaded image.
    pub url: String,
}

/// Client for the image host API.
#[derive(Clone)]
pub struct AssetClient {
    http: reqwest::Client,
    api_url: String,
    api_token: secrecy::SecretString,
}

impl AssetClient {
    /// Create a new asset client from configuration.
    #[must_use]
    pub fn new(config: &AssetHostConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
        }
    }

    /// Upload an image and return its public URL.
    ///
    /// # Errors
    ///
    /// Returns `AssetError::Rejected` for a non-success response, and
    /// `AssetError::InvalidResponse` if the success body lacks a URL.
    pub async fn upload(
        &self,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<StoredAsset, AssetError> {
        let part = Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str(content_type)
            .map_err(|e| AssetError::InvalidResponse(format!("bad content type: {e}")))?;
        let form = Form::new().part("file", part);

        let response = self
            .http
            .post(format!("{}/v1/images", self.api_url))
            .bearer_auth(self.api_token.expose_secret())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AssetError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let asset: StoredAsset = response
            .json()
            .await
            .map_err(|e| AssetError::InvalidResponse(e.to_string()))?;
        Ok(asset)
    }
}
