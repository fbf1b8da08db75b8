pub mod error;
pub mod types;

pub use error::{Result, VisionError};
pub use types::{AnnotateResponse, ApiStatus, ImageResponse, TextAnnotation};

use std::time::Duration;

const BASE_URL: &str = "https://vision.googleapis.com/v1";

pub struct VisionClient {
    client: reqwest::Client,
    api_key: String,
}

impl VisionClient {
    pub fn new(api_key: String, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self { client, api_key }
    }

    /// Run TEXT_DETECTION on an image by URI. The image is fetched by the
    /// detection service, never downloaded locally. A non-empty `error`
    /// field in the per-image response counts as a failure.
    pub async fn detect_text(&self, image_uri: &str) -> Result<Vec<TextAnnotation>> {
        let endpoint = format!("{BASE_URL}/images:annotate?key={}", self.api_key);
        let body = serde_json::json!({
            "requests": [{
                "image": { "source": { "imageUri": image_uri } },
                "features": [{ "type": "TEXT_DETECTION" }]
            }]
        });

        tracing::debug!(image_uri, "Text detection");
        let resp = self
            .client
            .post(&endpoint)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(VisionError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let annotate: AnnotateResponse = resp.json().await?;
        let image_response = annotate
            .responses
            .into_iter()
            .next()
            .ok_or_else(|| VisionError::Parse("annotate response has no entries".to_string()))?;

        if let Some(api_error) = image_response.error {
            if !api_error.message.is_empty() {
                return Err(VisionError::Detection(api_error.message));
            }
        }

        Ok(image_response.text_annotations)
    }
}
