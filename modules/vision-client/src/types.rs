use serde::Deserialize;

/// Batch annotate response; one entry per requested image.
#[derive(Debug, Clone, Deserialize)]
pub struct AnnotateResponse {
    #[serde(default)]
    pub responses: Vec<ImageResponse>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageResponse {
    /// First annotation covers the whole image; the rest are per-word.
    #[serde(rename = "textAnnotations", default)]
    pub text_annotations: Vec<TextAnnotation>,
    pub error: Option<ApiStatus>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextAnnotation {
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiStatus {
    pub code: Option<i32>,
    #[serde(default)]
    pub message: String,
}
