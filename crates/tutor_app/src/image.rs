use std::sync::Arc;

use thiserror::Error;
use tracing::info;
use tutor_domain::MaxTokens;
use tutor_provider::{ChatCompletion, ChatRequest, ContentPart, WireMessage};

/// Instruction for the vision call. Extraction is a single opaque call:
/// image in, problem text out.
const EXTRACTION_PROMPT: &str = "Extract the math problem from this image. Return ONLY the \
mathematical text exactly as it appears, preserving equations, numbers, and symbols. If there \
are multiple problems, extract all of them. Do not add explanations or commentary.";

/// Upstream provider limit
const MAX_IMAGE_BYTES: usize = 20 * 1024 * 1024;

const ALLOWED_MIME_TYPES: &[&str] = &[
    "image/png",
    "image/jpeg",
    "image/jpg",
    "image/webp",
    "image/gif",
];

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Image must be a data URL or an http(s) URL")]
    UnsupportedUrl,

    #[error("File type not supported. Please upload PNG, JPG, WEBP, or GIF images.")]
    UnsupportedType,

    #[error("File too large. Maximum size is 20MB.")]
    TooLarge,

    #[error("No text could be extracted from the image")]
    NoText,

    #[error("Image parsing failed: {0}")]
    Upstream(#[from] tutor_provider::Error),
}

/// Validate an incoming image reference before spending an upstream call
/// on it. Data URLs are checked for mime type and decoded size; plain
/// http(s) URLs pass through for the provider to fetch.
pub fn validate_image_url(url: &str) -> Result<(), ImageError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        return Ok(());
    }

    let Some(rest) = url.strip_prefix("data:") else {
        return Err(ImageError::UnsupportedUrl);
    };

    let mime = rest.split(|c| c == ';' || c == ',').next().unwrap_or("");
    if !ALLOWED_MIME_TYPES.contains(&mime) {
        return Err(ImageError::UnsupportedType);
    }

    let payload = rest.split_once(',').map(|(_, data)| data).unwrap_or("");
    if base64::decoded_len_estimate(payload.len()) > MAX_IMAGE_BYTES {
        return Err(ImageError::TooLarge);
    }

    Ok(())
}

/// Turns a photographed or uploaded problem into problem text via the
/// vision-capable model
pub struct ProblemExtractor<P> {
    provider: Arc<P>,
    model: String,
    max_tokens: MaxTokens,
}

impl<P: ChatCompletion> ProblemExtractor<P> {
    pub fn new(provider: Arc<P>, model: impl ToString) -> Self {
        Self {
            provider,
            model: model.to_string(),
            max_tokens: MaxTokens::new(500),
        }
    }

    pub async fn extract(&self, image_url: &str) -> Result<String, ImageError> {
        validate_image_url(image_url)?;

        info!(model = %self.model, "Extracting problem text from image");

        let request = ChatRequest::new(&self.model)
            .messages(vec![WireMessage::user_parts(vec![
                ContentPart::text(EXTRACTION_PROMPT),
                ContentPart::image_url(image_url),
            ])])
            .max_tokens(self.max_tokens);

        let message = self.provider.chat(&request).await?;
        message
            .text()
            .map(str::to_string)
            .ok_or(ImageError::NoText)
    }
}
