use base64::Engine;
use serde::Deserialize;

use crate::ImageError;

const DATA_IMAGE_PREFIX: &str = "data:image";

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    choices: Option<Vec<Choice>>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    /// Usually a string; some providers send structured parts instead.
    #[serde(default)]
    content: Option<serde_json::Value>,
    #[serde(default)]
    images: Option<Vec<ImagePart>>,
}

#[derive(Debug, Deserialize)]
struct ImagePart {
    image_url: Option<ImageUrl>,
}

#[derive(Debug, Deserialize)]
struct ImageUrl {
    #[serde(default)]
    url: Option<String>,
}

/// Pick the image data URL out of the first choice: the image field first,
/// then a data URL sent as text.
pub fn extract_image(response: ChatResponse) -> Result<String, ImageError> {
    let message = response
        .choices
        .into_iter()
        .flatten()
        .next()
        .and_then(|choice| choice.message)
        .ok_or(ImageError::InvalidResponse)?;

    let image_url = message
        .images
        .into_iter()
        .flatten()
        .next()
        .and_then(|part| part.image_url)
        .and_then(|url| url.url);
    if let Some(url) = image_url.filter(|u| u.starts_with(DATA_IMAGE_PREFIX)) {
        return Ok(url);
    }

    match message.content {
        Some(serde_json::Value::String(text)) if text.starts_with(DATA_IMAGE_PREFIX) => Ok(text),
        Some(serde_json::Value::String(text)) => Err(ImageError::NoImage(text)),
        Some(other) => Err(ImageError::NoImage(other.to_string())),
        None => Err(ImageError::NoImage(String::new())),
    }
}

/// A decoded `data:<mime>;base64,<payload>` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl DataUrl {
    pub fn parse(url: &str) -> Result<Self, ImageError> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| ImageError::BadDataUrl("missing data: scheme".to_string()))?;
        let (meta, payload) = rest
            .split_once(',')
            .ok_or_else(|| ImageError::BadDataUrl("missing payload".to_string()))?;
        let mime_type = meta
            .strip_suffix(";base64")
            .ok_or_else(|| ImageError::BadDataUrl("payload is not base64".to_string()))?;
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| ImageError::BadDataUrl(e.to_string()))?;
        Ok(Self {
            mime_type: mime_type.to_string(),
            bytes,
        })
    }

    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/jpeg" => "jpg",
            "image/gif" => "gif",
            "image/webp" => "webp",
            "image/svg+xml" => "svg",
            _ => "png",
        }
    }
}
