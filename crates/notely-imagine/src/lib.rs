pub mod engine;
mod parse;
mod prompt;

pub use parse::DataUrl;
pub use prompt::enhance;

use notely_core::settings::ImageSettings;
use notely_core::Session;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Must be logged in to generate images")]
    Unauthenticated,
    #[error("Missing image API key")]
    MissingApiKey,
    #[error("image request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Image API error: {status} {detail}")]
    Upstream { status: u16, detail: String },
    #[error("Invalid response structure")]
    InvalidResponse,
    #[error("API did not return an image: {0}")]
    NoImage(String),
    #[error("malformed data URL: {0}")]
    BadDataUrl(String),
}

/// Generate an illustration for `prompt` and return it as a `data:image/...` URL.
pub async fn generate_image(
    session: &Session,
    settings: &ImageSettings,
    prompt: &str,
) -> Result<String, ImageError> {
    let user = session.user().ok_or(ImageError::Unauthenticated)?;
    if settings.api_key.trim().is_empty() {
        return Err(ImageError::MissingApiKey);
    }

    info!(user = %user, model = %settings.model, "generating image");
    match engine::generate(settings, prompt).await {
        Ok(url) => {
            info!(bytes = url.len(), "image generated");
            Ok(url)
        }
        Err(e) => {
            warn!("image generation failed: {e}");
            Err(e)
        }
    }
}
