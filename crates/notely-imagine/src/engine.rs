use notely_core::settings::ImageSettings;
use tracing::{debug, warn};

use crate::parse::{self, ChatResponse};
use crate::prompt;
use crate::ImageError;

/// One POST to the chat-completions endpoint. No retry and no client timeout.
pub async fn generate(settings: &ImageSettings, prompt_text: &str) -> Result<String, ImageError> {
    generate_with(&reqwest::Client::new(), settings, prompt_text).await
}

pub async fn generate_with(
    client: &reqwest::Client,
    settings: &ImageSettings,
    prompt_text: &str,
) -> Result<String, ImageError> {
    let body = prompt::request_body(&settings.model, prompt_text);

    let mut request = client
        .post(&settings.api_url)
        .bearer_auth(&settings.api_key)
        .header("X-Title", &settings.title)
        .json(&body);
    if let Some(referer) = settings.referer.as_deref().filter(|r| !r.is_empty()) {
        request = request.header("HTTP-Referer", referer);
    }

    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        let detail = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), "image API rejected request");
        return Err(ImageError::Upstream {
            status: status.as_u16(),
            detail,
        });
    }

    let parsed: ChatResponse = response
        .json()
        .await
        .map_err(|_| ImageError::InvalidResponse)?;
    debug!("image API responded with {status}");
    parse::extract_image(parsed)
}
