use serde::Serialize;

const PROMPT_PREFIX: &str = "High quality, detailed illustration of: ";

#[derive(Debug, Serialize, PartialEq)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

/// Body of the chat-completions request asking for image and text output.
#[derive(Debug, Serialize, PartialEq)]
pub struct ImageRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub modalities: [&'static str; 2],
}

pub fn enhance(prompt: &str) -> String {
    format!("{PROMPT_PREFIX}{prompt}")
}

pub fn request_body(model: &str, prompt: &str) -> ImageRequest {
    ImageRequest {
        model: model.to_string(),
        messages: vec![ChatMessage {
            role: "user",
            content: enhance(prompt),
        }],
        modalities: ["image", "text"],
    }
}
