//! Structured-extraction collaborator.
//!
//! The trait is the seam the orchestrator works against; the HTTP
//! implementation posts the image to an OpenAI-compatible vision endpoint
//! and returns the model's markdown.

use std::path::Path;
use std::time::Duration;

use base64::Engine;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

/// Turns one prescription image into structured markdown.
pub trait StructuredExtractor {
    fn extract_structured_data(&self, image_path: &Path) -> Result<String, String>;
}

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Provider settings, loaded from the environment (`.env` supported).
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl ExtractorConfig {
    /// Read `RXTRACT_API_KEY` (required) plus the optional
    /// `RXTRACT_BASE_URL`, `RXTRACT_MODEL` and `RXTRACT_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, String> {
        let _ = dotenvy::dotenv(); // Try to load .env, ignore if missing

        let api_key = std::env::var("RXTRACT_API_KEY")
            .map_err(|_| "RXTRACT_API_KEY is not set".to_string())?;
        let base_url =
            std::env::var("RXTRACT_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model = std::env::var("RXTRACT_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let timeout_secs = std::env::var("RXTRACT_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Ok(Self {
            api_key,
            base_url,
            model,
            timeout_secs,
        })
    }
}

pub struct HttpExtractor {
    client: Client,
    config: ExtractorConfig,
}

impl HttpExtractor {
    pub fn new(config: ExtractorConfig) -> Result<Self, String> {
        // A hung call fails the item instead of blocking the batch forever.
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {e}"))?;
        Ok(Self { client, config })
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: Vec<ContentPart>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: String,
}

/// Mime type for the data URL, by extension.
fn mime_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
    {
        Some(ext) if ext == "png" => "image/png",
        _ => "image/jpeg",
    }
}

fn build_prompt() -> String {
    let mut prompt = String::new();
    prompt.push_str("You are an assistant that reads handwritten medical prescriptions. ");
    prompt.push_str(
        "Extract every piece of structured information from the attached prescription image: ",
    );
    prompt.push_str(
        "patient details, prescriber details, date, and each medication with its dosage, frequency and duration. ",
    );
    prompt.push_str(
        "Output the result as markdown, with one section per category and a table for the medications. ",
    );
    prompt.push_str("If a field is illegible, mark it as 'unreadable' rather than guessing.");
    prompt
}

impl StructuredExtractor for HttpExtractor {
    fn extract_structured_data(&self, image_path: &Path) -> Result<String, String> {
        let bytes = std::fs::read(image_path)
            .map_err(|e| format!("Failed to read {}: {e}", image_path.display()))?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
        let data_url = format!("data:{};base64,{encoded}", mime_for(image_path));

        let payload = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: vec![
                    ContentPart::Text {
                        text: build_prompt(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl { url: data_url },
                    },
                ],
            }],
            temperature: 0.0,
        };

        let res = self
            .client
            .post(&self.config.base_url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .map_err(|e| format!("HTTP request failed: {e}"))?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().unwrap_or_default();
            return Err(format!("API error {status}: {text}"));
        }

        let chat_res: ChatResponse = res
            .json()
            .map_err(|e| format!("Failed to parse JSON response: {e}"))?;

        let content = chat_res
            .choices
            .first()
            .ok_or("No choices in model response")?
            .message
            .content
            .trim()
            .to_string();

        Ok(content)
    }
}
