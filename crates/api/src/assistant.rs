//! Chat assistant backed by hosted generative models.
//!
//! Text comes from a [`TextGenerator`] (Gemini `generateContent`), images from an optional
//! [`ImageGenerator`] (Hugging Face inference). A failed generation is logged and yields an
//! empty reply so the conversation can carry on.

use crate::{ApiError, ApiResult};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use cardio_core::chat::{ChatHistory, Speaker};
use cardio_core::models::HistoryEntry;
use cardio_core::KeyValueStore;
use reqwest::Client;
use serde_json::json;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-pro";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_IMAGE_API_URL: &str =
    "https://api-inference.huggingface.co/models/stabilityai/stable-diffusion-xl-base-1.0";

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> ApiResult<String>;
}

/// Produces an image for a prompt, returned as a `data:` URI.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate_image(&self, prompt: &str) -> ApiResult<String>;
}

/// Assistant credentials and endpoints, resolved once at start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantConfig {
    gemini_api_key: Option<String>,
    gemini_model: String,
    huggingface_token: Option<String>,
    image_api_url: String,
}

impl AssistantConfig {
    pub fn new(
        gemini_api_key: Option<String>,
        gemini_model: String,
        huggingface_token: Option<String>,
        image_api_url: String,
    ) -> Self {
        Self {
            gemini_api_key: gemini_api_key.filter(|k| !k.trim().is_empty()),
            gemini_model,
            huggingface_token: huggingface_token.filter(|t| !t.trim().is_empty()),
            image_api_url,
        }
    }

    pub fn gemini_model(&self) -> &str {
        &self.gemini_model
    }

    pub fn has_text(&self) -> bool {
        self.gemini_api_key.is_some()
    }

    pub fn has_images(&self) -> bool {
        self.huggingface_token.is_some()
    }
}

/// Builds an [`AssistantConfig`] from raw env values; blank model or URL fall back to
/// defaults.
pub fn assistant_config_from_env_values(
    gemini_api_key: Option<String>,
    gemini_model: Option<String>,
    huggingface_token: Option<String>,
    image_api_url: Option<String>,
) -> AssistantConfig {
    let non_blank = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    AssistantConfig::new(
        gemini_api_key,
        non_blank(gemini_model).unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
        huggingface_token,
        non_blank(image_api_url).unwrap_or_else(|| DEFAULT_IMAGE_API_URL.to_string()),
    )
}

pub struct GeminiTextGenerator {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiTextGenerator {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiTextGenerator {
    async fn generate(&self, prompt: &str) -> ApiResult<String> {
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        );

        let res = self
            .client
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        let json: serde_json::Value = res.json().await?;

        extract_gemini_text(&json)
    }
}

/// Concatenates the text parts of the first candidate.
fn extract_gemini_text(json: &serde_json::Value) -> ApiResult<String> {
    let parts = json["candidates"][0]["content"]["parts"]
        .as_array()
        .ok_or_else(|| ApiError::UnexpectedResponse("no candidates in Gemini response".into()))?;
    Ok(parts
        .iter()
        .filter_map(|p| p["text"].as_str())
        .collect::<Vec<_>>()
        .join(""))
}

pub struct HuggingFaceImageGenerator {
    client: Client,
    url: String,
    token: String,
}

impl HuggingFaceImageGenerator {
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
            token: token.into(),
        }
    }
}

#[async_trait]
impl ImageGenerator for HuggingFaceImageGenerator {
    async fn generate_image(&self, prompt: &str) -> ApiResult<String> {
        let res = self
            .client
            .post(&self.url)
            .bearer_auth(&self.token)
            .json(&json!({ "inputs": prompt }))
            .send()
            .await?
            .error_for_status()?;
        let content_type = res
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/jpeg")
            .to_string();
        let bytes = res.bytes().await?;

        Ok(data_uri(&content_type, &bytes))
    }
}

fn data_uri(content_type: &str, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        content_type,
        general_purpose::STANDARD.encode(bytes)
    )
}

/// One assistant turn. `text` is empty when generation failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssistantReply {
    pub text: String,
    pub image: Option<String>,
}

pub struct Assistant {
    text: Box<dyn TextGenerator>,
    image: Option<Box<dyn ImageGenerator>>,
}

impl Assistant {
    pub fn new(text: Box<dyn TextGenerator>, image: Option<Box<dyn ImageGenerator>>) -> Self {
        Self { text, image }
    }

    /// Wires the hosted generators. Text generation needs a Gemini key; images are optional.
    pub fn from_config(cfg: &AssistantConfig) -> ApiResult<Self> {
        let api_key = cfg
            .gemini_api_key
            .clone()
            .ok_or(ApiError::NotConfigured("GEMINI_API_KEY is not set"))?;
        let text = Box::new(GeminiTextGenerator::new(api_key, cfg.gemini_model.clone()));
        let image = cfg.huggingface_token.clone().map(|token| {
            Box::new(HuggingFaceImageGenerator::new(cfg.image_api_url.clone(), token))
                as Box<dyn ImageGenerator>
        });
        Ok(Self::new(text, image))
    }

    /// Prefixes the question with the patient's recorded results, oldest first.
    pub fn build_prompt(question: &str, history: &[HistoryEntry]) -> String {
        if history.is_empty() {
            return question.to_string();
        }
        let mut prompt = String::from("Patient history:\n");
        for entry in history {
            let date = entry
                .date_registration
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "unknown date".into());
            let risk = entry
                .risk_percentage
                .map(|r| format!("{r}%"))
                .unwrap_or_else(|| "-".into());
            prompt.push_str(&format!("- {date}: risk {risk}"));
            if let Some(diagnosis) = entry.diagnostico.as_deref().filter(|d| !d.is_empty()) {
                prompt.push_str(&format!(", diagnosis: {diagnosis}"));
            }
            prompt.push('\n');
        }
        prompt.push_str("\nQuestion: ");
        prompt.push_str(question);
        prompt
    }

    /// Generates a reply. An image is requested only for a non-blank `image_prompt` and
    /// only if an image generator is configured.
    pub async fn reply(&self, prompt: &str, image_prompt: Option<&str>) -> AssistantReply {
        let text = match self.text.generate(prompt).await {
            Ok(text) => text,
            Err(err) => {
                tracing::error!("Error generating text: {err}");
                String::new()
            }
        };

        let image = match (&self.image, image_prompt.map(str::trim)) {
            (Some(generator), Some(p)) if !p.is_empty() => {
                match generator.generate_image(p).await {
                    Ok(uri) => Some(uri),
                    Err(err) => {
                        tracing::error!("Error generating image: {err}");
                        None
                    }
                }
            }
            _ => None,
        };

        AssistantReply { text, image }
    }

    /// Records the question in the current chat, asks the model, and records the answer.
    ///
    /// Returns `None` when the question was not recorded (blank, or no chat selected).
    /// An empty model reply is not recorded.
    pub async fn converse(
        &self,
        chats: &mut ChatHistory,
        store: &mut impl KeyValueStore,
        question: &str,
        patient_history: &[HistoryEntry],
        image_prompt: Option<&str>,
    ) -> ApiResult<Option<AssistantReply>> {
        if !chats.append(store, Speaker::User, question)? {
            return Ok(None);
        }
        let prompt = Self::build_prompt(question.trim(), patient_history);
        let reply = self.reply(&prompt, image_prompt).await;
        chats.append(store, Speaker::Assistant, &reply.text)?;
        Ok(Some(reply))
    }
}
