//! Gemini gateway: sole boundary to the hosted generative-AI service.
//!
//! Two remote operations, both single-attempt `generateContent` calls:
//! 1. **Image edit** – pairs the raw image bytes (mime type attached) with an
//!    instruction and returns the first inline image of the response.
//! 2. **Chat** – sends a message inside a running [`Conversation`]; the handle
//!    carries the tutor system instruction and replays accumulated turns so
//!    the model keeps multi-turn context (the REST API itself is stateless).
//!
//! API key: `GEMINI_API_KEY`. Raw failures are logged here and mapped to
//! [`GatewayError`]; user-facing fallback text is the sessions' job.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::config::AcademyConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::prompts::TUTOR_SYSTEM_INSTRUCTION;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Fallback mime type declared when the model omits one on a returned image.
const FALLBACK_IMAGE_MIME: &str = "image/png";

// Gemini generateContent wire structures (camelCase on the wire).

#[derive(Serialize)]
struct GenerateRequest {
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(
        rename = "inlineData",
        alias = "inline_data",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    inline_data: Option<InlineData>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
struct InlineData {
    #[serde(
        rename = "mimeType",
        alias = "mime_type",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    mime_type: Option<String>,
    data: String,
}

#[derive(Deserialize, Debug)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

impl Content {
    fn user_text(text: &str) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![Part {
                text: Some(text.to_string()),
                ..Part::default()
            }],
        }
    }

    fn system(text: &str) -> Self {
        Self {
            role: None,
            parts: vec![Part {
                text: Some(text.to_string()),
                ..Part::default()
            }],
        }
    }
}

/// An edited image returned by the gateway: base64 payload plus the mime type
/// the model actually declared (`image/png` fallback when it declared none).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditedImage {
    /// Mime type of the returned payload.
    pub mime_type: String,
    /// Base64-encoded image bytes.
    pub data: String,
}

impl EditedImage {
    /// Render as a `data:` URL for direct display.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    /// Decode the raw image bytes (e.g. for saving to disk).
    pub fn decode_bytes(&self) -> GatewayResult<Vec<u8>> {
        BASE64
            .decode(&self.data)
            .map_err(|e| GatewayError::Transport(format!("Result image decode failed: {e}")))
    }
}

/// Opaque server-conversation handle for the tutor chat. Created lazily on
/// the first turn with the fixed tutor system instruction, then reused for
/// every subsequent turn of the same session; dropping it and creating a new
/// one starts a fresh context with no memory of prior turns.
#[derive(Debug, Clone)]
pub struct Conversation {
    system_instruction: String,
    history: Vec<Content>,
}

impl Conversation {
    /// New empty conversation with the tutor persona instruction.
    pub fn new() -> Self {
        Self {
            system_instruction: TUTOR_SYSTEM_INSTRUCTION.to_string(),
            history: Vec::new(),
        }
    }

    /// Number of turns (user and model contents) accumulated so far.
    pub fn turn_count(&self) -> usize {
        self.history.len()
    }

    pub(crate) fn record_exchange(&mut self, user_message: &str, reply: &str) {
        self.history.push(Content::user_text(user_message));
        self.history.push(Content {
            role: Some("model".to_string()),
            parts: vec![Part {
                text: Some(reply.to_string()),
                ..Part::default()
            }],
        });
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

/// Tutor-chat seam: one outbound chat turn inside a running conversation.
#[async_trait::async_trait]
pub trait TutorGateway: Send + Sync {
    /// Send `message` within `conversation` and return the reply text
    /// (possibly empty). Never synthesizes fallback content.
    async fn send_chat_message(
        &self,
        conversation: &mut Conversation,
        message: &str,
    ) -> GatewayResult<String>;
}

/// Image-lab seam: one outbound edit request.
#[async_trait::async_trait]
pub trait ImageGateway: Send + Sync {
    /// Edit `image` (with `mime_type`) per `instruction` and return the first
    /// inline image of the response.
    async fn edit_image(
        &self,
        image: &[u8],
        mime_type: &str,
        instruction: &str,
    ) -> GatewayResult<EditedImage>;
}

/// Gemini gateway client. Constructed once at startup and shared; the inner
/// `reqwest::Client` is stateless and reused for every call.
pub struct GeminiClient {
    api_key: String,
    chat_model: String,
    image_model: String,
    client: reqwest::Client,
}

impl GeminiClient {
    /// Create a client from environment configuration. Returns `None` when no
    /// `GEMINI_API_KEY` is set; an invalid key still constructs and surfaces
    /// as a transport failure on the first call.
    pub fn from_env() -> Option<Self> {
        let config = AcademyConfig::from_env();
        let key = config.api_key.clone()?;
        Some(Self::with_config(key, &config))
    }

    /// Create a client with an explicit API key and default models.
    pub fn new(api_key: String) -> Self {
        Self::with_config(api_key, &AcademyConfig::default())
    }

    /// Create a client with an explicit key and the given configuration.
    pub fn with_config(api_key: String, config: &AcademyConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            api_key: api_key.trim().to_string(),
            chat_model: config.chat_model.clone(),
            image_model: config.image_model.clone(),
            client,
        }
    }

    /// Override the chat model.
    pub fn with_chat_model(mut self, model: &str) -> Self {
        self.chat_model = model.to_string();
        self
    }

    /// Override the image-edit model.
    pub fn with_image_model(mut self, model: &str) -> Self {
        self.image_model = model.to_string();
        self
    }

    /// Request an edit of `image` per `instruction`. `image` must be a
    /// non-empty payload and `instruction` non-empty text (the sessions
    /// validate before calling). Single attempt, no retries.
    pub async fn edit_image(
        &self,
        image: &[u8],
        mime_type: &str,
        instruction: &str,
    ) -> GatewayResult<EditedImage> {
        let request = GenerateRequest {
            system_instruction: None,
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![
                    Part {
                        inline_data: Some(InlineData {
                            mime_type: Some(mime_type.to_string()),
                            data: BASE64.encode(image),
                        }),
                        ..Part::default()
                    },
                    Part {
                        text: Some(instruction.to_string()),
                        ..Part::default()
                    },
                ],
            }],
        };

        let response = self.generate(&self.image_model, &request).await?;
        first_inline_image(&response).ok_or(GatewayError::NoImageReturned)
    }

    /// Send one chat turn. On success the exchange is recorded in the
    /// conversation so the next turn replays it; a failed call leaves the
    /// conversation untouched.
    pub async fn send_chat_message(
        &self,
        conversation: &mut Conversation,
        message: &str,
    ) -> GatewayResult<String> {
        let mut contents = conversation.history.clone();
        contents.push(Content::user_text(message));

        let request = GenerateRequest {
            system_instruction: Some(Content::system(&conversation.system_instruction)),
            contents,
        };

        let response = self.generate(&self.chat_model, &request).await?;
        let reply = reply_text(&response);
        conversation.record_exchange(message, &reply);
        Ok(reply)
    }

    async fn generate(
        &self,
        model: &str,
        request: &GenerateRequest,
    ) -> GatewayResult<GenerateResponse> {
        let url = format!("{GEMINI_API_BASE}/models/{model}:generateContent");
        debug!(model, "gateway request");

        let res = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                error!(model, "Gemini request failed: {e}");
                GatewayError::Transport(format!("Gemini request failed: {e}"))
            })?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            error!(model, %status, "Gemini API error: {body}");
            return Err(GatewayError::Transport(format!(
                "Gemini API error {status}: {body}"
            )));
        }

        res.json().await.map_err(|e| {
            error!(model, "Gemini response parse failed: {e}");
            GatewayError::Transport(format!("Gemini response parse failed: {e}"))
        })
    }
}

#[async_trait::async_trait]
impl TutorGateway for GeminiClient {
    async fn send_chat_message(
        &self,
        conversation: &mut Conversation,
        message: &str,
    ) -> GatewayResult<String> {
        GeminiClient::send_chat_message(self, conversation, message).await
    }
}

#[async_trait::async_trait]
impl ImageGateway for GeminiClient {
    async fn edit_image(
        &self,
        image: &[u8],
        mime_type: &str,
        instruction: &str,
    ) -> GatewayResult<EditedImage> {
        GeminiClient::edit_image(self, image, mime_type, instruction).await
    }
}

/// First inline image payload of the first candidate, mime type as declared
/// by the model with `image/png` fallback.
fn first_inline_image(response: &GenerateResponse) -> Option<EditedImage> {
    let content = response.candidates.first()?.content.as_ref()?;
    content
        .parts
        .iter()
        .find_map(|part| part.inline_data.as_ref())
        .map(|inline| EditedImage {
            mime_type: inline
                .mime_type
                .clone()
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| FALLBACK_IMAGE_MIME.to_string()),
            data: inline.data.clone(),
        })
}

/// Concatenated text parts of the first candidate; empty string when the
/// model returned no text.
fn reply_text(response: &GenerateResponse) -> String {
    response
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .map(|content| {
            content
                .parts
                .iter()
                .filter_map(|p| p.text.as_deref())
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> GenerateResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn picks_first_inline_image_and_keeps_declared_mime() {
        let response = parse(
            r#"{"candidates":[{"content":{"role":"model","parts":[
                {"text":"Here you go"},
                {"inlineData":{"mimeType":"image/webp","data":"AAAA"}},
                {"inlineData":{"mimeType":"image/png","data":"BBBB"}}
            ]}}]}"#,
        );
        let image = first_inline_image(&response).unwrap();
        assert_eq!(image.mime_type, "image/webp");
        assert_eq!(image.data, "AAAA");
        assert_eq!(image.to_data_url(), "data:image/webp;base64,AAAA");
    }

    #[test]
    fn falls_back_to_png_when_mime_missing() {
        let response =
            parse(r#"{"candidates":[{"content":{"parts":[{"inline_data":{"data":"AAAA"}}]}}]}"#);
        let image = first_inline_image(&response).unwrap();
        assert_eq!(image.mime_type, "image/png");
    }

    #[test]
    fn no_image_part_yields_none() {
        let response = parse(r#"{"candidates":[{"content":{"parts":[{"text":"sorry"}]}}]}"#);
        assert!(first_inline_image(&response).is_none());
    }

    #[test]
    fn reply_text_joins_parts_and_tolerates_empty() {
        let response = parse(
            r#"{"candidates":[{"content":{"parts":[{"text":"hel"},{"text":"lo"}]}}]}"#,
        );
        assert_eq!(reply_text(&response), "hello");
        assert_eq!(reply_text(&parse(r#"{"candidates":[]}"#)), "");
    }

    #[test]
    fn conversation_records_exchange_on_success_only() {
        let mut conversation = Conversation::new();
        assert_eq!(conversation.turn_count(), 0);
        conversation.record_exchange("hello", "hi there");
        assert_eq!(conversation.turn_count(), 2);
    }

    #[test]
    fn request_serializes_camel_case_wire_format() {
        let request = GenerateRequest {
            system_instruction: Some(Content::system("be helpful")),
            contents: vec![Content::user_text("hi")],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("systemInstruction").is_some());
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hi");
    }

    #[test]
    fn inline_data_serializes_camel_case() {
        let part = Part {
            inline_data: Some(InlineData {
                mime_type: Some("image/jpeg".to_string()),
                data: "Zm9v".to_string(),
            }),
            ..Part::default()
        };
        let json = serde_json::to_value(&part).unwrap();
        assert_eq!(json["inlineData"]["mimeType"], "image/jpeg");
    }

    #[test]
    fn decode_bytes_round_trips() {
        let image = EditedImage {
            mime_type: "image/png".to_string(),
            data: BASE64.encode(b"not-a-real-png"),
        };
        assert_eq!(image.decode_bytes().unwrap(), b"not-a-real-png");
    }
}
