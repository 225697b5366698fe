//! Image lab session: `Idle → Processing → {Success | Error}` per upload,
//! with re-selection resetting the job back to `Idle`.
//!
//! Same begin/resolve split and generation guard as the tutor session: the
//! session is a pure state machine, [`ImageLabService`] drives the gateway
//! call without holding the lock across the await, and a result landing
//! after the source image was replaced is discarded.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::{GatewayResult, SaveError, ValidationSkip};
use crate::gemini_service::{EditedImage, ImageGateway};
use crate::prompts::{DOWNLOAD_FILENAME, IMAGE_EDIT_FAILURE_MESSAGE};

/// Job status of the current upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageStatus {
    #[default]
    Idle,
    Processing,
    Success,
    Error,
}

/// The uploaded source image: raw bytes plus the mime type reported by the
/// file picker. Any image mime type is accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

/// In-flight edit issued by [`ImageEditSession::begin_submit`].
#[derive(Debug)]
pub struct EditTicket {
    generation: u64,
    source: SourceImage,
    instruction: String,
}

impl EditTicket {
    pub fn source(&self) -> &SourceImage {
        &self.source
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }
}

/// Per-upload edit state. Created empty; a selected file plus a non-empty
/// instruction make it submittable. Mutated only through its own operations.
#[derive(Debug, Default)]
pub struct ImageEditSession {
    source: Option<SourceImage>,
    instruction: String,
    status: ImageStatus,
    result: Option<EditedImage>,
    error_message: Option<String>,
    generation: u64,
}

impl ImageEditSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> ImageStatus {
        self.status
    }

    pub fn source(&self) -> Option<&SourceImage> {
        self.source.as_ref()
    }

    /// The requested edit instruction as last submitted.
    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    /// Result image, present only in `Success`.
    pub fn result(&self) -> Option<&EditedImage> {
        self.result.as_ref()
    }

    /// Result as a displayable data URL, present only in `Success`.
    pub fn result_data_url(&self) -> Option<String> {
        self.result.as_ref().map(EditedImage::to_data_url)
    }

    /// User-facing failure message, present only in `Error`.
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Replace the source image. Valid from any state: resets status to
    /// `Idle`, clears any previous result and error, and bumps the
    /// generation so an edit still in flight for the old image is discarded
    /// on arrival. An empty payload is a skip, not a reset.
    pub fn select_image(
        &mut self,
        bytes: Vec<u8>,
        mime_type: impl Into<String>,
    ) -> Result<(), ValidationSkip> {
        if bytes.is_empty() {
            return Err(ValidationSkip::EmptyInput);
        }
        self.source = Some(SourceImage {
            bytes,
            mime_type: mime_type.into(),
        });
        self.status = ImageStatus::Idle;
        self.result = None;
        self.error_message = None;
        self.generation += 1;
        Ok(())
    }

    /// Start an edit. Valid only when status is `Idle` or `Error` with a
    /// selected image and a non-empty instruction; otherwise the skip reason
    /// says what was missing. A submit while `Processing` is refused by the
    /// session itself even if the consuming view forgot to disable its
    /// button.
    pub fn begin_submit(&mut self, instruction: &str) -> Result<EditTicket, ValidationSkip> {
        match self.status {
            ImageStatus::Processing => return Err(ValidationSkip::RequestInFlight),
            ImageStatus::Success => return Err(ValidationSkip::WrongState),
            ImageStatus::Idle | ImageStatus::Error => {}
        }
        let source = match &self.source {
            Some(source) => source.clone(),
            None => return Err(ValidationSkip::MissingImage),
        };
        let instruction = instruction.trim();
        if instruction.is_empty() {
            return Err(ValidationSkip::EmptyInput);
        }

        self.instruction = instruction.to_string();
        self.status = ImageStatus::Processing;
        self.error_message = None;
        Ok(EditTicket {
            generation: self.generation,
            source,
            instruction: instruction.to_string(),
        })
    }

    /// Apply the outcome of an edit. Success stores the result and moves to
    /// `Success`; any gateway error stores the fixed user-facing message and
    /// moves to `Error` — the raw cause was already logged at the gateway.
    ///
    /// Returns `false` when the ticket's generation no longer matches (the
    /// source image was replaced while the call was outstanding).
    pub fn resolve(&mut self, ticket: EditTicket, outcome: GatewayResult<EditedImage>) -> bool {
        if ticket.generation != self.generation {
            debug!(
                ticket_generation = ticket.generation,
                session_generation = self.generation,
                "discarding late edit result for a replaced image"
            );
            return false;
        }

        match outcome {
            Ok(image) => {
                self.result = Some(image);
                self.error_message = None;
                self.status = ImageStatus::Success;
            }
            Err(e) => {
                warn!("image edit gateway call failed: {e}");
                self.result = None;
                self.error_message = Some(IMAGE_EDIT_FAILURE_MESSAGE.to_string());
                self.status = ImageStatus::Error;
            }
        }
        true
    }

    /// Save the result under the fixed `edited-by-codeai.png` filename in
    /// `dir`. Valid only in `Success`; no state change.
    pub fn save_result(&self, dir: &Path) -> Result<PathBuf, SaveError> {
        let image = match (&self.status, &self.result) {
            (ImageStatus::Success, Some(image)) => image,
            _ => return Err(SaveError::Skipped(ValidationSkip::WrongState)),
        };
        let bytes = image
            .decode_bytes()
            .map_err(|e| SaveError::Decode(e.to_string()))?;
        let path = dir.join(DOWNLOAD_FILENAME);
        std::fs::write(&path, bytes)?;
        Ok(path)
    }
}

/// Async driver for an [`ImageEditSession`], mirroring the tutor service.
pub struct ImageLabService<G> {
    gateway: G,
    session: Arc<Mutex<ImageEditSession>>,
}

impl<G: ImageGateway> ImageLabService<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            session: Arc::new(Mutex::new(ImageEditSession::new())),
        }
    }

    /// Shared handle to the session, for hosts that render the job state.
    pub fn session(&self) -> Arc<Mutex<ImageEditSession>> {
        Arc::clone(&self.session)
    }

    /// Replace the source image.
    pub async fn select_image(
        &self,
        bytes: Vec<u8>,
        mime_type: impl Into<String>,
    ) -> Result<(), ValidationSkip> {
        self.session.lock().await.select_image(bytes, mime_type)
    }

    /// Submit an edit. Returns the skip reason when the session refused the
    /// submit; gateway failures surface as `Error` state, not as `Err`.
    pub async fn submit(&self, instruction: &str) -> Result<(), ValidationSkip> {
        let ticket = self.session.lock().await.begin_submit(instruction)?;
        let outcome = self
            .gateway
            .edit_image(
                &ticket.source.bytes,
                &ticket.source.mime_type,
                &ticket.instruction,
            )
            .await;
        self.session.lock().await.resolve(ticket, outcome);
        Ok(())
    }

    /// Save the current result into `dir`.
    pub async fn save_result(&self, dir: &Path) -> Result<PathBuf, SaveError> {
        self.session.lock().await.save_result(dir)
    }
}
