//! Error types for the CodeAI Academy core.

use thiserror::Error;

/// Result type alias for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Errors crossing the Gemini gateway boundary.
///
/// Raw causes are logged at the gateway before mapping; sessions translate
/// these into fixed user-facing messages and never show them directly.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The remote call failed for any reason: network, auth, quota, malformed request.
    #[error("Gateway transport failure: {0}")]
    Transport(String),

    /// The model answered without any usable inline image part.
    #[error("No image data returned from the model")]
    NoImageReturned,
}

/// Errors from saving an edit result to disk.
#[derive(Error, Debug)]
pub enum SaveError {
    /// No result to save (the session is not in the success state).
    #[error("{0}")]
    Skipped(ValidationSkip),

    /// The stored result payload was not valid base64.
    #[error("Result image decode failed: {0}")]
    Decode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A requested session operation was skipped because its preconditions were
/// unmet. Returned explicitly instead of a silent early-return so callers and
/// tests can tell a skipped operation from an executed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationSkip {
    /// Input text was empty after trimming.
    EmptyInput,

    /// No source image has been selected yet.
    MissingImage,

    /// A gateway call for this session is already outstanding.
    RequestInFlight,

    /// The session is not in a state that permits the operation.
    WrongState,
}

impl std::fmt::Display for ValidationSkip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            ValidationSkip::EmptyInput => "input is empty",
            ValidationSkip::MissingImage => "no source image selected",
            ValidationSkip::RequestInFlight => "a request is already in flight",
            ValidationSkip::WrongState => "operation not valid in the current state",
        };
        write!(f, "operation skipped: {reason}")
    }
}
