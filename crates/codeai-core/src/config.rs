//! Academy configuration loaded from the environment.
//!
//! | Env | Default | Description |
//! |-----|---------|-------------|
//! | GEMINI_API_KEY | (unset) | API key for the Gemini gateway. Absence is not a startup error; it surfaces as a transport failure on the first call. |
//! | CODEAI_CHAT_MODEL | gemini-3-pro-preview | Model used by the tutor chat. |
//! | CODEAI_IMAGE_MODEL | gemini-2.5-flash-image | Model used by the image lab. |
//! | CODEAI_REQUEST_TIMEOUT_SECS | 60 | Per-request HTTP timeout. |

use std::time::Duration;

const ENV_API_KEY: &str = "GEMINI_API_KEY";
const ENV_CHAT_MODEL: &str = "CODEAI_CHAT_MODEL";
const ENV_IMAGE_MODEL: &str = "CODEAI_IMAGE_MODEL";
const ENV_REQUEST_TIMEOUT_SECS: &str = "CODEAI_REQUEST_TIMEOUT_SECS";

/// Default chat model: strongest reasoning tier for tutoring.
pub const DEFAULT_CHAT_MODEL: &str = "gemini-3-pro-preview";

/// Default image-edit model.
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";

/// Default per-request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Runtime configuration for the Gemini gateway client.
#[derive(Debug, Clone)]
pub struct AcademyConfig {
    /// Gateway API key, if one was provided.
    pub api_key: Option<String>,
    /// Model id for tutor chat requests.
    pub chat_model: String,
    /// Model id for image-edit requests.
    pub image_model: String,
    /// HTTP timeout applied to every gateway request.
    pub request_timeout: Duration,
}

impl Default for AcademyConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl AcademyConfig {
    /// Load configuration from environment. Unset or invalid values fall back
    /// to the defaults documented in the module header.
    pub fn from_env() -> Self {
        Self {
            api_key: env_nonempty(ENV_API_KEY),
            chat_model: env_nonempty(ENV_CHAT_MODEL)
                .unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
            image_model: env_nonempty(ENV_IMAGE_MODEL)
                .unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string()),
            request_timeout: Duration::from_secs(env_secs(
                ENV_REQUEST_TIMEOUT_SECS,
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )),
        }
    }
}

fn env_nonempty(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(v) => {
            let v = v.trim().to_string();
            if v.is_empty() {
                None
            } else {
                Some(v)
            }
        }
        Err(_) => None,
    }
}

fn env_secs(name: &str, default: u64) -> u64 {
    match std::env::var(name) {
        Ok(v) => v.trim().parse().unwrap_or(default),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_env() {
        let cfg = AcademyConfig::default();
        assert_eq!(cfg.chat_model, DEFAULT_CHAT_MODEL);
        assert_eq!(cfg.image_model, DEFAULT_IMAGE_MODEL);
        assert_eq!(cfg.request_timeout, Duration::from_secs(60));
        assert!(cfg.api_key.is_none());
    }

    #[test]
    fn secs_default_when_unset() {
        assert_eq!(env_secs("CODEAI_TEST_UNSET_TIMEOUT", 60), 60);
    }
}
