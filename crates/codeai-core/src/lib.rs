//! codeai-core: CodeAI Academy core library.
//!
//! The interaction/request lifecycle behind the academy dashboard: the
//! Gemini gateway client, the tutor-chat and image-lab session state
//! machines, the course catalog view, and the notification center. All
//! state is in-memory; the hosted model is an opaque remote dependency.

mod catalog;
mod config;
mod error;
mod gemini_service;
mod image_lab;
mod notify;
pub mod prompts;
mod tutor;

// Configuration (environment-driven, no startup key check)
pub use config::{
    AcademyConfig, DEFAULT_CHAT_MODEL, DEFAULT_IMAGE_MODEL, DEFAULT_REQUEST_TIMEOUT_SECS,
};

// Errors: gateway taxonomy + explicit validation skips
pub use error::{GatewayError, GatewayResult, SaveError, ValidationSkip};

// Gemini gateway (sole boundary to the hosted model)
pub use gemini_service::{Conversation, EditedImage, GeminiClient, ImageGateway, TutorGateway};

// Tutor chat session + driver
pub use tutor::{ChatRole, ChatSession, ChatStatus, ChatTurn, SendTicket, TutorService};

// Image lab session + driver
pub use image_lab::{EditTicket, ImageEditSession, ImageLabService, ImageStatus, SourceImage};

// Course catalog (pure derived view, no I/O)
pub use catalog::{
    academy_catalog, catalog_view, level_counts, ColorTag, CourseIcon, CourseLevel, CourseRecord,
    LevelCounts, LevelFilter, SortKey,
};

// Notification center (timer-expiring toasts)
pub use notify::{Notification, NotificationCenter, Severity, AUTO_DISMISS};
