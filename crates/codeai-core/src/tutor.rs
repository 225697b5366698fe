//! Tutor chat session: ordered transcript, `Idle ⇄ AwaitingReply` state
//! machine, and a persistent conversation handle reused across turns.
//!
//! The session itself is a pure state machine (`begin_send` / `resolve` /
//! `clear`) so the at-most-one-outstanding-call invariant is enforced and
//! testable without a network. [`TutorService`] is the async driver: it holds
//! the session behind a mutex, releases the lock across the gateway await,
//! and applies the outcome afterwards. Every outstanding call carries the
//! session generation at issue time; a reply arriving after `clear()` no
//! longer matches and is discarded instead of corrupting the fresh transcript.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::{GatewayResult, ValidationSkip};
use crate::gemini_service::{Conversation, TutorGateway};
use crate::prompts::TUTOR_FALLBACK_MESSAGE;

/// Author of a transcript turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

/// One transcript entry. Immutable once appended; transcript order is
/// semantically meaningful and never reordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

impl ChatTurn {
    fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    fn model(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            text: text.into(),
        }
    }
}

/// Session status. `AwaitingReply` gates new submissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatStatus {
    #[default]
    Idle,
    AwaitingReply,
}

/// In-flight send issued by [`ChatSession::begin_send`]. Carries the trimmed
/// message, the conversation handle for the gateway call, and the generation
/// the session had when the call was issued.
#[derive(Debug)]
pub struct SendTicket {
    generation: u64,
    message: String,
    conversation: Conversation,
}

impl SendTicket {
    /// The trimmed message to send.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Conversation handle to pass to the gateway.
    pub fn conversation_mut(&mut self) -> &mut Conversation {
        &mut self.conversation
    }
}

/// Tutor chat state: transcript, in-flight gate, conversation handle,
/// generation counter. Mutated only through its own operations.
#[derive(Debug, Default)]
pub struct ChatSession {
    transcript: Vec<ChatTurn>,
    status: ChatStatus,
    conversation: Option<Conversation>,
    generation: u64,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transcript in insertion order.
    pub fn transcript(&self) -> &[ChatTurn] {
        &self.transcript
    }

    pub fn status(&self) -> ChatStatus {
        self.status
    }

    /// True while a gateway call is outstanding for this session.
    pub fn is_awaiting_reply(&self) -> bool {
        self.status == ChatStatus::AwaitingReply
    }

    /// Start a send: validates, appends the user turn optimistically, moves
    /// to `AwaitingReply`, and hands out the conversation handle (created
    /// lazily on the first turn, reused afterwards so the model keeps
    /// context).
    ///
    /// Skips with `EmptyInput` when the trimmed text is empty and with
    /// `RequestInFlight` while a call is outstanding; a skip triggers no
    /// gateway call and leaves the transcript untouched.
    pub fn begin_send(&mut self, text: &str) -> Result<SendTicket, ValidationSkip> {
        let message = text.trim();
        if message.is_empty() {
            return Err(ValidationSkip::EmptyInput);
        }
        if self.status == ChatStatus::AwaitingReply {
            return Err(ValidationSkip::RequestInFlight);
        }

        self.transcript.push(ChatTurn::user(message));
        self.status = ChatStatus::AwaitingReply;
        Ok(SendTicket {
            generation: self.generation,
            message: message.to_string(),
            conversation: self.conversation.take().unwrap_or_default(),
        })
    }

    /// Apply the outcome of a send. On success appends the model turn (reply
    /// text, possibly empty); on gateway failure appends the fixed fallback
    /// message — the error never propagates. Either way the session returns
    /// to `Idle` and keeps the conversation handle for the next turn.
    ///
    /// Returns `false` when the ticket's generation no longer matches (the
    /// session was cleared while the call was outstanding): the late reply
    /// and its stale conversation are discarded.
    pub fn resolve(&mut self, ticket: SendTicket, outcome: GatewayResult<String>) -> bool {
        if ticket.generation != self.generation {
            debug!(
                ticket_generation = ticket.generation,
                session_generation = self.generation,
                "discarding late tutor reply for a cleared session"
            );
            // The stale conversation handle is dropped with the ticket.
            return false;
        }

        self.status = ChatStatus::Idle;
        match outcome {
            Ok(reply) => self.transcript.push(ChatTurn::model(reply)),
            Err(e) => {
                warn!("tutor gateway call failed: {e}");
                self.transcript.push(ChatTurn::model(TUTOR_FALLBACK_MESSAGE));
            }
        }
        self.conversation = Some(ticket.conversation);
        true
    }

    /// Empty the transcript and discard the conversation handle; the next
    /// send starts a fresh context with no memory of prior turns. Valid in
    /// any state; an outstanding call is not cancelled — its reply will fail
    /// the generation check in [`resolve`](Self::resolve).
    pub fn clear(&mut self) {
        self.transcript.clear();
        self.conversation = None;
        self.status = ChatStatus::Idle;
        self.generation += 1;
    }
}

/// Async driver for a [`ChatSession`]: owns the gateway and the shared
/// session, and runs the begin → call → resolve cycle without holding the
/// session lock across the network await.
pub struct TutorService<G> {
    gateway: G,
    session: Arc<Mutex<ChatSession>>,
}

impl<G: TutorGateway> TutorService<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            session: Arc::new(Mutex::new(ChatSession::new())),
        }
    }

    /// Shared handle to the session, for hosts that render the transcript.
    pub fn session(&self) -> Arc<Mutex<ChatSession>> {
        Arc::clone(&self.session)
    }

    /// Send one user message. Returns the skip reason when the session
    /// refused the send; gateway failures are absorbed into the transcript
    /// as the fallback turn and still count as `Ok`.
    pub async fn send(&self, text: &str) -> Result<(), ValidationSkip> {
        let mut ticket = self.session.lock().await.begin_send(text)?;
        let outcome = self
            .gateway
            .send_chat_message(&mut ticket.conversation, &ticket.message)
            .await;
        self.session.lock().await.resolve(ticket, outcome);
        Ok(())
    }

    /// Clear the transcript and start a fresh conversation context.
    pub async fn clear(&self) {
        self.session.lock().await.clear();
    }

    /// Snapshot of the transcript.
    pub async fn transcript(&self) -> Vec<ChatTurn> {
        self.session.lock().await.transcript().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GatewayError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;

    /// Mock gateway: scripted reply, call count, and the conversation turn
    /// count observed at each call.
    struct ScriptedGateway {
        reply: Result<String, ()>,
        calls: AtomicUsize,
        observed_turns: StdMutex<Vec<usize>>,
    }

    impl ScriptedGateway {
        fn replying(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                calls: AtomicUsize::new(0),
                observed_turns: StdMutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err(()),
                calls: AtomicUsize::new(0),
                observed_turns: StdMutex::new(Vec::new()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl TutorGateway for ScriptedGateway {
        async fn send_chat_message(
            &self,
            conversation: &mut Conversation,
            message: &str,
        ) -> GatewayResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.observed_turns
                .lock()
                .unwrap()
                .push(conversation.turn_count());
            match &self.reply {
                Ok(reply) => {
                    conversation.record_exchange(message, reply);
                    Ok(reply.clone())
                }
                Err(()) => Err(GatewayError::Transport("boom".to_string())),
            }
        }
    }

    #[tokio::test]
    async fn hello_round_trip() {
        let service = TutorService::new(ScriptedGateway::replying("hi there"));
        service.send("hello").await.unwrap();

        let transcript = service.transcript().await;
        assert_eq!(
            transcript,
            vec![
                ChatTurn {
                    role: ChatRole::User,
                    text: "hello".to_string()
                },
                ChatTurn {
                    role: ChatRole::Model,
                    text: "hi there".to_string()
                },
            ]
        );
        assert_eq!(service.session.lock().await.status(), ChatStatus::Idle);
    }

    #[tokio::test]
    async fn gateway_failure_appends_fallback_and_returns_idle() {
        let service = TutorService::new(ScriptedGateway::failing());
        service.send("hello").await.unwrap();

        let transcript = service.transcript().await;
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[1].role, ChatRole::Model);
        assert_eq!(transcript[1].text, TUTOR_FALLBACK_MESSAGE);
        assert!(!service.session.lock().await.is_awaiting_reply());
    }

    #[tokio::test]
    async fn empty_or_whitespace_message_skips_without_gateway_call() {
        let gateway = ScriptedGateway::replying("unused");
        let service = TutorService::new(gateway);
        assert_eq!(service.send("   ").await, Err(ValidationSkip::EmptyInput));
        assert_eq!(service.gateway.call_count(), 0);
        assert!(service.transcript().await.is_empty());
    }

    #[test]
    fn send_while_awaiting_is_refused() {
        let mut session = ChatSession::new();
        let ticket = session.begin_send("first").unwrap();
        assert_eq!(
            session.begin_send("second").unwrap_err(),
            ValidationSkip::RequestInFlight
        );
        // Only the optimistic user turn of the outstanding send is present.
        assert_eq!(session.transcript().len(), 1);
        session.resolve(ticket, Ok("done".to_string()));
        assert_eq!(session.transcript().len(), 2);
    }

    #[test]
    fn late_reply_after_clear_is_discarded() {
        let mut session = ChatSession::new();
        let ticket = session.begin_send("pre-clear question").unwrap();
        session.clear();
        assert!(session.transcript().is_empty());

        let applied = session.resolve(ticket, Ok("late reply".to_string()));
        assert!(!applied);
        assert!(session.transcript().is_empty());
        assert_eq!(session.status(), ChatStatus::Idle);
    }

    #[tokio::test]
    async fn clear_starts_a_fresh_conversation_context() {
        let service = TutorService::new(ScriptedGateway::replying("hi"));
        service.send("first").await.unwrap();
        service.send("second").await.unwrap();
        service.clear().await;
        assert!(service.transcript().await.is_empty());

        service.send("after clear").await.unwrap();
        // Turn counts observed by the gateway: 0, 2 (context kept), then 0
        // again — no pre-clear turns reach the gateway.
        let observed = service.gateway.observed_turns.lock().unwrap().clone();
        assert_eq!(observed, vec![0, 2, 0]);
    }

    #[tokio::test]
    async fn empty_reply_is_tolerated() {
        let service = TutorService::new(ScriptedGateway::replying(""));
        service.send("hello").await.unwrap();
        let transcript = service.transcript().await;
        assert_eq!(transcript[1].text, "");
        assert_eq!(transcript[1].role, ChatRole::Model);
    }
}
