//! Turn lifecycle for the chat and code-generation screens.
//!
//! A turn goes `Idle -> AwaitingReply -> Idle`. `submit` performs the first
//! transition and hands back the [`Dispatch`] the caller must send; the caller
//! feeds the gateway result into `complete`. `run` does both for callers that
//! can simply await the gateway.

use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::error::{GatewayError, ValidationError};
use crate::gateway::Gateway;
use crate::provider::Provider;
use crate::state::ConversationEntry;
use crate::store::ConversationStore;

/// Bot entry appended when a chat reply cannot be obtained.
pub const CHAT_FALLBACK_MESSAGE: &str =
    "Maaf, terjadi kesalahan saat memproses permintaan Anda. Silakan coba lagi.";

/// Shown when the code prompt is submitted empty.
pub const EMPTY_CODE_PROMPT_NOTICE: &str = "Silakan masukkan deskripsi kode yang Anda inginkan.";

/// Code generation always goes through the OpenAI-shaped endpoint.
pub const CODE_PROVIDER: Provider = Provider::OpenAI;

/// Languages offered by the code-generation language selector.
pub const CODE_LANGUAGES: &[&str] = &[
    "JavaScript",
    "Python",
    "Java",
    "C++",
    "C#",
    "PHP",
    "HTML",
    "CSS",
    "Rust",
    "Go",
    "SQL",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    AwaitingReply,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    Completed,
    Failed,
}

/// Marker for a reply that is still outstanding.
#[derive(Debug, Clone)]
pub struct PendingTurn {
    provider: Provider,
    started: Instant,
}

impl PendingTurn {
    fn start(provider: Provider) -> Self {
        Self {
            provider,
            started: Instant::now(),
        }
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// What the caller has to send to the gateway for an accepted submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub prompt: String,
    pub provider: Provider,
}

fn validate(input: &str, pending: &Option<PendingTurn>) -> Result<String, ValidationError> {
    if pending.is_some() {
        return Err(ValidationError::Busy);
    }
    let prompt = input.trim();
    if prompt.is_empty() {
        return Err(ValidationError::EmptyPrompt);
    }
    Ok(prompt.to_string())
}

/// Chat turns over a persisted conversation log.
pub struct ChatTurns {
    store: ConversationStore,
    pending: Option<PendingTurn>,
}

impl ChatTurns {
    pub fn new(store: ConversationStore) -> Self {
        Self {
            store,
            pending: None,
        }
    }

    pub fn state(&self) -> TurnState {
        if self.pending.is_some() {
            TurnState::AwaitingReply
        } else {
            TurnState::Idle
        }
    }

    pub fn pending(&self) -> Option<&PendingTurn> {
        self.pending.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn entries(&self) -> &[ConversationEntry] {
        self.store.all()
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    /// Accept a prompt: record the user entry and mark the turn pending.
    pub fn submit(&mut self, input: &str, provider: Provider) -> Result<Dispatch, ValidationError> {
        let prompt = validate(input, &self.pending)?;

        self.store.append(ConversationEntry::user(prompt.clone()));
        self.pending = Some(PendingTurn::start(provider));
        info!(%provider, "chat turn dispatched");

        Ok(Dispatch { prompt, provider })
    }

    /// Finish the pending turn with the gateway result and persist the log.
    ///
    /// Returns `None` if no turn was pending.
    pub fn complete(&mut self, result: Result<String, GatewayError>) -> Option<TurnOutcome> {
        let Some(pending) = self.pending.take() else {
            warn!("chat reply arrived with no pending turn");
            return None;
        };

        let outcome = match result {
            Ok(reply) => {
                self.store.append(ConversationEntry::bot(reply));
                TurnOutcome::Completed
            }
            Err(e) => {
                warn!(provider = %pending.provider(), error = %e, "chat turn failed");
                self.store.append(ConversationEntry::bot(CHAT_FALLBACK_MESSAGE));
                TurnOutcome::Failed
            }
        };
        info!(
            ?outcome,
            elapsed_ms = pending.elapsed().as_millis() as u64,
            "chat turn finished"
        );

        if let Err(e) = self.store.persist() {
            warn!(error = %e, "could not save chat history");
        }

        Some(outcome)
    }

    /// Submit, await the gateway, complete.
    pub async fn run(
        &mut self,
        gateway: &dyn Gateway,
        input: &str,
        provider: Provider,
    ) -> Result<TurnOutcome, ValidationError> {
        let dispatch = self.submit(input, provider)?;
        let result = gateway.send(&dispatch.prompt, dispatch.provider).await;
        Ok(self.complete(result).unwrap_or(TurnOutcome::Failed))
    }

    /// Empty the conversation. Refused while a reply is pending.
    pub fn clear_history(&mut self) -> Result<(), ValidationError> {
        if self.pending.is_some() {
            return Err(ValidationError::Busy);
        }
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "could not save cleared chat history");
        }
        Ok(())
    }
}

/// Wrap a code request in the instruction template.
pub fn code_prompt(language: &str, prompt: &str) -> String {
    format!(
        "Buat kode {} untuk: {}. Berikan hanya kodenya tanpa penjelasan tambahan.",
        language, prompt
    )
}

/// Code-generation turns. The latest result is kept as a single block of text.
#[derive(Debug, Default)]
pub struct CodeTurns {
    pending: Option<PendingTurn>,
    output: Option<String>,
}

impl CodeTurns {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> TurnState {
        if self.pending.is_some() {
            TurnState::AwaitingReply
        } else {
            TurnState::Idle
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn output(&self) -> Option<&str> {
        self.output.as_deref()
    }

    pub fn submit(&mut self, input: &str, language: &str) -> Result<Dispatch, ValidationError> {
        let prompt = validate(input, &self.pending)?;

        self.pending = Some(PendingTurn::start(CODE_PROVIDER));
        info!(language = %language, "code turn dispatched");

        Ok(Dispatch {
            prompt: code_prompt(language, &prompt),
            provider: CODE_PROVIDER,
        })
    }

    /// On failure the output becomes the error text as a comment line.
    pub fn complete(&mut self, result: Result<String, GatewayError>) -> Option<TurnOutcome> {
        let Some(pending) = self.pending.take() else {
            warn!("code reply arrived with no pending turn");
            return None;
        };

        let outcome = match result {
            Ok(code) => {
                self.output = Some(code);
                TurnOutcome::Completed
            }
            Err(e) => {
                warn!(error = %e, "code turn failed");
                self.output = Some(format!("// Error: {}", e));
                TurnOutcome::Failed
            }
        };
        info!(
            ?outcome,
            elapsed_ms = pending.elapsed().as_millis() as u64,
            "code turn finished"
        );

        Some(outcome)
    }

    pub async fn run(
        &mut self,
        gateway: &dyn Gateway,
        input: &str,
        language: &str,
    ) -> Result<TurnOutcome, ValidationError> {
        let dispatch = self.submit(input, language)?;
        let result = gateway.send(&dispatch.prompt, dispatch.provider).await;
        Ok(self.complete(result).unwrap_or(TurnOutcome::Failed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Author;
    use crate::store::MemorySlot;

    fn chat() -> (ChatTurns, MemorySlot) {
        let slot = MemorySlot::new();
        (ChatTurns::new(ConversationStore::open(slot.clone())), slot)
    }

    #[test]
    fn test_submit_appends_user_entry_and_goes_pending() {
        let (mut turns, _) = chat();
        let dispatch = turns.submit("  hello  ", Provider::Gemini).unwrap();

        assert_eq!(dispatch.prompt, "hello");
        assert_eq!(dispatch.provider, Provider::Gemini);
        assert_eq!(turns.state(), TurnState::AwaitingReply);
        assert_eq!(turns.entries(), &[ConversationEntry::user("hello")]);
        assert_eq!(turns.pending().map(|p| p.provider()), Some(Provider::Gemini));
    }

    #[test]
    fn test_empty_prompt_is_rejected_without_side_effects() {
        let (mut turns, slot) = chat();
        assert_eq!(turns.submit("   \n\t", Provider::OpenAI), Err(ValidationError::EmptyPrompt));
        assert_eq!(turns.state(), TurnState::Idle);
        assert!(turns.entries().is_empty());
        assert_eq!(slot.get(), None);
    }

    #[test]
    fn test_second_submit_while_pending_is_busy() {
        let (mut turns, _) = chat();
        turns.submit("first", Provider::OpenAI).unwrap();
        assert_eq!(turns.submit("second", Provider::OpenAI), Err(ValidationError::Busy));
        assert_eq!(turns.entries().len(), 1);
    }

    #[test]
    fn test_user_entry_is_not_persisted_until_turn_completes() {
        let (mut turns, slot) = chat();
        turns.submit("hello", Provider::OpenAI).unwrap();
        assert_eq!(slot.get(), None);
    }

    #[test]
    fn test_complete_success_appends_reply_and_persists() {
        let (mut turns, slot) = chat();
        turns.submit("hello", Provider::OpenAI).unwrap();
        let outcome = turns.complete(Ok("hi there".to_string()));

        assert_eq!(outcome, Some(TurnOutcome::Completed));
        assert_eq!(turns.state(), TurnState::Idle);
        assert_eq!(
            turns.entries(),
            &[ConversationEntry::user("hello"), ConversationEntry::bot("hi there")]
        );

        let mut reopened = ConversationStore::new(slot);
        assert_eq!(reopened.restore().unwrap(), turns.entries());
    }

    #[test]
    fn test_complete_failure_appends_fallback() {
        let (mut turns, slot) = chat();
        turns.submit("hello", Provider::OpenAI).unwrap();
        let outcome = turns.complete(Err(GatewayError::HttpStatus(502)));

        assert_eq!(outcome, Some(TurnOutcome::Failed));
        let last = turns.entries().last().unwrap();
        assert_eq!(last.author(), Author::Bot);
        assert_eq!(last.content(), CHAT_FALLBACK_MESSAGE);
        assert!(slot.get().unwrap().contains(CHAT_FALLBACK_MESSAGE));
    }

    #[test]
    fn test_complete_without_pending_turn_is_ignored() {
        let (mut turns, slot) = chat();
        assert_eq!(turns.complete(Ok("stray".to_string())), None);
        assert!(turns.entries().is_empty());
        assert_eq!(slot.get(), None);
    }

    #[test]
    fn test_clear_history_refused_while_pending() {
        let (mut turns, slot) = chat();
        turns.submit("hello", Provider::OpenAI).unwrap();
        assert_eq!(turns.clear_history(), Err(ValidationError::Busy));
        turns.complete(Ok("hi".to_string()));
        turns.clear_history().unwrap();
        assert!(turns.store().shows_welcome());
        assert_eq!(slot.get().as_deref(), Some("[]"));
    }

    #[test]
    fn test_code_prompt_template() {
        assert_eq!(
            code_prompt("Python", "fizzbuzz"),
            "Buat kode Python untuk: fizzbuzz. Berikan hanya kodenya tanpa penjelasan tambahan."
        );
    }

    #[test]
    fn test_code_submit_wraps_prompt_and_uses_openai() {
        let mut code = CodeTurns::new();
        let dispatch = code.submit(" sort a list ", "Rust").unwrap();
        assert_eq!(dispatch.provider, Provider::OpenAI);
        assert_eq!(dispatch.prompt, code_prompt("Rust", "sort a list"));
        assert!(code.is_pending());
        assert_eq!(code.submit("again", "Rust"), Err(ValidationError::Busy));
    }

    #[test]
    fn test_code_empty_prompt() {
        let mut code = CodeTurns::new();
        assert_eq!(code.submit("", "Go"), Err(ValidationError::EmptyPrompt));
        assert_eq!(code.state(), TurnState::Idle);
    }

    #[test]
    fn test_code_complete_sets_output() {
        let mut code = CodeTurns::new();
        code.submit("hello world", "Python").unwrap();
        assert_eq!(code.complete(Ok("print('hello')".to_string())), Some(TurnOutcome::Completed));
        assert_eq!(code.output(), Some("print('hello')"));
        assert_eq!(code.state(), TurnState::Idle);
    }

    #[test]
    fn test_code_failure_shows_error_text() {
        let mut code = CodeTurns::new();
        code.submit("hello world", "Python").unwrap();
        code.complete(Err(GatewayError::HttpStatus(500)));
        assert_eq!(code.output(), Some("// Error: HTTP error! status: 500"));
    }
}
