use std::sync::Mutex;

use async_trait::async_trait;
use riktech_core::orchestrator::{code_prompt, CHAT_FALLBACK_MESSAGE};
use riktech_core::{
    Author, ChatTurns, CodeTurns, ConversationEntry, ConversationStore, FileSlot, Gateway,
    GatewayError, Provider, SnapshotSlot, TurnOutcome, ValidationError,
};

/// Gateway double that replays canned results and records what it was sent.
struct ScriptedGateway {
    replies: Mutex<Vec<Result<String, GatewayError>>>,
    sent: Mutex<Vec<(String, Provider)>>,
}

impl ScriptedGateway {
    fn new(replies: Vec<Result<String, GatewayError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().rev().collect()),
            sent: Mutex::new(Vec::new()),
        }
    }

    fn sent(&self) -> Vec<(String, Provider)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Gateway for ScriptedGateway {
    async fn send(&self, prompt: &str, provider: Provider) -> Result<String, GatewayError> {
        self.sent.lock().unwrap().push((prompt.to_string(), provider));
        self.replies
            .lock()
            .unwrap()
            .pop()
            .unwrap_or(Err(GatewayError::HttpStatus(500)))
    }
}

fn file_store(dir: &tempfile::TempDir) -> (ConversationStore, FileSlot) {
    let slot = FileSlot::in_dir(dir.path(), "riktech-ai-chat");
    (ConversationStore::open(slot.clone()), slot)
}

#[tokio::test]
async fn hello_turn_is_logged_and_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let (store, slot) = file_store(&dir);
    let mut chat = ChatTurns::new(store);
    let gateway = ScriptedGateway::new(vec![Ok("hi there".to_string())]);

    let outcome = chat.run(&gateway, "hello", Provider::OpenAI).await.unwrap();

    assert_eq!(outcome, TurnOutcome::Completed);
    let expected = vec![ConversationEntry::user("hello"), ConversationEntry::bot("hi there")];
    assert_eq!(chat.entries(), expected.as_slice());
    assert_eq!(gateway.sent(), vec![("hello".to_string(), Provider::OpenAI)]);

    let mut reopened = ConversationStore::new(slot);
    assert_eq!(reopened.restore().unwrap(), expected.as_slice());
}

#[tokio::test]
async fn transport_failure_appends_one_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let (store, slot) = file_store(&dir);
    let mut chat = ChatTurns::new(store);

    let refused = reqwest::Client::new()
        .get("http://127.0.0.1:1/")
        .send()
        .await
        .unwrap_err();
    let gateway = ScriptedGateway::new(vec![Err(GatewayError::Transport(refused))]);

    let outcome = chat.run(&gateway, "hello", Provider::Gemini).await.unwrap();

    assert_eq!(outcome, TurnOutcome::Failed);
    assert_eq!(
        chat.entries(),
        &[ConversationEntry::user("hello"), ConversationEntry::bot(CHAT_FALLBACK_MESSAGE)]
    );
    let persisted = ConversationStore::open(slot);
    assert_eq!(persisted.len(), 2);
}

#[tokio::test]
async fn each_turn_grows_persisted_log_by_two() {
    let dir = tempfile::tempdir().unwrap();
    let (store, slot) = file_store(&dir);
    let mut chat = ChatTurns::new(store);
    let gateway = ScriptedGateway::new(vec![
        Ok("one".to_string()),
        Err(GatewayError::Protocol(Provider::Gemini)),
        Ok("three".to_string()),
    ]);

    for (i, prompt) in ["a", "b", "c"].iter().enumerate() {
        chat.run(&gateway, prompt, Provider::OpenAI).await.unwrap();
        assert_eq!(ConversationStore::open(slot.clone()).len(), (i + 1) * 2);
    }

    let authors: Vec<Author> = chat.entries().iter().map(|e| e.author()).collect();
    assert_eq!(
        authors,
        vec![Author::User, Author::Bot, Author::User, Author::Bot, Author::User, Author::Bot]
    );
}

#[tokio::test]
async fn empty_prompt_never_reaches_gateway() {
    let dir = tempfile::tempdir().unwrap();
    let (store, slot) = file_store(&dir);
    let mut chat = ChatTurns::new(store);
    let gateway = ScriptedGateway::new(vec![]);

    let result = chat.run(&gateway, "   ", Provider::OpenAI).await;

    assert_eq!(result, Err(ValidationError::EmptyPrompt));
    assert!(gateway.sent().is_empty());
    assert!(chat.store().shows_welcome());
    assert_eq!(slot.read().unwrap(), None);
}

#[tokio::test]
async fn startup_without_snapshot_shows_welcome() {
    let dir = tempfile::tempdir().unwrap();
    let (store, _) = file_store(&dir);
    assert!(store.is_empty());
    assert!(store.shows_welcome());
}

#[tokio::test]
async fn corrupt_history_file_starts_empty_and_is_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let slot = FileSlot::in_dir(dir.path(), "riktech-ai-chat");
    std::fs::write(slot.path(), "[{\"isUser\": tru").unwrap();

    let mut chat = ChatTurns::new(ConversationStore::open(slot.clone()));
    assert!(chat.store().shows_welcome());

    let gateway = ScriptedGateway::new(vec![Ok("fresh".to_string())]);
    chat.run(&gateway, "hello", Provider::OpenAI).await.unwrap();

    assert_eq!(ConversationStore::open(slot).len(), 2);
}

#[tokio::test]
async fn code_turn_sends_template_to_openai() {
    let mut code = CodeTurns::new();
    let gateway = ScriptedGateway::new(vec![Ok("fn main() {}".to_string())]);

    let outcome = code.run(&gateway, "an empty program", "Rust").await.unwrap();

    assert_eq!(outcome, TurnOutcome::Completed);
    assert_eq!(code.output(), Some("fn main() {}"));
    assert_eq!(
        gateway.sent(),
        vec![(code_prompt("Rust", "an empty program"), Provider::OpenAI)]
    );
}

#[tokio::test]
async fn code_turn_failure_shows_error_inline() {
    let mut code = CodeTurns::new();
    let gateway = ScriptedGateway::new(vec![Err(GatewayError::Protocol(Provider::OpenAI))]);

    let outcome = code.run(&gateway, "anything", "Go").await.unwrap();

    assert_eq!(outcome, TurnOutcome::Failed);
    assert_eq!(code.output(), Some("// Error: invalid response format from OpenAI"));
}
