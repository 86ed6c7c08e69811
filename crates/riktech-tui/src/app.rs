use std::sync::Arc;

use ratatui::layout::Rect;
use ratatui::text::Line;
use riktech_core::orchestrator::{CODE_LANGUAGES, EMPTY_CODE_PROMPT_NOTICE};
use riktech_core::{
    ChatTurns, CodeTurns, Config, Gateway, GatewayError, Provider, ValidationError,
};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::clipboard;
use crate::highlight;

type ReplyTask = JoinHandle<Result<String, GatewayError>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Chat,
    Code,
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Single-line text input with a character cursor
#[derive(Debug, Default, Clone)]
pub struct InputLine {
    pub text: String,
    pub cursor: usize,
}

impl InputLine {
    pub fn insert(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.text, self.cursor);
        self.text.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.text, self.cursor);
            self.text.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.text.chars().count() {
            let byte_pos = char_to_byte_index(&self.text, self.cursor);
            self.text.remove(byte_pos);
        }
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.text.chars().count());
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.text.chars().count();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub screen: Screen,
    pub gateway: Arc<dyn Gateway>,
    pub provider: Provider,
    /// Write provider changes back to the config file
    pub save_settings: bool,

    // Chat state
    pub chat: ChatTurns,
    pub chat_input: InputLine,
    pub chat_task: Option<ReplyTask>,
    pub chat_scroll: u16,
    pub chat_follow: bool,
    pub chat_height: u16,
    pub chat_area: Option<Rect>,

    // Code generation state
    pub code: CodeTurns,
    pub code_input: InputLine,
    pub code_task: Option<ReplyTask>,
    /// Language the pending or last code request was sent with
    pub code_language: &'static str,
    pub language_idx: usize,
    pub code_lines: Vec<Line<'static>>,
    pub code_scroll: u16,
    pub code_area: Option<Rect>,

    // Status line message (validation notices, clipboard results)
    pub notice: Option<String>,
    pub animation_frame: u8,
}

impl App {
    pub fn new(
        chat: ChatTurns,
        gateway: Arc<dyn Gateway>,
        provider: Provider,
        language_idx: usize,
    ) -> Self {
        Self {
            should_quit: false,
            screen: Screen::Chat,
            gateway,
            provider,
            save_settings: false,

            chat,
            chat_input: InputLine::default(),
            chat_task: None,
            chat_scroll: 0,
            chat_follow: true,
            chat_height: 0,
            chat_area: None,

            code: CodeTurns::new(),
            code_input: InputLine::default(),
            code_task: None,
            code_language: CODE_LANGUAGES[0],
            language_idx: language_idx.min(CODE_LANGUAGES.len() - 1),
            code_lines: Vec::new(),
            code_scroll: 0,
            code_area: None,

            notice: None,
            animation_frame: 0,
        }
    }

    pub fn language(&self) -> &'static str {
        CODE_LANGUAGES[self.language_idx]
    }

    pub fn is_waiting(&self) -> bool {
        match self.screen {
            Screen::Chat => self.chat.is_pending(),
            Screen::Code => self.code.is_pending(),
        }
    }

    pub fn switch_screen(&mut self) {
        self.screen = match self.screen {
            Screen::Chat => Screen::Code,
            Screen::Code => Screen::Chat,
        };
        self.notice = None;
    }

    pub fn submit_chat(&mut self) {
        let dispatch = match self.chat.submit(&self.chat_input.text, self.provider) {
            Ok(dispatch) => dispatch,
            // Empty prompts are ignored silently; the input is disabled while busy
            Err(ValidationError::EmptyPrompt | ValidationError::Busy) => return,
        };

        self.chat_input.clear();
        self.chat_follow = true;

        let gateway = Arc::clone(&self.gateway);
        self.chat_task = Some(tokio::spawn(async move {
            gateway.send(&dispatch.prompt, dispatch.provider).await
        }));
    }

    pub fn submit_code(&mut self) {
        let language = self.language();
        let dispatch = match self.code.submit(&self.code_input.text, language) {
            Ok(dispatch) => dispatch,
            Err(ValidationError::EmptyPrompt) => {
                self.notice = Some(EMPTY_CODE_PROMPT_NOTICE.to_string());
                return;
            }
            Err(ValidationError::Busy) => return,
        };

        self.notice = None;
        self.code_language = language;
        let gateway = Arc::clone(&self.gateway);
        self.code_task = Some(tokio::spawn(async move {
            gateway.send(&dispatch.prompt, dispatch.provider).await
        }));
    }

    /// Collect finished gateway tasks and feed them to their orchestrators.
    pub async fn poll_tasks(&mut self) {
        if let Some(result) = take_finished(&mut self.chat_task).await {
            self.chat.complete(result);
            self.chat_follow = true;
        }

        if let Some(result) = take_finished(&mut self.code_task).await {
            self.code.complete(result);
            self.code_scroll = 0;
            self.code_lines = match self.code.output() {
                Some(code) => highlight::highlight_code(self.code_language, code),
                None => Vec::new(),
            };
        }
    }

    pub fn cycle_provider(&mut self) {
        self.provider = self.provider.next();
        info!(provider = %self.provider, "provider selected");
        if self.save_settings {
            if let Err(e) = Config::save_provider(self.provider) {
                warn!(error = %e, "could not save provider to config");
            }
        }
    }

    pub fn next_language(&mut self) {
        self.language_idx = (self.language_idx + 1) % CODE_LANGUAGES.len();
    }

    pub fn prev_language(&mut self) {
        self.language_idx = self
            .language_idx
            .checked_sub(1)
            .unwrap_or(CODE_LANGUAGES.len() - 1);
    }

    pub fn clear_history(&mut self) {
        match self.chat.clear_history() {
            Ok(()) => {
                self.chat_scroll = 0;
                self.chat_follow = true;
                self.notice = Some("Riwayat chat dihapus".to_string());
            }
            Err(ValidationError::Busy) => {
                self.notice = Some("Tunggu balasan selesai sebelum menghapus riwayat".to_string());
            }
            Err(ValidationError::EmptyPrompt) => {}
        }
    }

    pub fn copy_last_reply(&mut self) {
        let text = self
            .chat
            .store()
            .last_bot_entry()
            .map(|entry| entry.content().to_string());
        if let Some(text) = text {
            self.copy(&text);
        }
    }

    pub fn copy_code_output(&mut self) {
        if let Some(code) = self.code.output().map(str::to_string) {
            self.copy(&code);
        }
    }

    fn copy(&mut self, text: &str) {
        self.notice = Some(if clipboard::copy_to_clipboard(text) {
            "Disalin!".to_string()
        } else {
            "Clipboard tidak tersedia".to_string()
        });
    }

    pub fn tick_animation(&mut self) {
        if self.chat.is_pending() || self.code.is_pending() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn scroll_up(&mut self, lines: u16) {
        match self.screen {
            Screen::Chat => {
                self.chat_follow = false;
                self.chat_scroll = self.chat_scroll.saturating_sub(lines);
            }
            Screen::Code => self.code_scroll = self.code_scroll.saturating_sub(lines),
        }
    }

    pub fn scroll_down(&mut self, lines: u16) {
        match self.screen {
            // The renderer clamps this and re-enables following at the bottom
            Screen::Chat => self.chat_scroll = self.chat_scroll.saturating_add(lines),
            Screen::Code => self.code_scroll = self.code_scroll.saturating_add(lines),
        }
    }
}

/// Take the task's result if it has finished, leaving running tasks in place.
async fn take_finished(task: &mut Option<ReplyTask>) -> Option<Result<String, GatewayError>> {
    if !task.as_ref().is_some_and(|t| t.is_finished()) {
        return None;
    }
    let handle = task.take()?;
    Some(match handle.await {
        Ok(result) => result,
        Err(e) => Err(GatewayError::Interrupted(e.to_string())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use riktech_core::{Author, ConversationStore, MemorySlot};
    use riktech_core::orchestrator::CHAT_FALLBACK_MESSAGE;

    struct EchoGateway;

    #[async_trait]
    impl Gateway for EchoGateway {
        async fn send(&self, prompt: &str, provider: Provider) -> Result<String, GatewayError> {
            match prompt {
                "fail" => Err(GatewayError::HttpStatus(500)),
                _ => Ok(format!("{}: {}", provider, prompt)),
            }
        }
    }

    fn test_app() -> App {
        let store = ConversationStore::open(MemorySlot::new());
        App::new(ChatTurns::new(store), Arc::new(EchoGateway), Provider::OpenAI, 0)
    }

    async fn settle(app: &mut App) {
        while app.chat_task.is_some() || app.code_task.is_some() {
            tokio::task::yield_now().await;
            app.poll_tasks().await;
        }
    }

    fn type_text(input: &mut InputLine, text: &str) {
        for c in text.chars() {
            input.insert(c);
        }
    }

    #[test]
    fn test_input_line_editing_is_utf8_safe() {
        let mut input = InputLine::default();
        type_text(&mut input, "héllo");
        input.left();
        input.left();
        input.backspace();
        assert_eq!(input.text, "hélo");
        input.home();
        input.delete();
        assert_eq!(input.text, "élo");
        input.end();
        input.insert('!');
        assert_eq!(input.text, "élo!");
    }

    #[tokio::test]
    async fn test_chat_submit_round_trip() {
        let mut app = test_app();
        type_text(&mut app.chat_input, "hello");

        app.submit_chat();
        assert!(app.chat_input.text.is_empty());
        assert!(app.is_waiting());

        settle(&mut app).await;
        let entries = app.chat.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].content(), "OpenAI: hello");
        assert!(!app.is_waiting());
    }

    #[tokio::test]
    async fn test_chat_input_kept_while_waiting() {
        let mut app = test_app();
        type_text(&mut app.chat_input, "first");
        app.submit_chat();
        type_text(&mut app.chat_input, "second");
        app.submit_chat();

        assert_eq!(app.chat_input.text, "second");
        assert_eq!(app.chat.entries().len(), 1);
        settle(&mut app).await;
    }

    #[tokio::test]
    async fn test_chat_failure_shows_fallback() {
        let mut app = test_app();
        type_text(&mut app.chat_input, "fail");
        app.submit_chat();
        settle(&mut app).await;

        let last = app.chat.entries().last().unwrap();
        assert_eq!(last.author(), Author::Bot);
        assert_eq!(last.content(), CHAT_FALLBACK_MESSAGE);
    }

    #[tokio::test]
    async fn test_empty_code_prompt_sets_notice() {
        let mut app = test_app();
        app.screen = Screen::Code;
        app.submit_code();
        assert_eq!(app.notice.as_deref(), Some(EMPTY_CODE_PROMPT_NOTICE));
        assert!(app.code_task.is_none());
    }

    #[tokio::test]
    async fn test_code_submit_highlights_output() {
        let mut app = test_app();
        app.screen = Screen::Code;
        type_text(&mut app.code_input, "print hello");
        app.submit_code();
        settle(&mut app).await;

        assert!(app.code.output().unwrap().starts_with("OpenAI: Buat kode JavaScript"));
        assert!(!app.code_lines.is_empty());
    }

    #[tokio::test]
    async fn test_code_output_uses_submitted_language() {
        let mut app = test_app();
        app.screen = Screen::Code;
        type_text(&mut app.code_input, "print hello");
        app.submit_code();
        app.next_language();
        settle(&mut app).await;

        assert_eq!(app.language(), "Python");
        assert_eq!(app.code_language, "JavaScript");
        let output = app.code.output().unwrap();
        assert_eq!(app.code_lines, highlight::highlight_code("JavaScript", output));
    }

    #[test]
    fn test_language_selection_wraps() {
        let mut app = test_app();
        app.prev_language();
        assert_eq!(app.language(), *CODE_LANGUAGES.last().unwrap());
        app.next_language();
        assert_eq!(app.language(), CODE_LANGUAGES[0]);
    }

    #[test]
    fn test_cycle_provider() {
        let mut app = test_app();
        app.cycle_provider();
        assert_eq!(app.provider, Provider::Gemini);
        app.cycle_provider();
        assert_eq!(app.provider, Provider::OpenAI);
    }
}
