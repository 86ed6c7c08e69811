//! UI-agnostic conversation types
//!
//! These are shared by the orchestrator, the store and whatever front end
//! displays the conversation.

/// Who wrote a conversation entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Author {
    User,
    Bot,
}

/// One message in the conversation log. Entries are never edited after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationEntry {
    author: Author,
    content: String,
}

impl ConversationEntry {
    pub fn new(author: Author, content: impl Into<String>) -> Self {
        Self {
            author,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Author::User, content)
    }

    pub fn bot(content: impl Into<String>) -> Self {
        Self::new(Author::Bot, content)
    }

    pub fn author(&self) -> Author {
        self.author
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_user(&self) -> bool {
        self.author == Author::User
    }
}
