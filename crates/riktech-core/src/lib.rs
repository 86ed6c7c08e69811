pub mod config;
pub mod error;
pub mod gateway;
pub mod orchestrator;
pub mod provider;
pub mod render;
pub mod state;
pub mod store;

// Re-export main types for convenience
pub use config::Config;
pub use error::{GatewayError, StoreError, ValidationError};
pub use gateway::{Gateway, HttpGateway};
pub use orchestrator::{ChatTurns, CodeTurns, Dispatch, TurnOutcome, TurnState};
pub use provider::Provider;
pub use render::{render, Segment};
pub use state::{Author, ConversationEntry};
pub use store::{ConversationStore, FileSlot, MemorySlot, SnapshotSlot};
