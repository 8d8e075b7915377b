// src/chat/mod.rs — Paper-aware chat: sessions, prompt, rendering

pub mod markdown;
pub mod orchestrator;
pub mod prompt;
pub mod session;

pub use orchestrator::{ChatOrchestrator, ChatReply};
pub use session::{Message, PaperContext, Role, SessionStore};
