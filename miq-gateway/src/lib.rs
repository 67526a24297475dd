//! Chat-channel gateway: the three-tier message router, per-user
//! conversation sessions, the card formatter, and the axum webhook surface.

pub mod conversation;
pub mod formatter;
pub mod router;
pub mod webhook;

pub use conversation::{ConversationManager, SessionKey};
pub use router::{NullLlmClient, OpenAiRouterClient, Router, RouterLlmClient};
pub use webhook::{build_router, AppState};
