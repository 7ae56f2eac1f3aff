// Core ZettelGPT functionality, independent of any note-taking host:
// - Conversation-history resolution over linked notes
// - Incremental decoding of chat-completion event streams
// - HTTP client for the chat-completions API
// - Configuration loading
// - Shared error types

// Export client module - API client for chat completions
pub mod client;
pub use client::*;

// Export types module - Request/response data structures
pub mod types;
pub use types::*;

// Export config module - Configuration loading
pub mod config;
pub use config::*;

// Export errors module - Shared error types
pub mod errors;
pub use errors::*;

// Export vault module - Note storage seam
pub mod vault;
pub use vault::*;

// Export history module - Conversation threading
pub mod history;
pub use history::*;

// Export stream module - Event-stream decoding
pub mod stream;
pub use stream::*;
