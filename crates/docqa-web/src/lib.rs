//! Web form for DocQA
//!
//! One text input, one answer area, served by axum. The query engine is built
//! once at startup and shared with every request through [`AppState`].

mod page;
mod routes;
mod server;


pub use page::{PageConfig, PageRenderer};
pub use routes::{AppState, AskRequest, AskResponse, router};
pub use server::{ServerConfig, serve, shutdown_signal};

// Re-export core types
pub use docqa_core::{Error, Result};
