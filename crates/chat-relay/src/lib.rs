//! chat-relay - forwards a single chat message to an OpenAI-compatible
//! completion API and returns the generated text.

pub mod config;
pub mod error;
pub mod handlers;
pub mod llm;
pub mod response;
pub mod server;

pub use server::{AppState, build_app};
