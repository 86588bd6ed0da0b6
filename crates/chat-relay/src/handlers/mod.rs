//! HTTP request handlers.

mod chat;
mod health;

pub use chat::{ChatRequest, ChatResponse, chat};
pub use health::{livez, readyz};
