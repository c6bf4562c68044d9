pub mod client;
pub mod models;

pub use client::{ChatApi, HttpChatApi};
pub use models::{ChatRequest, ChatResponse, Message, ToolCall, Usage};
