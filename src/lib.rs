pub mod api;
pub mod chat;
pub mod cli;
pub mod config;
pub mod llm;
pub mod session;
