pub mod agent;
pub mod api;
pub mod bridge;
pub mod cli;
pub mod config;
pub mod error;
pub mod mcp;
pub mod modes;
pub mod registry;
pub mod script;
pub mod ui;
