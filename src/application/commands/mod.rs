// src/application/commands/mod.rs
//
// Command Handlers
//
// ARCHITECTURE:
// - Commands are thin adapters between UI and Services
// - Commands accept plain values, return DTOs
// - Commands handle error conversion for the UI
// - Commands NEVER contain business logic

pub mod library_commands;
pub mod reader_commands;

pub use library_commands::*;
pub use reader_commands::*;
