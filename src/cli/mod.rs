//! CLI module - command-line interface
//!
//! Contains the console loop and its local commands.

pub mod commands;
pub mod repl;

pub use repl::Repl;
