//! Core module - shared infrastructure for the tutor
//!
//! This module contains foundational types, configuration, prompt loading,
//! and error handling used throughout the application.

pub mod config;
pub mod error;
pub mod prompts;
pub mod types;

pub use config::Config;
pub use error::{Result, TutorError};
pub use prompts::Prompts;
pub use types::*;
