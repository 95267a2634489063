//! Instruction prompts for the tutor agents
//!
//! Prompts are plain text files in the configured prompts directory. A file
//! that cannot be read falls back to a generic instruction so the tutor can
//! still start.

use std::path::{Path, PathBuf};

use tracing::{debug, error};

/// Instruction used when a prompt file cannot be read
pub const FALLBACK_PROMPT: &str = "You are a helpful assistant.";

/// File name of the root tutor instruction
pub const ROOT_PROMPT_FILE: &str = "root_prompt.txt";

/// File name of the handbook researcher instruction
pub const RAG_PROMPT_FILE: &str = "rag_prompt.txt";

/// Instructions for both agents
#[derive(Debug, Clone)]
pub struct Prompts {
    /// Root tutor instruction
    pub root: String,
    /// Handbook researcher instruction
    pub rag: String,
}

impl Prompts {
    /// Load both prompts from a directory
    pub fn load(dir: &Path) -> Self {
        Self {
            root: load_prompt(dir, ROOT_PROMPT_FILE),
            rag: load_prompt(dir, RAG_PROMPT_FILE),
        }
    }
}

/// Read a prompt file, falling back to [`FALLBACK_PROMPT`] on any read failure
pub fn load_prompt(dir: &Path, filename: &str) -> String {
    let full_path: PathBuf = dir.join(filename);

    match std::fs::read_to_string(&full_path) {
        Ok(content) => {
            debug!("Loaded prompt {} ({} bytes)", full_path.display(), content.len());
            content
        }
        Err(e) => {
            error!(
                "Prompt file {} not found at {}: {}",
                filename,
                full_path.display(),
                e
            );
            FALLBACK_PROMPT.to_string()
        }
    }
}
