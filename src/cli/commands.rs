//! CLI commands
//!
//! Console commands handled locally instead of being sent to the tutor. Only
//! an input consisting of the command word alone counts, so "help me with
//! parking" still goes to the tutor.

use crate::agent::Runner;

/// Result of handling one line of input
#[derive(Debug, PartialEq, Eq)]
pub enum CommandResult {
    /// Not a command, send to the tutor
    Continue(String),
    /// Command was handled, show output
    Handled(String),
    /// Session state was cleared
    Reset,
    /// Exit the console
    Exit,
    /// Blank line
    None,
}

/// Commands that need no session state
pub fn parse_command(input: &str) -> CommandResult {
    let input = input.trim();
    if input.is_empty() {
        return CommandResult::None;
    }

    match input.to_lowercase().as_str() {
        "exit" | "quit" => CommandResult::Exit,
        "help" => CommandResult::Handled(help_text()),
        _ => CommandResult::Continue(input.to_string()),
    }
}

/// Parse and handle console commands
pub async fn handle_command(input: &str, runner: &mut Runner) -> CommandResult {
    match input.trim().to_lowercase().as_str() {
        "score" => CommandResult::Handled(runner.score().await.to_string()),
        "reset" => {
            runner.reset().await;
            CommandResult::Reset
        }
        _ => parse_command(input),
    }
}

/// Generate help text
fn help_text() -> String {
    r#"Commands:
  help          Show this help message
  score         Show your quiz score so far
  reset         Start over with a clean conversation and score
  exit, quit    Leave the tutor

Anything else is sent to the tutor."#
        .to_string()
}
