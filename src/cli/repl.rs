//! Interactive console for the tutor
//!
//! Greets the student, then relays lines from stdin to the tutor and streams
//! its replies to stdout. Logs go to stderr.

use std::io::{self, Write};

use console::style;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error};

use crate::agent::{AgentEvent, Runner};
use crate::cli::commands::{handle_command, CommandResult};
use crate::core::{Config, Result};

/// Interactive REPL (Read-Eval-Print Loop)
pub struct Repl {
    runner: Runner,
}

/// Print streamed reply text as it arrives
fn print_event(event: AgentEvent) {
    match event {
        AgentEvent::Text(fragment) => {
            print!("{}", fragment);
            if let Err(e) = io::stdout().flush() {
                debug!("Failed to flush stdout: {}", e);
            }
        }
        AgentEvent::ToolCallStarted { name } => debug!("Tool call: {}", name),
        AgentEvent::ToolCallFinished { name, success } => {
            debug!("Tool {} finished (success: {})", name, success)
        }
        AgentEvent::TurnComplete => {}
    }
}

fn tutor_label() -> String {
    style("Tutor:").green().bold().to_string()
}

impl Repl {
    pub fn new(runner: Runner) -> Self {
        Self { runner }
    }

    /// Create a REPL talking to Vertex AI
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(Runner::from_config(config)?))
    }

    /// Run one message without the greeting and return the reply
    pub async fn run_once(&mut self, prompt: &str) -> Result<String> {
        self.runner.send(prompt, &|_event| {}).await
    }

    /// Run the REPL
    pub async fn run(&mut self) -> Result<()> {
        self.print_banner();

        print!("{} ", tutor_label());
        io::stdout().flush()?;
        if let Err(e) = self.runner.start(&print_event).await {
            error!("Session start failed: {}", e);
        }
        println!("\n");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            print!("{} ", style("You:").blue().bold());
            io::stdout().flush()?;

            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                // EOF (Ctrl+D)
                Ok(None) => break,
                Err(e) => {
                    error!("Error reading input: {}", e);
                    continue;
                }
            };

            match handle_command(&line, &mut self.runner).await {
                CommandResult::Exit => break,
                CommandResult::None => continue,
                CommandResult::Handled(output) => println!("{}\n", output),
                CommandResult::Reset => println!("{}\n", style("Session reset.").dim()),
                CommandResult::Continue(text) => {
                    print!("\n{} ", tutor_label());
                    io::stdout().flush()?;
                    if let Err(e) = self.runner.send(&text, &print_event).await {
                        error!("Turn failed: {}", e);
                    }
                    println!("\n");
                }
            }
        }

        println!("\n{} Good luck on your test!", tutor_label());
        Ok(())
    }

    /// Print the startup banner
    fn print_banner(&self) {
        let session = self.runner.session();
        let agent = self.runner.agent();

        println!();
        println!("{}", style("California Driver's License Tutor").bold().underlined());
        println!("  {}: {}", style("Model").dim(), agent.model());
        println!("  {}: {}", style("Session").dim(), session.session_id);
        println!("  {}: {}", style("Tools").dim(), agent.tools().names().join(", "));
        println!("Type 'help' for commands, 'exit' to quit.");
        println!();
    }
}
