//! Quiz score bookkeeping for one tutoring session
//!
//! The scorekeeper is owned by the session and mutated only through the quiz
//! tools. Replies are plain text read by the model, so their wording matters.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Mutex;
use tracing::info;

/// Reply when a quiz limit cannot be parsed
pub const INVALID_LIMIT: &str = "Error: Please provide a valid number.";

/// Scorekeeper handle shared by a session and its quiz tools
pub type SharedScorekeeper = Arc<Mutex<Scorekeeper>>;

/// Running score for the current session
#[derive(Debug, Clone, Default)]
pub struct Scorekeeper {
    correct: u32,
    total: u32,
    history: Vec<String>,
    limit: i64,
    batch_count: i64,
}

/// What the tutor should do after an answer was recorded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// The configured batch is finished
    BatchComplete {
        outcome: String,
        correct: u32,
        total: u32,
        limit: i64,
    },
    /// More questions remain in the batch
    Progress {
        outcome: String,
        correct: u32,
        total: u32,
        batch: i64,
        limit: i64,
    },
    /// No batch limit configured
    Unlimited {
        outcome: String,
        correct: u32,
        total: u32,
    },
}

impl RecordOutcome {
    /// Whether this answer closed a batch
    pub fn is_batch_complete(&self) -> bool {
        matches!(self, RecordOutcome::BatchComplete { .. })
    }
}

impl fmt::Display for RecordOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordOutcome::BatchComplete {
                outcome,
                correct,
                total,
                limit,
            } => write!(
                f,
                "Result recorded ({outcome}). Total Score: {correct}/{total}. \
                 BATCH COMPLETE ({limit}/{limit}). Stop giving questions. \
                 Summary: {correct}/{total}. Ask to continue."
            ),
            RecordOutcome::Progress {
                outcome,
                correct,
                total,
                batch,
                limit,
            } => write!(
                f,
                "Result recorded ({outcome}). Total Score: {correct}/{total}. \
                 Progress: {batch}/{limit}. Proceed to next question."
            ),
            RecordOutcome::Unlimited {
                outcome,
                correct,
                total,
            } => write!(
                f,
                "Result recorded ({outcome}). Total Score: {correct}/{total}. Proceed."
            ),
        }
    }
}

/// Read-only view of the score
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreSummary {
    pub correct: u32,
    pub total: u32,
    pub history: Vec<String>,
    pub limit: i64,
    pub batch_count: i64,
}

impl fmt::Display for ScoreSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Score: {}/{}", self.correct, self.total)?;
        if self.limit > 0 {
            write!(f, " (batch {}/{})", self.batch_count, self.limit)?;
        }
        for entry in &self.history {
            write!(f, "\n  - {}", entry)?;
        }
        Ok(())
    }
}

/// Parse a quiz limit the way a model is likely to send it
fn parse_limit(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl Scorekeeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh scorekeeper behind a shared handle
    pub fn shared() -> SharedScorekeeper {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Configure the batch size; zero or negative means unlimited
    pub fn set_limit(&mut self, value: &Value) -> String {
        let Some(limit) = parse_limit(value) else {
            return INVALID_LIMIT.to_string();
        };

        self.limit = limit;
        self.batch_count = 0;
        info!("Quiz limit set to {}", limit);

        format!(
            "Quiz configured for {} questions. Ask for the topic and start Question 1.",
            limit
        )
    }

    /// Record one answer
    pub fn record(&mut self, outcome: &str, topic: &str) -> RecordOutcome {
        let outcome = outcome.trim().to_lowercase();

        self.total += 1;
        self.batch_count += 1;
        if outcome == "correct" {
            self.correct += 1;
        }
        self.history.push(format!("{}: {}", topic, outcome));

        let (correct, total) = (self.correct, self.total);
        info!("Score updated: {}/{} ({}: {})", correct, total, topic, outcome);

        if self.limit <= 0 {
            return RecordOutcome::Unlimited {
                outcome,
                correct,
                total,
            };
        }

        if self.batch_count >= self.limit {
            self.batch_count = 0;
            RecordOutcome::BatchComplete {
                outcome,
                correct,
                total,
                limit: self.limit,
            }
        } else {
            RecordOutcome::Progress {
                outcome,
                correct,
                total,
                batch: self.batch_count,
                limit: self.limit,
            }
        }
    }

    pub fn summary(&self) -> ScoreSummary {
        ScoreSummary {
            correct: self.correct,
            total: self.total,
            history: self.history.clone(),
            limit: self.limit,
            batch_count: self.batch_count,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
