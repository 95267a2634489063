//! Tools module - Tool implementations for the tutor
//!
//! Contains the quiz bookkeeping tools, the video and handbook lookups, and the
//! tool registry.

pub mod handbook;
pub mod quiz;
pub mod registry;
pub mod video;

use async_trait::async_trait;

use crate::core::{Result, ToolCall, ToolCategory, ToolDefinition, ToolResult};

pub use handbook::HandbookSearchTool;
pub use quiz::{RecordQuizResultTool, SetQuizLimitTool};
pub use registry::ToolRegistry;
pub use video::VideoSearchTool;

/// A function the model can call
#[async_trait]
pub trait Tool: Send + Sync {
    /// Declaration sent to the model
    fn definition(&self) -> ToolDefinition;

    /// Category used for grouping and display
    fn category(&self) -> ToolCategory;

    /// Run the tool for one call
    ///
    /// Expected failures (bad arguments, remote errors) come back as text in
    /// the [`ToolResult`]; `Err` is reserved for failures the tool cannot
    /// describe to the model.
    async fn execute(&self, call: &ToolCall) -> Result<ToolResult>;
}
