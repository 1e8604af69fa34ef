pub mod traits;
pub mod openai;
pub mod ollama;
pub mod tokens;
pub mod error;


use serde::{Serialize, Deserialize};
use serde_json::Value as JsonValue;
use tokens::TokenUsage;

/// Result of one model call.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct GenerateResult {
    pub tokens: TokenUsage,
    pub generation: String,
    /// Structured tool calls the model asked for, in the order it listed them.
    #[serde(default)]
    pub tool_calls: Vec<CallInfo>,
}

impl GenerateResult {
    /// A plain answer with no tool calls.
    pub fn answer(generation: impl Into<String>) -> Self {
        Self {
            generation: generation.into(),
            ..Self::default()
        }
    }

    /// A turn that only requests tools.
    pub fn calls(tool_calls: Vec<CallInfo>) -> Self {
        Self {
            tool_calls,
            ..Self::default()
        }
    }
}

/// Structured information about a single tool call requested by the model.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CallInfo {
    /// Provider-assigned id, echoed back on the matching tool result.
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub args: JsonValue,
}

impl CallInfo {
    pub fn new(id: impl Into<String>, name: impl Into<String>, args: JsonValue) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            args,
        }
    }
}

/// Result type for LLM operations.
pub type LLMResult<T> = std::result::Result<T, error::LLMError>;
