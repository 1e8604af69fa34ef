use crate::llm::traits::LLM;
use std::sync::Arc;
use crate::config::AgentConfig;
use crate::memory::ConversationMemory;
use crate::prompt::PromptAssembler;
use crate::tools::ToolRegistry;
use super::error::AgentError;
use crate::llm::{CallInfo, GenerateResult, tokens::TokenUsage};
use serde::{Serialize, Deserialize};
use serde_json::Value;

/// Conversational agent: a chat model, a tool registry and a conversation buffer.
pub struct Agent {
    /// Model parameters and loop limits, fixed at construction.
    pub(crate) config: AgentConfig,

    /// The model that decides between answering and calling tools.
    pub(crate) llm: Arc<dyn LLM>,

    /// Tools the model may call by name.
    pub(crate) tools: ToolRegistry,

    /// Human queries and final answers from earlier runs.
    pub(crate) memory: ConversationMemory,

    pub(crate) prompt: PromptAssembler,
}

/// What the model decided on one turn.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentStep {
    /// Run these tools, in order, then ask again.
    ToolCalls {
        generation: String,
        calls: Vec<CallInfo>,
    },
    /// Done; this is the answer.
    Finish(String),
}

impl From<GenerateResult> for AgentStep {
    fn from(res: GenerateResult) -> Self {
        if res.tool_calls.is_empty() {
            AgentStep::Finish(res.generation)
        } else {
            AgentStep::ToolCalls {
                generation: res.generation,
                calls: res.tool_calls,
            }
        }
    }
}

/// How a run ended.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
pub enum StopReason {
    #[default]
    FinalAnswer,
    IterationLimitExceeded,
}

/// One tool invocation made during a run.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ToolCallRecord {
    pub name: String,
    pub args: Value,
    pub output: String,
}

impl std::fmt::Display for ToolCallRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.args)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct AgentResult {
    pub tokens: TokenUsage,
    pub generation: String,
    pub stop_reason: StopReason,
    /// Model calls made.
    pub iterations: usize,
    pub tool_calls: Vec<ToolCallRecord>,
}

pub type AgentExecuteResult = Result<AgentResult, AgentError>;
