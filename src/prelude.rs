pub use crate::agent::{
    ERROR_PREFIX,
    executor::ITERATION_LIMIT_MESSAGE,
    traits::AgentRunner,
    types::{Agent, AgentResult, AgentStep, StopReason, ToolCallRecord},
};
pub use crate::config::{AgentConfig, Provider};
pub use crate::error::Error;
pub use crate::llm::{CallInfo, GenerateResult, LLMResult, traits::LLM};
pub use crate::memory::ConversationMemory;
pub use crate::message::{Message, MessageRole};
pub use crate::tools::{Tool, ToolRegistry, error::ToolError, schema::{ArgSchema, ToolSchema}};
pub use crate::tool;
