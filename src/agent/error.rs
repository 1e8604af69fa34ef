use crate::llm::error::LLMError;

/// Failures that stop a run. Tool problems never surface here: they are
/// reported back to the model as text.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("LLM error: {0}")]
    LLMExecutionError(#[from] LLMError),
}
