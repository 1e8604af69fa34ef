use crate::message::Message;

use super::types::AgentExecuteResult;

/// Drives one query through the model/tool loop.
#[async_trait::async_trait]
pub trait AgentRunner: Send + Sync {
    /// Run `query` on top of the prior conversation `history` until the model
    /// gives a final answer or the iteration limit is reached.
    async fn execute(&self, history: &[Message], query: &str) -> AgentExecuteResult;
}
