use crate::message::Message;
use crate::llm::{LLMResult, GenerateResult};
use crate::tools::schema::ToolSchema;
use futures::future::BoxFuture;

/// Chat model with function calling.
///
/// The returned future may borrow `messages` and `tools` for `'a`, so
/// implementations can read them without cloning. A request is the full
/// message list plus every tool the model may pick from; the answer either
/// carries tool calls or is the final text.
pub trait LLM: Send + Sync {
    fn generate<'a>(
        &'a self,
        messages: &'a [Message],
        tools: &'a [ToolSchema],
    ) -> BoxFuture<'a, LLMResult<GenerateResult>>;
}
