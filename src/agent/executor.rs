use tracing::{debug, warn};

use crate::llm::traits::LLM;
use crate::llm::CallInfo;
use crate::message::Message;
use crate::prompt::{PromptAssembler, Scratchpad};
use crate::tools::error::ToolError;
use crate::tools::ToolRegistry;

use super::traits::AgentRunner;
use super::types::{AgentExecuteResult, AgentResult, AgentStep, StopReason, ToolCallRecord};

/// Final text when the loop runs out of iterations.
pub const ITERATION_LIMIT_MESSAGE: &str = "Agent stopped due to iteration limit or time limit.";

/// Tool-call loop for a single run, borrowing the agent's parts.
pub struct AgentExecutor<'a> {
    pub llm: &'a dyn LLM,
    pub tools: &'a ToolRegistry,
    pub prompt: &'a PromptAssembler,
    pub max_iterations: usize,
}

impl<'a> AgentExecutor<'a> {
    /// Run one requested tool. Failures become text for the model, never errors.
    async fn invoke_tool(&self, call: &CallInfo) -> String {
        let tool = match self.tools.lookup(&call.name) {
            Ok(tool) => tool,
            Err(ToolError::ToolNotFound(name)) => {
                warn!(tool = %name, "Model requested unknown tool");
                return format!(
                    "{} is not a valid tool, try one of [{}].",
                    name,
                    self.tools.names().join(", ")
                );
            }
            Err(e) => return format!("Tool {} failed: {}", call.name, e),
        };

        debug!(tool = %call.name, args = %call.args, "Invoking tool");
        match tool.run(call.args.clone()).await {
            Ok(output) => {
                debug!(tool = %call.name, output = %output, "Tool returned");
                output
            }
            Err(e) => {
                warn!(tool = %call.name, error = %e, "Tool failed");
                format!("Tool {} failed: {}", call.name, e)
            }
        }
    }
}

#[async_trait::async_trait]
impl<'a> AgentRunner for AgentExecutor<'a> {
    async fn execute(&self, history: &[Message], query: &str) -> AgentExecuteResult {
        let schemas = self.tools.schemas();
        let mut scratchpad = Scratchpad::new();
        let mut result = AgentResult::default();

        // Main loop: call the model, run the tools it asks for, repeat.
        while result.iterations < self.max_iterations {
            let msgs = self.prompt.assemble(history, query, &scratchpad);
            debug!(iteration = result.iterations + 1, messages = msgs.len(), "Calling model");

            let res = self.llm.generate(&msgs, &schemas).await?;
            result.tokens += res.tokens;
            result.iterations += 1;

            match AgentStep::from(res) {
                AgentStep::Finish(generation) => {
                    result.generation = generation;
                    result.stop_reason = StopReason::FinalAnswer;
                    return Ok(result);
                }
                AgentStep::ToolCalls { generation, calls } => {
                    scratchpad.record_calls(generation, calls.clone());
                    // strictly sequential, in the order the model listed them
                    for call in calls {
                        let output = self.invoke_tool(&call).await;
                        scratchpad.record_result(&call, output.clone());
                        result.tool_calls.push(ToolCallRecord {
                            name: call.name,
                            args: call.args,
                            output,
                        });
                    }
                }
            }
        }

        warn!(max_iterations = self.max_iterations, "Iteration limit reached without a final answer");
        result.generation = ITERATION_LIMIT_MESSAGE.to_string();
        result.stop_reason = StopReason::IterationLimitExceeded;
        Ok(result)
    }
}
