use crate::llm::CallInfo;
use crate::message::Message;

/// Instructions sent ahead of every conversation.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant with multiple capabilities.
Use the available tools to help users with their requests.
Always be accurate and provide detailed explanations.";

/// Intermediate tool calls and their results for a single run.
///
/// Lives only as long as one trip through the tool loop; nothing in here is
/// written to conversation memory.
#[derive(Debug, Default, Clone)]
pub struct Scratchpad {
    steps: Vec<Message>,
}

impl Scratchpad {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the model turn that requested `calls`.
    pub fn record_calls(&mut self, generation: impl Into<String>, calls: Vec<CallInfo>) {
        self.steps.push(Message::assistant_tool_calls(generation, calls));
    }

    /// Record the output of one tool invocation.
    pub fn record_result(&mut self, call: &CallInfo, output: impl Into<String>) {
        self.steps.push(Message::tool_res(&call.name, &call.id, output));
    }

    pub fn messages(&self) -> &[Message] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Builds the message sequence handed to the model:
/// system instructions, prior turns, the new query, then the scratchpad.
#[derive(Debug, Clone)]
pub struct PromptAssembler {
    system_prompt: String,
}

impl PromptAssembler {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
        }
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn assemble(&self, history: &[Message], query: &str, scratchpad: &Scratchpad) -> Vec<Message> {
        let mut msgs = Vec::with_capacity(history.len() + scratchpad.messages().len() + 2);
        msgs.push(Message::system(self.system_prompt.clone()));
        msgs.extend(history.iter().cloned());
        msgs.push(Message::human(query));
        msgs.extend(scratchpad.messages().iter().cloned());
        msgs
    }
}

impl Default for PromptAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_SYSTEM_PROMPT)
    }
}
