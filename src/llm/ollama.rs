
use std::sync::Arc;
use serde_json::{json, Value};
use futures::{
    FutureExt,
    future::BoxFuture,
};
use tracing::debug;

use crate::config::AgentConfig;
use crate::message::Message;
use crate::message::MessageRole as MsgRole;
use crate::tools::schema::ToolSchema;

use crate::llm::{
    traits::LLM,
    tokens::TokenUsage,
    CallInfo,
    GenerateResult,
    LLMResult,
};

/// Default model name used when no model is specified.
/// Adjust this to match the model name you have installed in your local Ollama.
/// Common names: "llama3.2", "llama3", "qwen3:8b", or custom names from `ollama list`.
pub const DEFAULT_MODEL: &str = "llama3.2";

pub use ollama_rs::{
    error::OllamaError,
    Ollama as OllamaClient,
    models::ModelOptions,
    generation::chat::{request::ChatMessageRequest, ChatMessage, MessageRole},
};


/// Local models served by Ollama.
///
/// Ollama models get no native function calling here. Available tools are
/// described in an extra system message and the model is asked to answer with
/// a `{"tool_calls": [...]}` object when it wants one.
#[derive(Debug, Clone)]
pub struct Ollama {
    pub(crate) client: Arc<OllamaClient>,
    pub(crate) model: String,
    pub(crate) options: Option<ModelOptions>,
}
impl Ollama {
    /// Create an `Ollama` wrapper using the provided client and the default model.
    pub fn new(client: Arc<OllamaClient>) -> Self {
        Self {
            client,
            model: DEFAULT_MODEL.to_string(),
            options: None,
        }
    }

    /// Create an `Ollama` wrapper with an explicit model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Create an `Ollama` wrapper with additional generation options.
    pub fn with_options(mut self, options: ModelOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Local client on the default port with model, temperature and response
    /// cap taken from the agent configuration.
    pub fn from_agent_config(config: &AgentConfig) -> Self {
        let options = ModelOptions::default()
            .temperature(config.temperature)
            .num_predict(i32::try_from(config.max_tokens).unwrap_or(i32::MAX));
        Self::default()
            .with_model(config.model_name.clone())
            .with_options(options)
    }

    fn generate_request(&self, messages: &[Message], tools: &[ToolSchema]) -> ChatMessageRequest {
        let mut mapped_messages: Vec<ChatMessage> = Vec::with_capacity(messages.len() + 1);
        let mut messages = messages.iter().peekable();

        // Keep the caller's system prompt first, then the tool instructions.
        if let Some(first) = messages.next_if(|m| m.role == MsgRole::System) {
            mapped_messages.push(first.into());
        }
        if !tools.is_empty() {
            mapped_messages.push(ChatMessage::new(MessageRole::System, tools_prompt(tools)));
        }
        mapped_messages.extend(messages.map(ChatMessage::from));

        let request = ChatMessageRequest::new(self.model.clone(), mapped_messages);
        match &self.options {
            Some(options) => request.options(options.clone()),
            None => request,
        }
    }
}

impl Default for Ollama {
    fn default() -> Self {
        let client = Arc::new(OllamaClient::default());
        Ollama::new(client)
    }
}

/// Describe every tool and the reply format the model must use to call one.
fn tools_prompt(tools: &[ToolSchema]) -> String {
    let listing = tools
        .iter()
        .map(|schema| json!({
            "name": schema.name,
            "description": schema.description,
            "parameters": schema.parameters(),
        }))
        .collect::<Vec<_>>();

    format!(
        "You can call the following tools: {}

If you want to call a tool, reply with only this JSON object: {}

After you have the information you need, you MUST answer WITHOUT any tool_calls.",
        Value::Array(listing),
        json!({
            "tool_calls": [
                { "name": "tool_name", "args": { "param1": "value1" } }
            ]
        }),
    )
}

/// Pull `{"tool_calls": [{name, args}]}` out of a free-text reply.
///
/// The object may be the whole reply or be embedded in surrounding prose.
fn extract_tool_calls(generation: &str) -> Vec<CallInfo> {
    let parsed = serde_json::from_str::<Value>(generation).ok().or_else(|| {
        let start = generation.find('{')?;
        let end = generation.rfind('}')?;
        if start >= end {
            return None;
        }
        serde_json::from_str::<Value>(&generation[start..=end]).ok()
    });

    let Some(entries) = parsed
        .as_ref()
        .and_then(|v| v.get("tool_calls"))
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| {
            let name = entry.get("name")?.as_str()?;
            let args = entry.get("args").cloned().unwrap_or_else(|| json!({}));
            Some((name.to_string(), args))
        })
        .enumerate()
        .map(|(i, (name, args))| CallInfo::new(format!("call_{i}"), name, args))
        .collect()
}

impl From<&Message> for ChatMessage {
    fn from(message: &Message) -> Self {
        match message.role {
            MsgRole::System => ChatMessage::new(MessageRole::System, message.content.clone()),
            MsgRole::Human => ChatMessage::new(MessageRole::User, message.content.clone()),
            MsgRole::Assistant if message.content.is_empty() && !message.tool_calls.is_empty() => {
                let calls = message
                    .tool_calls
                    .iter()
                    .map(|c| json!({ "name": c.name, "args": c.args }))
                    .collect::<Vec<_>>();
                ChatMessage::new(MessageRole::Assistant, json!({ "tool_calls": calls }).to_string())
            }
            MsgRole::Assistant => ChatMessage::new(MessageRole::Assistant, message.content.clone()),
            MsgRole::Tool => {
                let name = message.name.as_deref().unwrap_or("tool");
                ChatMessage::new(
                    MessageRole::Tool,
                    format!("Tool {} returned: {}", name, message.content),
                )
            }
        }
    }
}


impl LLM for Ollama {
    fn generate<'a>(
        &'a self,
        messages: &'a [Message],
        tools: &'a [ToolSchema],
    ) -> BoxFuture<'a, LLMResult<GenerateResult>> {
        async move {
            let request = self.generate_request(messages, tools);
            debug!(model = %self.model, messages = messages.len(), "Sending Ollama chat request");

            let response = self.client.send_chat_messages(request).await?;
            let generation = response.message.content.clone();

            let tokens = response
                .final_data
                .map(|final_data| {
                    TokenUsage::new(final_data.prompt_eval_count as u32, final_data.eval_count as u32)
                })
                .unwrap_or_default();

            let tool_calls = if tools.is_empty() {
                Vec::new()
            } else {
                extract_tool_calls(&generation)
            };

            Ok(GenerateResult { tokens, generation, tool_calls })
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_calls_from_bare_json() {
        let calls = extract_tool_calls(
            r#"{"tool_calls":[{"name":"Calculator","args":{"expression":"2*3"}}]}"#,
        );
        assert_eq!(calls, vec![CallInfo::new("call_0", "Calculator", json!({"expression": "2*3"}))]);
    }

    #[test]
    fn extracts_calls_embedded_in_prose() {
        let text = r#"Sure, let me check.
{"tool_calls":[{"name":"TextAnalysis","args":{"text":"a b"}},{"name":"CodeGenerator"}]}
Done."#;
        let calls = extract_tool_calls(text);
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].id, "call_1");
        assert_eq!(calls[1].name, "CodeGenerator");
        assert_eq!(calls[1].args, json!({}));
    }

    #[test]
    fn plain_answer_has_no_calls() {
        assert!(extract_tool_calls("The answer is 110.").is_empty());
        assert!(extract_tool_calls("} not json {").is_empty());
        assert!(extract_tool_calls(r#"{"answer": 110}"#).is_empty());
    }

    #[test]
    fn tool_instructions_follow_system_prompt() {
        let ollama = Ollama::default();
        let schema = ToolSchema {
            name: "Calculator".to_string(),
            description: "math".to_string(),
            args: Vec::new(),
        };
        let request = ollama.generate_request(&[Message::system("sys"), Message::human("hi")], &[schema]);
        assert_eq!(request.messages.len(), 3);
        assert_eq!(request.messages[0].content, "sys");
        assert!(request.messages[1].content.contains("Calculator"));
        assert_eq!(request.messages[2].content, "hi");
    }
}
