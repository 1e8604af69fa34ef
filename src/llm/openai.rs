// Reference: https://github.com/64bit/async-openai/blob/main/examples/tool-call/src/main.rs
pub use async_openai::{
    Client, config::{Config, OpenAIConfig}
};
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
    ChatCompletionTool, ChatCompletionToolArgs, ChatCompletionToolType,
    CreateChatCompletionRequest, CreateChatCompletionRequestArgs, FunctionCall,
    FunctionObjectArgs,
};
use serde::{Serialize, Deserialize};
use serde_json::Value;
use std::time::Duration;
use futures::{FutureExt, future::BoxFuture};
use tracing::debug;

use crate::config::AgentConfig;
use crate::message::{Message, MessageRole};
use crate::tools::schema::ToolSchema;
use crate::llm::{
    traits::LLM,
    tokens::TokenUsage,
    error::LLMError,
    CallInfo,
    GenerateResult,
    LLMResult,
};

/// Model used when nothing else is configured.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Default timeout for a single chat completion request.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;


#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionOptions {
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// A unique identifier representing your end-user, which will help OpenAI to monitor and detect abuse.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: None,
            temperature: None,
            user: None,
        }
    }
}

/// Chat completions backend with native tool calling.
#[derive(Clone)]
pub struct OpenAI {
    pub client: Client<OpenAIConfig>,
    pub options: CompletionOptions,
}

impl OpenAI {
    /// Client configured from the environment (`OPENAI_API_KEY`, `OPENAI_BASE_URL`).
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            options: CompletionOptions::default(),
        }
    }

    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self::with_config(OpenAIConfig::new().with_api_key(api_key))
    }

    pub fn with_config(config: OpenAIConfig) -> Self {
        Self {
            client: Client::with_config(config),
            options: CompletionOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CompletionOptions) -> Self {
        self.options = options;
        self
    }

    /// Build the backend described by an agent configuration: model, sampling
    /// temperature, response cap, optional API base and request timeout.
    pub fn from_agent_config(config: &AgentConfig) -> LLMResult<Self> {
        let mut openai_config = OpenAIConfig::new();
        if let Some(api_base) = &config.api_base {
            openai_config = openai_config.with_api_base(api_base);
        }
        if let Some(api_key) = &config.api_key {
            openai_config = openai_config.with_api_key(api_key);
        }

        let timeout = Duration::from_secs(config.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client: Client::with_config(openai_config).with_http_client(http_client),
            options: CompletionOptions {
                model: config.model_name.clone(),
                max_tokens: Some(config.max_tokens),
                temperature: Some(config.temperature),
                user: None,
            },
        })
    }

    #[allow(deprecated)]
    fn generate_request(&self, messages: &[Message], tools: &[ToolSchema]) -> LLMResult<CreateChatCompletionRequest> {
        let mapped_messages = messages
            .iter()
            .map(request_message)
            .collect::<LLMResult<Vec<_>>>()?;

        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(self.options.model.clone()).messages(mapped_messages);
        if let Some(temperature) = self.options.temperature {
            args.temperature(temperature);
        }
        if let Some(max_tokens) = self.options.max_tokens {
            args.max_tokens(max_tokens);
        }
        if let Some(user) = &self.options.user {
            args.user(user.clone());
        }
        if !tools.is_empty() {
            let tools = tools.iter().map(tool_definition).collect::<LLMResult<Vec<_>>>()?;
            args.tools(tools);
        }
        Ok(args.build()?)
    }
}

impl Default for OpenAI {
    fn default() -> Self {
        Self::new()
    }
}

fn request_message(message: &Message) -> LLMResult<ChatCompletionRequestMessage> {
    let mapped: ChatCompletionRequestMessage = match message.role {
        MessageRole::System => ChatCompletionRequestSystemMessageArgs::default()
            .content(message.content.clone())
            .build()?
            .into(),
        MessageRole::Human => ChatCompletionRequestUserMessageArgs::default()
            .content(message.content.clone())
            .build()?
            .into(),
        MessageRole::Assistant => {
            let mut args = ChatCompletionRequestAssistantMessageArgs::default();
            if !message.content.is_empty() || message.tool_calls.is_empty() {
                args.content(message.content.clone());
            }
            if !message.tool_calls.is_empty() {
                args.tool_calls(message.tool_calls.iter().map(message_tool_call).collect::<Vec<_>>());
            }
            args.build()?.into()
        }
        MessageRole::Tool => ChatCompletionRequestToolMessageArgs::default()
            .tool_call_id(message.tool_call_id.clone().unwrap_or_default())
            .content(message.content.clone())
            .build()?
            .into(),
    };
    Ok(mapped)
}

fn message_tool_call(call: &CallInfo) -> ChatCompletionMessageToolCall {
    ChatCompletionMessageToolCall {
        id: call.id.clone(),
        r#type: ChatCompletionToolType::Function,
        function: FunctionCall {
            name: call.name.clone(),
            arguments: call.args.to_string(),
        },
    }
}

fn tool_definition(schema: &ToolSchema) -> LLMResult<ChatCompletionTool> {
    let function = FunctionObjectArgs::default()
        .name(schema.name.clone())
        .description(schema.description.clone())
        .parameters(schema.parameters())
        .build()?;
    Ok(ChatCompletionToolArgs::default()
        .r#type(ChatCompletionToolType::Function)
        .function(function)
        .build()?)
}

/// Arguments arrive as JSON text; anything unparsable is handed to the tool verbatim.
fn parse_arguments(arguments: &str) -> Value {
    serde_json::from_str(arguments).unwrap_or_else(|_| Value::String(arguments.to_string()))
}

impl LLM for OpenAI {
    fn generate<'a>(
        &'a self,
        messages: &'a [Message],
        tools: &'a [ToolSchema],
    ) -> BoxFuture<'a, LLMResult<GenerateResult>> {
        async move {
            let request = self.generate_request(messages, tools)?;
            debug!(model = %self.options.model, messages = messages.len(), "Sending chat completion request");

            let response = self.client.chat().create(request).await?;

            let tokens = response
                .usage
                .map(|usage| TokenUsage {
                    prompt_tokens: usage.prompt_tokens,
                    completion_tokens: usage.completion_tokens,
                    total_tokens: usage.total_tokens,
                })
                .unwrap_or_default();

            let choice = response
                .choices
                .into_iter()
                .next()
                .ok_or_else(|| LLMError::InvalidResponse("no choices in completion".to_string()))?;

            let generation = choice.message.content.unwrap_or_default();
            let tool_calls = choice
                .message
                .tool_calls
                .unwrap_or_default()
                .into_iter()
                .map(|call| CallInfo::new(call.id, call.function.name, parse_arguments(&call.function.arguments)))
                .collect();

            Ok(GenerateResult { tokens, generation, tool_calls })
        }
        .boxed()
    }
}
