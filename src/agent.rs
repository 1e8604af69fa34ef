use std::sync::Arc;
use tracing::{error, info};

use crate::config::{AgentConfig, ConfigError, Provider};
use crate::error::Result;
use crate::llm::{ollama::Ollama, openai::OpenAI, traits::LLM};
use crate::memory::ConversationMemory;
use crate::message::Message;
use crate::prompt::PromptAssembler;
use crate::tools::{builtin::default_tools, error::ToolError, traits::Tool, ToolRegistry};


pub mod types;
pub mod error;
pub mod traits;
pub mod executor;

use executor::AgentExecutor;
use traits::AgentRunner;
use types::{Agent, AgentExecuteResult};

/// Prefix of every answer produced from a failed run.
pub const ERROR_PREFIX: &str = "I encountered an error: ";


impl Agent {
    /// Build an agent around `llm` with the default tools and an empty memory.
    ///
    /// Fails if the configuration is invalid (empty model name, `max_tokens`
    /// of zero, temperature outside 0.0..=2.0).
    pub fn new(config: AgentConfig, llm: Arc<dyn LLM>) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        let agent = Self {
            prompt: PromptAssembler::new(config.system_prompt.clone()),
            tools: default_tools(),
            memory: ConversationMemory::new(),
            llm,
            config,
        };
        info!(model = %agent.config.model_name, tools = ?agent.tools.names(), "AI Agent initialized");
        Ok(agent)
    }

    /// Build an agent and the backend its configuration names.
    pub fn from_config(config: AgentConfig) -> Result<Self> {
        config.validate()?;
        let llm: Arc<dyn LLM> = match config.provider {
            Provider::OpenAI => Arc::new(OpenAI::from_agent_config(&config)?),
            Provider::Ollama => Arc::new(Ollama::from_agent_config(&config)),
        };
        Ok(Self::new(config, llm)?)
    }

    /// OpenAI-backed agent; the API key comes from `OPENAI_API_KEY`.
    pub fn openai(model_name: impl Into<String>, temperature: f32, max_tokens: u32) -> Result<Self> {
        Self::from_config(AgentConfig::new(model_name, temperature, max_tokens))
    }

    /// Add a tool beyond the defaults. Names must stay unique.
    pub fn register_tool(&mut self, tool: Arc<dyn Tool>) -> std::result::Result<&mut Self, ToolError> {
        self.tools.register(tool)?;
        Ok(self)
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    /// Conversation so far, oldest first.
    pub fn history(&self) -> &[Message] {
        self.memory.history()
    }

    /// Run `query` and return the full result, or the error that stopped it.
    ///
    /// Memory gains the query and the answer only when the run completes;
    /// a failed run leaves it untouched.
    pub async fn try_run(&mut self, query: &str) -> AgentExecuteResult {
        info!(query = %query, "Processing query");
        let result = {
            let executor = AgentExecutor {
                llm: self.llm.as_ref(),
                tools: &self.tools,
                prompt: &self.prompt,
                max_iterations: self.config.max_iterations,
            };
            executor.execute(self.memory.history(), query).await?
        };

        self.memory.append(Message::human(query));
        self.memory.append(Message::assistant(result.generation.clone()));
        info!(
            iterations = result.iterations,
            tool_calls = result.tool_calls.len(),
            total_tokens = result.tokens.total_tokens,
            stop_reason = ?result.stop_reason,
            "Query complete"
        );
        Ok(result)
    }

    /// Run `query` and return the answer text. Never fails: errors come back
    /// as text starting with [`ERROR_PREFIX`].
    pub async fn run(&mut self, query: &str) -> String {
        match self.try_run(query).await {
            Ok(result) => result.generation,
            Err(e) => {
                error!(error = %e, "Error processing query");
                format!("{}{}", ERROR_PREFIX, e)
            }
        }
    }

    pub fn clear_memory(&mut self) {
        self.memory.clear();
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("config", &self.config)
            .field("tools", &self.tools)
            .field("memory_turns", &self.memory.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{GenerateResult, LLMResult};
    use crate::tools::schema::ToolSchema;
    use futures::{FutureExt, future::BoxFuture};

    struct Echo;

    impl LLM for Echo {
        fn generate<'a>(
            &'a self,
            messages: &'a [Message],
            _tools: &'a [ToolSchema],
        ) -> BoxFuture<'a, LLMResult<GenerateResult>> {
            async move {
                let last = messages.last().map(|m| m.content.clone()).unwrap_or_default();
                Ok(GenerateResult::answer(format!("echo: {last}")))
            }
            .boxed()
        }
    }

    #[test]
    fn construction_fails_fast_on_bad_config() {
        let err = Agent::new(AgentConfig::new("", 0.7, 10), Arc::new(Echo)).unwrap_err();
        assert!(matches!(err, ConfigError::MissingConfig(_)));

        let err = Agent::new(AgentConfig::new("m", 0.7, 0), Arc::new(Echo)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidConfig(_)));
    }

    #[test]
    fn starts_with_default_tools_and_empty_memory() {
        let agent = Agent::new(AgentConfig::default(), Arc::new(Echo)).unwrap();
        assert_eq!(agent.tools().names(), ["Calculator", "TextAnalysis", "CodeGenerator"]);
        assert!(agent.history().is_empty());
    }

    #[tokio::test]
    async fn run_persists_query_and_answer() {
        let mut agent = Agent::new(AgentConfig::default(), Arc::new(Echo)).unwrap();
        assert_eq!(agent.run("hello").await, "echo: hello");
        assert_eq!(agent.history(), [Message::human("hello"), Message::assistant("echo: hello")]);

        agent.clear_memory();
        assert!(agent.history().is_empty());
        assert_eq!(agent.tools().len(), 3);
    }

    #[test]
    fn registering_a_default_name_again_fails() {
        let mut agent = Agent::new(AgentConfig::default(), Arc::new(Echo)).unwrap();
        let err = agent
            .register_tool(Arc::new(crate::tools::builtin::CalculatorTool))
            .err()
            .unwrap();
        assert!(matches!(err, ToolError::DuplicateName(_)));
    }
}
