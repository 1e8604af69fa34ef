//! A conversational functions agent.
//!
//! An [`Agent`](agent::types::Agent) pairs a chat model with a registry of
//! tools and a conversation buffer. Each [`run`](agent::types::Agent::run)
//! sends the conversation to the model, executes whatever tools it asks for,
//! feeds the results back and stops once the model answers in plain text.

pub mod llm;
pub mod tools;
pub mod agent;
pub mod message;
pub mod memory;
pub mod prompt;
pub mod config;
pub mod error;
pub mod prelude;

// re-export the proc-macro attribute for convenient use: `use functions_agent::tool;` or `#[functions_agent::tool(...)]`
#[allow(unused_imports)]
pub use functions_agent_macros::tool;

// paths the `#[tool]` expansion refers to
#[doc(hidden)]
pub use serde;
#[doc(hidden)]
pub use serde_json;
#[doc(hidden)]
pub use async_trait;
