use async_openai::error::OpenAIError;
use super::ollama::OllamaError;


#[derive(Debug, thiserror::Error)]
pub enum LLMError {
    #[error("OpenAI error: {0}")]
    OpenAIError(#[from] OpenAIError),

    #[error("Ollama error: {0}")]
    OllamaError(#[from] OllamaError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}
