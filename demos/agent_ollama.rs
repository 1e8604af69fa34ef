use functions_agent::prelude::*;
use tracing_subscriber::EnvFilter;

// Settings come from a TOML file when one is given, e.g.
//
//     provider = "ollama"
//     model_name = "qwen3:8b"
//     temperature = 0.2
//
// Adjust the model name to one available in your Ollama server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => AgentConfig::from_file(path)?,
        None => AgentConfig {
            provider: Provider::Ollama,
            ..AgentConfig::new("qwen3:8b", 0.2, 1024)
        },
    };

    let mut agent = Agent::from_config(config)?;

    let result = agent.try_run("What is (12 + 30) * 3 / 4?").await?;
    println!("generation: {}", result.generation);
    for call in &result.tool_calls {
        println!("  called {} -> {}", call, call.output);
    }
    println!(
        "tokens: prompt={} completion={} total={}",
        result.tokens.prompt_tokens, result.tokens.completion_tokens, result.tokens.total_tokens
    );

    Ok(())
}
