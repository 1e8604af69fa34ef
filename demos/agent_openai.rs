use functions_agent::prelude::*;
use tracing_subscriber::EnvFilter;

// Requires OPENAI_API_KEY in the environment.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut agent = Agent::openai("gpt-3.5-turbo", 0.7, 2000)?;

    println!("{}", agent.run("Calculate 25 * 4 + 10").await);
    println!("{}", agent.run("Analyze this text: Hello world from AI agent").await);

    agent.clear_memory();
    Ok(())
}
