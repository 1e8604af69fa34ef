use functions_agent::prelude::*;
use mockito::{Matcher, Server};
use serde_json::json;

fn config_for(server: &Server) -> AgentConfig {
    AgentConfig {
        model_name: "gpt-test".to_string(),
        temperature: 0.0,
        max_tokens: 64,
        api_base: Some(server.url()),
        api_key: Some("test-key".to_string()),
        request_timeout_secs: Some(5),
        ..AgentConfig::default()
    }
}

fn completion(message: serde_json::Value, finish_reason: &str) -> String {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "created": 1_700_000_000,
        "model": "gpt-test",
        "choices": [{
            "index": 0,
            "message": message,
            "finish_reason": finish_reason,
            "logprobs": null
        }],
        "usage": { "prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15 }
    })
    .to_string()
}

#[tokio::test]
async fn final_answer_round_trip() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer test-key")
        .match_body(Matcher::PartialJson(json!({ "model": "gpt-test", "max_tokens": 64 })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion(json!({ "role": "assistant", "content": "Hello there" }), "stop"))
        .expect(1)
        .create_async()
        .await;

    let mut agent = Agent::from_config(config_for(&server)).unwrap();
    let result = agent.try_run("Say hello").await.unwrap();

    assert_eq!(result.generation, "Hello there");
    assert_eq!(result.stop_reason, StopReason::FinalAnswer);
    assert_eq!(result.tokens.total_tokens, 15);
    assert_eq!(agent.history().len(), 2);
    mock.assert_async().await;
}

#[tokio::test]
async fn native_tool_calls_are_decoded_and_executed() {
    let mut server = Server::new_async().await;
    let tool_call = json!({
        "role": "assistant",
        "content": null,
        "tool_calls": [{
            "id": "call_1",
            "type": "function",
            "function": {
                "name": "Calculator",
                "arguments": "{\"expression\": \"25 * 4 + 10\"}"
            }
        }]
    });
    let mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion(tool_call, "tool_calls"))
        .expect(2)
        .create_async()
        .await;

    let config = config_for(&server).with_max_iterations(2);
    let mut agent = Agent::from_config(config).unwrap();
    let result = agent.try_run("Calculate 25 * 4 + 10").await.unwrap();

    assert_eq!(result.stop_reason, StopReason::IterationLimitExceeded);
    assert_eq!(result.tool_calls.len(), 2);
    assert_eq!(result.tool_calls[0].name, "Calculator");
    assert_eq!(result.tool_calls[0].args, json!({ "expression": "25 * 4 + 10" }));
    assert_eq!(result.tool_calls[0].output, "Result: 110");
    assert_eq!(result.tokens.total_tokens, 30);
    mock.assert_async().await;
}

#[tokio::test]
async fn api_failure_becomes_error_text() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "error": {
                    "message": "Incorrect API key provided",
                    "type": "invalid_request_error",
                    "param": null,
                    "code": "invalid_api_key"
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let mut agent = Agent::from_config(config_for(&server)).unwrap();
    let reply = agent.run("Calculate 25 * 4 + 10").await;

    assert!(reply.starts_with("I encountered an error: "), "got {reply}");
    assert!(reply.contains("Incorrect API key provided"), "got {reply}");
    assert!(agent.history().is_empty());
    mock.assert_async().await;
}

#[test]
fn invalid_config_fails_before_any_request() {
    let err = Agent::from_config(AgentConfig::new("gpt-test", 0.7, 0)).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}
