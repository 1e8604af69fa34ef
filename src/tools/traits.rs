use serde_json::{Map, Value};

use super::error::ToolError;
use super::schema::ToolSchema;

// re-export ArgSchema for macros use
pub use super::schema::ArgSchema;

/// A named capability the model may invoke.
///
/// Implement by hand, or generate from a plain function with `#[tool(...)]`.
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn args(&self) -> Vec<ArgSchema>;
    async fn run(&self, input: Value) -> Result<String, ToolError>;

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name().to_string(),
            description: self.description().to_string(),
            args: self.args(),
        }
    }
}

/// Normalize input for tools that take one string argument.
///
/// Models send single-input tools either a bare string, an object keyed by the
/// declared parameter, or an object with one arbitrary key (`{"__arg1": ...}`).
/// The first and last forms are rewritten to `{ param: <string> }`.
pub fn single_arg_input(input: Value, param: &str) -> Value {
    match input {
        Value::String(s) => {
            let mut map = Map::new();
            map.insert(param.to_string(), Value::String(s));
            Value::Object(map)
        }
        Value::Object(map) if map.len() == 1 && !map.contains_key(param) => {
            match map.into_iter().next() {
                Some((_, value @ Value::String(_))) => {
                    let mut renamed = Map::new();
                    renamed.insert(param.to_string(), value);
                    Value::Object(renamed)
                }
                Some((key, value)) => {
                    let mut original = Map::new();
                    original.insert(key, value);
                    Value::Object(original)
                }
                None => Value::Object(Map::new()),
            }
        }
        other => other,
    }
}
