use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use super::error::ToolError;
use super::schema::ToolSchema;
use super::traits::Tool;

/// Fixed set of tools, in registration order, addressed by exact name.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool. Names are unique; a second tool with the same name is rejected.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<&mut Self, ToolError> {
        let name = tool.name().to_string();
        if self.index.contains_key(&name) {
            return Err(ToolError::DuplicateName(name));
        }
        self.index.insert(name, self.tools.len());
        self.tools.push(tool);
        Ok(self)
    }

    pub fn lookup(&self, name: &str) -> Result<Arc<dyn Tool>, ToolError> {
        self.index
            .get(name)
            .map(|&i| Arc::clone(&self.tools[i]))
            .ok_or_else(|| ToolError::ToolNotFound(name.to_string()))
    }

    /// Tools in registration order.
    pub fn list(&self) -> &[Arc<dyn Tool>] {
        &self.tools
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Schemas for advertising the tools to a model, in registration order.
    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.tools.iter().map(|t| t.schema()).collect()
    }

    pub async fn invoke(&self, name: &str, input: Value) -> Result<String, ToolError> {
        self.lookup(name)?.run(input).await
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry").field("tools", &self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::builtin::{CalculatorTool, CodeGeneratorTool, TextAnalysisTool, default_tools};
    use serde_json::json;

    #[test]
    fn duplicate_names_are_rejected() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(CalculatorTool)).unwrap();
        let err = registry.register(Arc::new(CalculatorTool)).err().unwrap();
        assert!(matches!(err, ToolError::DuplicateName(ref n) if n == "Calculator"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn list_follows_registration_order() {
        let mut registry = ToolRegistry::new();
        registry
            .register(Arc::new(TextAnalysisTool))
            .and_then(|r| r.register(Arc::new(CodeGeneratorTool)))
            .and_then(|r| r.register(Arc::new(CalculatorTool)))
            .unwrap();
        assert_eq!(registry.names(), ["TextAnalysis", "CodeGenerator", "Calculator"]);

        let schemas = registry.schemas();
        assert_eq!(schemas[2].name, "Calculator");
    }

    #[test]
    fn lookup_is_exact() {
        let registry = default_tools();
        assert!(registry.lookup("Calculator").is_ok());
        let err = registry.lookup("calculator").err().unwrap();
        assert!(matches!(err, ToolError::ToolNotFound(ref n) if n == "calculator"));
    }

    #[tokio::test]
    async fn invoke_runs_the_named_tool() {
        let registry = default_tools();
        let out = registry
            .invoke("TextAnalysis", json!({"text": "one two"}))
            .await
            .unwrap();
        assert_eq!(out, "Analysis: 2 words, 7 characters");

        let missing = registry.invoke("Search", json!({})).await;
        assert!(matches!(missing, Err(ToolError::ToolNotFound(_))));
    }
}
