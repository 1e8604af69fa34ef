//! The three tools every agent starts with.

use std::sync::Arc;

use crate::tool;
use super::calculator::evaluate;
use super::registry::ToolRegistry;

#[tool(
    name = "Calculator",
    description = "Useful for mathematical calculations. Input is an arithmetic expression using numbers, + - * / and parentheses.",
    params(expression = "Arithmetic expression, e.g. '25 * 4 + 10'")
)]
pub fn calculator(expression: String) -> String {
    match evaluate(&expression) {
        Ok(value) => format!("Result: {}", value),
        Err(e) => format!("Error in calculation: {}", e),
    }
}

#[tool(
    name = "TextAnalysis",
    description = "Analyze text and provide insights",
    params(text = "The text to analyze")
)]
pub fn text_analysis(text: String) -> String {
    let word_count = text.split_whitespace().count();
    let char_count = text.chars().count();
    format!("Analysis: {} words, {} characters", word_count, char_count)
}

/// Placeholder only: echoes the requirements into a comment skeleton.
#[tool(
    name = "CodeGenerator",
    description = "Generate code snippets based on requirements",
    params(requirements = "What the code should do")
)]
pub fn code_generator(requirements: String) -> String {
    format!("# Generated code for: {}\n# Implementation goes here", requirements)
}

/// Calculator, TextAnalysis and CodeGenerator, in that order.
pub fn default_tools() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    for tool in [
        Arc::new(CalculatorTool) as Arc<dyn crate::tools::Tool>,
        Arc::new(TextAnalysisTool),
        Arc::new(CodeGeneratorTool),
    ] {
        let registered = registry.register(tool).is_ok();
        debug_assert!(registered, "default tool names must be distinct");
    }
    registry
}
