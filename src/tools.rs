pub mod traits;
pub mod schema;
pub mod error;
pub mod registry;
pub mod calculator;
pub mod builtin;

pub use registry::ToolRegistry;
pub use traits::Tool;
