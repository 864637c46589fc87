//! Tool registry
//!
//! Tools implement the typed [`Tool`] trait. Registration erases the argument
//! type behind [`ToolHandler`], which runs the decode step once at the
//! dispatch boundary: arguments that do not match `Tool::Args` become a
//! failed [`ToolCallResult`] before the tool runs.
//!
//! The registry is built once through [`ToolRegistryBuilder`] and is read-only
//! afterwards. It is stateless, so every server instance shares the same
//! `Arc<ToolRegistry>`.

use crate::error::{McpError, McpResult};
use crate::protocol::{ToolCallResult, ToolDefinition};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Failure reported by a tool implementation
#[derive(Debug, Error)]
pub enum ToolError {
    /// Arguments decoded but are semantically invalid
    #[error("{0}")]
    InvalidArguments(String),

    /// Unexpected failure inside the tool
    #[error("{0}")]
    Internal(String),
}

/// A named, schema-described operation
#[async_trait]
pub trait Tool: Send + Sync + 'static {
    /// Decoded arguments
    type Args: DeserializeOwned + Send;

    /// Unique registry key
    fn name(&self) -> &'static str;

    /// Human-readable description shown to the caller
    fn description(&self) -> &'static str;

    /// JSON Schema of the accepted arguments
    fn input_schema(&self) -> Value;

    /// Run the tool
    ///
    /// Domain failures (backend unreachable, record missing) are reported as
    /// `Ok(ToolCallResult::error(..))`. `Err` is reserved for bad arguments
    /// and internal faults.
    async fn call(&self, args: Self::Args) -> Result<ToolCallResult, ToolError>;

    /// Definition advertised by `tools/list`
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }
}

/// Type-erased tool handler
#[async_trait]
pub trait ToolHandler: Send + Sync + 'static {
    /// Decode `args` and run the tool
    async fn handle(&self, args: Option<Value>) -> Result<ToolCallResult, ToolError>;
}

struct TypedHandler<T: Tool>(T);

#[async_trait]
impl<T: Tool> ToolHandler for TypedHandler<T> {
    async fn handle(&self, args: Option<Value>) -> Result<ToolCallResult, ToolError> {
        let args = match decode_args::<T::Args>(self.0.name(), args) {
            Ok(args) => args,
            Err(rejected) => return Ok(rejected),
        };

        self.0.call(args).await
    }
}

/// Decode raw tool arguments into `A`
///
/// Missing or `null` arguments decode as an empty object. Anything else that
/// is not an object, or that does not match `A`, yields the failed result to
/// return to the caller.
pub fn decode_args<A: DeserializeOwned>(
    tool: &str,
    args: Option<Value>,
) -> Result<A, ToolCallResult> {
    let value = match args {
        None | Some(Value::Null) => Value::Object(Map::new()),
        Some(value @ Value::Object(_)) => value,
        Some(_) => {
            return Err(ToolCallResult::error(
                "Error: Arguments must be an object",
            ))
        }
    };

    serde_json::from_value(value).map_err(|e| {
        ToolCallResult::error(format!("Error: Invalid arguments for {}: {}", tool, e))
    })
}

/// A registered tool
#[derive(Clone)]
pub struct ToolRegistryEntry {
    definition: ToolDefinition,
    handler: Arc<dyn ToolHandler>,
}

impl ToolRegistryEntry {
    /// Tool definition
    pub fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    /// Shared handler
    pub fn handler(&self) -> Arc<dyn ToolHandler> {
        Arc::clone(&self.handler)
    }
}

impl std::fmt::Debug for ToolRegistryEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistryEntry")
            .field("name", &self.definition.name)
            .finish_non_exhaustive()
    }
}

/// Immutable, ordered mapping from tool name to entry
#[derive(Debug, Default)]
pub struct ToolRegistry {
    entries: Vec<ToolRegistryEntry>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Start building a registry
    pub fn builder() -> ToolRegistryBuilder {
        ToolRegistryBuilder::default()
    }

    /// Definitions in registration order
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.entries.iter().map(|e| e.definition.clone()).collect()
    }

    /// Look up a tool by name
    pub fn lookup(&self, name: &str) -> Option<&ToolRegistryEntry> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    /// Tool names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.definition.name.as_str())
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no tool is registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Collects tools before freezing them into a [`ToolRegistry`]
#[derive(Default)]
pub struct ToolRegistryBuilder {
    entries: Vec<ToolRegistryEntry>,
}

impl ToolRegistryBuilder {
    /// Add a tool
    pub fn register<T: Tool>(mut self, tool: T) -> Self {
        self.entries.push(ToolRegistryEntry {
            definition: tool.definition(),
            handler: Arc::new(TypedHandler(tool)),
        });
        self
    }

    /// Freeze the registry, rejecting duplicate names
    pub fn build(self) -> McpResult<ToolRegistry> {
        let mut index = HashMap::with_capacity(self.entries.len());
        for (i, entry) in self.entries.iter().enumerate() {
            if index.insert(entry.definition.name.clone(), i).is_some() {
                return Err(McpError::DuplicateTool(entry.definition.name.clone()));
            }
        }

        Ok(ToolRegistry {
            entries: self.entries,
            index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Deserialize)]
    struct EchoArgs {
        text: String,
    }

    struct Echo(&'static str);

    #[async_trait]
    impl Tool for Echo {
        type Args = EchoArgs;

        fn name(&self) -> &'static str {
            self.0
        }

        fn description(&self) -> &'static str {
            "Echoes its input"
        }

        fn input_schema(&self) -> Value {
            json!({
                "type": "object",
                "properties": { "text": { "type": "string" } },
                "required": ["text"]
            })
        }

        async fn call(&self, args: EchoArgs) -> Result<ToolCallResult, ToolError> {
            if args.text.is_empty() {
                return Err(ToolError::InvalidArguments("text must not be empty".into()));
            }
            Ok(ToolCallResult::text(args.text))
        }
    }

    #[test]
    fn test_definitions_keep_registration_order() {
        let registry = ToolRegistry::builder()
            .register(Echo("b"))
            .register(Echo("a"))
            .register(Echo("c"))
            .build()
            .unwrap();

        let names: Vec<_> = registry.names().collect();
        assert_eq!(names, vec!["b", "a", "c"]);
        assert_eq!(registry.definitions(), registry.definitions());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let err = ToolRegistry::builder()
            .register(Echo("same"))
            .register(Echo("same"))
            .build()
            .unwrap_err();
        assert!(matches!(err, McpError::DuplicateTool(name) if name == "same"));
    }

    #[test]
    fn test_lookup_missing() {
        let registry = ToolRegistry::builder().register(Echo("echo")).build().unwrap();
        assert!(registry.lookup("echo").is_some());
        assert!(registry.lookup("nope").is_none());
    }

    #[tokio::test]
    async fn test_decode_failure_is_tool_error_result() {
        let registry = ToolRegistry::builder().register(Echo("echo")).build().unwrap();
        let handler = registry.lookup("echo").unwrap().handler();

        let result = handler.handle(Some(json!({ "text": 5 }))).await.unwrap();
        assert!(result.is_error());
        assert!(result.text_content().contains("Invalid arguments for echo"));

        let result = handler.handle(Some(json!([1, 2]))).await.unwrap();
        assert!(result.is_error());
        assert_eq!(result.text_content(), "Error: Arguments must be an object");
    }

    #[tokio::test]
    async fn test_semantic_rejection_passes_through_handler() {
        let registry = ToolRegistry::builder().register(Echo("echo")).build().unwrap();
        let handler = registry.lookup("echo").unwrap().handler();

        let err = handler.handle(Some(json!({ "text": "" }))).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(ref m) if m == "text must not be empty"));
    }

    #[test]
    fn test_missing_arguments_decode_as_empty_object() {
        #[derive(Deserialize)]
        struct NoArgs {}

        assert!(decode_args::<NoArgs>("t", None).is_ok());
        assert!(decode_args::<NoArgs>("t", Some(Value::Null)).is_ok());
    }
}
