//! add_integers

use crate::protocol::ToolCallResult;
use crate::registry::{Tool, ToolError};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
pub struct AddIntegersParams {
    pub a: f64,
    pub b: f64,
}

/// Adds two numbers
pub struct AddIntegers;

#[async_trait]
impl Tool for AddIntegers {
    type Args = AddIntegersParams;

    fn name(&self) -> &'static str {
        "add_integers"
    }

    fn description(&self) -> &'static str {
        "Adds two integers together"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "a": { "type": "number", "description": "First integer" },
                "b": { "type": "number", "description": "Second integer" }
            },
            "required": ["a", "b"]
        })
    }

    async fn call(&self, args: AddIntegersParams) -> Result<ToolCallResult, ToolError> {
        Ok(ToolCallResult::text(format!("Result: {}", args.a + args.b)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::decode_args;

    #[tokio::test]
    async fn test_add() {
        let result = AddIntegers
            .call(AddIntegersParams { a: 5.0, b: 3.0 })
            .await
            .unwrap();
        assert_eq!(result.text_content(), "Result: 8");

        let result = AddIntegers
            .call(AddIntegersParams { a: 1.5, b: -4.0 })
            .await
            .unwrap();
        assert_eq!(result.text_content(), "Result: -2.5");
    }

    #[test]
    fn test_wrong_type_rejected_before_call() {
        let rejected =
            decode_args::<AddIntegersParams>("add_integers", Some(json!({ "a": "5", "b": 3 })))
                .unwrap_err();
        assert!(rejected.is_error());
        assert!(rejected.text_content().starts_with("Error: Invalid arguments for add_integers"));
    }
}
