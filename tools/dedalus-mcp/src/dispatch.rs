//! Tool dispatch
//!
//! Looks a tool up by name and runs it. Arguments a tool rejects become a
//! failed [`ToolCallResult`]. Two failures leave the tool layer: an unknown
//! name and an internal fault (including a panic inside the handler, which is
//! caught so the connection survives).

use crate::error::McpError;
use crate::protocol::ToolCallResult;
use crate::registry::{ToolError, ToolRegistry};
use futures_util::FutureExt;
use serde_json::Value;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error};

/// Failure that becomes a protocol-level error
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No tool is registered under this name
    #[error("Unknown tool: {0}")]
    UnknownCapability(String),

    /// The tool faulted
    #[error("Tool {tool} failed: {message}")]
    InternalFailure { tool: String, message: String },
}

impl From<DispatchError> for McpError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::UnknownCapability(name) => McpError::UnknownTool(name),
            err @ DispatchError::InternalFailure { .. } => McpError::Internal(err.to_string()),
        }
    }
}

/// Runs tools from a shared registry
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
}

impl Dispatcher {
    /// Create a dispatcher over `registry`
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    /// The registry tools are dispatched from
    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Invoke tool `name` with raw `args`
    pub async fn dispatch(
        &self,
        name: &str,
        args: Option<Value>,
    ) -> Result<ToolCallResult, DispatchError> {
        let handler = self
            .registry
            .lookup(name)
            .map(|entry| entry.handler())
            .ok_or_else(|| DispatchError::UnknownCapability(name.to_string()))?;

        debug!("🛠️  Dispatching tool: {}", name);

        match AssertUnwindSafe(handler.handle(args)).catch_unwind().await {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(ToolError::InvalidArguments(message))) => {
                debug!("🚫 Tool {} rejected its arguments: {}", name, message);
                Ok(ToolCallResult::error(format!("Error: {}", message)))
            }
            Ok(Err(ToolError::Internal(message))) => {
                error!("❌ Tool {} failed: {}", name, message);
                Err(DispatchError::InternalFailure {
                    tool: name.to_string(),
                    message,
                })
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!("💥 Tool {} panicked: {}", name, message);
                Err(DispatchError::InternalFailure {
                    tool: name.to_string(),
                    message,
                })
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    }
}
