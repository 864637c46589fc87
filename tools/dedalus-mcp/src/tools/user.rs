//! get_current_user

use super::format::{fetch_error, iso_time, readable_time, titled};
use crate::protocol::ToolCallResult;
use crate::registry::{Tool, ToolError};
use async_trait::async_trait;
use dedalus_client::Backend;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

/// Tools that take no arguments
#[derive(Debug, Default, Deserialize)]
pub struct NoParams {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UserView {
    user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    created_at: String,
    readable_created_at: String,
}

pub struct GetCurrentUser {
    backend: Arc<dyn Backend>,
}

impl GetCurrentUser {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Tool for GetCurrentUser {
    type Args = NoParams;

    fn name(&self) -> &'static str {
        "get_current_user"
    }

    fn description(&self) -> &'static str {
        "Get information about the currently authenticated user. Returns user details including ID, email, and name."
    }

    fn input_schema(&self) -> Value {
        json!({ "type": "object", "properties": {}, "required": [] })
    }

    async fn call(&self, _args: NoParams) -> Result<ToolCallResult, ToolError> {
        debug!("👤 Fetching current user");

        let user = match self.backend.current_user().await {
            Ok(Some(user)) => user,
            Ok(None) => {
                return Ok(ToolCallResult::text(
                    "No authenticated user found. User may not be logged in.",
                ))
            }
            Err(e) => return Ok(fetch_error("current user", &e)),
        };

        titled(
            "Current User",
            &UserView {
                user_id: user.id,
                email: user.email,
                name: user.name,
                created_at: iso_time(user.creation_time),
                readable_created_at: readable_time(user.creation_time),
            },
        )
    }
}
