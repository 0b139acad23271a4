use serde::Serialize;
use serde_json::Value;

use crate::config::ServerConfig;
use crate::protocol::{McpErrorCode, McpErrorResponse, ToolResult, ValidateParams};
use crate::schema::{validate, SchemaNode, ValidationError};

#[derive(Debug, Serialize)]
struct ValidationReport {
    valid: bool,
    errors: Vec<ValidationError>,
}

/// Handle a `schema.validate` tool call.
///
/// Parses the schema from its wire shape, then runs the validator on a
/// blocking thread bounded by the configured tool timeout. The report lists
/// errors in a stable order, so identical inputs give identical output.
pub async fn handle(params: ValidateParams, config: &ServerConfig) -> ToolResult {
    let schema: SchemaNode = match serde_json::from_value(params.schema) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(error = %e, "rejecting malformed schema");
            return McpErrorResponse::canonical(McpErrorCode::InvalidSchema)
                .with_details([e])
                .into();
        }
    };

    let data = params.data;
    let timeout = config.tool_timeout;
    let task = tokio::task::spawn_blocking(move || run(&schema, &data));

    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(Ok(report))) => ToolResult::structured(report),
        Ok(Ok(Err(mcp_err))) => mcp_err.into(),
        Ok(Err(join_err)) => {
            tracing::error!(error = %join_err, "validation task failed");
            McpErrorResponse::canonical(McpErrorCode::InternalError).into()
        }
        Err(_) => {
            tracing::warn!(timeout_secs = timeout.as_secs(), "validation timed out");
            McpErrorResponse::canonical(McpErrorCode::Timeout).into()
        }
    }
}

/// Synchronous validation (runs inside spawn_blocking).
fn run(schema: &SchemaNode, data: &Value) -> Result<Value, McpErrorResponse> {
    let errors = validate(schema, data).map_err(|e| {
        tracing::warn!(error = %e, "schema cannot be evaluated");
        McpErrorResponse::canonical(McpErrorCode::InvalidSchema).with_details([e])
    })?;

    tracing::debug!(errors = errors.len(), "validation complete");

    let report = ValidationReport {
        valid: errors.is_empty(),
        errors: errors.into_vec(),
    };

    serde_json::to_value(&report).map_err(|e| {
        tracing::error!(error = %e, "serialization failed");
        McpErrorResponse::canonical(McpErrorCode::InternalError)
    })
}
