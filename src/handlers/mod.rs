pub mod error_kinds;
pub mod validate;

use serde::Serialize;

use crate::config::ServerConfig;
use crate::protocol::{
    ErrorKindsParams, InitializeParams, JsonRpcError, JsonRpcRequest, JsonRpcResponse,
    McpErrorCode, McpErrorResponse, ToolCallParams, ToolResult, ValidateParams,
};
use crate::tools::{ToolDefinition, ToolRegistry, ERROR_KINDS_TOOL, VALIDATE_TOOL};

#[derive(Serialize)]
struct ToolsListResult<'a> {
    tools: Vec<&'a ToolDefinition>,
}

/// Dispatch a JSON-RPC request to the appropriate handler.
///
/// Returns `None` for notifications (no response required).
pub async fn dispatch(
    req: &JsonRpcRequest,
    config: &ServerConfig,
    tools: &ToolRegistry,
) -> Option<JsonRpcResponse> {
    match req.method.as_str() {
        "initialize" => {
            if let Some(params) = req
                .params
                .as_ref()
                .and_then(|v| serde_json::from_value::<InitializeParams>(v.clone()).ok())
            {
                let client = params.client_info.as_ref();
                tracing::info!(
                    protocol_version = params.protocol_version.as_deref().unwrap_or("unknown"),
                    client_name = client.and_then(|c| c.name.as_deref()).unwrap_or("unknown"),
                    client_version = client.and_then(|c| c.version.as_deref()).unwrap_or("unknown"),
                    "client initializing"
                );
            }

            let result = serde_json::json!({
                "protocolVersion": "2024-11-05",
                "capabilities": {
                    "tools": {}
                },
                "serverInfo": {
                    "name": "mcp-schema-server",
                    "version": env!("CARGO_PKG_VERSION")
                }
            });
            Some(JsonRpcResponse::success(req.id.clone(), result))
        }

        "notifications/initialized" => None,

        "ping" => Some(JsonRpcResponse::success(req.id.clone(), serde_json::json!({}))),

        "tools/list" => {
            let listing = ToolsListResult {
                tools: tools.iter().collect(),
            };
            Some(match serde_json::to_value(&listing) {
                Ok(result) => JsonRpcResponse::success(req.id.clone(), result),
                Err(e) => {
                    tracing::error!(error = %e, "cannot serialize tool list");
                    JsonRpcResponse::error(
                        req.id.clone(),
                        JsonRpcError::internal_error(e.to_string()),
                    )
                }
            })
        }

        "tools/call" => {
            let params: ToolCallParams = match &req.params {
                Some(v) => match serde_json::from_value(v.clone()) {
                    Ok(p) => p,
                    Err(e) => {
                        return Some(JsonRpcResponse::error(
                            req.id.clone(),
                            JsonRpcError::invalid_params(format!(
                                "Invalid tools/call params: {e}"
                            )),
                        ));
                    }
                },
                None => {
                    return Some(JsonRpcResponse::error(
                        req.id.clone(),
                        JsonRpcError::invalid_params("Missing params for tools/call"),
                    ));
                }
            };

            let tool_result = dispatch_tool_call(&params, config, tools).await;
            Some(match serde_json::to_value(&tool_result) {
                Ok(result) => JsonRpcResponse::success(req.id.clone(), result),
                Err(e) => {
                    tracing::error!(error = %e, "cannot serialize tool result");
                    JsonRpcResponse::error(
                        req.id.clone(),
                        JsonRpcError::internal_error(e.to_string()),
                    )
                }
            })
        }

        _ if req.id.is_none() => None,

        _ => Some(JsonRpcResponse::error(
            req.id.clone(),
            JsonRpcError::method_not_found(&req.method),
        )),
    }
}

/// Check the arguments against the tool's input schema, then run the tool.
async fn dispatch_tool_call(
    params: &ToolCallParams,
    config: &ServerConfig,
    tools: &ToolRegistry,
) -> ToolResult {
    let Some(tool) = tools.get(&params.name) else {
        return McpErrorResponse::new(
            McpErrorCode::UnknownTool,
            format!("Unknown tool: {}", params.name),
        )
        .into();
    };

    match tool.check_arguments(params.arguments.as_ref()) {
        Ok(errors) if errors.is_empty() => {}
        Ok(errors) => {
            tracing::debug!(tool = %tool.name, errors = errors.len(), "rejecting tool arguments");
            return McpErrorResponse::canonical(McpErrorCode::InvalidArguments)
                .with_details(errors.iter())
                .into();
        }
        Err(e) => {
            tracing::error!(tool = %tool.name, error = %e, "tool input schema cannot be evaluated");
            return McpErrorResponse::canonical(McpErrorCode::InternalError).into();
        }
    }

    let arguments = params
        .arguments
        .clone()
        .unwrap_or_else(|| serde_json::json!({}));

    match tool.name.as_str() {
        VALIDATE_TOOL => match serde_json::from_value::<ValidateParams>(arguments) {
            Ok(p) => validate::handle(p, config).await,
            Err(e) => ToolResult::error(format!("Invalid arguments for {VALIDATE_TOOL}: {e}")),
        },

        ERROR_KINDS_TOOL => match serde_json::from_value::<ErrorKindsParams>(arguments) {
            Ok(p) => error_kinds::handle(p).await,
            Err(e) => ToolResult::error(format!("Invalid arguments for {ERROR_KINDS_TOOL}: {e}")),
        },

        other => McpErrorResponse::new(McpErrorCode::UnknownTool, format!("Unknown tool: {other}"))
            .into(),
    }
}
