use serde::{Deserialize, Serialize};

/// JSON-RPC 2.0 ID, either a number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RpcId {
    Number(i64),
    Str(String),
}

/// JSON-RPC 2.0 request envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: Option<RpcId>,
    pub method: String,
    pub params: Option<serde_json::Value>,
}

/// Arguments of the `schema.validate` tool.
///
/// `schema` stays a raw value here: turning it into a `SchemaNode` can fail
/// on a malformed schema, which is reported as `invalid_schema` rather than
/// as an argument error.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidateParams {
    pub schema: serde_json::Value,
    pub data: serde_json::Value,
}

/// Arguments of the `schema.error_kinds` tool.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorKindsParams {
    pub prefix: Option<String>,
}

/// MCP `initialize` params.
#[derive(Debug, Clone, Deserialize)]
pub struct InitializeParams {
    #[serde(rename = "protocolVersion")]
    pub protocol_version: Option<String>,
    #[serde(rename = "clientInfo")]
    pub client_info: Option<ClientInfo>,
}

/// Client information sent during `initialize`.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientInfo {
    pub name: Option<String>,
    pub version: Option<String>,
}

/// Parameters for `tools/call`.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallParams {
    pub name: String,
    pub arguments: Option<serde_json::Value>,
}
