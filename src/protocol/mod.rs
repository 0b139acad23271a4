pub mod request;
pub mod response;

pub use request::{
    ClientInfo, ErrorKindsParams, InitializeParams, JsonRpcRequest, RpcId, ToolCallParams,
    ValidateParams,
};
pub use response::{
    JsonRpcError, JsonRpcResponse, McpError, McpErrorCode, McpErrorResponse, ToolResult,
    ToolResultContent,
};
