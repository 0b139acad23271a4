use jsonschema::validator_for;
use serde_json::Value;

use mcp_schema_server::protocol::{JsonRpcError, McpErrorCode, McpErrorResponse, ToolResult};
use mcp_schema_server::schema::{validate, SchemaNode};

const ERROR_SCHEMA_V0: &str = r#"{
  "$schema": "https://json-schema.org/draft/2020-12/schema",
  "title": "MCP Error Response v0",
  "type": "object",
  "required": ["error"],
  "additionalProperties": false,
  "properties": {
    "error": {
      "type": "object",
      "required": ["code", "message"],
      "additionalProperties": false,
      "properties": {
        "code": {
          "type": "string",
          "pattern": "^(invalid_arguments|invalid_schema|unknown_tool|timeout|internal_error)$"
        },
        "message": {
          "type": "string",
          "minLength": 1
        },
        "details": {
          "type": "array",
          "items": {"type": "string", "minLength": 1},
          "minItems": 1
        }
      }
    }
  }
}"#;

fn error_schema() -> Value {
    serde_json::from_str(ERROR_SCHEMA_V0).unwrap()
}

#[test]
fn golden_mcp_error_schema_validation() {
    let response = McpErrorResponse::canonical(McpErrorCode::InvalidSchema);

    let json_str = serde_json::to_string_pretty(&response).unwrap();
    let json_value: Value = serde_json::from_str(&json_str).unwrap();

    let validator = validator_for(&error_schema()).unwrap();
    assert!(validator.is_valid(&json_value), "MCP error JSON must satisfy v0 schema");

    // The frozen schema is within the subset the server itself evaluates.
    let ours: SchemaNode = serde_json::from_value(error_schema()).unwrap();
    assert!(validate(&ours, &json_value).unwrap().is_empty());

    let expected = r#"{
  "error": {
    "code": "invalid_schema",
    "message": "Schema is invalid"
  }
}"#;

    assert_eq!(json_str.trim(), expected.trim(), "MCP error JSON snapshot mismatch");
}

#[test]
fn every_code_satisfies_error_schema() {
    let validator = validator_for(&error_schema()).unwrap();
    let ours: SchemaNode = serde_json::from_value(error_schema()).unwrap();

    for code in [
        McpErrorCode::InvalidArguments,
        McpErrorCode::InvalidSchema,
        McpErrorCode::UnknownTool,
        McpErrorCode::Timeout,
        McpErrorCode::InternalError,
    ] {
        let detail = "requiredPropertyMissing at #root: required property \"data\" is missing";
        let response = McpErrorResponse::canonical(code.clone()).with_details([detail]);
        let value = serde_json::to_value(&response).unwrap();

        assert!(validator.is_valid(&value), "{code:?} rejected by reference validator");
        let errors = validate(&ours, &value).unwrap();
        assert!(errors.is_empty(), "{code:?} rejected: {errors}");
    }
}

#[test]
fn unknown_code_is_rejected_by_error_schema() {
    let ours: SchemaNode = serde_json::from_value(error_schema()).unwrap();
    let value = serde_json::json!({"error": {"code": "cache_missing", "message": "x"}});

    assert!(!validate(&ours, &value).unwrap().is_empty());
    assert!(!validator_for(&error_schema()).unwrap().is_valid(&value));
}

#[test]
fn json_rpc_codes_follow_blame() {
    let caller: JsonRpcError = McpErrorResponse::canonical(McpErrorCode::InvalidArguments).into();
    let server: JsonRpcError = McpErrorResponse::canonical(McpErrorCode::Timeout).into();

    assert_eq!(caller.code, -32602);
    assert_eq!(server.code, -32603);
    assert_eq!(server.message, "Tool call timed out");
    assert_eq!(server.data.unwrap()["error"]["code"], "timeout");
}

#[test]
fn tool_result_carries_error_json() {
    let result: ToolResult = McpErrorResponse::canonical(McpErrorCode::UnknownTool).into();

    assert!(result.is_error);
    let parsed: McpErrorResponse = serde_json::from_str(result.content[0].text.trim()).unwrap();
    assert_eq!(parsed, McpErrorResponse::canonical(McpErrorCode::UnknownTool));
}
