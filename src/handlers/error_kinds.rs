use crate::protocol::{ErrorKindsParams, ToolResult};
use crate::schema::ValidationErrorType;

/// Handle a `schema.error_kinds` tool call.
///
/// Lists the validator's error kinds in declaration order, optionally
/// narrowed to names starting with `prefix`.
pub async fn handle(params: ErrorKindsParams) -> ToolResult {
    let kinds: Vec<&str> = ValidationErrorType::ALL
        .iter()
        .map(|kind| kind.name())
        .filter(|name| params.prefix.as_deref().map_or(true, |p| name.starts_with(p)))
        .collect();

    ToolResult::structured(serde_json::json!({ "kinds": kinds }))
}
