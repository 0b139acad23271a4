//! A JSON Schema subset for describing tool-call arguments.
//!
//! [`SchemaNode`] is the in-memory schema tree, serialized with the exact
//! wire key names used by MCP tool definitions. [`validate`] walks a schema
//! and a `serde_json::Value` in lockstep and returns every violation found.
//!
//! Supported: `object`, `array`, `string`, `number`, `integer`, `boolean`
//! and `null` types with their per-type constraints, and the `allOf`,
//! `anyOf`, `oneOf` and `not` combinators. `$ref`, `$defs`, `enum`,
//! `format` and `if`/`then`/`else` are not.

pub mod error;
pub mod model;
pub mod validate;
mod wire;

pub use error::{SchemaError, ValidationError, ValidationErrorType, ValidationErrors};
pub use model::{
    AdditionalProperties, ArraySchema, BooleanSchema, CombinedSchema, IntegerSchema, NullSchema,
    NumberSchema, NumericBounds, ObjectSchema, SchemaMeta, SchemaNode, SchemaType, StringSchema,
};
pub use validate::{is_valid, validate};
