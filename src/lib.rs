//! JSON Schema validation for MCP tool arguments.
//!
//! The [`schema`] module is usable on its own: build or deserialize a
//! [`schema::SchemaNode`], then call [`schema::validate`] on any
//! `serde_json::Value`. The rest of the crate is an MCP server exposing
//! `schema.validate` and `schema.error_kinds` tools over JSON-RPC 2.0
//! stdio, and checking every tool call's arguments with the same engine.

pub mod config;
pub mod handlers;
pub mod protocol;
pub mod server;
pub mod tools;

pub mod schema;
