//! Error taxonomy for the retrieval engine and dispatch loop.
//!
//! Validation and not-found conditions are resolved into normal response
//! shapes by the callers; store failures surface as generic internal errors
//! with no detail leaked; tool invocation failures are fed back into the
//! dispatch loop's reasoning context; a blown round budget forces the fixed
//! fallback answer instead of an unbounded loop.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A request parameter was malformed or missing. Rejected before any
    /// store access.
    #[error("invalid parameter: {0}")]
    Validation(String),

    /// A lookup matched zero records. A normal outcome, not a fault.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The underlying store failed (connection, constraint, corrupt data).
    #[error("store error: {0}")]
    Store(#[from] sqlx::Error),

    /// A list-valued payload could not be serialized for storage.
    #[error("malformed list payload: {0}")]
    Serde(#[from] serde_json::Error),

    /// A tool was called with arguments failing its schema, or the
    /// reasoning provider requested an undeclared tool.
    #[error("tool invocation failed: {0}")]
    ToolInvocation(String),

    /// The decision provider could not be reached or returned garbage.
    #[error("decision provider error: {0}")]
    Provider(String),

    /// The dispatch loop exhausted its round budget without a final answer.
    #[error("dispatch budget exhausted after {0} rounds")]
    LoopBound(u32),
}
