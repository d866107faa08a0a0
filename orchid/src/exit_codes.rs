//! Stable exit codes for orchid CLI commands.

/// Command succeeded or a rule fired.
pub const OK: i32 = 0;
/// Command failed due to an invalid definition, schema, document, config, or other errors.
pub const INVALID: i32 = 1;
/// `orchid step` found no rule firing in the requested node.
pub const UNHANDLED: i32 = 2;
