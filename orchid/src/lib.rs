//! Decision core of a workflow engine.
//!
//! A workflow is a DAG of named nodes, each holding an ordered list of rules.
//! A rule either advances to another node, waits for an external event, or
//! ends the instance, optionally guarded by a predicate over process state.
//! The crate is split into:
//!
//! - **[`core`]**: Pure, deterministic logic (structural validation, predicate
//!   evaluation, the state store, rule selection). No filesystem access.
//! - **[`schema`]**: Pluggable backends that validate state documents.
//! - **[`io`]**: Loading definitions, schemas, documents and configuration.
//!
//! Orchestration modules ([`select`], [`validate`]) coordinate core logic with
//! I/O to implement CLI commands.

pub mod core;
pub mod dag;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod schema;
pub mod select;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod validate;
