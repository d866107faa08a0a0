//! Deterministic, pure decision logic.
//!
//! Core modules are free of I/O side effects. They operate on in-memory
//! definitions and documents and return deterministic outputs suitable for tests.

pub mod compare;
pub mod graph;
pub mod invariants;
pub mod path;
pub mod predicate;
pub mod selector;
pub mod state;
