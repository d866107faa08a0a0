//! I/O helpers for orchid commands.

pub mod config;
pub mod definition_store;
