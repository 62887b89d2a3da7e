//! CLI module for the granary command-line interface.
//!
//! This module provides command handlers for one-shot operations that
//! run against a local configuration, without starting the server.

mod commands;
mod output;

pub use commands::*;
