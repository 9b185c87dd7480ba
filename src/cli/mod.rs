//! Command-line interface
//!
//! Argument definitions and command handlers for the `alert-trust` binary.

pub mod args;
pub mod commands;
