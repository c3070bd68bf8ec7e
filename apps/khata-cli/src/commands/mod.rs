//! Subcommand handlers. Each returns `anyhow::Result` and prints to stdout.

pub mod documents;
pub mod payroll;
pub mod remote;
pub mod tools;
