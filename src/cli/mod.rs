//! CLI command handlers

pub mod commands;

pub use commands::{batch, export, template, validate};
