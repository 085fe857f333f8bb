//! CLI subcommands.

pub mod config;
pub mod export;
pub mod ingest;
pub mod inventory;
pub mod parse;
