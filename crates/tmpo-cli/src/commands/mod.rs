//! CLI subcommand implementations.

pub mod config;
pub mod delete;
pub mod edit;
pub mod export;
mod filter;
pub mod init;
pub mod log;
pub mod manual;
pub mod milestone;
pub mod resume;
pub mod start;
pub mod stats;
pub mod status;
pub mod stop;
