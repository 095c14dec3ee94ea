//! CLI subcommands.

pub mod build;
pub mod clean;
pub mod serve;
