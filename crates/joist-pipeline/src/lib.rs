//! Build pipeline for the joist static site tool.
//!
//! Copies HTML pages and assets, compiles and vendor-prefixes the stylesheet,
//! and renames the pre-built script bundle, all orchestrated by a small task
//! graph with sequence and parallel combinators.

pub mod clean;
pub mod config;
pub mod copy;
pub mod pipeline;
pub mod scripts;
pub mod styles;
pub mod task;

pub use config::SiteConfig;
pub use pipeline::{Pipeline, PipelineError};
pub use task::{parallel, sequence, task, TaskError, TaskGraph};
