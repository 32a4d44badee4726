//! Descant - build-descriptor resolution and plugin-usage aggregation
//!
//! Computes each repository's effective build descriptor across a corpus —
//! parent chains resolved, properties interpolated — memoizing the
//! expensive resolution in a durable cache, and reports plugin usage.

pub mod aggregate;
pub mod builder;
pub mod cache;
pub mod cli;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod resolver;
pub mod scanner;
pub mod ui;

pub use error::{DescantError, DescantResult};
