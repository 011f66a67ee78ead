//! Pipeline building and execution.
//!
//! This module provides:
//! - The fluent [`Pipeline`] builder
//! - The dispatcher that drains its queue step by step

mod builder;
mod executor;

pub use builder::Pipeline;
