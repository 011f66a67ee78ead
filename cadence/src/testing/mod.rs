//! Testing utilities for cadence pipelines.
//!
//! This module provides:
//! - Trace, an ordered and timestamped recorder
//! - RecordingRunner, an effect runner that records starts and finishes
//! - TestHost, a host wired to both
//! - Assertions over traces

mod assertions;
mod fixtures;
mod mocks;

pub use assertions::{assert_before, assert_count, assert_trace};
pub use fixtures::TestHost;
pub use mocks::{RecordingRunner, Trace, TraceEntry};
