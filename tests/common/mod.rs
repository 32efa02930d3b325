//! Fixture units and mock sources shared by the integration tests.
//! Included by each test file; never built as a test binary on its own.
#![allow(dead_code)]

pub mod fixtures;
pub mod mock;
