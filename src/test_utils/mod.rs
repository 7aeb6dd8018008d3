//! Shared test utilities for imamdir.

pub mod fixtures;
pub mod logging;

pub use fixtures::{SAMPLE_ENTRIES, SAMPLE_LOCATIONS, SeededDirectory, fixture_context, seed_directory};
pub use logging::init_test_logging;
