//! Integration tests for imamdir
//!
//! Every test builds its own database and cache store; nothing is shared
//! between tests.

mod fixture;
mod review_flow_tests;
mod scenario_tests;
mod staleness_tests;
