//! Property-based tests for the search pipeline.

mod ranking_props;
