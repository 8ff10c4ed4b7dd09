//! Property-based invariant tests

pub mod invariant_tests;
