//! Property-based tests for pip command rendering
//!
//! These check that argument normalization and token ordering hold for
//! arbitrary mirrors, packages and requirements paths.
