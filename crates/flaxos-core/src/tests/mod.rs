//! Test module for determinism, integration and property tests.
//!
//! This module exercises the whole tick pipeline through the public API:
//! - **Determinism tests**: Verify identical inputs produce identical results
//! - **Integration tests**: Test the full simulation pipeline
//! - **Property tests**: Check per-ship invariants over generated inputs
//! - **Helper functions**: Utilities for test setup
//!
//! # Test Structure
//!
//! - `determinism.rs`: Tests that verify deterministic execution
//! - `integration.rs`: End-to-end tests of the simulation
//! - `properties.rs`: proptest invariants for `advance_ship`
//! - `helpers.rs`: Test setup utilities and factory functions

mod helpers;
mod integration;
