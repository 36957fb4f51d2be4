//! Shared test helpers for `metricbridge-core` integration tests.
//!
//! Lightweight fakes for the export ports so cycle tests can script store
//! behaviour and snapshot contents tick by tick.

pub mod source;
pub mod store;
