//! Platform-specific lookups
//!
//! Host identity used to tag exported points.

pub mod hostname;

pub use hostname::{resolve_hostname, resolve_hostname_with};
