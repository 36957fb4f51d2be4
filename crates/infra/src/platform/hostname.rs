//! Local hostname resolution
//!
//! Resolved once at registration. A failed lookup is logged and degrades to an
//! empty `host` tag; it never aborts startup.

use std::ffi::OsString;
use std::io;

use tracing::error;

/// Resolve the local hostname, or `""` when the lookup fails.
pub fn resolve_hostname() -> String {
    resolve_hostname_with(hostname::get)
}

/// Same as [`resolve_hostname`] with a caller-supplied lookup.
pub fn resolve_hostname_with<F>(lookup: F) -> String
where
    F: FnOnce() -> io::Result<OsString>,
{
    match lookup() {
        Ok(name) => name.to_string_lossy().into_owned(),
        Err(err) => {
            error!(error = %err, "unable to resolve hostname, points will carry an empty host tag");
            String::new()
        }
    }
}
