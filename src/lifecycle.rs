//! Process-wide library lifecycle (spec.md §3 "Library lifecycle").
//!
//! Two entry points bracket a process's use of this crate: [`initialize`],
//! taking the process's CLI arguments for optional cluster backend setup,
//! and [`finalize`], releasing any such state. Neither is required for
//! purely in-core use; both are no-ops returning success unless the
//! `distributed-backend` feature is enabled and a cluster endpoint is
//! configured.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{info, warn};

static INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Status code returned by [`initialize`], mirroring a process exit code:
/// `0` for success, nonzero for failure.
pub const STATUS_OK: i32 = 0;
pub const STATUS_ALREADY_INITIALIZED: i32 = 1;

/// Initializes process-wide state for this crate.
///
/// `args` is the process's argument vector (`argc`/`argv` in the spec's own
/// terms), inspected only for distributed-backend configuration. In-core-
/// only builds ignore it entirely and always succeed.
///
/// Calling this more than once without an intervening [`finalize`] is not
/// an error the caller must avoid; it is reported via the returned status
/// instead, since a caller linking this crate as a library cannot always
/// guarantee it is the first to initialize shared state.
pub fn initialize(args: &[String]) -> i32 {
    if INITIALIZED.swap(true, Ordering::SeqCst) {
        warn!(target: "lifecycle", "initialize called while already initialized");
        return STATUS_ALREADY_INITIALIZED;
    }
    info!(target: "lifecycle", arg_count = args.len(), "tensorcontract initialized");
    init_distributed_backend(args);
    STATUS_OK
}

/// Releases any process-wide state acquired by [`initialize`]. Safe to call
/// even if `initialize` was never called, or was already finalized.
pub fn finalize() {
    if INITIALIZED.swap(false, Ordering::SeqCst) {
        info!(target: "lifecycle", "tensorcontract finalized");
    }
}

#[cfg(feature = "distributed-backend")]
fn init_distributed_backend(args: &[String]) {
    if let Some(endpoint) = args.iter().find_map(|a| a.strip_prefix("--cluster-endpoint=")) {
        info!(target: "lifecycle", endpoint, "distributed backend endpoint configured");
    }
}

#[cfg(not(feature = "distributed-backend"))]
fn init_distributed_backend(_args: &[String]) {}

#[cfg(test)]
mod tests {
    use super::*;

    // The only test touching `INITIALIZED`; no `#[serial]` dependency needed.
    #[test]
    fn initialize_then_finalize_round_trips() {
        finalize();
        assert_eq!(initialize(&[]), STATUS_OK);
        assert_eq!(initialize(&[]), STATUS_ALREADY_INITIALIZED);
        finalize();
        assert_eq!(initialize(&[]), STATUS_OK);
        finalize();
    }
}
