//! Tracing setup for binaries and tests that embed the library.
//!
//! The library itself only emits `tracing` events; installing a subscriber
//! is left to the host. [`init`] is a convenience for hosts that have none.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_DIRECTIVE: &str = "info,plyr_rs=debug";

/// Install a fmt subscriber filtered by `RUST_LOG`, or `default_directive`
/// when that is unset or invalid.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init(default_directive: &str) -> bool {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_directive)),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok()
}

/// [`init`] with [`DEFAULT_DIRECTIVE`].
pub fn init_default() -> bool {
    init(DEFAULT_DIRECTIVE)
}
