//! Integration test crate for CueKit.
//!
//! This crate exists solely to hold cross-crate integration tests.
//! It depends on every cuekit crate to verify they work together.

#[cfg(test)]
mod pipeline;

#[cfg(test)]
mod segments;

#[cfg(test)]
mod timecode;

/// Route `tracing` output through the test harness. Safe to call repeatedly.
#[cfg(test)]
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
