#![forbid(unsafe_code)]

//! Subscriber setup for the binary.
//!
//! Filtering comes from `AIDSEC_LOG` (same syntax as `RUST_LOG`) and falls
//! back to `warn`. Events go to stderr so stdout stays clean for frames.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the filter directives.
pub const LOG_ENV: &str = "AIDSEC_LOG";

const DEFAULT_FILTER: &str = "warn";

#[must_use]
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber. A second call is a no-op.
pub fn init(json: bool) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr);
    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if result.is_err() {
        tracing::debug!(target: "aidsec.cli", "subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_twice_does_not_panic() {
        init(false);
        init(true);
    }
}
