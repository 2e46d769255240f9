//! Observability (logging and request tracing)
//!
//! Structured logging through `tracing`: pretty output in debug builds, JSON
//! lines in release builds. `RUST_LOG` overrides the default filter.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used in debug builds when `RUST_LOG` is unset
pub const DEBUG_FILTER: &str = "debug,stratek=trace";

/// Filter used in release builds when `RUST_LOG` is unset
pub const RELEASE_FILTER: &str = "info";

/// Default filter directive for the current build profile
#[must_use]
pub const fn default_filter() -> &'static str {
    if cfg!(debug_assertions) {
        DEBUG_FILTER
    } else {
        RELEASE_FILTER
    }
}

/// Initialize the global subscriber
///
/// # Example
///
/// ```rust,no_run
/// use stratek::observability;
///
/// # fn main() -> anyhow::Result<()> {
/// observability::init()?;
/// tracing::info!("Application started");
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init() -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter()));

    #[cfg(debug_assertions)]
    {
        // Pretty formatting for development
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init()?;
    }

    #[cfg(not(debug_assertions))]
    {
        // JSON formatting for production
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()?;
    }

    Ok(())
}
