//! Tracing bootstrap for hosts embedding the engine.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install a stdout `tracing` subscriber filtered by `filter`.
///
/// An unparseable filter falls back to `info`. Returns `false` when a global
/// subscriber was already installed (e.g. by the host or another test).
pub fn init_tracing(filter: &str) -> bool {
    let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true))
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_install_is_refused() {
        let _ = init_tracing("not a [valid filter");
        assert!(!init_tracing("debug"));
    }
}
