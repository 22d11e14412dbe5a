//! Logging setup for the contentious workspace.
//!
//! Installs a [`tracing`]-based subscriber. Rendering and the save endpoint
//! emit `debug!`/`info!`/`warn!` events; hosts that already configure their
//! own subscriber can skip this entirely.

/// Installs a global fmt subscriber filtered by `level` (e.g. `"info"`,
/// `"contentious_template=debug"`).
///
/// Safe to call more than once; later calls are no-ops, which keeps test
/// suites from panicking when several tests set up logging.
pub fn init(level: &str) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));

    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init("debug");
        init("not a real directive ][");
        tracing::debug!("logging initialized twice without panicking");
    }
}
