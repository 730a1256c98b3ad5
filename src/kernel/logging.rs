use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Install the global fmt subscriber, filtered by `RUST_LOG`.
///
/// Panics if a global subscriber is already set; use [`try_init`] where that
/// can happen (tests, embedders).
pub fn init() {
    if let Err(e) = try_init() {
        panic!("setting default subscriber failed: {e}");
    }
}

pub fn try_init() -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)
}
