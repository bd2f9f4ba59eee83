//! Log capture for tests.

use tracing_subscriber::EnvFilter;

/// verstamp's own crates at debug, everything else at warn.
pub const DEFAULT_TEST_FILTER: &str = "warn,verstamp_core=debug,verstamp_config=debug,verstamp_cli=debug";

/// Route tracing output through the test harness so it only shows for
/// failing tests. `RUST_LOG` replaces [`DEFAULT_TEST_FILTER`].
///
/// Only the first call in a test binary installs the subscriber.
pub fn init_test_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_TEST_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_test_writer()
        .try_init();
}
