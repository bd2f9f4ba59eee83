//! Configuration builders for tests.
//!
//! Use [`TestConfigBuilder`] to create customised [`AppConfig`] values without
//! repeating boilerplate across crate boundaries.

use verstamp_config::{AppConfig, StampConfig};

/// Fluent builder for [`AppConfig`] in tests.
///
/// # Example
///
/// ```ignore
/// let config = TestConfigBuilder::new()
///     .public_dir("static")
///     .compact()
///     .build();
/// ```
pub struct TestConfigBuilder {
    config: AppConfig,
}

impl TestConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    pub fn public_dir(mut self, dir: &str) -> Self {
        self.config.stamp.public_dir = dir.to_string();
        self
    }

    pub fn file_name(mut self, name: &str) -> Self {
        self.config.stamp.file_name = name.to_string();
        self
    }

    pub fn prefix(mut self, prefix: &str) -> Self {
        self.config.stamp.prefix = prefix.to_string();
        self
    }

    /// Write single-line JSON.
    pub fn compact(mut self) -> Self {
        self.config.stamp.pretty = false;
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }

    pub fn build_stamp(self) -> StampConfig {
        self.config.stamp
    }
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
