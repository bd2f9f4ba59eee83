//! Identity of the verstamp binary itself, embedded at compile time.
//!
//! This is about the tool, not the project it stamps; that is
//! [`VersionRecord`](crate::record::VersionRecord).

use std::fmt;

/// How this copy of verstamp was built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolInfo {
    pub version: &'static str,
    /// Short commit hash, or `unknown` outside a git checkout.
    pub commit: &'static str,
    pub profile: &'static str,
    /// Target triple.
    pub target: &'static str,
}

impl ToolInfo {
    /// Information for the running binary.
    pub const fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            commit: env!("VERSTAMP_COMMIT"),
            profile: env!("VERSTAMP_PROFILE"),
            target: env!("VERSTAMP_TARGET"),
        }
    }

    /// Whether the commit the binary was built from is known.
    pub fn has_commit(&self) -> bool {
        self.commit != "unknown"
    }
}

impl fmt::Display for ToolInfo {
    /// `verstamp 0.1.0 (abc1234def, release, x86_64-unknown-linux-gnu)`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "verstamp {} ({}, {}, {})",
            self.version, self.commit, self.profile, self.target
        )
    }
}
