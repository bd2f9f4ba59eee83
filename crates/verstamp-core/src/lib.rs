#![deny(unsafe_code)]

//! verstamp core: build identity records and the hook pipeline that writes them.
//!
//! A production build registers [`VersionStampPlugin`] with a
//! [`BuildPipeline`]. When the pipeline reaches the bundle-generation phase,
//! the plugin writes a [`VersionRecord`] (`timestamp`, `buildTime`,
//! `version`) as JSON into the project's static asset directory.

/// Identity of the verstamp binary (version, commit, profile, target).
pub mod build_info;
/// Injectable wall-clock source.
pub mod clock;
/// Build-lifecycle phases, hooks and the pipeline that runs them.
pub mod hook;
/// The version record and its JSON form.
pub mod record;
/// The version-stamp build hook.
pub mod stamp;

pub use clock::{Clock, FixedClock, SystemClock};
pub use hook::{BuildContext, BuildHook, BuildMode, BuildPhase, BuildPipeline, PipelineError};
pub use record::VersionRecord;
pub use stamp::{StampError, VersionStampPlugin};
