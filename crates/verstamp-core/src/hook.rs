//! Build-lifecycle hooks and the pipeline that runs them.
//!
//! Hooks register with a [`BuildPipeline`], which walks the lifecycle phases
//! in order and runs every applicable hook exactly once per
//! [`run`](BuildPipeline::run). The first failing hook aborts the build.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::{debug, info};

use crate::stamp::StampError;

/// Lifecycle phases, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BuildPhase {
    /// Before any output is produced.
    BuildStart,
    /// The output bundle has been finalized but not yet written.
    GenerateBundle,
    /// The output bundle has been written to disk.
    WriteBundle,
    /// The build is complete.
    BuildEnd,
}

impl BuildPhase {
    /// All phases in execution order.
    pub const ALL: [BuildPhase; 4] = [
        BuildPhase::BuildStart,
        BuildPhase::GenerateBundle,
        BuildPhase::WriteBundle,
        BuildPhase::BuildEnd,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BuildPhase::BuildStart => "build-start",
            BuildPhase::GenerateBundle => "generate-bundle",
            BuildPhase::WriteBundle => "write-bundle",
            BuildPhase::BuildEnd => "build-end",
        }
    }
}

impl fmt::Display for BuildPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the pipeline is producing a distributable build or serving a
/// development session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildMode {
    /// One-shot production build.
    Build,
    /// Development server with incremental recompilation.
    Serve,
}

impl BuildMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildMode::Build => "build",
            BuildMode::Serve => "serve",
        }
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown [`BuildMode`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown build mode {0:?} (expected \"build\" or \"serve\")")]
pub struct ParseBuildModeError(String);

impl FromStr for BuildMode {
    type Err = ParseBuildModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "build" => Ok(BuildMode::Build),
            "serve" => Ok(BuildMode::Serve),
            other => Err(ParseBuildModeError(other.to_string())),
        }
    }
}

/// What a hook gets to see about the running build.
#[derive(Debug, Clone)]
pub struct BuildContext {
    root: PathBuf,
    mode: BuildMode,
}

impl BuildContext {
    /// Create a context for a build of the project at `root`.
    pub fn new(root: impl Into<PathBuf>, mode: BuildMode) -> Self {
        Self {
            root: root.into(),
            mode,
        }
    }

    /// Project root; relative output paths resolve against it.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn mode(&self) -> BuildMode {
        self.mode
    }
}

/// Errors a hook can report.
#[derive(Debug, thiserror::Error)]
pub enum HookError {
    #[error(transparent)]
    Stamp(#[from] StampError),
}

/// A callback run by the [`BuildPipeline`] at a fixed lifecycle phase.
pub trait BuildHook: Send + Sync {
    /// Unique name of this hook.
    fn name(&self) -> &str;

    /// The phase this hook runs in.
    fn phase(&self) -> BuildPhase;

    /// Whether this hook runs for the given mode.
    fn applies_to(&self, _mode: BuildMode) -> bool {
        true
    }

    /// Priority within the phase (higher = runs first).
    fn priority(&self) -> u32 {
        0
    }

    /// Run the hook.
    fn run(&self, ctx: &BuildContext) -> Result<(), HookError>;
}

/// Errors from pipeline registration and execution.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("hook {0:?} is already registered")]
    Duplicate(String),

    #[error("hook {hook:?} failed during {phase}: {source}")]
    Hook {
        hook: String,
        phase: BuildPhase,
        #[source]
        source: HookError,
    },
}

/// Outcome of a successful pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Hooks that ran, in execution order.
    pub executed: Vec<String>,
    /// Hooks that did not apply to the build mode.
    pub skipped: Vec<String>,
}

/// Ordered set of build hooks.
pub struct BuildPipeline {
    hooks: Vec<Box<dyn BuildHook>>,
}

impl BuildPipeline {
    /// Create an empty pipeline.
    pub fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    /// Register a hook. Names must be unique.
    pub fn register(&mut self, hook: Box<dyn BuildHook>) -> Result<(), PipelineError> {
        if self.hooks.iter().any(|h| h.name() == hook.name()) {
            return Err(PipelineError::Duplicate(hook.name().to_string()));
        }
        debug!(hook = hook.name(), phase = %hook.phase(), "Registered build hook");
        self.hooks.push(hook);
        // Keep hooks sorted by phase, then priority (highest first)
        self.hooks
            .sort_by(|a, b| a.phase().cmp(&b.phase()).then(b.priority().cmp(&a.priority())));
        Ok(())
    }

    /// Names of all hooks registered for a phase, in execution order.
    pub fn hooks_for_phase(&self, phase: BuildPhase) -> Vec<&str> {
        self.hooks
            .iter()
            .filter(|h| h.phase() == phase)
            .map(|h| h.name())
            .collect()
    }

    /// Number of registered hooks.
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Run every applicable hook once, phase by phase.
    ///
    /// Stops at the first failure; hooks in later phases do not run.
    pub fn run(&self, ctx: &BuildContext) -> Result<BuildReport, PipelineError> {
        info!(root = %ctx.root().display(), mode = %ctx.mode(), "Running build hooks");
        let mut report = BuildReport::default();

        for hook in &self.hooks {
            if !hook.applies_to(ctx.mode()) {
                debug!(hook = hook.name(), mode = %ctx.mode(), "Hook skipped");
                report.skipped.push(hook.name().to_string());
                continue;
            }

            debug!(hook = hook.name(), phase = %hook.phase(), "Running hook");
            hook.run(ctx).map_err(|source| PipelineError::Hook {
                hook: hook.name().to_string(),
                phase: hook.phase(),
                source,
            })?;
            report.executed.push(hook.name().to_string());
        }

        Ok(report)
    }
}

impl Default for BuildPipeline {
    fn default() -> Self {
        Self::new()
    }
}
