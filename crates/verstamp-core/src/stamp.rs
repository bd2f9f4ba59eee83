//! The version-stamp build hook.
//!
//! Once per production build, [`VersionStampPlugin`] reads the clock, builds a
//! [`VersionRecord`] and writes it into the project's static asset directory
//! so the deployed application can fetch its own build identity.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};
use verstamp_config::StampConfig;

use crate::clock::{Clock, SystemClock};
use crate::hook::{BuildContext, BuildHook, BuildMode, BuildPhase, HookError};
use crate::record::{RecordError, VersionRecord};

/// Name the plugin registers under.
pub const PLUGIN_NAME: &str = "generate-version";

/// Errors from stamping or reading back the version file.
#[derive(Debug, thiserror::Error)]
pub enum StampError {
    #[error("filesystem error at {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Record(#[from] RecordError),
}

impl StampError {
    fn io(path: &Path, source: io::Error) -> Self {
        StampError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Build hook that writes the version record at bundle-generation time.
pub struct VersionStampPlugin {
    config: StampConfig,
    clock: Arc<dyn Clock>,
}

impl VersionStampPlugin {
    /// Create a plugin that reads the system clock.
    pub fn new(config: StampConfig) -> Self {
        Self {
            config,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &StampConfig {
        &self.config
    }

    /// Where the record is written for a project rooted at `root`.
    ///
    /// An absolute `public_dir` ignores `root`.
    pub fn target_path(&self, root: &Path) -> PathBuf {
        root.join(&self.config.public_dir).join(&self.config.file_name)
    }

    /// Generate a fresh record and write it, replacing any previous file.
    ///
    /// The target directory must already exist.
    pub fn stamp(&self, root: &Path) -> Result<VersionRecord, StampError> {
        let record = VersionRecord::now(self.clock.as_ref(), &self.config.prefix)?;
        let json = record.to_json(self.config.pretty)?;
        let path = self.target_path(root);

        write_atomic(&path, json.as_bytes())?;

        info!(
            timestamp = record.timestamp(),
            build_time = record.build_time(),
            version = record.version(),
            path = %path.display(),
            "Version file generated"
        );
        Ok(record)
    }

    /// Read and validate the record currently on disk.
    pub fn read_current(&self, root: &Path) -> Result<VersionRecord, StampError> {
        let path = self.target_path(root);
        let content = fs::read_to_string(&path).map_err(|e| StampError::io(&path, e))?;
        Ok(VersionRecord::from_json(&content, &self.config.prefix)?)
    }
}

impl BuildHook for VersionStampPlugin {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    fn phase(&self) -> BuildPhase {
        BuildPhase::GenerateBundle
    }

    fn applies_to(&self, mode: BuildMode) -> bool {
        mode == BuildMode::Build
    }

    fn run(&self, ctx: &BuildContext) -> Result<(), HookError> {
        self.stamp(ctx.root())?;
        Ok(())
    }
}

/// Write `contents` to a sibling temp file, then rename it over `path`.
///
/// On failure the temp file is removed and `path` is left untouched.
fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), StampError> {
    let (dir, file_name) = match (path.parent(), path.file_name()) {
        (Some(dir), Some(name)) => (dir, name),
        _ => {
            return Err(StampError::io(
                path,
                io::Error::new(io::ErrorKind::InvalidInput, "not a file path"),
            ));
        }
    };
    let temp_path = dir.join(format!(
        ".{}.{}.tmp",
        file_name.to_string_lossy(),
        std::process::id()
    ));

    let written = File::create(&temp_path).and_then(|mut file| {
        file.write_all(contents)?;
        file.sync_all()
    });
    if let Err(e) = written {
        warn!(
            temp_path = %temp_path.display(),
            error = %e,
            "Failed to write version file"
        );
        // Clean up temp file on write failure
        let _ = fs::remove_file(&temp_path);
        return Err(StampError::io(path, e));
    }

    if let Err(e) = fs::rename(&temp_path, path) {
        warn!(
            temp_path = %temp_path.display(),
            path = %path.display(),
            error = %e,
            "Failed to move version file into place"
        );
        let _ = fs::remove_file(&temp_path);
        return Err(StampError::io(path, e));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const NOV_2023: i64 = 1_700_000_000_000;

    fn project() -> TempDir {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("public")).unwrap();
        tmp
    }

    fn plugin_at(millis: i64) -> VersionStampPlugin {
        VersionStampPlugin::new(StampConfig::default()).with_clock(Arc::new(FixedClock(millis)))
    }

    fn dir_entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_target_path_defaults() {
        let plugin = VersionStampPlugin::new(StampConfig::default());
        assert_eq!(
            plugin.target_path(Path::new("/srv/app")),
            PathBuf::from("/srv/app/public/version.json")
        );
    }

    #[test]
    fn test_target_path_absolute_public_dir() {
        let config = StampConfig {
            public_dir: "/var/www/static".to_string(),
            ..StampConfig::default()
        };
        let plugin = VersionStampPlugin::new(config);
        assert_eq!(
            plugin.target_path(Path::new("/srv/app")),
            PathBuf::from("/var/www/static/version.json")
        );
    }

    #[test]
    fn test_stamp_with_fixed_clock_compact() {
        let tmp = project();
        let config = StampConfig {
            pretty: false,
            ..StampConfig::default()
        };
        let plugin = VersionStampPlugin::new(config).with_clock(Arc::new(FixedClock(NOV_2023)));

        plugin.stamp(tmp.path()).unwrap();

        let content = fs::read_to_string(tmp.path().join("public/version.json")).unwrap();
        assert_eq!(
            content,
            r#"{"timestamp":1700000000000,"buildTime":"2023-11-14T22:13:20.000Z","version":"v1700000000000"}"#
        );
    }

    #[test]
    fn test_stamp_writes_indented_json_by_default() {
        let tmp = project();
        let record = plugin_at(NOV_2023).stamp(tmp.path()).unwrap();

        let content = fs::read_to_string(tmp.path().join("public/version.json")).unwrap();
        assert!(content.contains("\n  \"buildTime\": \"2023-11-14T22:13:20.000Z\""));
        assert_eq!(record.version(), "v1700000000000");
    }

    #[test]
    fn test_stamp_overwrites_previous_file() {
        let tmp = project();
        plugin_at(NOV_2023).stamp(tmp.path()).unwrap();
        plugin_at(NOV_2023 + 1).stamp(tmp.path()).unwrap();

        let current = plugin_at(0).read_current(tmp.path()).unwrap();
        assert_eq!(current.timestamp(), NOV_2023 + 1);
        assert_eq!(dir_entries(&tmp.path().join("public")), vec!["version.json"]);
    }

    #[test]
    fn test_stamp_fails_when_directory_missing() {
        let tmp = TempDir::new().unwrap();
        let err = plugin_at(NOV_2023).stamp(tmp.path()).unwrap_err();

        match err {
            StampError::Io { path, source } => {
                assert_eq!(path, tmp.path().join("public/version.json"));
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!tmp.path().join("public").exists());
        assert!(dir_entries(tmp.path()).is_empty());
    }

    #[test]
    fn test_stamp_fails_when_public_dir_is_a_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("public"), b"not a directory").unwrap();

        let err = plugin_at(NOV_2023).stamp(tmp.path()).unwrap_err();
        assert!(matches!(err, StampError::Io { .. }));
        assert_eq!(
            fs::read(tmp.path().join("public")).unwrap(),
            b"not a directory"
        );
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_stamp_fails_in_directory_refusing_writes() {
        // procfs rejects file creation, even for root.
        let config = StampConfig {
            public_dir: "/proc/self".to_string(),
            ..StampConfig::default()
        };
        let plugin = VersionStampPlugin::new(config).with_clock(Arc::new(FixedClock(NOV_2023)));

        let err = plugin.stamp(Path::new("/srv/app")).unwrap_err();
        assert!(
            err.to_string()
                .starts_with("filesystem error at /proc/self/version.json:")
        );
        match err {
            StampError::Io { path, .. } => {
                assert_eq!(path, PathBuf::from("/proc/self/version.json"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!Path::new("/proc/self/version.json").exists());
    }

    #[test]
    fn test_failed_stamp_keeps_previous_record() {
        let tmp = project();
        plugin_at(NOV_2023).stamp(tmp.path()).unwrap();

        let err = plugin_at(-5).stamp(tmp.path()).unwrap_err();
        assert!(matches!(
            err,
            StampError::Record(RecordError::InvalidTimestamp(-5))
        ));
        let current = plugin_at(0).read_current(tmp.path()).unwrap();
        assert_eq!(current.timestamp(), NOV_2023);
    }

    #[test]
    fn test_read_current_missing_file() {
        let tmp = project();
        let err = plugin_at(0).read_current(tmp.path()).unwrap_err();
        assert!(matches!(err, StampError::Io { .. }));
    }

    #[test]
    fn test_read_current_rejects_tampered_file() {
        let tmp = project();
        fs::write(
            tmp.path().join("public/version.json"),
            r#"{"timestamp":1700000000000,"buildTime":"2023-11-14T22:13:20.000Z","version":"v1"}"#,
        )
        .unwrap();

        let err = plugin_at(0).read_current(tmp.path()).unwrap_err();
        assert!(matches!(
            err,
            StampError::Record(RecordError::Inconsistent(_))
        ));
    }

    #[test]
    fn test_hook_contract() {
        let plugin = plugin_at(NOV_2023);
        assert_eq!(plugin.name(), "generate-version");
        assert_eq!(plugin.phase(), BuildPhase::GenerateBundle);
        assert!(plugin.applies_to(BuildMode::Build));
        assert!(!plugin.applies_to(BuildMode::Serve));
    }

    #[test]
    fn test_hook_run_writes_under_context_root() {
        let tmp = project();
        let ctx = BuildContext::new(tmp.path(), BuildMode::Build);
        plugin_at(NOV_2023).run(&ctx).unwrap();

        assert!(tmp.path().join("public/version.json").is_file());
    }
}
