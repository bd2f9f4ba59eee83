//! Scratch project directories.
//!
//! A [`TestProject`] owns a temporary project root with an empty `public/`
//! directory, mirroring the layout of a web application checkout.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use verstamp_config::CONFIG_FILE_NAME;

/// A test-scoped project root.
///
/// The temp directory is deleted automatically when this value is dropped,
/// guaranteeing cleanup even on panic.
pub struct TestProject {
    temp_dir: TempDir,
}

impl TestProject {
    /// Create a project root containing an empty `public/` directory.
    pub fn new() -> Self {
        let project = Self::bare();
        fs::create_dir(project.public_dir()).expect("failed to create public dir");
        project
    }

    /// Create a project root with no static asset directory.
    pub fn bare() -> Self {
        Self {
            temp_dir: TempDir::new().expect("failed to create temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn public_dir(&self) -> PathBuf {
        self.root().join("public")
    }

    /// Default location of the version record.
    pub fn version_file(&self) -> PathBuf {
        self.public_dir().join("version.json")
    }

    pub fn config_path(&self) -> PathBuf {
        self.root().join(CONFIG_FILE_NAME)
    }

    /// Write `verstamp.toml` at the project root.
    pub fn write_config(&self, toml_content: &str) {
        fs::write(self.config_path(), toml_content).expect("failed to write test config");
    }

    /// Read the default version record as a string.
    pub fn read_version_file(&self) -> String {
        fs::read_to_string(self.version_file()).expect("failed to read version file")
    }

    /// Names of the entries in `public/`, sorted.
    pub fn public_entries(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.public_dir())
            .expect("failed to list public dir")
            .map(|e| {
                e.expect("failed to read dir entry")
                    .file_name()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect();
        names.sort();
        names
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}
