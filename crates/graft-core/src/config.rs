//! Project configuration loaded from `graft.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Fallback target base when no package directory is configured.
pub const DEFAULT_TARGET_BASE: &str = "packages";

/// Graft configuration loaded from `<project root>/graft.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Workspace layout.
    #[serde(default)]
    pub workspace: WorkspaceConfig,

    /// Defaults for `graft import`.
    #[serde(default)]
    pub import: ImportConfig,
}

impl Config {
    /// Load config from a TOML file.
    ///
    /// A missing file yields the default configuration.
    ///
    /// # Errors
    /// Returns error if file can't be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Directories that hold packages: the parents of globs ending in `*`.
    ///
    /// `packages/*` contributes `packages`; globs without a trailing `*`
    /// name a single package and contribute nothing.
    #[must_use]
    pub fn package_directories(&self) -> Vec<String> {
        self.workspace
            .packages
            .iter()
            .filter(|glob| glob.ends_with('*'))
            .map(|glob| match glob.rsplit_once('/') {
                Some((dir, _)) => dir.to_string(),
                None => ".".to_string(),
            })
            .collect()
    }

    /// The base directory imports land under.
    ///
    /// An explicit destination wins, then the first package directory, then
    /// [`DEFAULT_TARGET_BASE`].
    #[must_use]
    pub fn target_base(&self, dest: Option<&str>) -> String {
        dest.map(String::from)
            .or_else(|| self.package_directories().into_iter().next())
            .unwrap_or_else(|| DEFAULT_TARGET_BASE.to_string())
    }
}

/// Workspace layout settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Package globs, relative to the project root.
    #[serde(default = "default_packages")]
    pub packages: Vec<String>,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            packages: default_packages(),
        }
    }
}

fn default_packages() -> Vec<String> {
    vec!["packages/*".into()]
}

/// Defaults for the import command; CLI flags can only turn these on.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Import first-parent history as flattened diffs.
    #[serde(default)]
    pub flatten: bool,

    /// Record each commit with its original author identity.
    #[serde(default)]
    pub preserve_commit: bool,
}

/// A project root together with its configuration.
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
    config: Config,
}

impl Project {
    /// Name of the configuration file in the project root.
    pub const CONFIG_FILE: &'static str = "graft.toml";

    /// Load the project rooted at `root`.
    ///
    /// # Errors
    /// Returns error if the root does not exist or the config is invalid.
    pub fn load(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().canonicalize()?;
        let config = Config::load(root.join(Self::CONFIG_FILE))?;
        Ok(Self { root, config })
    }

    /// Build a project from parts.
    #[must_use]
    pub const fn new(root: PathBuf, config: Config) -> Self {
        Self { root, config }
    }

    /// The project root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The loaded configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.workspace.packages, vec!["packages/*".to_string()]);
        assert!(!config.import.flatten);
        assert!(!config.import.preserve_commit);
    }

    #[test]
    fn test_load_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("graft.toml");
        fs::write(
            &path,
            "[workspace]\npackages = [\"libs/*\", \"tools/*\"]\n\n\
             [import]\nflatten = true\npreserve_commit = true\n",
        )
        .unwrap();

        let loaded = Config::load(&path).unwrap();

        assert_eq!(loaded.workspace.packages, vec!["libs/*", "tools/*"]);
        assert!(loaded.import.flatten);
        assert!(loaded.import.preserve_commit);
    }

    #[test]
    fn test_missing_config_returns_default() {
        let config = Config::load("/nonexistent/path/graft.toml").unwrap();
        assert_eq!(config.package_directories(), vec!["packages"]);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: Config = toml::from_str("[import]\nflatten = true\n").unwrap();
        assert!(config.import.flatten);
        assert_eq!(config.workspace.packages, vec!["packages/*"]);
    }

    #[test]
    fn test_package_directories_ignore_exact_globs() {
        let config = Config {
            workspace: WorkspaceConfig {
                packages: vec![
                    "packages/*".into(),
                    "tools/cli".into(),
                    "nested/group/*".into(),
                    "*".into(),
                ],
            },
            import: ImportConfig::default(),
        };

        assert_eq!(
            config.package_directories(),
            vec!["packages", "nested/group", "."]
        );
    }

    #[test]
    fn test_target_base_precedence() {
        let mut config = Config::default();
        assert_eq!(config.target_base(Some("tools")), "tools");
        assert_eq!(config.target_base(None), "packages");

        config.workspace.packages = vec!["libs/*".into()];
        assert_eq!(config.target_base(None), "libs");

        config.workspace.packages.clear();
        assert_eq!(config.target_base(None), DEFAULT_TARGET_BASE);
    }

    #[test]
    fn test_project_load_reads_config() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(Project::CONFIG_FILE),
            "[workspace]\npackages = [\"apps/*\"]\n",
        )
        .unwrap();

        let project = Project::load(temp.path()).unwrap();
        assert_eq!(project.root(), temp.path().canonicalize().unwrap());
        assert_eq!(project.config().package_directories(), vec!["apps"]);
    }
}
