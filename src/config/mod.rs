//! Configuration management

use crate::diff::{ComparisonConfig, TimeField};
use crate::types::SyncError;
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Which way changes are allowed to flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    /// Make destination look like source
    #[default]
    SourceToDestination,

    /// Make source look like destination
    DestinationToSource,

    /// Merge: copy one-sided entries both ways, prefer the winning version
    Both,
}

/// Switches gating which operation kinds a scan may materialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncOptions {
    /// Descend into subfolders. When off, directory entries are removed
    /// from listings entirely, making subtrees invisible to the scan.
    pub recursive: bool,

    /// Allow Remove operations for entries missing on the other side
    pub delete_files: bool,

    /// Allow Copy operations for files missing on the other side
    pub copy_missing_files: bool,

    /// Include hidden entries in listings
    pub sync_hidden_files: bool,

    /// Mirror directories that are physically empty
    pub create_empty_dirs: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            recursive: true,
            delete_files: false,
            copy_missing_files: true,
            sync_hidden_files: false,
            create_empty_dirs: true,
        }
    }
}

/// Validated configuration for one sync run.
#[derive(Debug, Clone)]
pub struct Config {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub direction: Direction,
    pub options: SyncOptions,
    pub comparison: ComparisonConfig,

    /// Show the plan, change nothing
    pub dry_run: bool,
}

/// Optional TOML profile: a saved set of options and comparison criteria.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Profile {
    options: SyncOptions,
    comparison: ComparisonConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: PathBuf::new(),
            destination: PathBuf::new(),
            direction: Direction::default(),
            options: SyncOptions::default(),
            comparison: ComparisonConfig::default(),
            dry_run: false,
        }
    }
}

/// Command-line interface.
#[derive(Debug, Parser)]
#[command(name = "twofold", version, about = "Folder synchronization with a reviewable plan")]
pub struct Cli {
    /// Source folder
    pub source: PathBuf,

    /// Destination folder
    pub destination: PathBuf,

    /// Sync direction
    #[arg(long, value_enum, default_value = "source-to-destination")]
    pub direction: Direction,

    /// Do not descend into subfolders
    #[arg(long)]
    pub no_recursive: bool,

    /// Delete entries that are missing on the other side
    #[arg(long)]
    pub delete: bool,

    /// Do not copy files that are missing on the other side
    #[arg(long)]
    pub no_copy_missing: bool,

    /// Include hidden files and folders
    #[arg(long)]
    pub hidden: bool,

    /// Do not mirror empty folders
    #[arg(long)]
    pub no_empty_dirs: bool,

    /// Ignore file size when deciding which version wins
    #[arg(long)]
    pub no_compare_size: bool,

    /// Ignore timestamps when deciding which version wins
    #[arg(long)]
    pub no_compare_time: bool,

    /// Which timestamp the time criterion reads
    #[arg(long, value_enum)]
    pub time_field: Option<TimeFieldArg>,

    /// TOML profile with saved options and comparison criteria
    #[arg(long)]
    pub profile: Option<PathBuf>,

    /// Print the plan without executing it
    #[arg(long)]
    pub dry_run: bool,
}

/// CLI-facing mirror of [`TimeField`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TimeFieldArg {
    Created,
    Modified,
    Accessed,
}

impl From<TimeFieldArg> for TimeField {
    fn from(arg: TimeFieldArg) -> Self {
        match arg {
            TimeFieldArg::Created => TimeField::Created,
            TimeFieldArg::Modified => TimeField::Modified,
            TimeFieldArg::Accessed => TimeField::Accessed,
        }
    }
}

impl TryFrom<Cli> for Config {
    type Error = SyncError;

    /// Build a validated config: profile values form the base, then every
    /// flag the user passed pushes its setting on top.
    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let profile = match &cli.profile {
            Some(path) => load_profile(path)?,
            None => Profile::default(),
        };

        let mut options = profile.options;
        if cli.no_recursive {
            options.recursive = false;
        }
        if cli.delete {
            options.delete_files = true;
        }
        if cli.no_copy_missing {
            options.copy_missing_files = false;
        }
        if cli.hidden {
            options.sync_hidden_files = true;
        }
        if cli.no_empty_dirs {
            options.create_empty_dirs = false;
        }

        let mut comparison = profile.comparison;
        if cli.no_compare_size {
            comparison.compare_size = false;
        }
        if cli.no_compare_time {
            comparison.compare_time = false;
        }
        if let Some(field) = cli.time_field {
            comparison.time_field = field.into();
        }

        let config = Config {
            source: cli.source,
            destination: cli.destination,
            direction: cli.direction,
            options,
            comparison,
            dry_run: cli.dry_run,
        };
        config.validate()?;
        Ok(config)
    }
}

impl Config {
    /// Check the parts that can be checked without walking anything.
    pub fn validate(&self) -> Result<(), SyncError> {
        if !self.source.is_dir() {
            return Err(SyncError::Config(format!(
                "source folder does not exist: {}",
                self.source.display()
            )));
        }
        if self.source == self.destination {
            return Err(SyncError::Config(
                "source and destination cannot be the same folder".to_string(),
            ));
        }
        Ok(())
    }
}

fn load_profile(path: &PathBuf) -> Result<Profile, SyncError> {
    let text = fs::read_to_string(path)
        .map_err(|e| SyncError::Config(format!("cannot read profile {}: {}", path.display(), e)))?;
    toml::from_str(&text)
        .map_err(|e| SyncError::Config(format!("invalid profile {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_default_options() {
        let options = SyncOptions::default();

        assert!(options.recursive);
        assert!(!options.delete_files);
        assert!(options.copy_missing_files);
        assert!(!options.sync_hidden_files);
        assert!(options.create_empty_dirs);
    }

    #[test]
    fn test_validate_rejects_missing_source() {
        let config = Config {
            source: PathBuf::from("/definitely/not/here"),
            destination: PathBuf::from("/tmp"),
            ..Config::default()
        };

        assert!(matches!(config.validate(), Err(SyncError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_same_folder() {
        let dir = TempDir::new().expect("tempdir");
        let config = Config {
            source: dir.path().to_path_buf(),
            destination: dir.path().to_path_buf(),
            ..Config::default()
        };

        assert!(matches!(config.validate(), Err(SyncError::Config(_))));
    }

    #[test]
    fn test_profile_round_trip() {
        let dir = TempDir::new().expect("tempdir");
        let profile_path = dir.path().join("mirror.toml");
        let mut file = std::fs::File::create(&profile_path).expect("create profile");
        writeln!(
            file,
            "[options]\ndelete_files = true\nsync_hidden_files = true\n\n\
             [comparison]\ncompare_size = false\ntime_field = \"created\"\n"
        )
        .expect("write profile");

        let profile = load_profile(&profile_path).expect("load profile");

        assert!(profile.options.delete_files);
        assert!(profile.options.sync_hidden_files);
        assert!(profile.options.recursive, "unset fields keep defaults");
        assert!(!profile.comparison.compare_size);
        assert_eq!(profile.comparison.time_field, TimeField::Created);
    }

    #[test]
    fn test_invalid_profile_is_config_error() {
        let dir = TempDir::new().expect("tempdir");
        let profile_path = dir.path().join("broken.toml");
        std::fs::write(&profile_path, "options = 42").expect("write profile");

        assert!(matches!(
            load_profile(&profile_path),
            Err(SyncError::Config(_))
        ));
    }
}
