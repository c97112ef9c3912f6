//! Configuration file handling
//!
//! Every value is optional; command-line flags override the file.

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "kgraph.toml";

/// Analysis file name used when neither flag nor config names one.
pub const DEFAULT_ANALYSIS_FILE: &str = "analysis.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub extract: ExtractConfig,
    #[serde(default)]
    pub graph: GraphConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtractConfig {
    /// Dump files or directories used when none are given on the command line
    #[serde(default)]
    pub inputs: Vec<PathBuf>,
    pub project_root: Option<PathBuf>,
    pub scope: Option<ScopeMode>,
    pub output: Option<PathBuf>,
    #[serde(default)]
    pub summary: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GraphConfig {
    pub analysis: Option<PathBuf>,
    pub format: Option<String>,
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExportConfig {
    /// Cypher script path; export is skipped when unset
    pub cypher: Option<PathBuf>,
    #[serde(default)]
    pub clear: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderConfig {
    /// Graphviz output path; rendering is skipped when unset
    pub output: Option<PathBuf>,
}

/// Membership predicate used by `kgraph extract`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ScopeMode {
    /// Only declarations in the translation units themselves
    #[default]
    Units,
    /// Anything declared under the project root, headers included
    Project,
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// An explicit path must exist; otherwise `kgraph.toml` in the working
    /// directory is used when present.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let fallback = Path::new(DEFAULT_CONFIG_FILE);
        if fallback.is_file() {
            log::debug!("Using {DEFAULT_CONFIG_FILE} from the working directory");
            Self::load(fallback)
        } else {
            Ok(Self::default())
        }
    }
}
