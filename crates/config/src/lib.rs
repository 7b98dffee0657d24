//! otmap configuration
//!
//! Loads the world loader options from a `key = value` file (`#` starts a
//! comment). Every option has a default, unknown keys are ignored.
//!
//! ```text
//! mapname = forgotten
//! datadir = data
//! maxcontainerdepth = 64
//! strictitemsversion = false
//! waypointduplicates = overwrite
//! ```

use otmap_core::{OtmapError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "config.txt";

/// Default limit on container nesting inside one tile
pub const DEFAULT_MAX_CONTAINER_DEPTH: usize = 64;
/// Highest accepted container nesting limit
pub const MAX_CONTAINER_DEPTH: usize = 1024;

/// How the loader treats a waypoint name that appears twice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Fail the load
    Reject,
    /// Keep the latest definition
    Overwrite,
}

impl DuplicatePolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "reject" | "error" => Some(Self::Reject),
            "overwrite" | "replace" | "last" => Some(Self::Overwrite),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reject => "reject",
            Self::Overwrite => "overwrite",
        }
    }
}

/// World loading configuration
#[derive(Debug, Clone)]
pub struct WorldConfig {
    /// Map identifier (from "mapname" option); companion files default to
    /// `{mapname}-monster.xml`, `{mapname}-npc.xml`, `{mapname}-house.xml`
    pub map_name: String,
    /// Data directory (from "datadir" option)
    pub data_dir: PathBuf,
    /// Explicit map file (from "mapfile" option)
    pub map_file: Option<PathBuf>,
    /// Explicit items.otb (from "itemsfile" option)
    pub items_file: Option<PathBuf>,
    /// Container nesting limit (from "maxcontainerdepth" option)
    pub max_container_depth: usize,
    /// Reject maps saved with a newer items minor version (from "strictitemsversion")
    pub strict_items_version: bool,
    /// Duplicate waypoint handling (from "waypointduplicates" option)
    pub waypoint_duplicates: DuplicatePolicy,
    /// Log filter directive (from "loglevel" option)
    pub log_level: String,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            map_name: "forgotten".into(),
            data_dir: PathBuf::from("data"),
            map_file: None,
            items_file: None,
            max_container_depth: DEFAULT_MAX_CONTAINER_DEPTH,
            strict_items_version: false,
            waypoint_duplicates: DuplicatePolicy::Overwrite,
            log_level: "info".into(),
        }
    }
}

impl WorldConfig {
    /// Load configuration from a file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            OtmapError::Config(format!("could not read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    /// Parse configuration content
    pub fn parse(content: &str) -> Result<Self> {
        let mut config = Self::default();

        for (index, line) in content.lines().enumerate() {
            let line = line.trim();

            // Skip comments and empty lines
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                return Err(OtmapError::Config(format!(
                    "line {}: expected 'key = value', got '{}'",
                    index + 1,
                    line
                )));
            };

            config.parse_option(key.trim(), value.trim());
        }

        if config.map_name.is_empty() {
            return Err(OtmapError::Config("mapname must not be empty".into()));
        }

        Ok(config)
    }

    fn parse_option(&mut self, key: &str, value: &str) {
        match key.to_lowercase().as_str() {
            "mapname" => self.map_name = value.into(),
            "datadir" => self.data_dir = PathBuf::from(value),
            "mapfile" => self.map_file = (!value.is_empty()).then(|| PathBuf::from(value)),
            "itemsfile" => self.items_file = (!value.is_empty()).then(|| PathBuf::from(value)),
            "maxcontainerdepth" => {
                self.max_container_depth = value
                    .parse()
                    .ok()
                    .filter(|depth| (1..=MAX_CONTAINER_DEPTH).contains(depth))
                    .unwrap_or(DEFAULT_MAX_CONTAINER_DEPTH);
            }
            "strictitemsversion" => {
                self.strict_items_version = value.parse().unwrap_or(false);
            }
            "waypointduplicates" => {
                self.waypoint_duplicates =
                    DuplicatePolicy::parse(value).unwrap_or(DuplicatePolicy::Overwrite);
            }
            "loglevel" => self.log_level = value.into(),
            _ => {
                tracing::debug!("Unknown config option: {} = {}", key, value);
            }
        }
    }

    /// Path of the `.otbm` file to load
    pub fn map_path(&self) -> PathBuf {
        match &self.map_file {
            Some(path) => path.clone(),
            None => self
                .data_dir
                .join("world")
                .join(format!("{}.otbm", self.map_name)),
        }
    }

    /// Path of the items.otb file to load
    pub fn items_path(&self) -> PathBuf {
        match &self.items_file {
            Some(path) => path.clone(),
            None => self.data_dir.join("items").join("items.otb"),
        }
    }

    /// Display configuration summary
    pub fn display(&self) {
        tracing::info!("World configuration:");
        tracing::info!("    Map name: {}", self.map_name);
        tracing::info!("    Map file: {}", self.map_path().display());
        tracing::info!("    Items file: {}", self.items_path().display());
        tracing::info!("    Max container depth: {}", self.max_container_depth);
        tracing::info!("    Strict items version: {}", self.strict_items_version);
        tracing::info!("    Waypoint duplicates: {}", self.waypoint_duplicates.as_str());
    }
}
