//! Boolean load facade
//!
//! Callers that only need to know whether a step worked get `true`/`false`;
//! the reason of the last failure stays available as a structured error.

use crate::error::MapError;
use crate::loader::MapLoader;
use crate::map::Map;
use crate::resources;
use otmap_config::WorldConfig;
use otmap_items::ItemTypeOracle;
use otmap_otb::NodeSource;
use std::path::Path;
use tracing::{error, warn};

/// Map and companion loaders behind `bool` results, keeping the last error
pub struct IoMap<'a> {
    loader: MapLoader<'a>,
    config: &'a WorldConfig,
    last_error: Option<MapError>,
}

impl<'a> IoMap<'a> {
    pub fn new(items: &'a dyn ItemTypeOracle, config: &'a WorldConfig) -> Self {
        Self {
            loader: MapLoader::new(items, config),
            config,
            last_error: None,
        }
    }

    pub fn with_source(mut self, source: &'a dyn NodeSource) -> Self {
        self.loader = self.loader.with_source(source);
        self
    }

    /// Load a map file into `map`.
    ///
    /// On failure `map` is left exactly as it was.
    pub fn load_map(&mut self, map: &mut Map, path: &Path) -> bool {
        match self.loader.load(path) {
            Ok(loaded) => {
                *map = loaded;
                self.last_error = None;
                true
            }
            Err(err) => {
                error!("Failed to load map {}: {}", path.display(), err);
                self.last_error = Some(err);
                false
            }
        }
    }

    pub fn load_monsters(&mut self, map: &mut Map) -> bool {
        let result = resources::load_monsters(map, self.config);
        self.record(result, "monsters")
    }

    pub fn load_npcs(&mut self, map: &mut Map) -> bool {
        let result = resources::load_npcs(map, self.config);
        self.record(result, "npcs")
    }

    pub fn load_houses(&mut self, map: &mut Map) -> bool {
        let result = resources::load_houses(map, self.config);
        self.record(result, "houses")
    }

    fn record(&mut self, result: crate::Result<()>, what: &str) -> bool {
        match result {
            Ok(()) => {
                self.last_error = None;
                true
            }
            Err(err) => {
                warn!("Failed to load {}: {}", what, err);
                self.last_error = Some(err);
                false
            }
        }
    }

    /// Error of the most recent failed call
    pub fn last_error(&self) -> Option<&MapError> {
        self.last_error.as_ref()
    }

    /// Message of the most recent failed call, empty after a success
    pub fn last_error_string(&self) -> String {
        self.last_error
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default()
    }
}
