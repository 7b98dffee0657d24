//! Named waypoints

use otmap_core::Position;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Waypoint {
    pub name: String,
    pub position: Position,
}

/// Waypoints keyed by name
#[derive(Debug, Clone, Default)]
pub struct Waypoints {
    waypoints: BTreeMap<String, Waypoint>,
}

impl Waypoints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a waypoint, returning the replaced entry
    pub fn insert(&mut self, waypoint: Waypoint) -> Option<Waypoint> {
        self.waypoints.insert(waypoint.name.clone(), waypoint)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.waypoints.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Waypoint> {
        self.waypoints.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Waypoint> {
        self.waypoints.values()
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_replaces() {
        let mut waypoints = Waypoints::new();
        let first = Waypoint {
            name: "depot".into(),
            position: Position::new(100, 100, 7),
        };
        let second = Waypoint {
            name: "depot".into(),
            position: Position::new(200, 200, 6),
        };

        assert!(waypoints.insert(first.clone()).is_none());
        assert_eq!(waypoints.insert(second), Some(first));
        assert_eq!(waypoints.len(), 1);
        assert_eq!(
            waypoints.get("depot").map(|w| w.position),
            Some(Position::new(200, 200, 6))
        );
        assert!(!waypoints.contains("temple"));
    }
}
