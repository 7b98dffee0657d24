//! Position types for map objects

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of floors a map can hold (z = 0..=15)
pub const MAP_MAX_LAYERS: u8 = 16;

/// Absolute map position (tiles, items, towns, waypoints)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: u16,
    pub y: u16,
    pub z: u8,
}

impl Position {
    pub const fn new(x: u16, y: u16, z: u8) -> Self {
        Self { x, y, z }
    }

    /// Apply a relative (dx, dy) offset on the same floor.
    ///
    /// Returns `None` when the result does not fit in a `u16`.
    pub fn offset(self, dx: u8, dy: u8) -> Option<Self> {
        Some(Self {
            x: self.x.checked_add(dx as u16)?,
            y: self.y.checked_add(dy as u16)?,
            z: self.z,
        })
    }

    /// Apply a signed offset, as used by spawn files.
    ///
    /// Returns `None` when any component leaves its range.
    pub fn translate(self, dx: i32, dy: i32, dz: i32) -> Option<Self> {
        let x = u16::try_from((self.x as i32).checked_add(dx)?).ok()?;
        let y = u16::try_from((self.y as i32).checked_add(dy)?).ok()?;
        let z = u8::try_from((self.z as i32).checked_add(dz)?).ok()?;
        Some(Self { x, y, z })
    }

    /// Whether the floor is within the playable range
    pub fn has_valid_floor(&self) -> bool {
        self.z < MAP_MAX_LAYERS
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[x: {}, y: {}, z: {}]", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_keeps_floor() {
        let base = Position::new(1000, 2000, 7);
        let pos = base.offset(255, 3).unwrap();
        assert_eq!(pos, Position::new(1255, 2003, 7));
    }

    #[test]
    fn test_offset_overflow() {
        let base = Position::new(u16::MAX - 1, 0, 0);
        assert!(base.offset(2, 0).is_none());
        assert_eq!(base.offset(1, 0), Some(Position::new(u16::MAX, 0, 0)));
    }

    #[test]
    fn test_translate_signed() {
        let center = Position::new(100, 100, 7);
        assert_eq!(center.translate(-2, 3, 0), Some(Position::new(98, 103, 7)));
        assert_eq!(Position::new(0, 0, 0).translate(-1, 0, 0), None);
    }

    #[test]
    fn test_translate_extreme_offsets() {
        let center = Position::new(100, 100, 7);
        assert_eq!(center.translate(i32::MAX, 0, 0), None);
        assert_eq!(center.translate(0, i32::MAX, 0), None);
        assert_eq!(center.translate(0, 0, i32::MAX), None);
        assert_eq!(center.translate(i32::MIN, 0, 0), None);
        assert_eq!(
            Position::new(u16::MAX, u16::MAX, 0).translate(i32::MIN, i32::MIN, 0),
            None
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Position::new(1, 2, 3).to_string(), "[x: 1, y: 2, z: 3]");
    }

    #[test]
    fn test_floor_range() {
        assert!(Position::new(0, 0, 15).has_valid_floor());
        assert!(!Position::new(0, 0, 16).has_valid_floor());
    }
}
