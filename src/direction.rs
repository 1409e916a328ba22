#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

use crate::CellVec;

/// One of the eight compass directions on a square grid.
///
/// The numeric value is significant: it is the "direction code" used
/// throughout the tiler (e.g. as the low bits of a [crate::SegmentType]),
/// and [Direction::reverse] relies on opposite directions being four
/// apart.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Direction {
    North = 0,
    NorthEast = 1,
    East = 2,
    SouthEast = 3,
    South = 4,
    SouthWest = 5,
    West = 6,
    NorthWest = 7,
}

impl Direction {
    /// All eight directions, in code order.
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// The four cardinal (non-diagonal) directions, in code order.
    pub const CARDINAL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    #[inline]
    #[must_use]
    pub fn iter() -> impl Iterator<Item = Direction> {
        Self::ALL.into_iter()
    }

    #[inline]
    #[must_use]
    pub fn iter_cardinal() -> impl Iterator<Item = Direction> {
        Self::CARDINAL.into_iter()
    }

    /// Decode a direction from its numeric code (`0..8`).
    #[inline]
    #[must_use]
    pub fn from_code(code: u8) -> Option<Direction> {
        Self::ALL.get((code & 0x7) as usize).copied()
    }

    #[inline]
    #[must_use]
    pub fn code(&self) -> u8 {
        *self as u8
    }

    /// Returns the unit displacement for this direction.
    #[inline]
    #[must_use]
    pub fn unit(&self) -> CellVec {
        match self {
            Direction::North => CellVec::new(0, 1),
            Direction::NorthEast => CellVec::new(1, 1),
            Direction::East => CellVec::new(1, 0),
            Direction::SouthEast => CellVec::new(1, -1),
            Direction::South => CellVec::new(0, -1),
            Direction::SouthWest => CellVec::new(-1, -1),
            Direction::West => CellVec::new(-1, 0),
            Direction::NorthWest => CellVec::new(-1, 1),
        }
    }

    /// The opposite direction. Implemented as `code xor 4`, valid
    /// because opposite directions are always four codes apart.
    #[inline]
    #[must_use]
    pub fn reverse(&self) -> Direction {
        Direction::from_code(self.code() ^ 4).unwrap()
    }

    #[inline]
    #[must_use]
    pub fn is_cardinal(&self) -> bool {
        self.code() % 2 == 0
    }

    #[inline]
    #[must_use]
    pub fn is_diagonal(&self) -> bool {
        !self.is_cardinal()
    }

    /// Decode the 8-neighbor [Direction] matching `v` exactly, i.e. `v`
    /// must already be one of the eight unit offsets.
    #[must_use]
    pub fn from_cvec(v: CellVec) -> Option<Direction> {
        Direction::ALL.into_iter().find(|d| d.unit() == v)
    }

    /// Snap an arbitrary (non-zero) displacement to the nearest
    /// *cardinal* direction, breaking ties towards north/south over
    /// east/west. Used by path conditioning to pick a marching
    /// direction for extension from a recent, possibly diagonal, run
    /// of steps.
    #[must_use]
    pub fn snap_cardinal(v: CellVec) -> Direction {
        if v.x() == 0 && v.y() == 0 {
            return Direction::North;
        }
        if v.y().abs() >= v.x().abs() {
            if v.y() >= 0 {
                Direction::North
            } else {
                Direction::South
            }
        } else if v.x() >= 0 {
            Direction::East
        } else {
            Direction::West
        }
    }
}

#[cfg(test)]
mod test {
    use super::Direction;
    use crate::CellVec;

    #[test]
    fn test_reverse() {
        assert_eq!(Direction::North.reverse(), Direction::South);
        assert_eq!(Direction::NorthEast.reverse(), Direction::SouthWest);
        assert_eq!(Direction::East.reverse(), Direction::West);
        assert_eq!(Direction::SouthEast.reverse(), Direction::NorthWest);
        for d in Direction::iter() {
            assert_eq!(d.reverse().reverse(), d);
        }
    }

    #[test]
    fn test_cardinal_diagonal() {
        assert!(Direction::North.is_cardinal());
        assert!(!Direction::North.is_diagonal());
        assert!(Direction::NorthEast.is_diagonal());
        assert!(!Direction::NorthEast.is_cardinal());
    }

    #[test]
    fn test_from_cvec() {
        assert_eq!(Direction::from_cvec(CellVec::new(0, 1)), Some(Direction::North));
        assert_eq!(
            Direction::from_cvec(CellVec::new(1, -1)),
            Some(Direction::SouthEast)
        );
        assert_eq!(Direction::from_cvec(CellVec::new(2, 0)), None);
        assert_eq!(Direction::from_cvec(CellVec::new(0, 0)), None);
    }

    #[test]
    fn test_snap_cardinal() {
        assert_eq!(Direction::snap_cardinal(CellVec::new(3, 1)), Direction::East);
        assert_eq!(Direction::snap_cardinal(CellVec::new(1, 3)), Direction::North);
        assert_eq!(Direction::snap_cardinal(CellVec::new(-3, -1)), Direction::West);
        assert_eq!(Direction::snap_cardinal(CellVec::new(-1, -3)), Direction::South);
        assert_eq!(Direction::snap_cardinal(CellVec::new(2, 2)), Direction::North);
    }
}
