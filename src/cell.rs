#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

use std::ops::{Add, Sub};

/// An integer lattice point on the tile grid.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellPos {
    x: i32,
    y: i32,
}

impl CellPos {
    pub const ZERO: Self = Self { x: 0, y: 0 };

    #[inline]
    #[must_use]
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[inline]
    #[must_use]
    pub fn x(&self) -> i32 {
        self.x
    }

    #[inline]
    #[must_use]
    pub fn y(&self) -> i32 {
        self.y
    }

    /// Chebyshev (king-move) distance between two cells.
    #[inline]
    #[must_use]
    pub fn chebyshev(&self, other: CellPos) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    #[inline]
    #[must_use]
    pub fn min(&self, other: CellPos) -> Self {
        Self::new(self.x.min(other.x), self.y.min(other.y))
    }

    #[inline]
    #[must_use]
    pub fn max(&self, other: CellPos) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y))
    }
}

impl From<(i32, i32)> for CellPos {
    #[inline]
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl From<CellPos> for (i32, i32) {
    #[inline]
    fn from(pos: CellPos) -> Self {
        (pos.x, pos.y)
    }
}

/// An integer displacement between two [CellPos] values.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellVec {
    x: i32,
    y: i32,
}

impl CellVec {
    pub const ZERO: Self = Self { x: 0, y: 0 };

    #[inline]
    #[must_use]
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[inline]
    #[must_use]
    pub fn x(&self) -> i32 {
        self.x
    }

    #[inline]
    #[must_use]
    pub fn y(&self) -> i32 {
        self.y
    }

    /// True if this vector is a single non-diagonal (cardinal) unit
    /// step: exactly one of `x`/`y` is `+-1` and the other is `0`.
    #[inline]
    #[must_use]
    pub fn is_non_diagonal_unit(&self) -> bool {
        (self.x == 0 && self.y.abs() == 1) || (self.y == 0 && self.x.abs() == 1)
    }

    /// True if this vector is a unit step in any of the eight
    /// neighbor directions.
    #[inline]
    #[must_use]
    pub fn is_unit_step(&self) -> bool {
        self.x.abs() <= 1 && self.y.abs() <= 1 && (self.x != 0 || self.y != 0)
    }
}

impl From<(i32, i32)> for CellVec {
    #[inline]
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl Add<CellVec> for CellPos {
    type Output = CellPos;

    #[inline]
    fn add(self, rhs: CellVec) -> CellPos {
        CellPos::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub<CellVec> for CellPos {
    type Output = CellPos;

    #[inline]
    fn sub(self, rhs: CellVec) -> CellPos {
        CellPos::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Sub<CellPos> for CellPos {
    type Output = CellVec;

    #[inline]
    fn sub(self, rhs: CellPos) -> CellVec {
        CellVec::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Add for CellVec {
    type Output = CellVec;

    #[inline]
    fn add(self, rhs: CellVec) -> CellVec {
        CellVec::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for CellVec {
    type Output = CellVec;

    #[inline]
    fn sub(self, rhs: CellVec) -> CellVec {
        CellVec::new(self.x - rhs.x, self.y - rhs.y)
    }
}
