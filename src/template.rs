#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

use crate::CellVec;

/// A painted tile block referenced by one or more
/// [crate::TemplateSegment]s. Cells are `Option<u32>` tile indices;
/// `None` cells are left untouched by the painter.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainTemplate {
    id: u32,
    width: i32,
    height: i32,
    tiles: Vec<Option<u32>>,
    /// Offset from a segment's first point to this template's
    /// top-left tile, used by the painter to place the block
    /// relative to the search cell it was reached from.
    offset: CellVec,
    /// Templates flagged `pick_any` are chosen stochastically by an
    /// external engine (not this core) and must never reach the
    /// painter directly.
    pick_any: bool,
}

impl TerrainTemplate {
    #[must_use]
    pub fn new(id: u32, width: i32, height: i32, tiles: Vec<Option<u32>>, offset: CellVec) -> Self {
        assert_eq!(
            tiles.len(),
            (width as usize) * (height as usize),
            "tile grid length must equal width * height"
        );
        Self {
            id,
            width,
            height,
            tiles,
            offset,
            pick_any: false,
        }
    }

    #[must_use]
    pub fn pick_any(id: u32, width: i32, height: i32, tiles: Vec<Option<u32>>) -> Self {
        let mut t = Self::new(id, width, height, tiles, CellVec::ZERO);
        t.pick_any = true;
        t
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    #[must_use]
    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    #[must_use]
    pub fn offset(&self) -> CellVec {
        self.offset
    }

    #[inline]
    #[must_use]
    pub fn is_pick_any(&self) -> bool {
        self.pick_any
    }

    /// The tile index at `(x, y)` within this template's local grid,
    /// or `None` if the cell is empty or out of range.
    #[must_use]
    pub fn tile_at(&self, x: i32, y: i32) -> Option<u32> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        self.tiles[(y as usize) * (self.width as usize) + (x as usize)]
    }
}
