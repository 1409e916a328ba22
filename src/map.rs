use crate::CellPos;

/// An axis-aligned rectangle of valid cell coordinates, inclusive of
/// `min` and exclusive of `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellBounds {
    pub min: CellPos,
    pub max: CellPos,
}

impl CellBounds {
    #[inline]
    #[must_use]
    pub fn new(min: CellPos, max: CellPos) -> Self {
        Self { min, max }
    }

    #[inline]
    #[must_use]
    pub fn width(&self) -> i32 {
        self.max.x() - self.min.x()
    }

    #[inline]
    #[must_use]
    pub fn height(&self) -> i32 {
        self.max.y() - self.min.y()
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, pos: CellPos) -> bool {
        pos.x() >= self.min.x()
            && pos.y() >= self.min.y()
            && pos.x() < self.max.x()
            && pos.y() < self.max.y()
    }

    /// Expand this rectangle by `margin` cells in every direction.
    #[inline]
    #[must_use]
    pub fn expand(&self, margin: i32) -> CellBounds {
        CellBounds::new(
            CellPos::new(self.min.x() - margin, self.min.y() - margin),
            CellPos::new(self.max.x() + margin, self.max.y() + margin),
        )
    }
}

/// The map collaborator contract required by [crate::TilingPath]:
/// a writable cell grid the traceback/painter step paints templates
/// onto, plus the bounds information path conditioning needs (edge
/// extension, padding).
pub trait TileMap {
    /// The map's own native position type, e.g. a world-space or
    /// screen-space coordinate distinct from the tiler's [CellPos].
    type NativePos;

    /// The rectangle of valid cell coordinates on this map.
    fn cell_bounds(&self) -> CellBounds;

    /// True if `pos` is addressable on this map.
    fn contains(&self, pos: CellPos) -> bool {
        self.cell_bounds().contains(pos)
    }

    /// Convert a tiler-space [CellPos] to this map's native position
    /// type.
    fn to_map_pos(&self, pos: CellPos) -> Self::NativePos;

    /// Paint `tile_index` at `pos`. Called by the traceback/painter
    /// step once per non-`None` cell of a chosen template, already
    /// clipped to [TileMap::contains].
    fn paint(&mut self, pos: CellPos, tile_index: u32);
}
