#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

use crate::{CellVec, Direction, TilerError};
use fxhash::FxHashMap;
use indexmap::IndexMap;

/// The interned integer id of a terminal-type label
/// (`"<type>.<dir>"`, e.g. `"Beach.R"`), used to index the search's
/// flat, per-type cost matrices without repeated string comparison.
pub type TypeId = u32;

/// Renders a [Direction] as the short suffix used in terminal labels
/// (`"Beach.R"`, `"Beach.D"`, ...): `U`/`D`/`L`/`R` for the cardinals,
/// doubled for the diagonals (`UR`, `DR`, `DL`, `UL`).
#[must_use]
pub fn direction_suffix(direction: Direction) -> &'static str {
    match direction {
        Direction::North => "U",
        Direction::South => "D",
        Direction::East => "R",
        Direction::West => "L",
        Direction::NorthEast => "UR",
        Direction::SouthEast => "DR",
        Direction::SouthWest => "DL",
        Direction::NorthWest => "UL",
    }
}

fn suffix_direction(suffix: &str) -> Option<Direction> {
    match suffix {
        "U" => Some(Direction::North),
        "D" => Some(Direction::South),
        "R" => Some(Direction::East),
        "L" => Some(Direction::West),
        "UR" => Some(Direction::NorthEast),
        "DR" => Some(Direction::SouthEast),
        "DL" => Some(Direction::SouthWest),
        "UL" => Some(Direction::NorthWest),
        _ => None,
    }
}

/// Format a terminal label of the form `"<type>.<dir>"`.
#[must_use]
pub fn format_segment_type(type_name: &str, direction: Direction) -> String {
    format!("{type_name}.{}", direction_suffix(direction))
}

/// Split a terminal label into its type name and direction, if it is
/// well formed.
#[must_use]
pub fn parse_segment_type(label: &str) -> Option<(&str, Direction)> {
    let (type_name, suffix) = label.rsplit_once('.')?;
    suffix_direction(suffix).map(|d| (type_name, d))
}

/// A terrain-type connection point: a bare type name (e.g. `"Beach"`)
/// plus, once resolved, the compass [Direction] it connects towards.
/// `direction` is `None` until the tiler derives one automatically
/// from the path's first/last step (see [crate::TilingPath::tile]).
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Terminal {
    type_name: String,
    direction: Option<Direction>,
}

impl Terminal {
    #[must_use]
    pub fn new(type_name: impl Into<String>, direction: Option<Direction>) -> Self {
        Self {
            type_name: type_name.into(),
            direction,
        }
    }

    #[inline]
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    #[inline]
    #[must_use]
    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    #[inline]
    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = Some(direction);
    }

    /// The fully-resolved `"<type>.<dir>"` label. `None` until a
    /// direction has been resolved.
    #[must_use]
    pub fn label(&self) -> Option<String> {
        self.direction.map(|d| format_segment_type(&self.type_name, d))
    }
}

/// An authored path fragment: a terminal-to-terminal connector with a
/// concrete shape, shared between a catalog's `TemplateSegment`s and
/// the `TerrainTemplate` that paints it.
///
/// `points` are absolute offsets within the segment's own local space
/// (not necessarily starting at the origin); consecutive points must
/// differ by an 8-neighbor unit offset (diagonal steps are permitted
/// within a segment — only the *path* itself is restricted to
/// non-diagonal steps).
///
/// `inner_types` are the bare type labels (no direction suffix) this
/// segment exposes at points other than its first/last — authored
/// alongside the segment rather than geometrically derived, since the
/// point geometry alone carries no terrain-type information in this
/// core (an Open Question decision, see `DESIGN.md`).
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSegment {
    start: String,
    end: String,
    points: Vec<CellVec>,
    inner_types: Vec<String>,
    template_id: u32,
}

impl TemplateSegment {
    /// Construct a segment, validating the point geometry.
    ///
    /// # Errors
    ///
    /// Returns [TilerError::InvalidSegment] if fewer than two points
    /// are given, if any consecutive pair repeats, or if any
    /// consecutive pair is not an 8-neighbor unit step.
    pub fn new(
        start: impl Into<String>,
        end: impl Into<String>,
        points: Vec<CellVec>,
        inner_types: Vec<String>,
        template_id: u32,
    ) -> Result<Self, TilerError> {
        if points.len() < 2 {
            return Err(TilerError::InvalidSegment {
                reason: "segment must have at least two points".into(),
            });
        }
        for pair in points.windows(2) {
            let step = pair[1] - pair[0];
            if step == CellVec::ZERO {
                return Err(TilerError::InvalidSegment {
                    reason: "duplicate consecutive points".into(),
                });
            }
            if !step.is_unit_step() {
                return Err(TilerError::InvalidSegment {
                    reason: "step between consecutive points is not an 8-neighbor unit offset"
                        .into(),
                });
            }
        }
        Ok(Self {
            start: start.into(),
            end: end.into(),
            points,
            inner_types,
            template_id,
        })
    }

    #[inline]
    #[must_use]
    pub fn start(&self) -> &str {
        &self.start
    }

    #[inline]
    #[must_use]
    pub fn end(&self) -> &str {
        &self.end
    }

    #[inline]
    #[must_use]
    pub fn points(&self) -> &[CellVec] {
        &self.points
    }

    #[inline]
    #[must_use]
    pub fn inner_types(&self) -> &[String] {
        &self.inner_types
    }

    /// The id of the [crate::TerrainTemplate] this segment paints.
    #[inline]
    #[must_use]
    pub fn template_id(&self) -> u32 {
        self.template_id
    }

    /// The net displacement from the first to the last point.
    #[inline]
    #[must_use]
    pub fn moves(&self) -> CellVec {
        *self.points.last().unwrap() - self.points[0]
    }

    #[inline]
    #[must_use]
    pub fn has_start_type(&self, label: &str) -> bool {
        self.start == label
    }

    #[inline]
    #[must_use]
    pub fn has_end_type(&self, label: &str) -> bool {
        self.end == label
    }

    #[inline]
    #[must_use]
    pub fn has_inner_type(&self, label: &str) -> bool {
        self.inner_types.iter().any(|t| t == label)
    }
}

/// Interns terminal-type labels (`"<type>.<dir>"`) into dense
/// [TypeId]s on first sight, so the search engine can index flat cost
/// matrices by integer rather than re-hashing strings per relaxation.
///
/// Grounded on the `indexmap`-backed interning idiom used by the
/// teacher's own pathfinding driver (`FxIndexMap` in
/// `pathfinding.rs`), generalized from "visited-cell index" to
/// "terminal-type index".
#[derive(Debug, Clone, Default)]
pub struct TypeInterner {
    ids: IndexMap<String, TypeId, fxhash::FxBuildHasher>,
}

impl TypeInterner {
    #[must_use]
    pub fn new() -> Self {
        Self {
            ids: IndexMap::default(),
        }
    }

    /// Returns the id for `label`, assigning a new one if this is the
    /// first time it has been seen.
    pub fn intern(&mut self, label: &str) -> TypeId {
        if let Some(&id) = self.ids.get(label) {
            return id;
        }
        let id = self.ids.len() as TypeId;
        self.ids.insert(label.to_string(), id);
        id
    }

    #[must_use]
    pub fn get(&self, label: &str) -> Option<TypeId> {
        self.ids.get(label).copied()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// A dense `TypeId -> bool` set, used for the search's `inner_type_ids`
/// membership test.
#[derive(Debug, Clone, Default)]
pub struct TypeIdSet(FxHashMap<TypeId, ()>);

impl TypeIdSet {
    #[must_use]
    pub fn new() -> Self {
        Self(FxHashMap::default())
    }

    pub fn insert(&mut self, id: TypeId) {
        self.0.insert(id, ());
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, id: TypeId) -> bool {
        self.0.contains_key(&id)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_format_and_parse_roundtrip() {
        for d in Direction::iter() {
            let label = format_segment_type("Beach", d);
            assert_eq!(parse_segment_type(&label), Some(("Beach", d)));
        }
    }

    #[test]
    fn test_known_labels() {
        assert_eq!(format_segment_type("Beach", Direction::East), "Beach.R");
        assert_eq!(format_segment_type("Beach", Direction::South), "Beach.D");
        assert_eq!(format_segment_type("Beach", Direction::West), "Beach.L");
        assert_eq!(format_segment_type("Beach", Direction::North), "Beach.U");
    }

    #[test]
    fn test_terminal_label_requires_direction() {
        let t = Terminal::new("Beach", None);
        assert_eq!(t.label(), None);
        let mut t = t;
        t.set_direction(Direction::East);
        assert_eq!(t.label().as_deref(), Some("Beach.R"));
    }

    #[test]
    fn test_segment_rejects_duplicate_points() {
        let err = TemplateSegment::new(
            "Beach.R",
            "Beach.R",
            vec![CellVec::new(0, 0), CellVec::new(0, 0)],
            vec![],
            0,
        )
        .unwrap_err();
        assert!(matches!(err, TilerError::InvalidSegment { .. }));
    }

    #[test]
    fn test_segment_rejects_non_unit_step() {
        let err = TemplateSegment::new(
            "Beach.R",
            "Beach.R",
            vec![CellVec::new(0, 0), CellVec::new(2, 0)],
            vec![],
            0,
        )
        .unwrap_err();
        assert!(matches!(err, TilerError::InvalidSegment { .. }));
    }

    #[test]
    fn test_segment_moves() {
        let seg = TemplateSegment::new(
            "Beach.R",
            "Beach.R",
            vec![
                CellVec::new(0, 0),
                CellVec::new(1, 0),
                CellVec::new(2, 0),
                CellVec::new(3, 0),
            ],
            vec![],
            0,
        )
        .unwrap();
        assert_eq!(seg.moves(), CellVec::new(3, 0));
    }

    #[test]
    fn test_type_interner_is_stable_and_dense() {
        let mut interner = TypeInterner::new();
        let a = interner.intern("Beach.R");
        let b = interner.intern("Beach.D");
        let a2 = interner.intern("Beach.R");
        assert_eq!(a, a2);
        assert_ne!(a, b);
        assert_eq!(interner.len(), 2);
    }
}
