use crate::{
    search, traceback, CellBounds, CellPos, CellVec, Direction, PermittedSegments, TemplateCatalog, Terminal,
    TileMap, TileRandom, TilerError,
};
use fxhash::FxHashSet;

/// True if `points` closes on itself: its first and last points are
/// equal. The tiler never stores loop-ness as a separate flag —
/// `points[0] == points[last]` is definitional.
#[inline]
#[must_use]
pub fn is_loop(points: &[CellPos]) -> bool {
    points.len() >= 2 && points[0] == points[points.len() - 1]
}

/// The number of distinct progress indices along `points`: the ring
/// length for a loop (one less than `points.len()`, since the closing
/// point duplicates the first), or simply `points.len()` otherwise.
#[inline]
#[must_use]
pub fn progress_modulus(points: &[CellPos]) -> usize {
    if is_loop(points) {
        points.len() - 1
    } else {
        points.len()
    }
}

/// Validate a candidate path's points against the invariants:
/// non-empty, long enough (3 if a loop, else 2), no duplicate points
/// other than the loop closer, and every consecutive pair a
/// non-diagonal unit offset.
#[must_use]
pub fn validate_path_points(points: Option<&[CellPos]>) -> bool {
    let points = match points {
        Some(p) if !p.is_empty() => p,
        _ => return false,
    };

    let loops = is_loop(points);
    let min_len = if loops { 3 } else { 2 };
    if points.len() < min_len {
        return false;
    }

    let distinct = if loops { &points[..points.len() - 1] } else { points };
    let mut seen: FxHashSet<CellPos> = FxHashSet::default();
    for &p in distinct {
        if !seen.insert(p) {
            return false;
        }
    }

    points
        .windows(2)
        .all(|w| (w[1] - w[0]).is_non_diagonal_unit())
}

/// Prepend/append `ext_len` points marching in the cardinal direction
/// the path was already heading in, so a search has inertial "run-up"
/// before it must connect to the path's real endpoints. A no-op for
/// loops. The direction is computed by snapping the net displacement
/// over the first/last `min(inertial_range, len-1)` points to a
/// cardinal.
#[must_use]
pub fn inertially_extend_points(points: Vec<CellPos>, ext_len: i32, inertial_range: i32) -> Vec<CellPos> {
    if ext_len <= 0 || is_loop(&points) || points.len() < 2 {
        return points;
    }
    let n = points.len();
    let range = inertial_range.max(0) as usize;
    let range = range.min(n - 1).max(1);

    let start_dir = Direction::snap_cardinal(points[range] - points[0]);
    let end_dir = Direction::snap_cardinal(points[n - 1] - points[n - 1 - range]);

    let mut prefix = Vec::with_capacity(ext_len as usize);
    let mut cur = points[0];
    for _ in 0..ext_len {
        cur = cur - start_dir.unit();
        prefix.push(cur);
    }
    prefix.reverse();

    let mut suffix = Vec::with_capacity(ext_len as usize);
    let mut cur = points[n - 1];
    for _ in 0..ext_len {
        cur = cur + end_dir.unit();
        suffix.push(cur);
    }

    prefix.into_iter().chain(points).chain(suffix).collect()
}

fn edge_outward_normal(pos: CellPos, bounds: CellBounds) -> Option<Direction> {
    let on_left = pos.x() == bounds.min.x();
    let on_right = pos.x() == bounds.max.x() - 1;
    let on_bottom = pos.y() == bounds.min.y();
    let on_top = pos.y() == bounds.max.y() - 1;

    let corner = (on_left || on_right) && (on_bottom || on_top);
    if corner {
        return None;
    }
    if on_left {
        Some(Direction::West)
    } else if on_right {
        Some(Direction::East)
    } else if on_bottom {
        Some(Direction::South)
    } else if on_top {
        Some(Direction::North)
    } else {
        None
    }
}

/// Prepend/append `ext_len` points marching outward from an endpoint
/// that sits on a map edge (but not a corner), so the tiler has room
/// to admit a segment that runs off the map. A no-op for loops and for
/// endpoints away from an edge, or sitting on a corner.
#[must_use]
pub fn extend_edge_points(points: Vec<CellPos>, bounds: CellBounds, ext_len: i32) -> Vec<CellPos> {
    if ext_len <= 0 || is_loop(&points) || points.is_empty() {
        return points;
    }

    let mut prefix = Vec::new();
    if let Some(dir) = edge_outward_normal(points[0], bounds) {
        let mut cur = points[0];
        for _ in 0..ext_len {
            cur = cur + dir.unit();
            prefix.push(cur);
        }
        prefix.reverse();
    }

    let mut suffix = Vec::new();
    let last = *points.last().unwrap();
    if let Some(dir) = edge_outward_normal(last, bounds) {
        let mut cur = last;
        for _ in 0..ext_len {
            cur = cur + dir.unit();
            suffix.push(cur);
        }
    }

    prefix.into_iter().chain(points).chain(suffix).collect()
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Axis {
    Horizontal,
    Vertical,
}

fn edge_axis(from: CellPos, to: CellPos) -> Axis {
    if (to - from).y() == 0 {
        Axis::Horizontal
    } else {
        Axis::Vertical
    }
}

/// Rotate a loop's point sequence so that it starts and ends at the
/// midpoint of its single longest straight run, i.e. as far as
/// possible from the nearest bend in either direction.
/// A no-op for non-loops, and idempotent for loops already rotated
/// this way.
#[must_use]
pub fn optimize_loop_points(points: Vec<CellPos>) -> Vec<CellPos> {
    if !is_loop(&points) || points.len() < 4 {
        return points;
    }
    let ring_len = points.len() - 1;
    let ring = &points[..ring_len];

    let axis_of = |i: usize| edge_axis(ring[i], ring[(i + 1) % ring_len]);

    let mut bends = Vec::new();
    for i in 0..ring_len {
        let prev = (i + ring_len - 1) % ring_len;
        if axis_of(prev) != axis_of(i) {
            bends.push(i);
        }
    }
    if bends.len() < 2 {
        return points;
    }

    let mut best_start = bends[0];
    let mut best_len = 0usize;
    for w in 0..bends.len() {
        let a = bends[w];
        let b = bends[(w + 1) % bends.len()];
        let run = if b > a { b - a } else { ring_len - a + b };
        if run > best_len {
            best_len = run;
            best_start = (a + run / 2) % ring_len;
        }
    }

    let mut rotated: Vec<CellPos> = ring[best_start..].iter().chain(ring[..best_start].iter()).copied().collect();
    rotated.push(rotated[0]);
    rotated
}

/// Trim `shrink_by` points from each end of a non-loop path (loops are
/// only length-checked, never trimmed), returning `None` if doing so
/// would leave fewer than `min_len` points.
///
/// # Errors
///
/// Returns [TilerError::InvalidArgument] if `min_len <= 1`.
pub fn shrink_path_points(
    points: Vec<CellPos>,
    shrink_by: i32,
    min_len: i32,
) -> Result<Option<Vec<CellPos>>, TilerError> {
    if min_len <= 1 {
        return Err(TilerError::InvalidArgument {
            reason: "minimum_length must be greater than 1".into(),
        });
    }
    if is_loop(&points) {
        return Ok(if (points.len() as i32) < min_len {
            None
        } else {
            Some(points)
        });
    }

    let shrink_by = shrink_by.max(0);
    let new_len = points.len() as i32 - 2 * shrink_by;
    if new_len < min_len {
        return Ok(None);
    }
    let shrink_by = shrink_by as usize;
    Ok(Some(points[shrink_by..points.len() - shrink_by].to_vec()))
}

#[inline]
fn cross2(a: CellVec, b: CellVec) -> i64 {
    a.x() as i64 * b.y() as i64 - a.y() as i64 * b.x() as i64
}

#[inline]
fn dist_sq_from(p: CellPos, center: CellPos) -> i64 {
    let v = p - center;
    v.x() as i64 * v.x() as i64 + v.y() as i64 * v.y() as i64
}

#[inline]
fn angle_from(p: CellPos, center: CellPos) -> f64 {
    let v = p - center;
    (v.y() as f64).atan2(v.x() as f64)
}

fn top_left_most_index(ring: &[CellPos]) -> usize {
    let mut best = 0;
    for i in 1..ring.len() {
        let p = ring[i];
        let b = ring[best];
        if p.y() < b.y() || (p.y() == b.y() && p.x() < b.x()) {
            best = i;
        }
    }
    best
}

/// Ensure a path winds in a single, consistent rotational sense: for
/// loops, clockwise/counterclockwise is judged at the top-left-most
/// point; for non-loops, by the cross product of the start/end vectors
/// measured from `measure_from_center`. Idempotent: reversing the
/// input before normalizing yields the same output.
#[must_use]
pub fn chirally_normalize_points(points: Vec<CellPos>, measure_from_center: CellPos) -> Vec<CellPos> {
    if points.len() < 2 {
        return points;
    }

    if is_loop(&points) {
        let ring_len = points.len() - 1;
        let ring = &points[..ring_len];
        let i = top_left_most_index(ring);
        let prev = ring[(i + ring_len - 1) % ring_len];
        let cur = ring[i];
        let next = ring[(i + 1) % ring_len];
        let cross = cross2(cur - prev, next - cur);
        if cross < 0 {
            return reversed(points);
        }
        return points;
    }

    let start = points[0];
    let end = *points.last().unwrap();
    let cross = cross2(start - measure_from_center, end - measure_from_center);

    if cross < 0 {
        return reversed(points);
    }
    if cross > 0 {
        return points;
    }

    let d_start = dist_sq_from(start, measure_from_center);
    let d_end = dist_sq_from(end, measure_from_center);
    if d_start > d_end {
        return reversed(points);
    }
    if d_start < d_end {
        return points;
    }

    let a_start = angle_from(start, measure_from_center);
    let a_end = angle_from(end, measure_from_center);
    if a_start > a_end {
        reversed(points)
    } else {
        points
    }
}

fn reversed(mut points: Vec<CellPos>) -> Vec<CellPos> {
    points.reverse();
    points
}

/// Retain, in order, each path from `paths` that shares no cell with
/// any previously-retained path. Non-`None` inputs only.
#[must_use]
pub fn retain_disjoint_paths(paths: impl IntoIterator<Item = Vec<CellPos>>) -> Vec<Vec<CellPos>> {
    let mut used: FxHashSet<CellPos> = FxHashSet::default();
    let mut retained = Vec::new();
    for path in paths {
        if path.iter().any(|p| used.contains(p)) {
            continue;
        }
        used.extend(path.iter().copied());
        retained.push(path);
    }
    retained
}

/// The central entity of the tiler: a path to cover, the
/// constraints it must be covered within, and the catalog of segments
/// it may be covered with.
///
/// `TilingPath` is not parameterized by a map type: the map is
/// borrowed explicitly by the methods that use one ([TilingPath::extend_edge],
/// [TilingPath::tile]) rather than stored, so one map can host many
/// sequentially-tiled paths (see `DESIGN.md`'s Open Question notes).
///
/// Never `Serialize`/`Deserialize`, even under the `serialize`
/// feature: per the core's own design, a tiler holds no persisted
/// state, and `segments` carries an `Rc<C>` to a caller-owned catalog
/// that a serialized form would have nowhere to reconstruct. The
/// individual data types it is built from (`CellPos`, `Terminal`,
/// `TemplateSegment`, `TerrainTemplate`, ...) are serializable on
/// their own for callers that do need to persist a catalog or a path's
/// raw points.
pub struct TilingPath<C: TemplateCatalog> {
    pub(crate) points: Option<Vec<CellPos>>,
    pub(crate) max_deviation: u32,
    pub(crate) max_skip: u32,
    pub(crate) min_separation: u32,
    pub(crate) start: Terminal,
    pub(crate) end: Terminal,
    pub(crate) segments: PermittedSegments<C>,
}

// Hand-written for the same reason as `PermittedSegments`'s own impl:
// `#[derive(Clone)]` would add a spurious `C: Clone` bound.
impl<C: TemplateCatalog> Clone for TilingPath<C> {
    fn clone(&self) -> Self {
        Self {
            points: self.points.clone(),
            max_deviation: self.max_deviation,
            max_skip: self.max_skip,
            min_separation: self.min_separation,
            start: self.start.clone(),
            end: self.end.clone(),
            segments: self.segments.clone(),
        }
    }
}

impl<C: TemplateCatalog> TilingPath<C> {
    #[must_use]
    pub fn new(
        points: Option<Vec<CellPos>>,
        max_deviation: u32,
        start_type: impl Into<String>,
        end_type: impl Into<String>,
        segments: PermittedSegments<C>,
    ) -> Self {
        Self {
            points,
            max_deviation,
            max_skip: 0,
            min_separation: 0,
            start: Terminal::new(start_type, None),
            end: Terminal::new(end_type, None),
            segments,
        }
    }

    #[inline]
    #[must_use]
    pub fn points(&self) -> Option<&[CellPos]> {
        self.points.as_deref()
    }

    #[inline]
    #[must_use]
    pub fn max_deviation(&self) -> u32 {
        self.max_deviation
    }

    #[inline]
    #[must_use]
    pub fn max_skip(&self) -> u32 {
        self.max_skip
    }

    #[inline]
    #[must_use]
    pub fn min_separation(&self) -> u32 {
        self.min_separation
    }

    #[inline]
    #[must_use]
    pub fn start(&self) -> &Terminal {
        &self.start
    }

    #[inline]
    #[must_use]
    pub fn end(&self) -> &Terminal {
        &self.end
    }

    #[inline]
    #[must_use]
    pub fn segments(&self) -> &PermittedSegments<C> {
        &self.segments
    }

    #[must_use]
    pub fn with_max_skip(mut self, max_skip: u32) -> Self {
        self.max_skip = max_skip;
        self
    }

    #[must_use]
    pub fn with_min_separation(mut self, min_separation: u32) -> Self {
        self.min_separation = min_separation;
        self
    }

    #[must_use]
    pub fn with_start_direction(mut self, direction: Direction) -> Self {
        self.start.set_direction(direction);
        self
    }

    #[must_use]
    pub fn with_end_direction(mut self, direction: Direction) -> Self {
        self.end.set_direction(direction);
        self
    }

    pub fn inertially_extend(&mut self, ext_len: i32, inertial_range: i32) -> &mut Self {
        if let Some(points) = self.points.take() {
            self.points = Some(inertially_extend_points(points, ext_len, inertial_range));
        }
        self
    }

    pub fn extend_edge(&mut self, map: &impl TileMap, ext_len: i32) -> &mut Self {
        if let Some(points) = self.points.take() {
            self.points = Some(extend_edge_points(points, map.cell_bounds(), ext_len));
        }
        self
    }

    pub fn optimize_loop(&mut self) -> &mut Self {
        if let Some(points) = self.points.take() {
            self.points = Some(optimize_loop_points(points));
        }
        self
    }

    /// # Errors
    ///
    /// Returns [TilerError::InvalidArgument] if `min_len <= 1`.
    pub fn shrink(&mut self, shrink_by: i32, min_len: i32) -> Result<&mut Self, TilerError> {
        if let Some(points) = self.points.take() {
            self.points = shrink_path_points(points, shrink_by, min_len)?;
        }
        Ok(self)
    }

    pub fn chirally_normalize(&mut self, measure_from_center: CellPos) -> &mut Self {
        if let Some(points) = self.points.take() {
            self.points = Some(chirally_normalize_points(points, measure_from_center));
        }
        self
    }

    /// Null out `points` unless it currently satisfies
    /// [validate_path_points].
    pub fn retain_if_valid(&mut self) -> &mut Self {
        if !validate_path_points(self.points.as_deref()) {
            self.points = None;
        }
        self
    }

    /// Cover `points` with a chain of cost-optimal permitted segments
    /// and paint the result onto `map`.
    ///
    /// Returns `None` if `points` is `None` (no path to cover), or if
    /// no admissible chain of segments connects `path_start` to
    /// `path_end` within the configured deviation/skip/separation
    /// bounds. On success, returns the full sequence of grid points
    /// actually traversed (including any inertial/edge extension
    /// points), and `map` has been painted as a side effect.
    pub fn tile(&mut self, map: &mut impl TileMap, random: &mut impl TileRandom) -> Option<Vec<CellPos>> {
        let points = self.points.clone()?;

        let loops = is_loop(&points);
        if self.start.direction().is_none() {
            let dir = Direction::from_cvec(points[1] - points[0])
                .expect("path's first step must be a non-diagonal unit offset");
            self.start.set_direction(dir);
        }
        if self.end.direction().is_none() {
            let n = points.len();
            let dir = if loops {
                Direction::from_cvec(points[1] - points[0])
            } else {
                Direction::from_cvec(points[n - 1] - points[n - 2])
            }
            .expect("path's last step must be a non-diagonal unit offset");
            self.end.set_direction(dir);
        }

        let max_skip = if self.max_skip > 0 {
            self.max_skip
        } else {
            2 * self.max_deviation + 1
        };

        let outcome = search::run_search(
            &points,
            self.max_deviation,
            max_skip,
            self.min_separation,
            &self.start,
            &self.end,
            &self.segments,
        )?;

        Some(traceback::run_traceback(outcome, map, random))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn pts(coords: &[(i32, i32)]) -> Vec<CellPos> {
        coords.iter().map(|&(x, y)| CellPos::new(x, y)).collect()
    }

    #[test]
    fn test_validate_rejects_none_and_empty() {
        assert!(!validate_path_points(None));
        assert!(!validate_path_points(Some(&[])));
    }

    #[test]
    fn test_validate_rejects_short_non_loop() {
        assert!(!validate_path_points(Some(&pts(&[(0, 0)]))));
        assert!(validate_path_points(Some(&pts(&[(0, 0), (1, 0)]))));
    }

    #[test]
    fn test_validate_rejects_diagonal_step() {
        assert!(!validate_path_points(Some(&pts(&[(0, 0), (1, 1)]))));
    }

    #[test]
    fn test_validate_rejects_duplicate_points() {
        assert!(!validate_path_points(Some(&pts(&[(0, 0), (1, 0), (1, 0), (2, 0)]))));
    }

    #[test]
    fn test_validate_accepts_loop() {
        assert!(validate_path_points(Some(&pts(&[
            (0, 0),
            (1, 0),
            (1, 1),
            (0, 1),
            (0, 0)
        ]))));
    }

    #[test]
    fn test_validate_rejects_short_loop() {
        // closes immediately; too short even though first==last
        assert!(!validate_path_points(Some(&pts(&[(0, 0), (0, 0)]))));
    }

    #[test]
    fn test_inertially_extend_is_identity_on_loop() {
        let loop_pts = pts(&[(0, 0), (1, 0), (1, 1), (0, 1), (0, 0)]);
        let extended = inertially_extend_points(loop_pts.clone(), 3, 2);
        assert_eq!(extended, loop_pts);
    }

    #[test]
    fn test_inertially_extend_straight_line() {
        let line = pts(&[(0, 0), (1, 0), (2, 0)]);
        let extended = inertially_extend_points(line, 2, 2);
        assert_eq!(
            extended,
            pts(&[(-2, 0), (-1, 0), (0, 0), (1, 0), (2, 0), (3, 0), (4, 0)])
        );
    }

    #[test]
    fn test_shrink_points() {
        let p = pts(&[(0, 0), (1, 0), (2, 0), (3, 0)]);
        assert_eq!(
            shrink_path_points(p.clone(), 1, 2).unwrap(),
            Some(pts(&[(1, 0), (2, 0)]))
        );
        assert_eq!(shrink_path_points(p, 2, 2).unwrap(), None);
    }

    #[test]
    fn test_shrink_rejects_bad_min_len() {
        let p = pts(&[(0, 0), (1, 0)]);
        assert!(matches!(
            shrink_path_points(p, 0, 1),
            Err(TilerError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_shrink_loop_only_length_checks() {
        let loop_pts = pts(&[(0, 0), (1, 0), (1, 1), (0, 1), (0, 0)]);
        let result = shrink_path_points(loop_pts.clone(), 1, 2).unwrap();
        assert_eq!(result, Some(loop_pts));
    }

    #[test]
    fn test_optimize_loop_identity_on_non_loop() {
        let p = pts(&[(0, 0), (1, 0), (2, 0)]);
        assert_eq!(optimize_loop_points(p.clone()), p);
    }

    #[test]
    fn test_optimize_loop_idempotent() {
        let loop_pts = pts(&[
            (0, 0),
            (1, 0),
            (2, 0),
            (3, 0),
            (3, 1),
            (3, 2),
            (2, 2),
            (1, 2),
            (0, 2),
            (0, 1),
            (0, 0),
        ]);
        let once = optimize_loop_points(loop_pts);
        let twice = optimize_loop_points(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_chirally_normalize_idempotent() {
        let p = pts(&[(0, 0), (1, 0), (2, 1)]);
        let once = chirally_normalize_points(p, CellPos::new(1, 0));
        let twice = chirally_normalize_points(once.clone(), CellPos::new(1, 0));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_chirally_normalize_reverse_then_normalize_matches() {
        let p = pts(&[(0, 0), (1, 0), (2, 1)]);
        let center = CellPos::new(1, 0);
        let normalized = chirally_normalize_points(p.clone(), center);
        let mut reversed_input = p;
        reversed_input.reverse();
        let normalized_from_reversed = chirally_normalize_points(reversed_input, center);
        assert_eq!(normalized, normalized_from_reversed);
    }

    #[test]
    fn test_retain_disjoint_paths_preserves_order_and_drops_overlap() {
        let a = pts(&[(0, 0), (1, 0)]);
        let b = pts(&[(1, 0), (1, 1)]); // overlaps a at (1,0)
        let c = pts(&[(5, 5), (6, 5)]);
        let retained = retain_disjoint_paths([a.clone(), b, c.clone()]);
        assert_eq!(retained, vec![a, c]);
    }

    #[test]
    fn test_retain_disjoint_paths_idempotent() {
        let a = pts(&[(0, 0), (1, 0)]);
        let c = pts(&[(5, 5), (6, 5)]);
        let once = retain_disjoint_paths([a.clone(), c.clone()]);
        let twice = retain_disjoint_paths(once.clone());
        assert_eq!(once, twice);
    }
}
