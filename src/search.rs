use std::rc::Rc;

use crate::geometry::{self, GeometryFields, INVALID_PROGRESS, OVER_DEVIATION};
use crate::matrix::Matrix;
use crate::priority_array::{PriorityArray, MAX_COST};
use crate::segment::{format_segment_type, TypeId, TypeIdSet, TypeInterner};
use crate::tiling_path::{is_loop, progress_modulus};
use crate::{CellPos, CellVec, Direction, PermittedSegments, TemplateCatalog, Terminal};

/// A search-internal view of a catalog [crate::TemplateSegment]: its
/// points re-based so the first is `(0, 0)`, interned start/end type
/// ids, and the index of the original segment in the catalog (kept so
/// the traceback step can recover the real [crate::TemplateSegment]/
/// [crate::TerrainTemplate] for painting without re-interning).
#[derive(Debug, Clone)]
pub struct TilingSegment {
    segment_index: usize,
    relative_points: Vec<CellVec>,
    moves: CellVec,
    start_type_id: TypeId,
    end_type_id: TypeId,
    /// Direction of each step between consecutive relative points.
    step_directions: Vec<Direction>,
}

impl TilingSegment {
    fn new(segment_index: usize, points: &[CellVec], start_type_id: TypeId, end_type_id: TypeId) -> Self {
        let origin = points[0];
        let relative_points: Vec<CellVec> = points.iter().map(|&p| p - origin).collect();
        let moves = *relative_points.last().unwrap();
        let step_directions = relative_points
            .windows(2)
            .map(|w| Direction::from_cvec(w[1] - w[0]).expect("segment step must be an 8-neighbor unit offset"))
            .collect();
        Self {
            segment_index,
            relative_points,
            moves,
            start_type_id,
            end_type_id,
            step_directions,
        }
    }

    #[inline]
    #[must_use]
    pub fn segment_index(&self) -> usize {
        self.segment_index
    }

    #[inline]
    #[must_use]
    pub fn relative_points(&self) -> &[CellVec] {
        &self.relative_points
    }

    #[inline]
    #[must_use]
    pub fn moves(&self) -> CellVec {
        self.moves
    }

    #[inline]
    #[must_use]
    pub fn start_type_id(&self) -> TypeId {
        self.start_type_id
    }

    #[inline]
    #[must_use]
    pub fn end_type_id(&self) -> TypeId {
        self.end_type_id
    }

    #[inline]
    #[must_use]
    pub fn step_directions(&self) -> &[Direction] {
        &self.step_directions
    }
}

/// All state owned by a single [crate::TilingPath::tile] invocation:
/// the cost lattice, the priority-array frontier, and the
/// geometry/segment tables the search reads. Never stored on
/// `TilingPath` itself — built fresh and dropped at the end of `tile`.
pub struct SearchScratch<C: TemplateCatalog> {
    catalog: Rc<C>,
    width: i32,
    height: i32,
    cell_count: usize,
    geometry: GeometryFields,
    costs: Vec<Matrix<u32>>,
    priority: PriorityArray,
    segments_by_start: Vec<Vec<TilingSegment>>,
    segments_by_end: Vec<Vec<TilingSegment>>,
    inner_type_ids: TypeIdSet,
    max_skip: u32,
    is_loop: bool,
    progress_modulus: usize,
    path_start: CellPos,
    path_end: CellPos,
    path_start_type_id: TypeId,
    path_end_type_id: TypeId,
}

impl<C: TemplateCatalog> SearchScratch<C> {
    #[inline]
    fn flat_index(&self, type_id: TypeId, pos: CellPos) -> usize {
        type_id as usize * self.cell_count + self.geometry.deviation.flat_index(pos.x(), pos.y())
    }

    #[inline]
    fn decode(&self, flat: usize) -> (TypeId, CellPos) {
        let type_id = (flat / self.cell_count) as TypeId;
        let rem = flat % self.cell_count;
        let x = (rem as i32) % self.width;
        let y = (rem as i32) / self.width;
        (type_id, CellPos::new(x, y))
    }

    #[inline]
    fn in_bounds(&self, pos: CellPos) -> bool {
        pos.x() >= 0 && pos.y() >= 0 && pos.x() < self.width && pos.y() < self.height
    }

    /// True if `pos` is out of the padded search rectangle or has been
    /// excluded from the search by minimum-separation erosion.
    #[inline]
    pub(crate) fn excluded(&self, pos: CellPos) -> bool {
        !self.in_bounds(pos) || self.geometry.deviation.get_pos(pos) == OVER_DEVIATION
    }

    /// The catalog this search's templates are painted from.
    #[inline]
    #[must_use]
    pub fn catalog(&self) -> &C {
        &self.catalog
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
    pub fn cost(&self, type_id: TypeId, pos: CellPos) -> u32 {
        self.costs[type_id as usize].get_pos(pos)
    }

    fn set_cost(&mut self, type_id: TypeId, pos: CellPos, value: u32) {
        self.costs[type_id as usize].set_pos(pos, value);
        let idx = self.flat_index(type_id, pos);
        self.priority.set(idx, value);
    }

    /// Force-set a cost without touching the priority array — used
    /// only at the start of traceback to re-enable `path_start` as a
    /// valid backward-walk terminus.
    pub(crate) fn force_cost(&mut self, type_id: TypeId, pos: CellPos, value: u32) {
        self.costs[type_id as usize].set_pos(pos, value);
    }

    /// `score_segment`: the additive cost of laying `segment`
    /// starting at `from`, or [MAX_COST] if inadmissible.
    fn score_segment(&self, segment: &TilingSegment, from: CellPos) -> u32 {
        let to = from + segment.moves();

        // 1. Terminal-type gating.
        if from == self.path_start {
            if segment.start_type_id() != self.path_start_type_id {
                return MAX_COST;
            }
        } else if !self.inner_type_ids.contains(segment.start_type_id()) {
            return MAX_COST;
        }
        if to == self.path_end {
            if segment.end_type_id() != self.path_end_type_id {
                return MAX_COST;
            }
        } else if !self.inner_type_ids.contains(segment.end_type_id()) {
            return MAX_COST;
        }

        // 2. Loop anti-wrap (preserved literally, see DESIGN.md).
        if self.is_loop && to != self.path_end {
            let low_from = self.geometry.low_progress.get_pos(from);
            let high_to = self.geometry.high_progress.get_pos(to);
            if low_from > high_to && high_to != 0 {
                return MAX_COST;
            }
        }

        // 3. Per-point validation.
        let points = segment.relative_points();
        let mut deviation_acc: u32 = 0;
        let mut low_acc: i64 = 0;
        let mut high_acc: i64 = 0;

        for (i, &rel) in points.iter().enumerate() {
            let p = from + rel;
            if !self.in_bounds(p) || self.geometry.deviation.get_pos(p) == OVER_DEVIATION {
                return MAX_COST;
            }

            if i > 0 {
                deviation_acc += geometry::deviation_cost(self.geometry.deviation.get_pos(p));
            }

            if i + 1 < points.len() {
                let next = from + points[i + 1];
                if !self.in_bounds(next) || self.geometry.deviation.get_pos(next) == OVER_DEVIATION {
                    return MAX_COST;
                }
                let low_p = self.geometry.low_progress.get_pos(p);
                let low_n = self.geometry.low_progress.get_pos(next);
                let high_p = self.geometry.high_progress.get_pos(p);
                let high_n = self.geometry.high_progress.get_pos(next);
                if low_p == INVALID_PROGRESS
                    || low_n == INVALID_PROGRESS
                    || high_p == INVALID_PROGRESS
                    || high_n == INVALID_PROGRESS
                {
                    return MAX_COST;
                }
                let low_step = geometry::progress(low_p, low_n, self.progress_modulus, self.is_loop);
                let high_step = geometry::progress(high_p, high_n, self.progress_modulus, self.is_loop);
                if low_step.unsigned_abs() > self.max_skip || high_step.unsigned_abs() > self.max_skip {
                    return MAX_COST;
                }
                low_acc += low_step as i64;
                high_acc += high_step as i64;
            }
        }

        // 4. Monotonic progression.
        if low_acc < 0 || high_acc < 0 {
            return MAX_COST;
        }

        // 5. Result.
        deviation_acc
    }

    /// Relax every touchable segment starting at `from` under
    /// `from_type`, then remove `(from, from_type)` from the frontier.
    ///
    /// Scores every candidate by index against shared borrows first,
    /// staging the resulting `(type, pos, cost)` triples, then applies
    /// the cost-table/priority-array mutations in a second pass. This
    /// avoids cloning `segments_by_start[from_type]` (each
    /// `TilingSegment` owns its own point/direction vectors) on every
    /// single relaxation.
    fn update_from(&mut self, from: CellPos, from_type: TypeId, from_cost: u32) {
        let count = self.segments_by_start[from_type as usize].len();
        let mut updates: Vec<(TypeId, CellPos, u32)> = Vec::with_capacity(count);
        for i in 0..count {
            let segment = &self.segments_by_start[from_type as usize][i];
            let to = from + segment.moves();
            if !self.in_bounds(to) || self.geometry.deviation.get_pos(to) == OVER_DEVIATION {
                continue;
            }
            let seg_cost = self.score_segment(segment, from);
            if seg_cost == MAX_COST {
                continue;
            }
            let to_cost = from_cost.saturating_add(seg_cost);
            updates.push((segment.end_type_id(), to, to_cost));
        }
        for (to_type, to, to_cost) in updates {
            if to_cost < self.cost(to_type, to) {
                self.set_cost(to_type, to, to_cost);
            }
        }
        let idx = self.flat_index(from_type, from);
        self.priority.set(idx, MAX_COST);
    }

    /// All segments in `segments_by_end[to_type]` — candidate
    /// predecessors for traceback.
    pub(crate) fn segments_ending_with(&self, to_type: TypeId) -> &[TilingSegment] {
        &self.segments_by_end[to_type as usize]
    }

    #[inline]
    pub(crate) fn path_start(&self) -> CellPos {
        self.path_start
    }

    #[inline]
    pub(crate) fn path_end(&self) -> CellPos {
        self.path_end
    }

    #[inline]
    pub(crate) fn path_start_type_id(&self) -> TypeId {
        self.path_start_type_id
    }

    #[inline]
    pub(crate) fn path_end_type_id(&self) -> TypeId {
        self.path_end_type_id
    }

    pub(crate) fn score(&self, segment: &TilingSegment, from: CellPos) -> u32 {
        self.score_segment(segment, from)
    }
}

/// The outcome of running the forward Dijkstra search (steps
/// 4–9): the scratch state needed by traceback, plus the bookkeeping
/// needed to translate results back into the caller's coordinate
/// space.
pub struct SearchOutcome<C: TemplateCatalog> {
    pub scratch: SearchScratch<C>,
    pub min_corner: CellPos,
    pub best_cost: u32,
}

/// Compute the padded search rectangle and the translation that maps
/// the path's own coordinates into it, local-originated at `(0, 0)`.
fn padded_bounds(points: &[CellPos], margin: i32) -> (CellPos, i32, i32) {
    let mut min = points[0];
    let mut max = points[0];
    for &p in points {
        min = min.min(p);
        max = max.max(p);
    }
    let min_corner = CellPos::new(min.x() - margin, min.y() - margin);
    let width = (max.x() - min.x()) + 2 * margin + 1;
    let height = (max.y() - min.y()) + 2 * margin + 1;
    (min_corner, width, height)
}

/// Run the forward search (steps 4–9). Returns `None` if no
/// admissible tiling reaches `path_end` (the "no fit" case — the
/// caller's `points` must already be known `Some` and non-empty).
pub(crate) fn run_search<C: TemplateCatalog>(
    points: &[CellPos],
    max_deviation: u32,
    max_skip: u32,
    min_separation: u32,
    start: &Terminal,
    end: &Terminal,
    permitted: &PermittedSegments<C>,
) -> Option<SearchOutcome<C>> {
    let is_loop_path = is_loop(points);
    let progress_mod = progress_modulus(points);
    let margin = (max_deviation + min_separation) as i32;
    let (min_corner, width, height) = padded_bounds(points, margin);

    let translate = |p: CellPos| CellPos::new(p.x() - min_corner.x(), p.y() - min_corner.y());
    let local_points: Vec<CellPos> = points.iter().map(|&p| translate(p)).collect();

    let mut fields = geometry::build_progress_fill(&local_points, width, height, max_deviation, min_separation);
    geometry::erode_min_separation(&mut fields, &local_points, width, height, max_deviation, max_skip, min_separation);

    let catalog = permitted.catalog_rc();
    let mut interner = TypeInterner::new();

    let path_start_label = format_segment_type(start.type_name(), start.direction().expect("start direction must be resolved before searching"));
    let path_end_label = format_segment_type(end.type_name(), end.direction().expect("end direction must be resolved before searching"));
    let path_start_type_id = interner.intern(&path_start_label);
    let path_end_type_id = interner.intern(&path_end_label);

    let mut inner_type_ids = TypeIdSet::new();
    for segment in permitted.inner() {
        inner_type_ids.insert(interner.intern(segment.start()));
        inner_type_ids.insert(interner.intern(segment.end()));
    }

    let touchable = permitted.all();
    let mut built: Vec<TilingSegment> = Vec::with_capacity(touchable.len());
    for segment in &touchable {
        let start_type_id = interner.intern(segment.start());
        let end_type_id = interner.intern(segment.end());
        let segment_index = catalog
            .segments()
            .iter()
            .position(|s| std::ptr::eq(s, *segment))
            .expect("permitted segment must originate from its own catalog");
        built.push(TilingSegment::new(segment_index, segment.points(), start_type_id, end_type_id));
    }

    let type_count = interner.len();
    let cell_count = (width as usize) * (height as usize);
    let costs: Vec<Matrix<u32>> = (0..type_count).map(|_| Matrix::new(width, height, MAX_COST)).collect();
    let priority = PriorityArray::new(type_count * cell_count);

    let mut segments_by_start: Vec<Vec<TilingSegment>> = (0..type_count).map(|_| Vec::new()).collect();
    let mut segments_by_end: Vec<Vec<TilingSegment>> = (0..type_count).map(|_| Vec::new()).collect();
    for seg in built {
        segments_by_start[seg.start_type_id() as usize].push(seg.clone());
        segments_by_end[seg.end_type_id() as usize].push(seg);
    }

    let path_start = local_points[0];
    let path_end = *local_points.last().unwrap();

    let mut scratch = SearchScratch {
        catalog,
        width,
        height,
        cell_count,
        geometry: fields,
        costs,
        priority,
        segments_by_start,
        segments_by_end,
        inner_type_ids,
        max_skip,
        is_loop: is_loop_path,
        progress_modulus: progress_mod,
        path_start,
        path_end,
        path_start_type_id,
        path_end_type_id,
    };

    // Seed.
    scratch.update_from(path_start, path_start_type_id, 0);

    // Main loop.
    loop {
        let idx = match scratch.priority.get_min_index() {
            Some(i) => i,
            None => break,
        };
        let priority_val = scratch.priority.get(idx);
        if priority_val == MAX_COST {
            break;
        }
        let (type_id, pos) = scratch.decode(idx);
        if type_id == path_end_type_id && pos == path_end {
            break;
        }
        scratch.update_from(pos, type_id, priority_val);
    }

    let best_cost = scratch.cost(path_end_type_id, path_end);
    if best_cost == MAX_COST {
        return None;
    }

    Some(SearchOutcome {
        scratch,
        min_corner,
        best_cost,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{CellVec as CV, TemplateSegment, TerrainTemplate};

    struct TestCatalog {
        templates: Vec<TerrainTemplate>,
        segments: Vec<TemplateSegment>,
    }

    impl TemplateCatalog for TestCatalog {
        fn templates(&self) -> &[TerrainTemplate] {
            &self.templates
        }
        fn segments(&self) -> &[TemplateSegment] {
            &self.segments
        }
    }

    fn straight_h() -> TemplateSegment {
        TemplateSegment::new(
            "Beach.R",
            "Beach.R",
            vec![CV::new(0, 0), CV::new(1, 0)],
            vec!["Beach".to_string()],
            0,
        )
        .unwrap()
    }

    fn catalog_with_straight() -> Rc<TestCatalog> {
        Rc::new(TestCatalog {
            templates: vec![TerrainTemplate::new(0, 2, 1, vec![Some(0), Some(0)], CV::ZERO)],
            segments: vec![straight_h()],
        })
    }

    #[test]
    fn test_run_search_finds_straight_line() {
        let catalog = catalog_with_straight();
        let permitted = PermittedSegments::by_labels(catalog, &["Beach.R"], &["Beach"], &["Beach.R"]);
        let points = vec![CellPos::new(0, 0), CellPos::new(1, 0), CellPos::new(2, 0)];
        let start = Terminal::new("Beach", Some(Direction::East));
        let end = Terminal::new("Beach", Some(Direction::East));
        // max_skip=1, matching what TilingPath::tile derives from
        // max_deviation=0 (2*0+1); a literal max_skip=0 would reject
        // every real unit-progress step.
        let outcome = run_search(&points, 0, 1, 0, &start, &end, &permitted);
        assert!(outcome.is_some());
        assert_eq!(outcome.unwrap().best_cost, 0);
    }

    #[test]
    fn test_run_search_fails_with_no_matching_segment() {
        let catalog = catalog_with_straight();
        let permitted = PermittedSegments::by_labels(catalog, &["Rock.R"], &["Rock"], &["Rock.R"]);
        let points = vec![CellPos::new(0, 0), CellPos::new(1, 0), CellPos::new(2, 0)];
        let start = Terminal::new("Rock", Some(Direction::East));
        let end = Terminal::new("Rock", Some(Direction::East));
        let outcome = run_search(&points, 0, 0, 0, &start, &end, &permitted);
        assert!(outcome.is_none());
    }
}
