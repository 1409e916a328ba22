use crate::CellPos;
use std::collections::VecDeque;

/// What a flood-fill visitor callback should do after examining a
/// cell: stop propagating from it, or continue to its neighbors with
/// the given remaining `range`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloodStep {
    Stop,
    Continue(i32),
}

/// A single seed cell for [flood_fill], carrying the propagation range
/// it starts with.
#[derive(Debug, Clone, Copy)]
pub struct FloodSeed {
    pub pos: CellPos,
    pub range: i32,
}

impl FloodSeed {
    #[inline]
    #[must_use]
    pub fn new(pos: CellPos, range: i32) -> Self {
        Self { pos, range }
    }
}

/// Generic 8-neighborhood BFS flood fill: starting from `seeds`, visit
/// each cell once, invoking `visit(pos, range)` to decide whether and
/// how far to keep propagating from it. A cell already visited (by an
/// earlier, necessarily equal-or-shorter, path) is never revisited,
/// matching the "pop once" discipline the tiler's search engine also
/// follows.
///
/// Used by the geometry pass both for the progress-fill BFS (seeded by
/// path points, unbounded range re-derived by the visitor from
/// deviation radius) and for minimum-separation erosion (seeded by
/// excluded/invalid cells, range decrementing each hop).
pub fn flood_fill<F>(seeds: impl IntoIterator<Item = FloodSeed>, bounds: (i32, i32), mut visit: F)
where
    F: FnMut(CellPos, i32) -> FloodStep,
{
    let (width, height) = bounds;
    let mut visited = vec![false; (width as usize) * (height as usize)];
    let mut queue: VecDeque<FloodSeed> = VecDeque::new();

    let in_bounds = |p: CellPos| p.x() >= 0 && p.y() >= 0 && p.x() < width && p.y() < height;
    let idx = |p: CellPos| (p.y() as usize) * (width as usize) + (p.x() as usize);

    for seed in seeds {
        if !in_bounds(seed.pos) {
            continue;
        }
        let i = idx(seed.pos);
        if !visited[i] {
            visited[i] = true;
            queue.push_back(seed);
        }
    }

    while let Some(FloodSeed { pos, range }) = queue.pop_front() {
        let step = visit(pos, range);
        let next_range = match step {
            FloodStep::Stop => continue,
            FloodStep::Continue(r) => r,
        };
        if next_range < 0 {
            continue;
        }
        for d in crate::Direction::iter() {
            let n = pos + d.unit();
            if !in_bounds(n) {
                continue;
            }
            let i = idx(n);
            if visited[i] {
                continue;
            }
            visited[i] = true;
            queue.push_back(FloodSeed::new(n, next_range));
        }
    }
}

#[cfg(test)]
mod test {
    use super::{flood_fill, FloodSeed, FloodStep};
    use crate::CellPos;
    use std::collections::HashSet;

    #[test]
    fn test_single_seed_spreads_outward() {
        let mut visited = HashSet::new();
        flood_fill(
            [FloodSeed::new(CellPos::new(2, 2), 2)],
            (5, 5),
            |pos, range| {
                visited.insert(pos);
                if range > 0 {
                    FloodStep::Continue(range - 1)
                } else {
                    FloodStep::Stop
                }
            },
        );
        // Within Chebyshev radius 2 of (2,2), clipped to the 5x5 grid,
        // is the entire grid.
        assert_eq!(visited.len(), 25);
    }

    #[test]
    fn test_stop_halts_propagation() {
        let mut visited = HashSet::new();
        flood_fill([FloodSeed::new(CellPos::new(0, 0), 5)], (3, 3), |pos, _| {
            visited.insert(pos);
            FloodStep::Stop
        });
        assert_eq!(visited.len(), 1);
        assert!(visited.contains(&CellPos::new(0, 0)));
    }

    #[test]
    fn test_each_cell_visited_once() {
        let mut counts: std::collections::HashMap<CellPos, u32> = std::collections::HashMap::new();
        flood_fill(
            [
                FloodSeed::new(CellPos::new(0, 0), 3),
                FloodSeed::new(CellPos::new(1, 1), 3),
            ],
            (4, 4),
            |pos, range| {
                *counts.entry(pos).or_insert(0) += 1;
                if range > 0 {
                    FloodStep::Continue(range - 1)
                } else {
                    FloodStep::Stop
                }
            },
        );
        assert!(counts.values().all(|&c| c == 1));
    }
}
