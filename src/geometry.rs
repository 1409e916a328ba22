use crate::flood_fill::{flood_fill, FloodSeed, FloodStep};
use crate::matrix::Matrix;
use crate::priority_array::MAX_COST;
use crate::tiling_path::{is_loop, progress_modulus};
use crate::{CellPos, Direction};

/// Sentinel marking a cell's `low_progress`/`high_progress` as never
/// resolved by the progress-fill pass (outside `scan_range` of any
/// path point, or part of a fully-dispersed loop cluster). Distinct
/// from [OPPOSITE] and from any real progress index.
pub const INVALID_PROGRESS: i32 = i32::MIN + 1;

/// The `progress(from, to)` tie-break sentinel for loops: the gap
/// between `from` and `to` is exactly half the ring, so forward and
/// backward distance are equal and neither is intrinsically "the"
/// signed progress. For an even `progress_modulus` this case lands on
/// an exact integer (`forward_limit == backward_limit`), so
/// [progress] returns `forward_limit` there instead; for an odd
/// modulus no integer sits exactly opposite, so this branch is
/// unreachable in practice. `OPPOSITE` is therefore a defensive
/// sentinel that is never actually returned, not a live return value.
pub const OPPOSITE: i32 = i32::MIN;

/// Sentinel marking a cell's `deviation` as either unreached by the
/// progress-fill pass, or explicitly excluded from the search by
/// minimum-separation erosion. Shares a single value for both cases,
/// matching the exclusion test used throughout scoring and relaxation
/// (`deviation == OVER_DEVIATION`): either way, the cell must not be
/// considered.
pub const OVER_DEVIATION: i32 = i32::MAX;

/// The three per-cell fields the search reads over the padded
/// bounding box: `deviation` (Chebyshev-ish BFS radius from the
/// nearest path point, or [OVER_DEVIATION] if excluded),
/// `low_progress`/`high_progress` (earliest/latest nearby path-point
/// index, or [INVALID_PROGRESS]).
#[derive(Debug, Clone)]
pub struct GeometryFields {
    pub deviation: Matrix<i32>,
    pub low_progress: Matrix<i32>,
    pub high_progress: Matrix<i32>,
}

/// Signed progress from path-index `from` to path-index `to`.
///
/// Non-loop: plain difference. Loop: the shorter of the forward and
/// backward arcs around the ring (`modulus = progress_modulus`), with
/// a sign indicating direction; when `from`/`to` are exactly opposite
/// on the ring, the two arcs tie. For even `modulus` this tie lands on
/// an exact integer half (`forward_limit == backward_limit`) and
/// `forward_limit` is returned by convention; for odd `modulus` no
/// integer sits exactly opposite, so this branch is unreachable and
/// [OPPOSITE] is returned only as a defensive sentinel.
#[must_use]
pub fn progress(from: i32, to: i32, modulus: usize, is_loop: bool) -> i32 {
    if !is_loop || modulus == 0 {
        return to - from;
    }
    let m = modulus as i32;
    let p = ((to - from) % m + m) % m;
    let forward_limit = (m + 1) / 2;
    let backward_limit = m / 2;
    if p < forward_limit {
        p
    } else if p > backward_limit {
        p - m
    } else if forward_limit == backward_limit {
        forward_limit
    } else {
        OPPOSITE
    }
}

fn find_low_and_high(
    neighbor_lows: &[i32],
    neighbor_highs: &[i32],
    modulus: usize,
    loops: bool,
) -> (i32, i32) {
    let count = neighbor_lows.len();
    if count == 0 {
        return (INVALID_PROGRESS, INVALID_PROGRESS);
    }
    if count == 1 {
        return (neighbor_lows[0], neighbor_highs[0]);
    }
    if !loops {
        let lo = *neighbor_lows.iter().min().unwrap();
        let hi = *neighbor_highs.iter().max().unwrap();
        return (lo, hi);
    }

    let mut values: Vec<i32> = neighbor_lows.iter().chain(neighbor_highs.iter()).copied().collect();
    values.sort_unstable();
    values.dedup();
    if values.len() == 1 {
        return (values[0], values[0]);
    }

    let n = values.len();
    for i in 0..n {
        let a = values[i];
        let b = values[(i + 1) % n];
        if progress(a, b, modulus, true) < 0 {
            // the ring-order gap between `a` and its successor `b` runs
            // backward: `a` is the cluster's latest point, `b` its
            // earliest.
            return (b, a);
        }
    }
    (INVALID_PROGRESS, INVALID_PROGRESS)
}

/// Run the progress-fill BFS over a `width x height` rectangle
/// already translated so the padded bounding box's minimum corner is
/// `(0, 0)`. `points` must be expressed in that same local space.
#[must_use]
pub fn build_progress_fill(points: &[CellPos], width: i32, height: i32, max_deviation: u32, min_separation: u32) -> GeometryFields {
    let scan_range = (max_deviation + min_separation) as i32;
    let modulus = progress_modulus(points);
    let loops = is_loop(points);

    let mut deviation = Matrix::new(width, height, OVER_DEVIATION);
    let mut low_progress = Matrix::new(width, height, INVALID_PROGRESS);
    let mut high_progress = Matrix::new(width, height, INVALID_PROGRESS);

    let mut seeds = Vec::with_capacity(modulus);
    for i in 0..modulus {
        let p = points[i];
        deviation.set_pos(p, 0);
        low_progress.set_pos(p, i as i32);
        high_progress.set_pos(p, i as i32);
        seeds.push(FloodSeed::new(p, scan_range));
    }

    flood_fill(seeds, (width, height), |pos, range| {
        let depth = scan_range - range;
        if depth > 0 {
            let mut lows = Vec::new();
            let mut highs = Vec::new();
            for dir in Direction::iter() {
                let n = pos + dir.unit();
                if n.x() < 0 || n.y() < 0 || n.x() >= width || n.y() >= height {
                    continue;
                }
                // Only settled neighbors (strictly shallower) may
                // contribute: same-depth neighbors can still be queued
                // ahead of `pos` in this BFS pass and must not leak
                // their own not-yet-final progress into it.
                if deviation.get_pos(n) >= depth {
                    continue;
                }
                let l = low_progress.get_pos(n);
                let h = high_progress.get_pos(n);
                if l != INVALID_PROGRESS && h != INVALID_PROGRESS {
                    lows.push(l);
                    highs.push(h);
                }
            }
            let (lo, hi) = find_low_and_high(&lows, &highs, modulus, loops);
            deviation.set_pos(pos, depth);
            low_progress.set_pos(pos, lo);
            high_progress.set_pos(pos, hi);
        }
        if range > 0 {
            FloodStep::Continue(range - 1)
        } else {
            FloodStep::Stop
        }
    });

    GeometryFields {
        deviation,
        low_progress,
        high_progress,
    }
}

/// Apply minimum-separation erosion in place: cells too close
/// to an invalid-progress region, a large progress skip between
/// neighbors, or an over-deep deviation are spread outward by
/// `min_separation` cells and marked [OVER_DEVIATION], removing them
/// from the search. A no-op when `min_separation == 0`.
pub fn erode_min_separation(
    fields: &mut GeometryFields,
    points: &[CellPos],
    width: i32,
    height: i32,
    max_deviation: u32,
    max_skip: u32,
    min_separation: u32,
) {
    if min_separation == 0 {
        return;
    }
    let modulus = progress_modulus(points);
    let loops = is_loop(points);
    let mut seeds = Vec::new();

    for y in 0..height {
        for x in 0..width {
            let pos = CellPos::new(x, y);
            let low = fields.low_progress.get_pos(pos);
            let high = fields.high_progress.get_pos(pos);

            if low == INVALID_PROGRESS || high == INVALID_PROGRESS {
                seeds.push(FloodSeed::new(pos, min_separation as i32));
                continue;
            }

            let mut skip_exceeded = false;
            for dir in Direction::iter() {
                let n = pos + dir.unit();
                if n.x() < 0 || n.y() < 0 || n.x() >= width || n.y() >= height {
                    continue;
                }
                let nl = fields.low_progress.get_pos(n);
                let nh = fields.high_progress.get_pos(n);
                if nl == INVALID_PROGRESS || nh == INVALID_PROGRESS {
                    continue;
                }
                let dl = progress(low, nl, modulus, loops);
                let dh = progress(high, nh, modulus, loops);
                if dl.unsigned_abs() > max_skip || dh.unsigned_abs() > max_skip {
                    skip_exceeded = true;
                    break;
                }
            }
            if skip_exceeded {
                seeds.push(FloodSeed::new(pos, min_separation as i32 - 1));
                continue;
            }

            let dev = fields.deviation.get_pos(pos);
            if dev != OVER_DEVIATION && dev as u32 > max_deviation {
                seeds.push(FloodSeed::new(pos, 0));
            }
        }
    }

    let deviation = &mut fields.deviation;
    flood_fill(seeds, (width, height), |pos, range| {
        let dev = deviation.get_pos(pos);
        if dev != 0 && dev != OVER_DEVIATION {
            deviation.set_pos(pos, OVER_DEVIATION);
        }
        if range > 0 {
            FloodStep::Continue(range - 1)
        } else {
            FloodStep::Stop
        }
    });
}

/// `deviation` expressed as a `u32` additive cost, or [MAX_COST] if
/// the cell is excluded.
#[inline]
#[must_use]
pub fn deviation_cost(deviation: i32) -> u32 {
    if deviation == OVER_DEVIATION {
        MAX_COST
    } else {
        deviation as u32
    }
}
