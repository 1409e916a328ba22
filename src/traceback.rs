use crate::priority_array::MAX_COST;
use crate::search::SearchOutcome;
use crate::{CellPos, CellVec, TemplateCatalog, TileMap, TileRandom};

/// Walk backward from `path_end` along cost-optimal predecessors,
/// painting each chosen template and collecting the traversed points.
/// `outcome` is consumed: its scratch state is scoped to this single
/// call and dropped on return.
pub(crate) fn run_traceback<C: TemplateCatalog>(
    outcome: SearchOutcome<C>,
    map: &mut impl TileMap,
    random: &mut impl TileRandom,
) -> Vec<CellPos> {
    let SearchOutcome {
        mut scratch,
        min_corner,
        best_cost,
    } = outcome;

    let path_start = scratch.path_start();
    let path_start_type_id = scratch.path_start_type_id();
    let path_end = scratch.path_end();
    let path_end_type_id = scratch.path_end_type_id();

    // Re-enable path_start as a valid backward-walk terminus: the
    // forward search deliberately left its cost unset so a loop's
    // shared start/end cell did not short-circuit relaxation.
    scratch.force_cost(path_start_type_id, path_start, 0);

    let to_world = |local: CellPos| CellPos::new(local.x() + min_corner.x(), local.y() + min_corner.y());

    let mut result = vec![to_world(path_end)];

    let mut to = path_end;
    let mut to_type = path_end_type_id;
    let mut to_cost = best_cost;

    while !(to == path_start && to_type == path_start_type_id) {
        let mut candidates = Vec::new();
        for segment in scratch.segments_ending_with(to_type) {
            let from = to - segment.moves();
            if scratch.excluded(from) {
                continue;
            }
            let s = scratch.score(segment, from);
            if s == MAX_COST || s > to_cost {
                continue;
            }
            if scratch.cost(segment.start_type_id(), from) == to_cost - s {
                candidates.push((segment.clone(), from));
            }
        }

        assert!(
            !candidates.is_empty(),
            "traceback found no cost-optimal predecessor: malformed catalog or broken search invariant"
        );

        let choice = random.next_index(candidates.len());
        let (segment, from) = candidates.into_iter().nth(choice).unwrap();

        let catalog_segment = &scratch.catalog().segments()[segment.segment_index()];
        let template = scratch.catalog().template_for(catalog_segment);
        assert!(
            !template.is_pick_any(),
            "a pick-any template must never reach the painter directly"
        );

        let from_world = to_world(from);
        let top_left = CellPos::new(
            from_world.x() - template.offset().x(),
            from_world.y() - template.offset().y(),
        );
        for ty in 0..template.height() {
            for tx in 0..template.width() {
                if let Some(tile) = template.tile_at(tx, ty) {
                    let pos = top_left + CellVec::new(tx, ty);
                    if map.contains(pos) {
                        map.paint(pos, tile);
                    }
                }
            }
        }

        let points = segment.relative_points();
        for rel in points[..points.len() - 1].iter().rev() {
            result.push(to_world(from + *rel));
        }

        to_cost = scratch.cost(segment.start_type_id(), from);
        to_type = segment.start_type_id();
        to = from;
    }

    result.reverse();
    result
}
