use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::rc::Rc;

use path_tiler::{
    CellBounds, CellPos, CellVec, PermittedSegments, TemplateCatalog, TemplateSegment, TerrainTemplate, TileMap,
    TilingPath,
};

struct BenchCatalog {
    templates: Vec<TerrainTemplate>,
    segments: Vec<TemplateSegment>,
}

impl TemplateCatalog for BenchCatalog {
    fn templates(&self) -> &[TerrainTemplate] {
        &self.templates
    }
    fn segments(&self) -> &[TemplateSegment] {
        &self.segments
    }
}

struct BenchMap {
    width: i32,
    height: i32,
}

impl TileMap for BenchMap {
    type NativePos = (i32, i32);

    fn cell_bounds(&self) -> CellBounds {
        CellBounds::new(CellPos::ZERO, CellPos::new(self.width, self.height))
    }

    fn to_map_pos(&self, pos: CellPos) -> Self::NativePos {
        (pos.x(), pos.y())
    }

    fn paint(&mut self, _pos: CellPos, _tile_index: u32) {}
}

/// A small catalog of straight-H, straight-V, and a bend segment,
/// enough to force the search to choose between a straight run and a
/// turn at every corner of a zigzag.
fn bench_catalog() -> Rc<BenchCatalog> {
    let straight_h = TemplateSegment::new(
        "Beach.R",
        "Beach.R",
        vec![CellVec::new(0, 0), CellVec::new(1, 0), CellVec::new(2, 0), CellVec::new(3, 0)],
        vec!["Beach".to_string()],
        0,
    )
    .unwrap();
    let straight_v = TemplateSegment::new(
        "Beach.D",
        "Beach.D",
        vec![CellVec::new(0, 0), CellVec::new(0, -1), CellVec::new(0, -2), CellVec::new(0, -3)],
        vec!["Beach".to_string()],
        1,
    )
    .unwrap();
    let bend = TemplateSegment::new(
        "Beach.R",
        "Beach.D",
        vec![CellVec::new(0, 0), CellVec::new(1, 0), CellVec::new(1, -1), CellVec::new(1, -2)],
        vec!["Beach".to_string()],
        2,
    )
    .unwrap();

    Rc::new(BenchCatalog {
        templates: vec![
            TerrainTemplate::new(0, 4, 1, vec![Some(0); 4], CellVec::ZERO),
            TerrainTemplate::new(1, 1, 4, vec![Some(1); 4], CellVec::ZERO),
            TerrainTemplate::new(2, 2, 3, vec![Some(2); 6], CellVec::ZERO),
        ],
        segments: vec![straight_h, straight_v, bend],
    })
}

/// A long zigzagging path (right, up, right, up, ...) that forces the
/// search to repeatedly choose between straight runs and bends.
fn zigzag_path(legs: i32, leg_len: i32) -> Vec<CellPos> {
    let mut points = vec![CellPos::new(0, 0)];
    let mut cur = CellPos::new(0, 0);
    for leg in 0..legs {
        let step = if leg % 2 == 0 { CellVec::new(1, 0) } else { CellVec::new(0, 1) };
        for _ in 0..leg_len {
            cur = cur + step;
            points.push(cur);
        }
    }
    points
}

fn criterion_benchmark(c: &mut Criterion) {
    let catalog = bench_catalog();
    let permitted =
        PermittedSegments::by_labels(catalog, &["Beach.R"], &["Beach"], &["Beach.R", "Beach.D"]);
    let points = zigzag_path(20, 12);
    let mut map = BenchMap { width: 512, height: 512 };
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    c.bench_function("tile_zigzag_path", |b| {
        b.iter(|| {
            let mut path = TilingPath::new(
                Some(black_box(points.clone())),
                black_box(2),
                "Beach",
                "Beach",
                permitted.clone(),
            )
            .with_max_skip(3);
            black_box(path.tile(&mut map, &mut rng))
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
