//! A minimal worked example: tile a short straight path onto a tiny
//! map using a one-segment catalog, and print what got painted.

use path_tiler::{
    CellBounds, CellPos, CellVec, PermittedSegments, TemplateCatalog, TemplateSegment, TerrainTemplate, TileMap,
    TilingPath,
};

struct DemoCatalog {
    templates: Vec<TerrainTemplate>,
    segments: Vec<TemplateSegment>,
}

impl TemplateCatalog for DemoCatalog {
    fn templates(&self) -> &[TerrainTemplate] {
        &self.templates
    }
    fn segments(&self) -> &[TemplateSegment] {
        &self.segments
    }
}

/// A tiny 8x1 tile grid map. Each cell holds an `Option<u32>` tile
/// index, `None` meaning "never painted".
struct DemoMap {
    width: i32,
    height: i32,
    tiles: Vec<Option<u32>>,
}

impl DemoMap {
    fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            tiles: vec![None; (width as usize) * (height as usize)],
        }
    }
}

impl TileMap for DemoMap {
    type NativePos = (i32, i32);

    fn cell_bounds(&self) -> CellBounds {
        CellBounds::new(CellPos::ZERO, CellPos::new(self.width, self.height))
    }

    fn to_map_pos(&self, pos: CellPos) -> Self::NativePos {
        (pos.x(), pos.y())
    }

    fn paint(&mut self, pos: CellPos, tile_index: u32) {
        let i = (pos.y() as usize) * (self.width as usize) + (pos.x() as usize);
        self.tiles[i] = Some(tile_index);
    }
}

fn main() {
    // A single straight-horizontal connector, four cells long,
    // "Beach" on both ends.
    let straight_h = TemplateSegment::new(
        "Beach.R",
        "Beach.R",
        vec![
            CellVec::new(0, 0),
            CellVec::new(1, 0),
            CellVec::new(2, 0),
            CellVec::new(3, 0),
        ],
        vec!["Beach".to_string()],
        0,
    )
    .unwrap();

    let catalog = std::rc::Rc::new(DemoCatalog {
        templates: vec![TerrainTemplate::new(0, 4, 1, vec![Some(7); 4], CellVec::ZERO)],
        segments: vec![straight_h],
    });

    let permitted = PermittedSegments::by_labels(catalog, &["Beach.R"], &["Beach"], &["Beach.R"]);

    let points = vec![
        CellPos::new(1, 1),
        CellPos::new(2, 1),
        CellPos::new(3, 1),
        CellPos::new(4, 1),
    ];

    let mut path = TilingPath::new(Some(points), 0, "Beach", "Beach", permitted);
    let mut map = DemoMap::new(8, 3);
    let mut rng = rand::thread_rng();

    match path.tile(&mut map, &mut rng) {
        Some(traversed) => {
            println!("tiled {} points", traversed.len());
            for p in &traversed {
                println!("  ({}, {})", p.x(), p.y());
            }
            println!("painted tiles:");
            for y in (0..map.height).rev() {
                let row: String = (0..map.width)
                    .map(|x| match map.tiles[(y as usize) * (map.width as usize) + (x as usize)] {
                        Some(t) => std::char::from_digit(t, 10).unwrap_or('#'),
                        None => '.',
                    })
                    .collect();
                println!("  {row}");
            }
        }
        None => println!("no tiling found"),
    }
}
