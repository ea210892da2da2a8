//! Town Square — the prototype's single fixed map.

use once_cell::sync::Lazy;

use crate::{Direction, MapDef, NpcDef, Tile, TileType};

/// The Town Square area definition id — the only area in the prototype.
pub const TOWN_SQUARE_DEF_ID: i64 = 1;
pub const TOWN_SQUARE_MAP_ID: &str = "town_square";

// Layout (col 0-19, row 0-14):
//   - Stone building (rows 2-6, cols 2-6) with interior floor and a doorway at (4,6)
//   - Path from the doorway south, then east along row 8
//   - Pond (rows 4-6, cols 13-15), impassable water
//   - Second building (rows 12-14, cols 11-14), enclosed, no entry in the prototype
//   - Exit tile at (7,14), south-center of the map
//   - Players spawn at (9,9)
//
// Glyphs: '.' grass, ':' path, '#' wall, '~' water, 'x' exit.
const LAYOUT: [&str; 15] = [
    "....................",
    "....................",
    "..#####.............",
    "..#:::#.............",
    "..#:::#......~~~....",
    "..#:::#......~~~....",
    "..##:##......~~~....",
    "....:...............",
    "....::::::..........",
    "....................",
    "....................",
    "....................",
    "...........####.....",
    "...........#::#.....",
    ".......x...####.....",
];

fn tile_for(glyph: char) -> Tile {
    let kind = match glyph {
        '.' => TileType::Grass,
        ':' => TileType::Path,
        '#' => TileType::Wall,
        '~' => TileType::Water,
        'x' => TileType::Exit,
        other => unreachable!("unknown layout glyph {other:?}"),
    };
    Tile::new(kind)
}

pub static TOWN_SQUARE: Lazy<MapDef> = Lazy::new(|| MapDef {
    id: TOWN_SQUARE_MAP_ID.to_string(),
    name: "Town Square".to_string(),
    width: 20,
    height: 15,
    spawn_x: 9,
    spawn_y: 9,
    tiles: LAYOUT
        .iter()
        .map(|row| row.chars().map(tile_for).collect())
        .collect(),
    npcs: vec![
        NpcDef {
            id: "blacksmith".to_string(),
            name: "Gareth the Blacksmith".to_string(),
            x: 3,
            y: 4,
            facing: Direction::South,
            dialogue_file: "blacksmith".to_string(),
        },
        NpcDef {
            id: "elder".to_string(),
            name: "Elder Miriam".to_string(),
            x: 6,
            y: 8,
            facing: Direction::West,
            dialogue_file: "elder".to_string(),
        },
        NpcDef {
            id: "stranger".to_string(),
            name: "Hooded Stranger".to_string(),
            x: 11,
            y: 5,
            facing: Direction::South,
            dialogue_file: "stranger".to_string(),
        },
    ],
});
