//! Text rendering of an area: one character per tile, entities overlaid.

use shared::{AreaState, EntityType, TileType};

fn tile_glyph(kind: TileType) -> char {
    match kind {
        TileType::Grass => '.',
        TileType::Path => ':',
        TileType::Water => '~',
        TileType::Wall => '#',
        TileType::Exit => 'x',
    }
}

fn entity_glyph(kind: EntityType) -> char {
    match kind {
        EntityType::Player => '@',
        EntityType::Npc => 'N',
    }
}

/// Render the area as one string, row 0 at the top. Entities draw over the
/// tile they stand on; players win over NPCs because they are listed later.
pub fn render_area(state: &AreaState) -> String {
    let mut rows: Vec<Vec<char>> = state
        .tiles
        .iter()
        .map(|row| row.iter().map(|tile| tile_glyph(tile.kind)).collect())
        .collect();

    for entity in &state.entities {
        if entity.x < 0 || entity.y < 0 {
            continue;
        }
        if let Some(cell) = rows
            .get_mut(entity.y as usize)
            .and_then(|row| row.get_mut(entity.x as usize))
        {
            *cell = entity_glyph(entity.kind);
        }
    }

    rows.into_iter()
        .map(|row| row.into_iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}
