//! Tile-grid movement resolution, shared by the authoritative server and the
//! client's single-player mode. Everything here is pure: the same inputs give
//! the same result on both sides, and nothing is mutated.

use crate::{AreaState, Direction, Entity, MoveBlocked, MoveResult, Tile, TileType};

pub fn is_tile_passable(tile: &Tile) -> bool {
    matches!(tile.kind, TileType::Grass | TileType::Path | TileType::Exit)
}

pub fn direction_delta(direction: Direction) -> (i32, i32) {
    match direction {
        Direction::North => (0, -1),
        Direction::South => (0, 1),
        Direction::East => (1, 0),
        Direction::West => (-1, 0),
    }
}

/// Resolve a one-tile move against the current area state.
/// Facing always updates to the requested direction, even when blocked.
/// Returns the result without mutating anything; the caller applies it.
pub fn resolve_move(state: &AreaState, entity: &Entity, direction: Direction) -> MoveResult {
    let (dx, dy) = direction_delta(direction);
    let new_x = entity.x + dx;
    let new_y = entity.y + dy;

    if new_x < 0 || new_x >= state.width || new_y < 0 || new_y >= state.height {
        return MoveResult {
            success: false,
            reason: Some(MoveBlocked::OutOfBounds),
            new_x: entity.x,
            new_y: entity.y,
            new_facing: direction,
            exited_area: false,
        };
    }

    let tile = &state.tiles[new_y as usize][new_x as usize];
    if !is_tile_passable(tile) {
        return MoveResult {
            success: false,
            reason: Some(MoveBlocked::Impassable),
            new_x: entity.x,
            new_y: entity.y,
            new_facing: direction,
            exited_area: false,
        };
    }

    MoveResult {
        success: true,
        reason: None,
        new_x,
        new_y,
        new_facing: direction,
        exited_area: tile.kind == TileType::Exit,
    }
}
