use serde::{Deserialize, Serialize};

pub mod combat;
pub mod movement;
pub mod protocol;
pub mod stats;
pub mod town_square;

pub use movement::{direction_delta, is_tile_passable, resolve_move};
pub use town_square::TOWN_SQUARE;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TileType {
    Grass,
    Path,
    Water,
    Wall,
    Exit,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    #[serde(rename = "type")]
    pub kind: TileType,
}

impl Tile {
    pub const fn new(kind: TileType) -> Self {
        Self { kind }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// Parse a wire-format direction name. Returns None for anything other
    /// than the four cardinal values.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "north" => Some(Direction::North),
            "south" => Some(Direction::South),
            "east" => Some(Direction::East),
            "west" => Some(Direction::West),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::South => "south",
            Direction::East => "east",
            Direction::West => "west",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Player,
    Npc,
}

/// A live occupant of an area: a joined player or a seeded NPC.
/// `id` is the user id for players and the NPC definition id for NPCs.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: EntityType,
    pub x: i32,
    pub y: i32,
    pub facing: Direction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dialogue_file: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NpcDef {
    pub id: String,
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub facing: Direction,
    pub dialogue_file: String,
}

/// A static map definition. Built once, never mutated; runtime state copies
/// the tile grid out of it.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MapDef {
    pub id: String,
    pub name: String,
    pub width: i32,
    pub height: i32,
    pub spawn_x: i32,
    pub spawn_y: i32,
    /// tiles[row][col], row 0 = top
    pub tiles: Vec<Vec<Tile>>,
    #[serde(default)]
    pub npcs: Vec<NpcDef>,
}

impl MapDef {
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }
}

/// Runtime state of one area instance: a copy of the map's tile grid plus
/// the live entity list. Tiles are never mutated after load; only the entity
/// list changes.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AreaState {
    pub map_id: String,
    pub width: i32,
    pub height: i32,
    pub tiles: Vec<Vec<Tile>>,
    pub entities: Vec<Entity>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MoveBlocked {
    OutOfBounds,
    Impassable,
    // Reserved: entities never block movement in the prototype.
    EntityCollision,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MoveResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<MoveBlocked>,
    pub new_x: i32,
    pub new_y: i32,
    pub new_facing: Direction,
    pub exited_area: bool,
}
