//! Client-side single-player mode. Runs the exact same movement resolution
//! as the backend, against a locally built copy of the map, so the two modes
//! cannot diverge.

use shared::{resolve_move, AreaState, Direction, Entity, EntityType, MapDef, MoveResult};

pub struct LocalGame {
    state: AreaState,
    player: Entity,
}

impl LocalGame {
    /// Build a local area from the map definition: NPCs seeded, the player
    /// standing at spawn facing south.
    pub fn new(map: &MapDef, player_id: &str) -> Self {
        let mut entities: Vec<Entity> = map
            .npcs
            .iter()
            .map(|npc| Entity {
                id: npc.id.clone(),
                kind: EntityType::Npc,
                x: npc.x,
                y: npc.y,
                facing: npc.facing,
                name: Some(npc.name.clone()),
                dialogue_file: Some(npc.dialogue_file.clone()),
            })
            .collect();

        let player = Entity {
            id: player_id.to_string(),
            kind: EntityType::Player,
            x: map.spawn_x,
            y: map.spawn_y,
            facing: Direction::South,
            name: None,
            dialogue_file: None,
        };
        entities.push(player.clone());

        Self {
            state: AreaState {
                map_id: map.id.clone(),
                width: map.width,
                height: map.height,
                tiles: map.tiles.clone(),
                entities,
            },
            player,
        }
    }

    pub fn state(&self) -> &AreaState {
        &self.state
    }

    pub fn player(&self) -> &Entity {
        &self.player
    }

    /// Resolve and apply one move. On failure the position holds but the
    /// facing still turns, same as the backend.
    pub fn step(&mut self, direction: Direction) -> MoveResult {
        let result = resolve_move(&self.state, &self.player, direction);

        self.player.x = result.new_x;
        self.player.y = result.new_y;
        self.player.facing = result.new_facing;

        if let Some(entity) = self
            .state
            .entities
            .iter_mut()
            .find(|e| e.id == self.player.id && e.kind == EntityType::Player)
        {
            entity.x = result.new_x;
            entity.y = result.new_y;
            entity.facing = result.new_facing;
        }

        result
    }
}
