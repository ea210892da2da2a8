//! Area manager — bridges persisted area instance records and the in-memory
//! store. This is the only place that turns a map definition into live state.

use log::info;
use once_cell::sync::Lazy;
use shared::town_square::TOWN_SQUARE;
use shared::{AreaState, Entity, EntityType, MapDef};
use std::collections::HashMap;
use std::sync::Arc;

use crate::persist::{AreaDefId, PersistError, Persistence};
use crate::store::{AreaId, AreaStore};

pub use shared::town_square::{TOWN_SQUARE_DEF_ID, TOWN_SQUARE_MAP_ID};

static MAP_REGISTRY: Lazy<HashMap<&'static str, &'static MapDef>> = Lazy::new(|| {
    let mut maps: HashMap<&'static str, &'static MapDef> = HashMap::new();
    maps.insert(TOWN_SQUARE_MAP_ID, &*TOWN_SQUARE);
    maps
});

#[derive(Debug, thiserror::Error)]
pub enum ManagerError {
    #[error("Unknown map: {0}")]
    UnknownMap(String),
    #[error("Failed to create area instance for area_def {0}")]
    InstanceCreateFailed(AreaDefId),
    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// Get the map definition for a given map id.
pub fn map_def(map_id: &str) -> Result<&'static MapDef, ManagerError> {
    MAP_REGISTRY
        .get(map_id)
        .copied()
        .ok_or_else(|| ManagerError::UnknownMap(map_id.to_string()))
}

/// Build the initial runtime state for a freshly loaded area: a copy of the
/// map's tile grid plus its NPCs. Player entities are added as players join.
pub fn initial_area_state(map: &MapDef) -> AreaState {
    let entities = map
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

    AreaState {
        map_id: map.id.clone(),
        width: map.width,
        height: map.height,
        tiles: map.tiles.clone(),
        entities,
    }
}

pub struct AreaManager {
    store: Arc<AreaStore>,
    persist: Arc<dyn Persistence>,
}

impl AreaManager {
    pub fn new(store: Arc<AreaStore>, persist: Arc<dyn Persistence>) -> Self {
        Self { store, persist }
    }

    /// Get or create the single persistent area instance for `area_def_id`
    /// and make sure it is loaded into the store. Returns the area id.
    /// Idempotent: repeated and concurrent calls converge on one instance.
    pub async fn ensure_area(
        &self,
        area_def_id: AreaDefId,
        map_id: &str,
    ) -> Result<AreaId, ManagerError> {
        let instance = match self.persist.get_area_instance(area_def_id).await? {
            Some(instance) => instance,
            None => {
                self.persist.create_area_instance(area_def_id).await?;
                // Re-fetch instead of trusting the fresh insert id: a racing
                // creator may have won, and the lowest recorded id is canonical.
                self.persist
                    .get_area_instance(area_def_id)
                    .await?
                    .ok_or(ManagerError::InstanceCreateFailed(area_def_id))?
            }
        };

        let area_id = instance.area_id;

        // Load into memory if not already there (e.g. after a server restart).
        if !self.store.is_loaded(area_id) {
            let map = map_def(map_id)?;
            self.store.load(area_id, initial_area_state(map));
            info!("Loaded area {} from map {}", area_id, map_id);
        }

        Ok(area_id)
    }
}
