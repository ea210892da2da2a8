//! Persistence collaborator. The prototype ships an in-memory backing store;
//! the trait is the seam a real database implementation would fill.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::store::AreaId;

pub type AreaDefId = i64;

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("persistence backend error: {0}")]
    Backend(String),
}

/// One persisted area instance, tying an area definition to a live area id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaInstance {
    pub area_id: AreaId,
    pub area_def_id: AreaDefId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerRecord {
    pub user_id: String,
    pub points: i64,
    pub level: i32,
    pub last_area_id: Option<AreaId>,
    pub last_x: Option<i32>,
    pub last_y: Option<i32>,
}

impl PlayerRecord {
    fn new(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            points: 0,
            level: 1,
            last_area_id: None,
            last_x: None,
            last_y: None,
        }
    }
}

#[async_trait]
pub trait Persistence: Send + Sync {
    /// The single persistent instance for a definition, or None if none has
    /// been created yet. When racing inserts leave more than one record, the
    /// lowest area id wins so every caller converges on the same instance.
    async fn get_area_instance(
        &self,
        area_def_id: AreaDefId,
    ) -> Result<Option<AreaInstance>, PersistError>;

    async fn create_area_instance(&self, area_def_id: AreaDefId) -> Result<AreaId, PersistError>;

    /// Best-effort position snapshot after a successful move. Updating an
    /// unknown player is a no-op, matching an UPDATE that affects zero rows.
    async fn update_player_position(
        &self,
        user_id: &str,
        area_id: AreaId,
        x: i32,
        y: i32,
    ) -> Result<(), PersistError>;

    async fn create_player(&self, user_id: &str) -> Result<(), PersistError>;

    async fn get_player(&self, user_id: &str) -> Result<Option<PlayerRecord>, PersistError>;

    async fn update_player_progress(
        &self,
        user_id: &str,
        points: i64,
        level: i32,
    ) -> Result<(), PersistError>;
}

#[derive(Default)]
struct MemoryTables {
    areas: Vec<AreaInstance>,
    next_area_id: AreaId,
    players: HashMap<String, PlayerRecord>,
}

/// In-memory implementation used by the prototype binary and the tests.
#[derive(Default)]
pub struct MemoryPersistence {
    tables: RwLock<MemoryTables>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Persistence for MemoryPersistence {
    async fn get_area_instance(
        &self,
        area_def_id: AreaDefId,
    ) -> Result<Option<AreaInstance>, PersistError> {
        let tables = self.tables.read().await;
        Ok(tables
            .areas
            .iter()
            .filter(|instance| instance.area_def_id == area_def_id)
            .min_by_key(|instance| instance.area_id)
            .cloned())
    }

    async fn create_area_instance(&self, area_def_id: AreaDefId) -> Result<AreaId, PersistError> {
        let mut tables = self.tables.write().await;
        tables.next_area_id += 1;
        let area_id = tables.next_area_id;
        tables.areas.push(AreaInstance {
            area_id,
            area_def_id,
        });
        Ok(area_id)
    }

    async fn update_player_position(
        &self,
        user_id: &str,
        area_id: AreaId,
        x: i32,
        y: i32,
    ) -> Result<(), PersistError> {
        let mut tables = self.tables.write().await;
        if let Some(record) = tables.players.get_mut(user_id) {
            record.last_area_id = Some(area_id);
            record.last_x = Some(x);
            record.last_y = Some(y);
        }
        Ok(())
    }

    async fn create_player(&self, user_id: &str) -> Result<(), PersistError> {
        let mut tables = self.tables.write().await;
        tables
            .players
            .entry(user_id.to_string())
            .or_insert_with(|| PlayerRecord::new(user_id));
        Ok(())
    }

    async fn get_player(&self, user_id: &str) -> Result<Option<PlayerRecord>, PersistError> {
        let tables = self.tables.read().await;
        Ok(tables.players.get(user_id).cloned())
    }

    async fn update_player_progress(
        &self,
        user_id: &str,
        points: i64,
        level: i32,
    ) -> Result<(), PersistError> {
        let mut tables = self.tables.write().await;
        if let Some(record) = tables.players.get_mut(user_id) {
            record.points = points;
            record.level = level;
        }
        Ok(())
    }
}
