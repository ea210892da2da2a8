//! In-memory area store — the one place that holds live area state.
//!
//! All reads and writes of in-memory area state go through [`AreaStore`]; no
//! other code keeps a reference to a live [`AreaState`]. Each area instance
//! gets its own mutation gate, acquired with a bounded wait, so operations on
//! different areas never contend.
//!
//! The mutator passed to [`AreaStore::with_lock`] is a plain closure and
//! therefore cannot await: validation, persistence reads and move resolution
//! all happen before the lock, and only the precomputed change is applied
//! inside it. Persistence writes go after the call returns.

use log::warn;
use shared::{AreaState, Entity, EntityType};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::timeout;

pub type AreaId = i64;

pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_millis(5000);

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Area {0} not loaded in memory")]
    AreaNotLoaded(AreaId),
    #[error("Timed out waiting for the lock on area {0}")]
    LockTimeout(AreaId),
}

struct AreaEntry {
    /// Serializes mutators; held across the whole critical section.
    gate: Mutex<()>,
    /// Guards the state itself; only ever held for short synchronous spans,
    /// so snapshot reads never wait on a mutation in progress for long.
    state: std::sync::Mutex<AreaState>,
}

/// Owner of all live area state, keyed by area instance id.
///
/// Constructed once at process start and handed around by `Arc`; tests build
/// fresh instances so nothing leaks between them.
pub struct AreaStore {
    areas: RwLock<HashMap<AreaId, Arc<AreaEntry>>>,
    lock_timeout: Duration,
}

impl AreaStore {
    pub fn new() -> Self {
        Self::with_lock_timeout(DEFAULT_LOCK_TIMEOUT)
    }

    pub fn with_lock_timeout(lock_timeout: Duration) -> Self {
        Self {
            areas: RwLock::new(HashMap::new()),
            lock_timeout,
        }
    }

    fn entry(&self, area_id: AreaId) -> Option<Arc<AreaEntry>> {
        let areas = self.areas.read().unwrap_or_else(PoisonError::into_inner);
        areas.get(&area_id).cloned()
    }

    pub fn is_loaded(&self, area_id: AreaId) -> bool {
        self.entry(area_id).is_some()
    }

    /// Load an area into memory. No-op if already loaded. Taking the initial
    /// state by value is the copy boundary: the caller keeps no alias to it.
    pub fn load(&self, area_id: AreaId, initial: AreaState) {
        let mut areas = self.areas.write().unwrap_or_else(PoisonError::into_inner);
        areas.entry(area_id).or_insert_with(|| {
            Arc::new(AreaEntry {
                gate: Mutex::new(()),
                state: std::sync::Mutex::new(initial),
            })
        });
    }

    /// Read the current state of an area. The returned copy is detached from
    /// the live state, so callers cannot corrupt the store through it.
    pub fn read_snapshot(&self, area_id: AreaId) -> Option<AreaState> {
        let entry = self.entry(area_id)?;
        let state = entry.state.lock().unwrap_or_else(PoisonError::into_inner);
        Some(state.clone())
    }

    /// Acquire the area's mutation gate and run `mutate` against the live
    /// state. Fails with [`StoreError::LockTimeout`] if the gate cannot be
    /// acquired within the configured bound, and releases the gate
    /// unconditionally once the mutator has run — a mutator's error value
    /// propagates to the caller after release.
    pub async fn with_lock<T>(
        &self,
        area_id: AreaId,
        mutate: impl FnOnce(&mut AreaState) -> T,
    ) -> Result<T, StoreError> {
        let entry = self
            .entry(area_id)
            .ok_or(StoreError::AreaNotLoaded(area_id))?;

        let _gate = timeout(self.lock_timeout, entry.gate.lock())
            .await
            .map_err(|_| {
                warn!(
                    "Lock wait on area {} exceeded {}ms",
                    area_id,
                    self.lock_timeout.as_millis()
                );
                StoreError::LockTimeout(area_id)
            })?;

        // A panicking mutator poisons only the data lock; later callers take
        // the state as-is.
        let mut state = entry.state.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(mutate(&mut state))
    }

    /// Find a player entity in an area without taking the mutation gate.
    pub fn find_player_entity(&self, area_id: AreaId, user_id: &str) -> Option<Entity> {
        let state = self.read_snapshot(area_id)?;
        state
            .entities
            .into_iter()
            .find(|e| e.id == user_id && e.kind == EntityType::Player)
    }
}

impl Default for AreaStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{Direction, Tile, TileType};

    fn grass_area(width: i32, height: i32) -> AreaState {
        let row = vec![Tile::new(TileType::Grass); width as usize];
        AreaState {
            map_id: "test".to_string(),
            width,
            height,
            tiles: vec![row; height as usize],
            entities: Vec::new(),
        }
    }

    fn player(id: &str, x: i32, y: i32) -> Entity {
        Entity {
            id: id.to_string(),
            kind: EntityType::Player,
            x,
            y,
            facing: Direction::South,
            name: None,
            dialogue_file: None,
        }
    }

    #[test]
    fn test_load_and_is_loaded() {
        let store = AreaStore::new();
        assert!(!store.is_loaded(1));

        store.load(1, grass_area(3, 3));
        assert!(store.is_loaded(1));
        assert!(!store.is_loaded(2));
    }

    #[test]
    fn test_load_is_idempotent() {
        let store = AreaStore::new();
        let mut first = grass_area(3, 3);
        first.entities.push(player("p1", 0, 0));
        store.load(1, first);

        // A second load must not clobber the live state.
        store.load(1, grass_area(3, 3));

        let snapshot = store.read_snapshot(1).unwrap();
        assert_eq!(snapshot.entities.len(), 1);
    }

    #[test]
    fn test_snapshot_is_detached_from_live_state() {
        let store = AreaStore::new();
        store.load(1, grass_area(3, 3));

        let mut snapshot = store.read_snapshot(1).unwrap();
        snapshot.entities.push(player("intruder", 0, 0));
        snapshot.tiles[0][0] = Tile::new(TileType::Wall);

        let fresh = store.read_snapshot(1).unwrap();
        assert!(fresh.entities.is_empty());
        assert_eq!(fresh.tiles[0][0].kind, TileType::Grass);
    }

    #[test]
    fn test_read_snapshot_of_unloaded_area() {
        let store = AreaStore::new();
        assert!(store.read_snapshot(42).is_none());
    }

    #[tokio::test]
    async fn test_with_lock_applies_mutation() {
        let store = AreaStore::new();
        store.load(1, grass_area(3, 3));

        let len = store
            .with_lock(1, |state| {
                state.entities.push(player("p1", 1, 1));
                state.entities.len()
            })
            .await
            .unwrap();
        assert_eq!(len, 1);

        let snapshot = store.read_snapshot(1).unwrap();
        assert_eq!(snapshot.entities.len(), 1);
        assert_eq!(snapshot.entities[0].id, "p1");
    }

    #[tokio::test]
    async fn test_with_lock_on_unloaded_area_fails() {
        let store = AreaStore::new();
        let result = store.with_lock(7, |state| state.entities.len()).await;
        assert!(matches!(result, Err(StoreError::AreaNotLoaded(7))));
    }

    #[tokio::test]
    async fn test_mutator_error_value_propagates() {
        let store = AreaStore::new();
        store.load(1, grass_area(3, 3));

        let result: Result<Result<(), &str>, StoreError> =
            store.with_lock(1, |_state| Err("bad move")).await;
        assert_eq!(result.unwrap(), Err("bad move"));

        // The gate was released; the next mutator runs fine.
        store
            .with_lock(1, |state| state.entities.push(player("p1", 0, 0)))
            .await
            .unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_lock_timeout_when_holder_is_slow() {
        let store = Arc::new(AreaStore::with_lock_timeout(Duration::from_millis(50)));
        store.load(1, grass_area(3, 3));

        let holder = {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                store
                    .with_lock(1, |_state| {
                        // Simulate a pathologically slow critical section.
                        std::thread::sleep(Duration::from_millis(400));
                    })
                    .await
                    .unwrap();
            })
        };

        // Let the holder win the gate first.
        tokio::time::sleep(Duration::from_millis(100)).await;

        let result = store.with_lock(1, |state| state.entities.len()).await;
        assert!(matches!(result, Err(StoreError::LockTimeout(1))));

        holder.await.unwrap();

        // Once the slow holder is done the gate is free again.
        let result = store.with_lock(1, |state| state.entities.len()).await;
        assert!(result.is_ok());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_mutators_on_one_area_all_apply() {
        let store = Arc::new(AreaStore::new());
        store.load(1, grass_area(3, 3));

        let mut handles = Vec::new();
        for task in 0..4 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                for i in 0..25 {
                    let id = format!("p{}-{}", task, i);
                    store
                        .with_lock(1, move |state| state.entities.push(player(&id, 0, 0)))
                        .await
                        .unwrap();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let snapshot = store.read_snapshot(1).unwrap();
        assert_eq!(snapshot.entities.len(), 100);
    }

    #[test]
    fn test_find_player_entity_skips_npcs() {
        let store = AreaStore::new();
        let mut initial = grass_area(3, 3);
        initial.entities.push(Entity {
            id: "elder".to_string(),
            kind: EntityType::Npc,
            x: 0,
            y: 0,
            facing: Direction::West,
            name: Some("Elder Miriam".to_string()),
            dialogue_file: Some("elder".to_string()),
        });
        initial.entities.push(player("elder", 1, 1));
        store.load(1, initial);

        // Same id, different kind: only the player entity comes back.
        let found = store.find_player_entity(1, "elder").unwrap();
        assert_eq!(found.kind, EntityType::Player);
        assert_eq!((found.x, found.y), (1, 1));

        assert!(store.find_player_entity(1, "nobody").is_none());
        assert!(store.find_player_entity(9, "elder").is_none());
    }
}
