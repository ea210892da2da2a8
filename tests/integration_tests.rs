//! Integration tests for the town square backend and frontend.
//!
//! These tests exercise the full HTTP surface against a real listener,
//! driven through the client's API wrapper, plus cross-crate game logic.

use std::sync::Arc;

use tokio_test::assert_ok;

use client::api::{ApiClient, ApiClientError};
use server::api::{routes, AppContext};
use server::manager::AreaManager;
use server::persist::{MemoryPersistence, Persistence};
use server::session::SessionStore;
use server::store::AreaStore;
use shared::protocol::SESSION_TOKEN_HEADER;
use shared::town_square::{TOWN_SQUARE, TOWN_SQUARE_DEF_ID};
use shared::{Direction, EntityType, MoveBlocked, TileType};

/// Spin up a full server on an ephemeral port and return its base URL.
async fn spawn_server() -> String {
    let store = Arc::new(AreaStore::new());
    let persist: Arc<dyn Persistence> = Arc::new(MemoryPersistence::new());
    let context = Arc::new(AppContext {
        store: Arc::clone(&store),
        manager: AreaManager::new(Arc::clone(&store), Arc::clone(&persist)),
        sessions: SessionStore::new(),
        persist,
    });

    let app = routes().with_state(context);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("listener addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server runs");
    });

    format!("http://{}", addr)
}

async fn connected_client() -> ApiClient {
    let base_url = spawn_server().await;
    let mut api = ApiClient::new(&base_url);
    tokio_test::assert_ok!(api.start_session().await);
    api
}

/// HTTP SURFACE TESTS
mod http_tests {
    use super::*;

    #[tokio::test]
    async fn session_bootstrap_returns_anonymous_identity() {
        let base_url = spawn_server().await;
        let mut api = ApiClient::new(&base_url);

        let session = api.start_session().await.unwrap();
        assert!(!session.token.is_empty());
        assert!(!session.user_id.is_empty());
        assert!(!session.is_registered);
        assert_eq!(api.token(), Some(session.token.as_str()));
    }

    #[tokio::test]
    async fn map_endpoint_serves_town_square_without_entities() {
        let api = connected_client().await;

        let map = api.map().await.unwrap();
        assert_eq!(map.id, "town_square");
        assert_eq!((map.width, map.height), (20, 15));
        assert_eq!((map.spawn_x, map.spawn_y), (9, 9));
        assert_eq!(map.tiles[14][7].kind, TileType::Exit);
        assert_eq!(map.npcs.len(), 3);
    }

    #[tokio::test]
    async fn join_places_player_at_spawn_among_npcs() {
        let api = connected_client().await;

        let joined = api.join().await.unwrap();
        let player = joined.player.unwrap();
        assert_eq!((player.x, player.y), (9, 9));
        assert_eq!(player.facing, Direction::South);

        let npcs = joined
            .state
            .entities
            .iter()
            .filter(|e| e.kind == EntityType::Npc)
            .count();
        assert_eq!(npcs, 3);
        assert_eq!(joined.state.entities.len(), 4);
    }

    #[tokio::test]
    async fn join_is_idempotent_per_identity() {
        let api = connected_client().await;

        let first = api.join().await.unwrap();
        let second = api.join().await.unwrap();

        assert_eq!(first.area_id, second.area_id);
        let players = second
            .state
            .entities
            .iter()
            .filter(|e| e.kind == EntityType::Player)
            .count();
        assert_eq!(players, 1);
    }

    #[tokio::test]
    async fn two_sessions_share_one_area() {
        let base_url = spawn_server().await;

        let mut alice = ApiClient::new(&base_url);
        alice.start_session().await.unwrap();
        let mut bob = ApiClient::new(&base_url);
        bob.start_session().await.unwrap();

        let first = alice.join().await.unwrap();
        let second = bob.join().await.unwrap();

        assert_eq!(first.area_id, second.area_id);
        let players = second
            .state
            .entities
            .iter()
            .filter(|e| e.kind == EntityType::Player)
            .count();
        assert_eq!(players, 2);
    }

    #[tokio::test]
    async fn move_updates_position_and_state() {
        let api = connected_client().await;
        api.join().await.unwrap();

        let response = api.send_move(Direction::North).await.unwrap();
        assert!(response.move_result.success);
        assert_eq!(
            (response.move_result.new_x, response.move_result.new_y),
            (9, 8)
        );

        let player = response.player.unwrap();
        assert_eq!((player.x, player.y), (9, 8));
        assert_eq!(player.facing, Direction::North);

        let state = api.state().await.unwrap();
        let player = state.player.unwrap();
        assert_eq!((player.x, player.y), (9, 8));
    }

    #[tokio::test]
    async fn walk_north_stops_at_the_boundary() {
        let api = connected_client().await;
        api.join().await.unwrap();

        // Nine moves climb from (9,9) to (9,0).
        for step in 1..=9 {
            let response = api.send_move(Direction::North).await.unwrap();
            assert!(response.move_result.success, "step {} blocked", step);
            assert_eq!(response.move_result.new_y, 9 - step);
        }

        // The tenth runs out of map.
        let response = api.send_move(Direction::North).await.unwrap();
        assert!(!response.move_result.success);
        assert_eq!(response.move_result.reason, Some(MoveBlocked::OutOfBounds));
        assert_eq!(
            (response.move_result.new_x, response.move_result.new_y),
            (9, 0)
        );
        assert_eq!(response.move_result.new_facing, Direction::North);
    }

    #[tokio::test]
    async fn blocked_move_turns_the_player_in_place() {
        let api = connected_client().await;
        api.join().await.unwrap();

        // (9,9) west x5 to (4,9), then north up the path to the doorway at
        // (4,6); the tile west of the doorway is the building wall.
        for _ in 0..5 {
            assert!(api.send_move(Direction::West).await.unwrap().move_result.success);
        }
        for _ in 0..3 {
            assert!(api.send_move(Direction::North).await.unwrap().move_result.success);
        }

        let blocked = api.send_move(Direction::West).await.unwrap();
        assert!(!blocked.move_result.success);
        assert_eq!(blocked.move_result.reason, Some(MoveBlocked::Impassable));

        let player = blocked.player.unwrap();
        assert_eq!((player.x, player.y), (4, 6));
        assert_eq!(player.facing, Direction::West);
    }

    #[tokio::test]
    async fn exit_tile_removes_player_and_clears_area() {
        let api = connected_client().await;
        api.join().await.unwrap();

        // Spawn (9,9) -> (9,14), then west twice onto the exit at (7,14).
        for _ in 0..5 {
            assert!(api.send_move(Direction::South).await.unwrap().move_result.success);
        }
        api.send_move(Direction::West).await.unwrap();
        let last = api.send_move(Direction::West).await.unwrap();

        assert!(last.move_result.success);
        assert!(last.move_result.exited_area);
        assert!(last.player.is_none());
        assert!(last
            .state
            .entities
            .iter()
            .all(|e| e.kind == EntityType::Npc));

        // The session no longer has a current area.
        let err = api.state().await.unwrap_err();
        match err {
            ApiClientError::Server { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Not in an area");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn exit_endpoint_persists_reported_position() {
        let api = connected_client().await;
        api.join().await.unwrap();

        let response = api.exit(5, 5, TOWN_SQUARE_DEF_ID).await.unwrap();
        assert!(response.success);

        // Out-of-bounds coordinates are rejected.
        let err = api.exit(99, 5, TOWN_SQUARE_DEF_ID).await.unwrap_err();
        match err {
            ApiClientError::Server { status, .. } => assert_eq!(status, 400),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn exit_endpoint_skips_unknown_definitions_quietly() {
        let api = connected_client().await;

        // No instance exists for definition 42; the call still succeeds.
        let response = api.exit(1, 1, 42).await.unwrap();
        assert!(response.success);
    }
}

/// ERROR STATUS TESTS (raw requests, off the typed wrapper)
mod error_status_tests {
    use super::*;

    #[tokio::test]
    async fn join_without_session_is_unauthorized() {
        let base_url = spawn_server().await;
        let http = reqwest::Client::new();

        let response = http
            .post(format!("{}/api/area/join", base_url))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 401);

        let response = http
            .post(format!("{}/api/area/join", base_url))
            .header(SESSION_TOKEN_HEADER, "forged-token")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 401);
    }

    #[tokio::test]
    async fn move_outside_an_area_is_a_client_error() {
        let api = connected_client().await;

        // Session exists but join never happened.
        let err = api.send_move(Direction::North).await.unwrap_err();
        match err {
            ApiClientError::Server { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Not in an area");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn invalid_direction_is_rejected() {
        let base_url = spawn_server().await;
        let mut api = ApiClient::new(&base_url);
        let session = api.start_session().await.unwrap();
        api.join().await.unwrap();

        let http = reqwest::Client::new();
        for body in [
            serde_json::json!({ "direction": "up" }),
            serde_json::json!({ "direction": 3 }),
            serde_json::json!({}),
        ] {
            let response = http
                .post(format!("{}/api/area/move", base_url))
                .header(SESSION_TOKEN_HEADER, &session.token)
                .json(&body)
                .send()
                .await
                .unwrap();
            assert_eq!(response.status().as_u16(), 400, "body: {}", body);
        }
    }

    #[tokio::test]
    async fn malformed_exit_positions_are_rejected() {
        let base_url = spawn_server().await;
        let mut api = ApiClient::new(&base_url);
        let session = api.start_session().await.unwrap();

        let http = reqwest::Client::new();
        for body in [
            serde_json::json!({ "x": 2.5, "y": 1, "areaDefId": 1 }),
            serde_json::json!({ "x": 1, "y": "two", "areaDefId": 1 }),
            serde_json::json!({ "x": 1, "y": 1 }),
        ] {
            let response = http
                .post(format!("{}/api/area/exit", base_url))
                .header(SESSION_TOKEN_HEADER, &session.token)
                .json(&body)
                .send()
                .await
                .unwrap();
            assert_eq!(response.status().as_u16(), 400, "body: {}", body);
        }
    }
}

/// GAME LOGIC INTEGRATION TESTS
mod game_logic_tests {
    use super::*;
    use shared::{resolve_move, AreaState, Entity, Tile};

    // 3x3 fixture: row 0 all grass, row 1 = [grass, wall, grass],
    // row 2 = [grass, grass, exit].
    fn three_by_three() -> AreaState {
        let g = Tile::new(TileType::Grass);
        let w = Tile::new(TileType::Wall);
        let e = Tile::new(TileType::Exit);
        AreaState {
            map_id: "pocket".to_string(),
            width: 3,
            height: 3,
            tiles: vec![vec![g, g, g], vec![g, w, g], vec![g, g, e]],
            entities: Vec::new(),
        }
    }

    fn player_at(x: i32, y: i32) -> Entity {
        Entity {
            id: "p".to_string(),
            kind: EntityType::Player,
            x,
            y,
            facing: Direction::South,
            name: None,
            dialogue_file: None,
        }
    }

    #[test]
    fn south_move_lands_on_the_exit() {
        let state = three_by_three();
        let result = resolve_move(&state, &player_at(2, 1), Direction::South);

        assert!(result.success);
        assert_eq!((result.new_x, result.new_y), (2, 2));
        assert!(result.exited_area);
    }

    #[test]
    fn east_move_into_the_wall_is_impassable() {
        let state = three_by_three();
        let result = resolve_move(&state, &player_at(0, 1), Direction::East);

        assert!(!result.success);
        assert_eq!(result.reason, Some(MoveBlocked::Impassable));
        assert_eq!((result.new_x, result.new_y), (0, 1));
        assert_eq!(result.new_facing, Direction::East);
    }

    #[test]
    fn local_game_mirrors_the_backend_walk() {
        // The same nine-north walk the HTTP test performs, locally.
        let mut game = client::game::LocalGame::new(&TOWN_SQUARE, "you");

        for _ in 0..9 {
            assert!(game.step(Direction::North).success);
        }
        assert_eq!(game.player().y, 0);

        let blocked = game.step(Direction::North);
        assert!(!blocked.success);
        assert_eq!(blocked.reason, Some(MoveBlocked::OutOfBounds));
        assert_eq!(game.player().y, 0);
        assert_eq!(game.player().facing, Direction::North);
    }
}
