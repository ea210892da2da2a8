//! HTTP surface for the area API.
//!
//! Every handler follows the same discipline: all variable-latency work
//! (session lookup, persistence calls, move resolution against a snapshot)
//! happens outside the area lock, and each `with_lock` call applies only a
//! change computed beforehand.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use log::error;
use std::sync::Arc;

use shared::protocol::{
    ErrorBody, ExitRequest, ExitResponse, JoinResponse, MoveRequest, MoveResponse,
    SessionResponse, StateResponse,
};
use shared::town_square::TOWN_SQUARE;
use shared::{resolve_move, Direction, Entity, EntityType, MapDef};

use crate::manager::{map_def, AreaManager, ManagerError, TOWN_SQUARE_DEF_ID, TOWN_SQUARE_MAP_ID};
use crate::persist::Persistence;
use crate::session::{SessionStore, SESSION_TOKEN_HEADER};
use crate::store::{AreaId, AreaStore, StoreError};

/// Shared state behind every handler, built once at startup.
pub struct AppContext {
    pub store: Arc<AreaStore>,
    pub manager: AreaManager,
    pub sessions: SessionStore,
    pub persist: Arc<dyn Persistence>,
}

pub fn routes() -> Router<Arc<AppContext>> {
    Router::new()
        .route("/api/session", post(create_session))
        .route("/api/area/map", get(get_map))
        .route("/api/area/join", post(join_area))
        .route("/api/area/move", post(move_in_area))
        .route("/api/area/state", get(get_area_state))
        .route("/api/area/exit", post(exit_area))
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("No session")]
    Unauthorized,
    #[error("Not in an area")]
    NotInArea,
    #[error("Invalid direction")]
    InvalidDirection,
    #[error("Player not in area")]
    PlayerNotInArea,
    #[error("Invalid position")]
    InvalidPosition,
    #[error("Position out of bounds")]
    PositionOutOfBounds,
    #[error("Area not in memory")]
    AreaNotInMemory,
    /// Detail is logged server-side; the caller sees a generic failure.
    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotInArea
            | ApiError::InvalidDirection
            | ApiError::PlayerNotInArea
            | ApiError::InvalidPosition
            | ApiError::PositionOutOfBounds => StatusCode::BAD_REQUEST,
            ApiError::AreaNotInMemory | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            match &self {
                ApiError::Internal(detail) => error!("Area API error: {}", detail),
                other => error!("Area API error: {}", other),
            }
        }
        let body = Json(ErrorBody {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::AreaNotLoaded(_) => ApiError::AreaNotInMemory,
            StoreError::LockTimeout(area_id) => {
                ApiError::Internal(format!("lock timeout on area {}", area_id))
            }
        }
    }
}

impl From<ManagerError> for ApiError {
    fn from(err: ManagerError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

/// Authenticated request context: the session token plus a copy of the
/// session it names at the time the request arrived.
pub struct SessionIdentity {
    pub token: String,
    pub user_id: String,
    pub current_area_id: Option<AreaId>,
}

impl FromRequestParts<Arc<AppContext>> for SessionIdentity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &Arc<AppContext>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(SESSION_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;
        let session = ctx.sessions.get(token).await.ok_or(ApiError::Unauthorized)?;

        Ok(SessionIdentity {
            token: token.to_string(),
            user_id: session.user_id,
            current_area_id: session.current_area_id,
        })
    }
}

/// POST /api/session
/// Bootstrap an anonymous session. Anonymous users still get a player record
/// so position write-back has somewhere to land.
async fn create_session(
    State(ctx): State<Arc<AppContext>>,
) -> Result<Json<SessionResponse>, ApiError> {
    let (token, session) = ctx.sessions.create_anonymous().await;
    ctx.persist
        .create_player(&session.user_id)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(SessionResponse {
        token,
        user_id: session.user_id,
        is_registered: session.registered,
    }))
}

/// GET /api/area/map
/// The Town Square map definition (tiles + metadata, no entities). The
/// frontend uses it for client-side mode.
async fn get_map() -> Json<MapDef> {
    Json(TOWN_SQUARE.clone())
}

/// POST /api/area/join
/// Join the persistent Town Square instance: load it if needed, insert the
/// player at spawn unless a retried join already did, record the area in the
/// session.
async fn join_area(
    State(ctx): State<Arc<AppContext>>,
    identity: SessionIdentity,
) -> Result<Json<JoinResponse>, ApiError> {
    let area_id = ctx
        .manager
        .ensure_area(TOWN_SQUARE_DEF_ID, TOWN_SQUARE_MAP_ID)
        .await?;

    let map = map_def(TOWN_SQUARE_MAP_ID)?;
    let spawn_x = map.spawn_x;
    let spawn_y = map.spawn_y;

    let user_id = identity.user_id.clone();
    ctx.store
        .with_lock(area_id, move |state| {
            let already_joined = state
                .entities
                .iter()
                .any(|e| e.id == user_id && e.kind == EntityType::Player);
            if !already_joined {
                state.entities.push(Entity {
                    id: user_id,
                    kind: EntityType::Player,
                    x: spawn_x,
                    y: spawn_y,
                    facing: Direction::South,
                    name: None,
                    dialogue_file: None,
                });
            }
        })
        .await?;

    ctx.sessions
        .set_current_area(&identity.token, Some(area_id))
        .await;

    let state = ctx
        .store
        .read_snapshot(area_id)
        .ok_or(ApiError::AreaNotInMemory)?;
    let player = ctx.store.find_player_entity(area_id, &identity.user_id);

    Ok(Json(JoinResponse {
        area_id,
        state,
        player,
    }))
}

/// POST /api/area/move
/// Resolve one move for the session's player. The result is computed against
/// a snapshot before the lock; only the precomputed position and facing are
/// applied inside it.
async fn move_in_area(
    State(ctx): State<Arc<AppContext>>,
    identity: SessionIdentity,
    payload: Result<Json<MoveRequest>, JsonRejection>,
) -> Result<Json<MoveResponse>, ApiError> {
    let area_id = identity.current_area_id.ok_or(ApiError::NotInArea)?;

    let Json(request) = payload.map_err(|_| ApiError::InvalidDirection)?;
    let direction =
        Direction::from_name(&request.direction).ok_or(ApiError::InvalidDirection)?;

    let player_before = ctx
        .store
        .find_player_entity(area_id, &identity.user_id)
        .ok_or(ApiError::PlayerNotInArea)?;
    let state_before = ctx
        .store
        .read_snapshot(area_id)
        .ok_or(ApiError::AreaNotInMemory)?;
    let move_result = resolve_move(&state_before, &player_before, direction);

    let user_id = identity.user_id.clone();
    let applied = move_result.clone();
    ctx.store
        .with_lock(area_id, move |state| {
            if let Some(entity) = state
                .entities
                .iter_mut()
                .find(|e| e.id == user_id && e.kind == EntityType::Player)
            {
                entity.x = applied.new_x;
                entity.y = applied.new_y;
                entity.facing = applied.new_facing;
            }
        })
        .await?;

    // Persist the new position without blocking the response. At most once:
    // a failed write is logged and dropped, the in-memory state stays
    // authoritative for gameplay.
    if move_result.success {
        let persist = Arc::clone(&ctx.persist);
        let user_id = identity.user_id.clone();
        let (x, y) = (move_result.new_x, move_result.new_y);
        tokio::spawn(async move {
            if let Err(e) = persist.update_player_position(&user_id, area_id, x, y).await {
                error!(
                    "Failed to persist position for {} in area {}: {}",
                    user_id, area_id, e
                );
            }
        });
    }

    // Stepping onto the exit tile removes the player in a second critical
    // section; between the two, other readers may still see the entity on
    // the exit tile.
    if move_result.exited_area {
        let user_id = identity.user_id.clone();
        ctx.store
            .with_lock(area_id, move |state| {
                state
                    .entities
                    .retain(|e| !(e.id == user_id && e.kind == EntityType::Player));
            })
            .await?;
        ctx.sessions.set_current_area(&identity.token, None).await;
    }

    let state = ctx
        .store
        .read_snapshot(area_id)
        .ok_or(ApiError::AreaNotInMemory)?;
    let player = ctx.store.find_player_entity(area_id, &identity.user_id);

    Ok(Json(MoveResponse {
        move_result,
        state,
        player,
    }))
}

/// GET /api/area/state
/// Current area state (all entities, including other players).
async fn get_area_state(
    State(ctx): State<Arc<AppContext>>,
    identity: SessionIdentity,
) -> Result<Json<StateResponse>, ApiError> {
    let area_id = identity.current_area_id.ok_or(ApiError::NotInArea)?;

    let state = ctx
        .store
        .read_snapshot(area_id)
        .ok_or(ApiError::AreaNotInMemory)?;
    let player = state
        .entities
        .iter()
        .find(|e| e.id == identity.user_id && e.kind == EntityType::Player)
        .cloned();

    Ok(Json(StateResponse { state, player }))
}

/// POST /api/area/exit
/// Record a final player position reported by client-side mode. Skips
/// persistence quietly when the definition has no instance yet.
async fn exit_area(
    State(ctx): State<Arc<AppContext>>,
    identity: SessionIdentity,
    payload: Result<Json<ExitRequest>, JsonRejection>,
) -> Result<Json<ExitResponse>, ApiError> {
    let Json(request) = payload.map_err(|_| ApiError::InvalidPosition)?;

    let map = map_def(TOWN_SQUARE_MAP_ID)?;
    if !map.in_bounds(request.x, request.y) {
        return Err(ApiError::PositionOutOfBounds);
    }

    let instance = ctx
        .persist
        .get_area_instance(request.area_def_id)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    if let Some(instance) = instance {
        ctx.persist
            .update_player_position(&identity.user_id, instance.area_id, request.x, request.y)
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?;
    }

    Ok(Json(ExitResponse { success: true }))
}
