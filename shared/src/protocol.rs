//! Request and response bodies for the area HTTP API, shared by the server
//! handlers and the client's API wrapper so the two cannot drift apart.

use serde::{Deserialize, Serialize};

use crate::{AreaState, Entity, MoveResult};

/// Header carrying the opaque session token on authenticated requests.
pub const SESSION_TOKEN_HEADER: &str = "x-session-token";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub token: String,
    pub user_id: String,
    pub is_registered: bool,
}

/// Direction stays a plain string on the wire so the server can reject
/// unknown values as a client error rather than a parse failure.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MoveRequest {
    pub direction: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExitRequest {
    pub x: i32,
    pub y: i32,
    pub area_def_id: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JoinResponse {
    pub area_id: i64,
    pub state: AreaState,
    pub player: Option<Entity>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MoveResponse {
    pub move_result: MoveResult,
    pub state: AreaState,
    pub player: Option<Entity>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StateResponse {
    pub state: AreaState,
    pub player: Option<Entity>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct ExitResponse {
    pub success: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ErrorBody {
    pub error: String,
}
