//! # Town Square Client Library
//!
//! Frontend for the town square prototype. The client runs in one of two
//! movement modes:
//!
//! - **Local mode** ([`game::LocalGame`]): moves are resolved on this side
//!   with the exact same `shared::movement` logic the server runs, against a
//!   locally built copy of the map. Only the final position is reported back.
//! - **Backend mode** ([`api::ApiClient`]): every move is delegated to the
//!   authoritative server, and the returned state is rendered as-is.
//!
//! Because both modes call the same pure resolver over the same map data,
//! a walk through the square produces identical positions either way.
//!
//! ## Module Organization
//!
//! - [`api`] — typed HTTP wrapper over the backend's area endpoints
//! - [`game`] — local single-player state and move application
//! - [`rendering`] — text rendering of an area (one character per tile)

pub mod api;
pub mod game;
pub mod rendering;
