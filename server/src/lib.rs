//! # Town Square Server Library
//!
//! Authoritative backend for the multiplayer town square prototype. The
//! server owns one persistent shared area that players join, walk around in
//! tile by tile, and leave by stepping onto the exit tile. Movement is
//! resolved by the same pure logic the client uses for its single-player
//! mode (`shared::movement`), so the two modes cannot diverge.
//!
//! ## Core Responsibilities
//!
//! ### Live Area State
//! The [`store::AreaStore`] is the sole owner of all mutable area state.
//! Every area instance is guarded by its own mutation gate with a bounded
//! wait, so areas never contend with each other and a stuck caller fails
//! with a timeout instead of hanging forever.
//!
//! ### Lock Discipline
//! Critical sections are plain closures and cannot await. Validation,
//! persistence reads and move resolution happen before the lock against a
//! snapshot; only the precomputed mutation is applied inside it; persistence
//! writes happen after it, off the request path where possible.
//!
//! ### Area Lifecycle
//! The [`manager::AreaManager`] bridges persisted area instance records and
//! the in-memory store: exactly one instance exists per area definition, and
//! it is loaded into memory the first time it is referenced (including after
//! a restart wipes in-process state).
//!
//! ## Module Organization
//!
//! - [`store`] — keyed (state, lock) pairs; snapshots, bounded-wait mutation
//! - [`manager`] — map registry and instance resolution/loading
//! - [`persist`] — persistence collaborator trait plus the in-memory backend
//! - [`session`] — token-keyed session identities and the current-area slot
//! - [`api`] — axum routes, request validation, error-to-status mapping
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::api::{routes, AppContext};
//! use server::manager::AreaManager;
//! use server::persist::{MemoryPersistence, Persistence};
//! use server::session::SessionStore;
//! use server::store::AreaStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(AreaStore::new());
//!     let persist: Arc<dyn Persistence> = Arc::new(MemoryPersistence::new());
//!     let context = Arc::new(AppContext {
//!         store: Arc::clone(&store),
//!         manager: AreaManager::new(Arc::clone(&store), Arc::clone(&persist)),
//!         sessions: SessionStore::new(),
//!         persist,
//!     });
//!
//!     let app = routes().with_state(context);
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod manager;
pub mod persist;
pub mod session;
pub mod store;
