//! JobDeck — client-side session and job-state synchronization for the
//! JobDeck task-tracking service.
//!
//! The crate is split along the seams of the client:
//! - [`session`]: the signed-in credential + profile, persisted locally,
//!   with a watch channel dependents subscribe to.
//! - [`api`]: typed wrapper over the service's HTTP surface.
//! - [`board`]: in-memory mirror of the user's jobs, confirm-then-apply.
//! - [`profile`]: draft state for identity and password edits.
//!
//! The `jobdeck` binary in `main.rs` is the presentation layer; everything
//! it renders has already been validated and normalized here.

pub mod api;
pub mod board;
pub mod cli;
pub mod config;
pub mod errors;
pub mod models;
pub mod profile;
pub mod session;
