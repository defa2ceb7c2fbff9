//! Logit quantal response equilibrium tracing for finite games.
//!
//! This facade crate re-exports the workspace crates for convenient access.
//!
//! ## Crate Organization
//!
//! - [`core`] — Type aliases, default tuning constants, logger setup
//! - [`game`] — Strategic and extensive games, payoff oracles, text readers
//! - [`path`] — Logit map, predictor-corrector tracer, likelihood search

pub use qre_core as core;
pub use qre_game as game;
pub use qre_path as path;
