//! # touchline_core - Real-time football match simulation engine
//!
//! Two rosters in, a fixed-timestep match out: ball and player physics,
//! possession resolution, a referee for goals and restarts, and role AI for
//! goalkeepers, defenders, midfielders and forwards.
//!
//! ## Features
//! - Seeded `ChaCha8Rng`: same rosters + config + seed = same match
//! - Every tuning constant in one serde-loadable [`EngineConfig`]
//! - Optional event sink and ball-write trace hook, both observational
//!
//! ```rust,no_run
//! use rand::SeedableRng;
//! use touchline_core::{generate_team, EngineConfig, MatchEngine};
//!
//! let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(1);
//! let home = generate_team(&mut rng, 1, None, "4-4-2", 1).unwrap();
//! let away = generate_team(&mut rng, 2, None, "4-3-3", 100).unwrap();
//! let config = EngineConfig::default().into_shared();
//! let mut engine = MatchEngine::new(home, away, config, 1).unwrap();
//! engine.run_to_full_time(0.05);
//! println!("{:?}", engine.score());
//! ```

// Game engine APIs often require many parameters for physics, state, etc.
#![allow(clippy::too_many_arguments)]
// Struct initialization pattern used intentionally
#![allow(clippy::field_reassign_with_default)]

pub mod engine;
pub mod error;
pub mod models;

#[cfg(test)]
pub mod test_fixtures;

pub use engine::config;
pub use engine::config::EngineConfig;
pub use engine::{EventKind, MatchDebugger, MatchEngine, MatchEvent, Side};
pub use error::{Result, TouchlineError};
pub use models::{
    generate_team, load_teams_from_json, Formation, Player, PlayerAttributes, Role, Team,
};
