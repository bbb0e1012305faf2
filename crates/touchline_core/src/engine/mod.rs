//! # Match simulation engine
//!
//! | Layer | Modules |
//! |-------|---------|
//! | primitives | [`vector`], [`player_physics`], [`ball`], [`pitch`] |
//! | rules | [`referee`], [`possession`] |
//! | AI | [`behaviors`], [`player_state`] |
//! | loop | [`match_state`], [`match_engine`] |
//! | output | [`events`], [`debug_logger`] |
//!
//! All tuning flows from one [`config::EngineConfig`] value handed to
//! [`MatchEngine::new`].

pub mod ball;
pub mod behaviors;
pub mod config;
pub mod debug_logger;
pub mod events;
pub mod match_engine;
pub mod match_state;
pub mod pitch;
pub mod player_physics;
pub mod player_state;
pub mod possession;
pub mod referee;
pub mod vector;

pub use ball::{BallState, BallTraceHook, BallWrite};
pub use behaviors::{ActionOutcome, AiContext, Flank, PossessionChange, RoleBehaviour};
pub use debug_logger::MatchDebugger;
pub use events::{EventKind, EventLog, EventSink, MatchEvent, PlayerTrace};
pub use match_engine::MatchEngine;
pub use match_state::MatchState;
pub use pitch::{Pitch, Side};
pub use player_physics::{MoveParams, PlayerPhysicalState};
pub use player_state::{OffBallIntent, PassDecision, PassKind, PlayerMatchState};
pub use referee::{Referee, RefereeDecision, RefereeEvent, RestartKind};
pub use vector::Vector2D;
