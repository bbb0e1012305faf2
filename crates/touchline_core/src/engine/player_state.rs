//! Per-player match state
//!
//! 로스터 선수 한 명을 물리 상태와 역할 AI 에 묶는 런타임 래퍼.
//!
//! ## 템포 타이머
//! ```text
//! probe (space_move_until) → hold (tempo_hold_until) → cooldown (tempo_hold_cooldown_until)
//! ```
//! All timers are absolute match times; `0.0` means inactive.

use super::behaviors::RoleBehaviour;
use super::events::PlayerTrace;
use super::pitch::Side;
use super::player_physics::PlayerPhysicalState;
use super::vector::Vector2D;
use crate::models::{Player, PlayerAttributes, Role};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Movement intent, also remembered as the last off-ball state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OffBallIntent {
    #[default]
    Idle,
    /// press / tackle / chase (sprint tier)
    Press,
    /// run tier
    Mark,
    /// shape / hold / maintain (jog tier)
    Shape,
    /// blended jog-run tier
    Support,
}

impl OffBallIntent {
    pub fn as_str(self) -> &'static str {
        match self {
            OffBallIntent::Idle => "idle",
            OffBallIntent::Press => "press",
            OffBallIntent::Mark => "mark",
            OffBallIntent::Shape => "shape",
            OffBallIntent::Support => "support",
        }
    }
}

impl fmt::Display for OffBallIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PassKind {
    /// Best scored option (progress, lane, distance)
    Progressive,
    /// Lateral outlet under pressure
    Relief,
    /// Recycle to a deeper teammate
    Back,
}

impl PassKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PassKind::Progressive => "progressive",
            PassKind::Relief => "relief",
            PassKind::Back => "back",
        }
    }
}

/// A concrete pass picked by the role AI. Not persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PassDecision {
    pub target_id: u32,
    pub kind: PassKind,
    /// Kick speed before jitter
    pub power: f32,
    pub score: f32,
    pub lane_quality: f32,
    /// Receiver position at decision time
    pub lead_point: Vector2D,
}

#[derive(Debug, Clone)]
pub struct PlayerMatchState {
    pub player_id: u32,
    pub name: String,
    pub side: Side,
    pub team_name: Arc<str>,
    pub role: Role,
    pub attributes: PlayerAttributes,
    pub behaviour: RoleBehaviour,
    /// Nominal formation slot
    pub role_position: Vector2D,
    pub state: PlayerPhysicalState,
    pub current_target: Option<Vector2D>,
    pub off_ball_state: OffBallIntent,

    pub tempo_hold_until: f32,
    pub tempo_hold_cooldown_until: f32,
    pub space_move_until: f32,
    pub space_move_heading: Option<Vector2D>,
    pub space_probe_loops: u32,

    pub pending_save_target: Option<Vector2D>,
    pub pending_save_eta: f32,
    pub last_save_log_time: f32,

    /// Clock as of the current AI tick
    pub match_time: f32,
}

impl PlayerMatchState {
    pub fn new(
        player: &Player,
        side: Side,
        team_name: Arc<str>,
        role_position: Vector2D,
        behaviour: RoleBehaviour,
    ) -> Self {
        Self {
            player_id: player.id,
            name: player.name.clone(),
            side,
            team_name,
            role: player.role,
            attributes: player.attributes,
            behaviour,
            role_position,
            state: PlayerPhysicalState::new(role_position),
            current_target: None,
            off_ball_state: OffBallIntent::Idle,
            tempo_hold_until: 0.0,
            tempo_hold_cooldown_until: 0.0,
            space_move_until: 0.0,
            space_move_heading: None,
            space_probe_loops: 0,
            pending_save_target: None,
            pending_save_eta: f32::INFINITY,
            last_save_log_time: -1000.0,
            match_time: 0.0,
        }
    }

    #[inline]
    pub fn position(&self) -> Vector2D {
        self.state.position
    }

    #[inline]
    pub fn has_ball(&self) -> bool {
        self.state.has_ball
    }

    #[inline]
    pub fn is_home(&self) -> bool {
        self.side == Side::Home
    }

    pub fn is_teammate_of(&self, other: &PlayerMatchState) -> bool {
        self.side == other.side && self.player_id != other.player_id
    }

    /// Seconds left in an active tempo hold.
    pub fn hold_remaining(&self) -> f32 {
        (self.tempo_hold_until - self.match_time).max(0.0)
    }

    /// Stop the lateral probe; `reset_history` also forgets completed loops.
    pub fn reset_space_move(&mut self, reset_history: bool) {
        self.space_move_until = 0.0;
        self.space_move_heading = None;
        if reset_history {
            self.space_probe_loops = 0;
        }
    }

    pub fn clear_pending_save(&mut self) {
        self.pending_save_target = None;
        self.pending_save_eta = f32::INFINITY;
    }

    /// Fresh physical state at the formation slot, as after a goal or half-time.
    pub fn reset_to_slot(&mut self) {
        self.state = PlayerPhysicalState::new(self.role_position);
        self.current_target = None;
        self.off_ball_state = OffBallIntent::Idle;
        self.tempo_hold_until = 0.0;
        self.tempo_hold_cooldown_until = 0.0;
        self.reset_space_move(true);
        self.clear_pending_save();
    }

    pub fn trace(&self) -> PlayerTrace<'_> {
        PlayerTrace {
            player_id: self.player_id,
            team_name: &self.team_name,
            role: self.role,
            position: self.state.position,
            velocity: self.state.velocity,
            has_ball: self.state.has_ball,
            stamina: self.state.stamina,
            target: self.current_target,
        }
    }
}

impl fmt::Display for PlayerMatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {} {}", self.player_id, self.team_name, self.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::sample_player;

    fn state() -> PlayerMatchState {
        let player = sample_player(9, Role::CF, 70);
        let behaviour = RoleBehaviour::from_role(Role::CF);
        let slot = Vector2D::new(8.0, 0.0);
        PlayerMatchState::new(&player, Side::Away, Arc::from("Blues"), slot, behaviour)
    }

    #[test]
    fn test_starts_at_slot_with_fresh_timers() {
        let p = state();
        assert_eq!(p.position(), Vector2D::new(8.0, 0.0));
        assert!(!p.has_ball());
        assert_eq!(p.state.stamina, 100.0);
        assert!(p.pending_save_eta.is_infinite());
        assert_eq!(p.to_string(), "#9 Blues CF");
    }

    #[test]
    fn test_reset_restores_slot_and_clears_timers() {
        let mut p = state();
        p.state.position = Vector2D::new(-20.0, 5.0);
        p.state.velocity = Vector2D::new(3.0, 0.0);
        p.state.stamina = 61.0;
        p.state.has_ball = true;
        p.tempo_hold_until = 40.0;
        p.space_probe_loops = 3;
        p.space_move_heading = Some(Vector2D::new(0.0, 1.0));
        p.reset_to_slot();
        assert_eq!(p.position(), p.role_position);
        assert_eq!(p.state.velocity, Vector2D::ZERO);
        assert_eq!(p.state.stamina, 100.0);
        assert!(!p.has_ball());
        assert_eq!(p.space_probe_loops, 0);
        assert!(p.space_move_heading.is_none());
    }

    #[test]
    fn test_hold_remaining_never_negative() {
        let mut p = state();
        p.match_time = 10.0;
        p.tempo_hold_until = 10.5;
        assert!((p.hold_remaining() - 0.5).abs() < 1e-6);
        p.match_time = 12.0;
        assert_eq!(p.hold_remaining(), 0.0);
    }
}
