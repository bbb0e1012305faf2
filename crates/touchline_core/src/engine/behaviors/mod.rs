//! Role behaviours
//!
//! 역할 AI 는 닫힌 enum 하나로 표현한다. 각 변형은 공통 능력 라이브러리
//! ([`common`]) 위에 자기 결정 트리를 얹는다.
//!
//! | Variant | Roles | Side hook |
//! |---------|-------|-----------|
//! | `Goalkeeper` | GK | - |
//! | `Defender(flank)` | RD, CD, LD | shape width |
//! | `Midfielder(flank)` | RM, CM, LM | support width |
//! | `Forward(flank)` | RCF, CF, LCF | run target |
//!
//! ## 단일 작성자 규칙
//! `decide_action` receives the deciding player by `&mut` and a read-only
//! slice of everybody (including a stale copy of the decider). The only other
//! mutable state it can reach is the ball and the RNG inside [`AiContext`].
//! Possession flags are never written here: the behaviour reports a
//! [`PossessionChange`] and the match loop applies it.

pub mod common;
pub mod defender;
pub mod forward;
pub mod goalkeeper;
pub mod midfielder;
pub mod tempo;

use super::ball::BallState;
use super::config::EngineConfig;
use super::events::EventKind;
use super::pitch::{Pitch, Side};
use super::player_state::PlayerMatchState;
use crate::error::Result;
use crate::models::Role;
use rand_chacha::ChaCha8Rng;
use std::fmt;

/// Lateral variant of a role family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flank {
    Left,
    Central,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoleBehaviour {
    Goalkeeper,
    Defender(Flank),
    Midfielder(Flank),
    Forward(Flank),
}

impl RoleBehaviour {
    pub fn from_role(role: Role) -> Self {
        match role {
            Role::GK => RoleBehaviour::Goalkeeper,
            Role::RD => RoleBehaviour::Defender(Flank::Right),
            Role::CD => RoleBehaviour::Defender(Flank::Central),
            Role::LD => RoleBehaviour::Defender(Flank::Left),
            Role::RM => RoleBehaviour::Midfielder(Flank::Right),
            Role::CM => RoleBehaviour::Midfielder(Flank::Central),
            Role::LM => RoleBehaviour::Midfielder(Flank::Left),
            Role::RCF => RoleBehaviour::Forward(Flank::Right),
            Role::CF => RoleBehaviour::Forward(Flank::Central),
            Role::LCF => RoleBehaviour::Forward(Flank::Left),
        }
    }

    /// Build from a raw role code. Unknown codes are an error, never a default.
    pub fn from_code(code: &str) -> Result<Self> {
        Ok(Self::from_role(code.parse::<Role>()?))
    }

    pub fn role(&self) -> Role {
        match *self {
            RoleBehaviour::Goalkeeper => Role::GK,
            RoleBehaviour::Defender(Flank::Right) => Role::RD,
            RoleBehaviour::Defender(Flank::Central) => Role::CD,
            RoleBehaviour::Defender(Flank::Left) => Role::LD,
            RoleBehaviour::Midfielder(Flank::Right) => Role::RM,
            RoleBehaviour::Midfielder(Flank::Central) => Role::CM,
            RoleBehaviour::Midfielder(Flank::Left) => Role::LM,
            RoleBehaviour::Forward(Flank::Right) => Role::RCF,
            RoleBehaviour::Forward(Flank::Central) => Role::CF,
            RoleBehaviour::Forward(Flank::Left) => Role::LCF,
        }
    }

    pub fn flank(&self) -> Flank {
        match *self {
            RoleBehaviour::Goalkeeper => Flank::Central,
            RoleBehaviour::Defender(f)
            | RoleBehaviour::Midfielder(f)
            | RoleBehaviour::Forward(f) => f,
        }
    }

    /// One decision for `me` this tick.
    pub fn decide_action(
        &self,
        me: &mut PlayerMatchState,
        ctx: &mut AiContext<'_>,
    ) -> ActionOutcome {
        let mut out = ActionOutcome::default();
        match *self {
            RoleBehaviour::Goalkeeper => goalkeeper::decide(me, ctx, &mut out),
            RoleBehaviour::Defender(flank) => defender::decide(flank, me, ctx, &mut out),
            RoleBehaviour::Midfielder(flank) => midfielder::decide(flank, me, ctx, &mut out),
            RoleBehaviour::Forward(flank) => forward::decide(flank, me, ctx, &mut out),
        }
        out
    }
}

impl fmt::Display for RoleBehaviour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.role().code())
    }
}

/// Everything a behaviour may read, plus the two things it may mutate.
pub struct AiContext<'a> {
    /// All 22 players, home first; contains a stale copy of the decider.
    pub players: &'a [PlayerMatchState],
    pub ball: &'a mut BallState,
    pub rng: &'a mut ChaCha8Rng,
    pub cfg: &'a EngineConfig,
    pub pitch: &'a Pitch,
    /// Match clock after this tick's advance
    pub time: f32,
    pub dt: f32,
    pub team_in_possession: Option<Side>,
    pub last_possession_player_id: Option<u32>,
}

/// Possession edit requested by a behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PossessionChange {
    #[default]
    None,
    /// Decider takes the ball (save, collect, press win)
    Claim,
    /// Decider released the ball (pass, shot, clearance)
    Release,
    /// Tackle: nobody holds the ball afterwards
    Dispossess,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionOutcome {
    pub possession: PossessionChange,
    /// Events to append, description only; the loop stamps time and side.
    pub events: Vec<(EventKind, String)>,
}

impl ActionOutcome {
    pub fn push_event(&mut self, kind: EventKind, description: impl Into<String>) {
        self.events.push((kind, description.into()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TouchlineError;

    #[test]
    fn test_every_role_round_trips() {
        for role in Role::ALL {
            assert_eq!(RoleBehaviour::from_role(role).role(), role);
        }
        assert_eq!(RoleBehaviour::from_code("lcf").unwrap(), RoleBehaviour::Forward(Flank::Left));
        assert_eq!(RoleBehaviour::from_role(Role::RD).flank(), Flank::Right);
        assert_eq!(RoleBehaviour::Goalkeeper.to_string(), "GK");
    }

    #[test]
    fn test_unknown_code_is_rejected() {
        let err = RoleBehaviour::from_code("ST").unwrap_err();
        match err {
            TouchlineError::UnknownRole { role, known } => {
                assert_eq!(role, "ST");
                assert_eq!(known, "CD, CF, CM, GK, LCF, LD, LM, RCF, RD, RM");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
