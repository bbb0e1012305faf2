//! Referee: goal / out-of-play adjudication.
//!
//! 상태는 반환값에만 존재한다: `None → Goal | Out(GoalKick | ThrowIn | Corner)`.
//! Applying the restart is the match loop's job.

use super::ball::BallState;
use super::pitch::{Pitch, Side};
use super::vector::Vector2D;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefereeEvent {
    None,
    Goal,
    Out,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RestartKind {
    None,
    GoalKick,
    ThrowIn,
    Corner,
}

impl RestartKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RestartKind::None => "none",
            RestartKind::GoalKick => "goal_kick",
            RestartKind::ThrowIn => "throw_in",
            RestartKind::Corner => "corner",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RefereeDecision {
    pub event: RefereeEvent,
    pub scoring_side: Option<Side>,
    pub restart: RestartKind,
    pub awarded_side: Option<Side>,
    /// Where the ball left play
    pub restart_spot: Option<Vector2D>,
}

impl RefereeDecision {
    pub const PLAY_ON: Self = Self {
        event: RefereeEvent::None,
        scoring_side: None,
        restart: RestartKind::None,
        awarded_side: None,
        restart_spot: None,
    };

    fn goal(side: Side) -> Self {
        Self { event: RefereeEvent::Goal, scoring_side: Some(side), ..Self::PLAY_ON }
    }

    fn out(restart: RestartKind, awarded: Side, spot: Vector2D) -> Self {
        Self {
            event: RefereeEvent::Out,
            scoring_side: None,
            restart,
            awarded_side: Some(awarded),
            restart_spot: Some(spot),
        }
    }

    #[inline]
    pub fn is_goal(&self) -> bool {
        self.event == RefereeEvent::Goal
    }

    #[inline]
    pub fn is_ball_out(&self) -> bool {
        self.event == RefereeEvent::Out
    }
}

#[derive(Debug, Clone)]
pub struct Referee {
    pitch: Pitch,
}

impl Referee {
    pub fn new(pitch: Pitch) -> Self {
        Self { pitch }
    }

    pub fn pitch(&self) -> &Pitch {
        &self.pitch
    }

    /// Adjudicate the ball's current position.
    ///
    /// `last_touch_side` is the side of the last toucher when known;
    /// `possession_hint` is consulted for throw-ins when it is not.
    pub fn observe_ball(
        &self,
        ball: &BallState,
        current_time: f32,
        last_touch_side: Option<Side>,
        possession_hint: Option<Side>,
    ) -> RefereeDecision {
        let pos = ball.position();
        if self.pitch.is_in_bounds(pos) {
            return RefereeDecision::PLAY_ON;
        }

        if let Some(side) = self.pitch.goal_scored(pos) {
            log::debug!("[{:.1}s] goal awarded to {} at {}", current_time, side, pos);
            return RefereeDecision::goal(side);
        }

        if self.pitch.crossed_goal_line(pos) {
            let defender = self.pitch.defending_side_at(pos);
            let attacker = defender.opponent();
            let decision = if last_touch_side == Some(attacker) {
                RefereeDecision::out(RestartKind::GoalKick, defender, pos)
            } else {
                if last_touch_side.is_none() {
                    log::debug!(
                        "[{:.1}s] goal-line exit with unknown toucher, corner to {}",
                        current_time,
                        attacker
                    );
                }
                RefereeDecision::out(RestartKind::Corner, attacker, pos)
            };
            log::debug!(
                "[{:.1}s] ball out over goal line: {} to {}",
                current_time,
                decision.restart.as_str(),
                decision.awarded_side.map(Side::as_str).unwrap_or("-")
            );
            return decision;
        }

        if self.pitch.crossed_touchline(pos) {
            let awarded = match last_touch_side {
                Some(side) => side.opponent(),
                None => {
                    log::debug!(
                        "[{:.1}s] touchline exit with unknown toucher, using hint {:?}",
                        current_time,
                        possession_hint
                    );
                    possession_hint.unwrap_or(Side::Home)
                }
            };
            log::debug!("[{:.1}s] ball out over touchline: throw-in to {}", current_time, awarded);
            return RefereeDecision::out(RestartKind::ThrowIn, awarded, pos);
        }

        // non-finite position: nothing to adjudicate
        RefereeDecision::PLAY_ON
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::BallPhysicsConfig;

    fn ball_at(x: f32, y: f32) -> BallState {
        let mut b = BallState::new(Vector2D::ZERO, BallPhysicsConfig::default());
        b.set_position(Vector2D::new(x, y));
        b
    }

    fn referee() -> Referee {
        Referee::new(Pitch::default())
    }

    #[test]
    fn test_in_bounds_plays_on() {
        let d = referee().observe_ball(&ball_at(10.0, -5.0), 0.0, Some(Side::Home), None);
        assert_eq!(d, RefereeDecision::PLAY_ON);
    }

    #[test]
    fn test_goal_credits_side_not_defending_line() {
        let r = referee();
        let d = r.observe_ball(&ball_at(-53.0, 0.5), 1.0, Some(Side::Home), None);
        assert!(d.is_goal());
        assert_eq!(d.scoring_side, Some(Side::Away));
        let d = r.observe_ball(&ball_at(53.0, -1.0), 1.0, None, None);
        assert_eq!(d.scoring_side, Some(Side::Home));
    }

    #[test]
    fn test_goal_kick_when_attacker_last_touched() {
        let d = referee().observe_ball(&ball_at(-53.0, 12.0), 3.0, Some(Side::Away), None);
        assert!(d.is_ball_out());
        assert_eq!(d.restart, RestartKind::GoalKick);
        assert_eq!(d.awarded_side, Some(Side::Home));
        assert_eq!(d.restart_spot, Some(Vector2D::new(-53.0, 12.0)));
    }

    #[test]
    fn test_corner_when_defender_or_unknown_touched() {
        let r = referee();
        let d = r.observe_ball(&ball_at(53.0, 20.0), 3.0, Some(Side::Away), None);
        assert_eq!(d.restart, RestartKind::Corner);
        assert_eq!(d.awarded_side, Some(Side::Home));
        let d = r.observe_ball(&ball_at(53.0, 20.0), 3.0, None, None);
        assert_eq!(d.restart, RestartKind::Corner);
        assert_eq!(d.awarded_side, Some(Side::Home));
    }

    #[test]
    fn test_throw_in_to_other_side() {
        let r = referee();
        let d = r.observe_ball(&ball_at(5.0, 34.5), 3.0, Some(Side::Home), Some(Side::Home));
        assert_eq!(d.restart, RestartKind::ThrowIn);
        assert_eq!(d.awarded_side, Some(Side::Away));
    }

    #[test]
    fn test_throw_in_fallbacks() {
        let r = referee();
        let d = r.observe_ball(&ball_at(5.0, -35.0), 3.0, None, Some(Side::Away));
        assert_eq!(d.awarded_side, Some(Side::Away));
        let d = r.observe_ball(&ball_at(5.0, -35.0), 3.0, None, None);
        assert_eq!(d.awarded_side, Some(Side::Home));
    }

    #[test]
    fn test_goal_line_wins_over_touchline_at_the_corner() {
        let r = referee();
        let d = r.observe_ball(&ball_at(53.0, 35.0), 3.0, Some(Side::Home), None);
        assert_eq!(d.restart, RestartKind::GoalKick);
        assert_eq!(d.awarded_side, Some(Side::Away));
    }

    #[test]
    fn test_non_finite_ball_is_not_a_throw_in() {
        let r = referee();
        let d = r.observe_ball(&ball_at(f32::NAN, 0.0), 3.0, Some(Side::Home), None);
        assert_eq!(d, RefereeDecision::PLAY_ON);
    }
}
