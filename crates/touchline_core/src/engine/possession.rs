//! Possession resolver
//!
//! 매 틱 물리와 심판 다음에 한 번 실행된다.
//!
//! 1. 패스 수신자가 catch radius 안에 있고 공이 그쪽으로 향하면 수신자 소유
//! 2. 느린 공이면 가장 가까운 선수가 (속도 구간별 반경 안에서) 소유
//! 3. 그 외에는 아무도 소유하지 않는다

use super::config::PossessionConfig;
use super::match_state::MatchState;
use super::vector::Vector2D;

/// What the resolver did this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Intended recipient caught the pass
    Caught { index: usize, new_holder: bool },
    /// Nearest player collected a slow ball
    Collected { index: usize, new_holder: bool },
    /// Nobody controls the ball
    Free,
}

impl Resolution {
    /// Slot index when possession changed hands this tick.
    pub fn new_holder(&self) -> Option<usize> {
        match *self {
            Resolution::Caught { index, new_holder: true }
            | Resolution::Collected { index, new_holder: true } => Some(index),
            _ => None,
        }
    }
}

/// Catch radius for the intended recipient, growing with ball speed.
pub fn catch_radius(ball_speed: f32, cfg: &PossessionConfig) -> f32 {
    (cfg.target_radius_min + ball_speed * cfg.target_radius_speed_factor)
        .min(cfg.target_radius_max)
        .max(cfg.target_radius_min)
}

/// Collection radius for a loose ball; slower balls are easier to claim.
pub fn loose_ball_radius(ball_speed: f32, cfg: &PossessionConfig) -> f32 {
    let mut radius = cfg.base_radius;
    if ball_speed < cfg.medium_speed_threshold {
        radius = radius.max(cfg.medium_radius);
    }
    if ball_speed < cfg.slow_speed_threshold {
        radius = radius.max(cfg.slow_radius);
    }
    radius
}

/// Give the ball to `index`. Returns true when this is a new holder.
///
/// A new holder takes the ball at its own position and pace. A continuing
/// dribbler eases the ball just ahead so it stays contestable.
pub fn assign_possession(state: &mut MatchState, index: usize, cfg: &PossessionConfig) -> bool {
    let is_new = state.holder_index() != Some(index);
    state.clear_possession_flags();

    let time = state.match_time;
    let holder = &mut state.players[index];
    holder.state.has_ball = true;
    let (id, side) = (holder.player_id, holder.side);
    let (position, velocity) = (holder.state.position, holder.state.velocity);

    let ball = &mut state.ball;
    ball.last_touched_by = Some(id);
    ball.last_touched_time = time;
    ball.intended_recipient = None;
    ball.possessing_side = Some(side);
    state.team_in_possession = Some(side);
    state.last_possession_player_id = Some(id);

    if is_new {
        ball.set_velocity(velocity);
        ball.set_position(position);
    } else if velocity.magnitude() > 0.0 {
        let desired = position + velocity.normalize() * cfg.continue_control_offset;
        let eased = ball.position().lerp(desired, cfg.continue_position_lerp);
        ball.set_position(eased);
        ball.set_velocity(velocity * cfg.continue_velocity_blend);
    } else {
        ball.set_position(position);
        ball.set_velocity(Vector2D::ZERO);
    }
    is_new
}

/// Run the three-step resolution against the current state.
pub fn resolve_possession(state: &mut MatchState, cfg: &PossessionConfig) -> Resolution {
    let ball_pos = state.ball.position();
    let ball_vel = state.ball.velocity();
    let speed = ball_vel.magnitude();

    if let Some(target_id) = state.ball.intended_recipient {
        match state.index_of(target_id) {
            Some(index) => {
                let to_target = state.players[index].position() - ball_pos;
                let distance = to_target.magnitude();
                if distance > 0.0 {
                    let alignment = if speed > 0.1 {
                        ball_vel.normalize().dot(to_target.normalize())
                    } else {
                        1.0
                    };
                    if distance < catch_radius(speed, cfg)
                        && alignment > cfg.direction_alignment_min
                    {
                        let new_holder = assign_possession(state, index, cfg);
                        return Resolution::Caught { index, new_holder };
                    }
                }
            }
            None => log::debug!(
                "[{:.1}s] intended recipient {} not on the pitch",
                state.match_time,
                target_id
            ),
        }
    }

    if speed < cfg.loose_ball_speed_threshold {
        let mut nearest: Option<(usize, f32)> = None;
        for (i, p) in state.players.iter().enumerate() {
            let d = p.position().distance_to(ball_pos);
            if nearest.map_or(true, |(_, best)| d < best) {
                nearest = Some((i, d));
            }
        }
        if let Some((index, distance)) = nearest {
            if distance < loose_ball_radius(speed, cfg) {
                let new_holder = assign_possession(state, index, cfg);
                return Resolution::Collected { index, new_holder };
            }
        }
    }

    state.clear_possession_flags();
    Resolution::Free
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::EngineConfig;
    use crate::engine::pitch::Side;
    use crate::test_fixtures::sample_team;

    /// Everybody parked far from the ball on the away wing.
    fn state() -> MatchState {
        let home = sample_team(1, "Reds", 1, 60);
        let away = sample_team(2, "Blues", 100, 65);
        let mut s = MatchState::new(home, away, &EngineConfig::default()).unwrap();
        for (i, p) in s.players.iter_mut().enumerate() {
            p.state.position = Vector2D::new(40.0, -30.0 + i as f32);
        }
        s
    }

    fn cfg() -> PossessionConfig {
        PossessionConfig::default()
    }

    #[test]
    fn test_radii_follow_speed_bands() {
        let c = cfg();
        assert!((catch_radius(0.0, &c) - 1.1).abs() < 1e-6);
        assert!((catch_radius(1.0, &c) - 1.18).abs() < 1e-5);
        assert!((catch_radius(20.0, &c) - 1.3).abs() < 1e-6);
        assert_eq!(loose_ball_radius(4.0, &c), 0.5);
        assert_eq!(loose_ball_radius(1.0, &c), 0.8);
        assert_eq!(loose_ball_radius(0.1, &c), 1.0);
    }

    #[test]
    fn test_recipient_catches_incoming_pass() {
        let mut s = state();
        s.players[5].state.position = Vector2D::new(10.0, 0.0);
        s.ball.set_position(Vector2D::new(9.2, 0.0));
        s.ball.set_velocity(Vector2D::new(6.0, 0.0));
        s.ball.intended_recipient = Some(s.players[5].player_id);

        let r = resolve_possession(&mut s, &cfg());
        assert_eq!(r, Resolution::Caught { index: 5, new_holder: true });
        assert_eq!(r.new_holder(), Some(5));
        assert!(s.players[5].has_ball());
        assert_eq!(s.holders_count(), 1);
        assert!(s.ball.intended_recipient.is_none());
        assert_eq!(s.ball.position(), Vector2D::new(10.0, 0.0));
        assert_eq!(s.ball.last_touched_by, Some(s.players[5].player_id));
        assert_eq!(s.ball.possessing_side, Some(Side::Home));
        assert_eq!(s.team_in_possession, Some(Side::Home));
    }

    #[test]
    fn test_ball_moving_away_is_not_caught() {
        let mut s = state();
        s.players[5].state.position = Vector2D::new(10.0, 0.0);
        s.ball.set_position(Vector2D::new(9.2, 0.0));
        s.ball.set_velocity(Vector2D::new(-6.0, 0.0));
        s.ball.intended_recipient = Some(s.players[5].player_id);
        s.players[2].state.has_ball = true;

        assert_eq!(resolve_possession(&mut s, &cfg()), Resolution::Free);
        assert_eq!(s.holders_count(), 0);
    }

    #[test]
    fn test_nearest_player_collects_slow_ball() {
        let mut s = state();
        s.players[3].state.position = Vector2D::new(0.9, 0.0);
        s.players[14].state.position = Vector2D::new(0.0, 0.6);
        s.ball.set_position(Vector2D::ZERO);
        s.ball.set_velocity(Vector2D::new(0.2, 0.0));

        let r = resolve_possession(&mut s, &cfg());
        assert_eq!(r, Resolution::Collected { index: 14, new_holder: true });
        assert_eq!(s.ball.possessing_side, Some(Side::Away));
        assert_eq!(s.last_possession_player_id, Some(s.players[14].player_id));
    }

    #[test]
    fn test_slow_ball_out_of_reach_stays_free() {
        let mut s = state();
        s.players[3].state.position = Vector2D::new(0.9, 0.0);
        s.ball.set_position(Vector2D::ZERO);
        s.ball.set_velocity(Vector2D::new(2.0, 0.0));
        assert_eq!(resolve_possession(&mut s, &cfg()), Resolution::Free);
    }

    #[test]
    fn test_continuing_dribbler_eases_ball_ahead() {
        let mut s = state();
        s.players[7].state.position = Vector2D::ZERO;
        s.players[7].state.velocity = Vector2D::new(4.0, 0.0);
        s.players[7].state.has_ball = true;
        s.ball.set_position(Vector2D::ZERO);
        s.ball.set_velocity(Vector2D::new(4.0, 0.0));

        let r = resolve_possession(&mut s, &cfg());
        assert_eq!(r, Resolution::Collected { index: 7, new_holder: false });
        assert!(r.new_holder().is_none());
        assert!((s.ball.position().x - 0.225).abs() < 1e-5);
        assert!((s.ball.velocity().x - 3.2).abs() < 1e-5);
    }

    #[test]
    fn test_stationary_holder_keeps_ball_at_feet() {
        let mut s = state();
        s.players[0].state.position = Vector2D::new(-47.5, 2.0);
        s.players[0].state.has_ball = true;
        s.ball.set_position(Vector2D::new(-47.5, 2.0));

        resolve_possession(&mut s, &cfg());
        assert!(s.players[0].has_ball());
        assert_eq!(s.ball.position(), Vector2D::new(-47.5, 2.0));
        assert_eq!(s.ball.velocity(), Vector2D::ZERO);
    }
}
