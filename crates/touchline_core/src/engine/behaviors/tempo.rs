//! Ball-carrier tempo: lateral probe, hold window, backpass and relief outlets.
//!
//! 미드필더와 공격수가 같은 흐름을 쓰고 [`TempoConfig`] 만 다르다.
//!
//! ```text
//! lane blocked ─▶ probe (space_move_until) ─▶ hold (tempo_hold_until) ─▶ backpass / dribble
//!                   │ loops += 1                                   ▲
//!                   └──── loops ≥ patience ─▶ forced release ──────┘
//! ```

use super::common::{
    decision, execute_pass, nearest_opponent_distance, opponents, pass_lane_quality, pass_power,
    shield_ball, teammates, uniform, under_pressure,
};
use super::{ActionOutcome, AiContext};
use crate::engine::config::{ForwardConfig, MidfielderConfig, TempoConfig};
use crate::engine::player_state::{PassDecision, PassKind, PlayerMatchState};
use crate::engine::vector::Vector2D;
use crate::models::ratio;
use rand::Rng;

/// At least `min_blockers` opponents inside the corridor toward `goal`.
pub fn forward_lane_blocked(
    me: &PlayerMatchState,
    ctx: &AiContext<'_>,
    goal: Vector2D,
    max_distance: f32,
    half_width: f32,
    min_blockers: u32,
) -> bool {
    let forward = goal - me.position();
    if forward.magnitude() <= 1e-5 {
        return false;
    }
    let axis = forward.normalize();
    let lateral = axis.perpendicular();
    let blockers = opponents(ctx.players, me.side)
        .filter(|opp| {
            let rel = opp.position() - me.position();
            let along = rel.dot(axis);
            along > 0.0 && along <= max_distance && rel.dot(lateral).abs() <= half_width
        })
        .count();
    blockers as u32 >= min_blockers
}

/// Lateral probe with the ball. Returns `true` while the probe is running.
pub fn move_to_support_space(
    me: &mut PlayerMatchState,
    ctx: &mut AiContext<'_>,
    tempo: &TempoConfig,
) -> bool {
    if under_pressure(me, ctx.players, tempo.hold_pressure_release_radius) {
        me.reset_space_move(true);
        return false;
    }
    if me.space_move_heading.is_some() && me.space_move_until <= me.match_time {
        me.space_probe_loops += 1;
        me.reset_space_move(false);
        decision!(me, "probe_complete", "loops={}", me.space_probe_loops);
        return false;
    }
    let heading = match me.space_move_heading {
        Some(h) => h,
        None => {
            let forward = ctx.pitch.attacking_goal(me.side) - me.position();
            if forward.magnitude() <= 1e-5 {
                return false;
            }
            let lateral = forward.perpendicular().normalize();
            let side = if ctx.rng.gen::<f32>() < 0.5 { 1.0 } else { -1.0 };
            let heading = lateral * side;
            me.space_move_heading = Some(heading);
            me.space_move_until = me.match_time + tempo.space_move_duration;
            decision!(
                me,
                "probe_space_move",
                "side={} duration={:.2}s",
                if side > 0.0 { "right" } else { "left" },
                tempo.space_move_duration
            );
            heading
        }
    };
    me.state.velocity = heading.normalize() * tempo.space_move_speed;
    ctx.ball.set_position(me.position());
    ctx.ball.set_velocity(Vector2D::ZERO);
    true
}

/// Start or continue a hold. `false` only while the retry cooldown runs.
pub fn begin_hold_window(
    me: &mut PlayerMatchState,
    ctx: &mut AiContext<'_>,
    tempo: &TempoConfig,
) -> bool {
    if me.tempo_hold_until > me.match_time {
        decision!(me, "hold_window_active", "remaining={:.2}s", me.hold_remaining());
    } else {
        if me.match_time < me.tempo_hold_cooldown_until {
            return false;
        }
        let duration = uniform(ctx.rng, tempo.hold_min_duration, tempo.hold_max_duration);
        me.tempo_hold_until = me.match_time + duration;
        me.tempo_hold_cooldown_until = me.tempo_hold_until + tempo.hold_retry_cooldown;
        decision!(me, "hold_window_start", "duration={:.2}s", duration);
    }
    me.reset_space_move(true);
    shield_ball(me, ctx.ball, "hold_window");
    true
}

/// Closest free defensive-role teammate straight behind the carrier.
pub fn select_backpass(
    me: &PlayerMatchState,
    ctx: &AiContext<'_>,
    tempo: &TempoConfig,
) -> Option<PassDecision> {
    let own_goal = ctx.pitch.own_goal(me.side);
    let back = (own_goal - me.position()).normalize();
    let lateral_axis = back.perpendicular();
    let block = ctx.cfg.role.passing.lane_block_distance;

    let mut best: Option<PassDecision> = None;
    let mut best_score = 0.0;
    for mate in teammates(ctx.players, me.side, me.player_id) {
        if !tempo.backpass_roles.contains(&mate.role) {
            continue;
        }
        let offset = mate.position() - me.position();
        let backward = offset.dot(back);
        if backward < tempo.backpass_min_offset || backward > tempo.backpass_max_distance {
            continue;
        }
        if offset.dot(lateral_axis).abs() > tempo.hold_lane_block_width * 1.5 {
            continue;
        }
        let blockers = opponents(ctx.players, me.side).map(|o| o.position());
        let lane = pass_lane_quality(me.position(), mate.position(), blockers, block);
        let nearest = nearest_opponent_distance(ctx.players, me.side, mate.position())
            .unwrap_or(tempo.backpass_space_divisor);
        let space = (nearest / tempo.backpass_space_divisor).min(1.0);
        let distance = me.position().distance_to(mate.position());
        let distance_score = 1.0 - (distance / tempo.backpass_max_distance).min(1.0);
        let score = lane * tempo.backpass_lane_weight + space * tempo.backpass_space_weight
            + distance_score * tempo.backpass_distance_weight;
        if score > best_score {
            best_score = score;
            best = Some(PassDecision {
                target_id: mate.player_id,
                kind: PassKind::Back,
                power: pass_power(distance, me.attributes.passing, &ctx.cfg.role.passing),
                score,
                lane_quality: lane,
                lead_point: mate.position(),
            });
        }
    }
    if best_score < tempo.backpass_score_threshold {
        decision!(me, "backpass_unavailable", "score={:.2}", best_score);
        return None;
    }
    best
}

pub fn attempt_backpass(
    me: &PlayerMatchState,
    ctx: &mut AiContext<'_>,
    tempo: &TempoConfig,
    out: &mut ActionOutcome,
) -> bool {
    match select_backpass(me, ctx, tempo) {
        Some(pass) => {
            decision!(me, "backpass_execute", "target=#{}", pass.target_id);
            execute_pass(me, &pass, ctx, out);
            true
        }
        None => false,
    }
}

/// How a teammate's position relative to goal feeds the relief score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReliefBias {
    /// Outlets nearer the attacking goal earn `progress`, others `support`.
    TowardGoal { progress: f32, support: f32 },
    /// Outlets nearer our own goal earn `progress`; nothing for the rest.
    Recycle { progress: f32 },
}

/// Weights for the lateral outlet pass taken under pressure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReliefScoring {
    pub min_distance: f32,
    pub max_distance: f32,
    pub lane_weight: f32,
    pub space_weight: f32,
    pub distance_weight: f32,
    pub bias: ReliefBias,
    pub score_threshold: f32,
    pub space_divisor: f32,
    pub nearest_default: f32,
    pub vision_base: f32,
    pub vision_scale: f32,
}

impl From<&ForwardConfig> for ReliefScoring {
    fn from(c: &ForwardConfig) -> Self {
        Self {
            min_distance: c.relief_min_distance,
            max_distance: c.relief_max_distance,
            lane_weight: c.relief_lane_weight,
            space_weight: c.relief_space_weight,
            distance_weight: c.relief_distance_weight,
            bias: ReliefBias::TowardGoal {
                progress: c.relief_progress_bonus,
                support: c.relief_support_bonus,
            },
            score_threshold: c.relief_score_threshold,
            space_divisor: c.relief_space_divisor,
            nearest_default: c.relief_nearest_default,
            vision_base: c.relief_vision_base,
            vision_scale: c.relief_vision_scale,
        }
    }
}

impl From<&MidfielderConfig> for ReliefScoring {
    fn from(c: &MidfielderConfig) -> Self {
        Self {
            min_distance: c.relief_min_distance,
            max_distance: c.relief_max_distance,
            lane_weight: c.relief_lane_weight,
            space_weight: c.relief_space_weight,
            distance_weight: c.relief_distance_weight,
            bias: ReliefBias::Recycle { progress: c.relief_progress_bonus },
            score_threshold: c.relief_score_threshold,
            space_divisor: c.relief_space_divisor,
            nearest_default: c.relief_nearest_default,
            vision_base: c.relief_vision_base,
            vision_scale: c.relief_vision_scale,
        }
    }
}

pub fn find_relief_pass(
    me: &PlayerMatchState,
    ctx: &AiContext<'_>,
    scoring: &ReliefScoring,
) -> Option<PassDecision> {
    let goal = ctx.pitch.attacking_goal(me.side);
    let own_goal = ctx.pitch.own_goal(me.side);
    let block = ctx.cfg.role.passing.lane_block_distance;
    let vision_factor = scoring.vision_base + ratio(me.attributes.vision) * scoring.vision_scale;

    let mut best: Option<PassDecision> = None;
    let mut best_score = 0.0;
    for mate in teammates(ctx.players, me.side, me.player_id) {
        let distance = me.position().distance_to(mate.position());
        if distance < scoring.min_distance || distance > scoring.max_distance {
            continue;
        }
        let blockers = opponents(ctx.players, me.side).map(|o| o.position());
        let lane = pass_lane_quality(me.position(), mate.position(), blockers, block);
        let nearest = nearest_opponent_distance(ctx.players, me.side, mate.position())
            .unwrap_or(scoring.nearest_default);
        let space = (nearest / scoring.space_divisor).min(1.0);
        let bonus = match scoring.bias {
            ReliefBias::TowardGoal { progress, support } => {
                if goal.distance_to(mate.position()) < goal.distance_to(me.position()) {
                    progress
                } else {
                    support
                }
            }
            ReliefBias::Recycle { progress } => {
                if own_goal.distance_to(mate.position()) < own_goal.distance_to(me.position()) {
                    progress
                } else {
                    0.0
                }
            }
        };
        let distance_score = 1.0 - distance / scoring.max_distance;
        let weighted = lane * scoring.lane_weight
            + space * scoring.space_weight
            + distance_score * scoring.distance_weight;
        let score = (weighted + bonus) * vision_factor;
        if score > best_score {
            best_score = score;
            best = Some(PassDecision {
                target_id: mate.player_id,
                kind: PassKind::Relief,
                power: pass_power(distance, me.attributes.passing, &ctx.cfg.role.passing),
                score,
                lane_quality: lane,
                lead_point: mate.position(),
            });
        }
    }
    decision!(
        me,
        "relief_candidates",
        "best={} score={:.2} thresh={:.2}",
        best.map(|b| format!("#{}", b.target_id)).unwrap_or_else(|| "none".to_string()),
        best_score,
        scoring.score_threshold
    );
    if best_score > scoring.score_threshold {
        best
    } else {
        None
    }
}

/// Forced release and deadline release flags for the current carrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReleaseState {
    pub forced: bool,
    pub window: bool,
}

impl ReleaseState {
    pub fn evaluate(
        me: &PlayerMatchState,
        tempo: &TempoConfig,
        has_option: bool,
        progress_gain: f32,
    ) -> Self {
        let forced = tempo.space_move_patience_loops > 0
            && me.space_probe_loops >= tempo.space_move_patience_loops;
        let window = has_option
            && me.tempo_hold_until > me.match_time
            && tempo.hold_force_release_time > 0.0
            && me.hold_remaining() <= tempo.hold_force_release_time
            && progress_gain >= tempo.hold_force_release_progress;
        Self { forced, window }
    }
}

/// Resolve an active hold. Returns `true` when the carrier should keep shielding.
pub fn settle_active_hold(
    me: &mut PlayerMatchState,
    ctx: &mut AiContext<'_>,
    release: ReleaseState,
    pass_viable: bool,
) -> bool {
    if me.tempo_hold_until <= me.match_time {
        return false;
    }
    if release.forced || release.window {
        let reason = if release.forced { "probe_patience" } else { "hold_patience" };
        decision!(me, "hold_window_cancel", "reason={} loops={}", reason, me.space_probe_loops);
        me.tempo_hold_until = 0.0;
        me.reset_space_move(release.forced);
        false
    } else if pass_viable {
        me.tempo_hold_until = 0.0;
        false
    } else {
        me.reset_space_move(false);
        shield_ball(me, ctx.ball, "tempo_hold_active");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::behaviors::RoleBehaviour;
    use crate::engine::ball::BallState;
    use crate::engine::config::EngineConfig;
    use crate::engine::pitch::{Pitch, Side};
    use crate::models::Role;
    use crate::test_fixtures::sample_player;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::sync::Arc;

    fn at(id: u32, role: Role, side: Side, x: f32, y: f32) -> PlayerMatchState {
        let team: Arc<str> = Arc::from(if side == Side::Home { "Reds" } else { "Blues" });
        let slot = Vector2D::new(x, y);
        let behaviour = RoleBehaviour::from_role(role);
        let player = sample_player(id, role, 70);
        let mut p = PlayerMatchState::new(&player, side, team, slot, behaviour);
        p.state.position = Vector2D::new(x, y);
        p
    }

    struct World {
        players: Vec<PlayerMatchState>,
        ball: BallState,
        rng: ChaCha8Rng,
        cfg: EngineConfig,
        pitch: Pitch,
    }

    impl World {
        fn new(players: Vec<PlayerMatchState>, ball_at: Vector2D) -> Self {
            let cfg = EngineConfig::deterministic();
            Self {
                players,
                ball: BallState::new(ball_at, cfg.ball_physics),
                rng: ChaCha8Rng::seed_from_u64(7),
                pitch: Pitch::new(&cfg.pitch),
                cfg,
            }
        }

        fn ctx(&mut self) -> AiContext<'_> {
            AiContext {
                players: &self.players,
                ball: &mut self.ball,
                rng: &mut self.rng,
                cfg: &self.cfg,
                pitch: &self.pitch,
                time: 10.0,
                dt: 0.1,
                team_in_possession: Some(Side::Home),
                last_possession_player_id: Some(9),
            }
        }
    }

    #[test]
    fn test_lane_blocked_needs_two_blockers_in_corridor() {
        let carrier = at(9, Role::CF, Side::Home, 20.0, 0.0);
        let mut world = World::new(
            vec![
                carrier.clone(),
                at(30, Role::CD, Side::Away, 26.0, 1.0),
                at(31, Role::CD, Side::Away, 28.0, -2.0),
                // outside the corridor
                at(32, Role::RD, Side::Away, 26.0, 10.0),
            ],
            carrier.position(),
        );
        let ctx = world.ctx();
        let goal = ctx.pitch.attacking_goal(Side::Home);
        assert!(forward_lane_blocked(&carrier, &ctx, goal, 12.0, 4.0, 2));
        assert!(!forward_lane_blocked(&carrier, &ctx, goal, 12.0, 4.0, 3));
    }

    #[test]
    fn test_probe_counts_loops_when_it_expires() {
        let mut me = at(9, Role::CF, Side::Home, 20.0, 0.0);
        me.match_time = 10.0;
        let mut world = World::new(vec![me.clone()], me.position());
        let tempo = world.cfg.role.forward.tempo.clone();
        let mut ctx = world.ctx();

        assert!(move_to_support_space(&mut me, &mut ctx, &tempo));
        let heading = me.space_move_heading.unwrap();
        // lateral to the goal direction
        assert!(heading.x.abs() < 1e-5);
        assert!((me.state.velocity.magnitude() - tempo.space_move_speed).abs() < 1e-4);

        me.match_time = me.space_move_until + 0.01;
        assert!(!move_to_support_space(&mut me, &mut ctx, &tempo));
        assert_eq!(me.space_probe_loops, 1);
        assert!(me.space_move_heading.is_none());
    }

    #[test]
    fn test_pressure_cancels_probe_and_history() {
        let mut me = at(9, Role::CF, Side::Home, 20.0, 0.0);
        me.space_probe_loops = 1;
        me.space_move_heading = Some(Vector2D::new(0.0, 1.0));
        let blocker = at(30, Role::CD, Side::Away, 21.0, 0.5);
        let mut world = World::new(vec![me.clone(), blocker], me.position());
        let tempo = world.cfg.role.forward.tempo.clone();
        let mut ctx = world.ctx();
        assert!(!move_to_support_space(&mut me, &mut ctx, &tempo));
        assert_eq!(me.space_probe_loops, 0);
    }

    #[test]
    fn test_hold_window_respects_cooldown() {
        let mut me = at(9, Role::CF, Side::Home, 20.0, 0.0);
        me.match_time = 10.0;
        let mut world = World::new(vec![me.clone()], me.position());
        let tempo = world.cfg.role.forward.tempo.clone();
        let mut ctx = world.ctx();

        assert!(begin_hold_window(&mut me, &mut ctx, &tempo));
        let until = me.tempo_hold_until;
        assert!(until >= 10.0 + tempo.hold_min_duration && until <= 10.0 + tempo.hold_max_duration);
        assert_eq!(me.tempo_hold_cooldown_until, until + tempo.hold_retry_cooldown);
        assert_eq!(me.state.velocity, Vector2D::ZERO);

        // hold expired, cooldown still running
        me.match_time = until + 0.1;
        assert!(!begin_hold_window(&mut me, &mut ctx, &tempo));
        me.match_time = me.tempo_hold_cooldown_until + 0.1;
        assert!(begin_hold_window(&mut me, &mut ctx, &tempo));
    }

    #[test]
    fn test_backpass_prefers_listed_roles_behind() {
        let me = at(9, Role::CF, Side::Home, 20.0, 0.0);
        let mut world = World::new(
            vec![
                me.clone(),
                // behind and central: valid
                at(6, Role::CM, Side::Home, 10.0, 1.0),
                // forward role: not a backpass role
                at(10, Role::LCF, Side::Home, 12.0, 0.0),
                // too wide
                at(7, Role::LM, Side::Home, 10.0, 15.0),
            ],
            me.position(),
        );
        let tempo = world.cfg.role.forward.tempo.clone();
        let ctx = world.ctx();
        let pass = select_backpass(&me, &ctx, &tempo).unwrap();
        assert_eq!(pass.target_id, 6);
        assert_eq!(pass.kind, PassKind::Back);
    }

    #[test]
    fn test_relief_bias_variants() {
        let me = at(9, Role::CM, Side::Home, 0.0, 0.0);
        let mut world = World::new(
            vec![
                me.clone(),
                at(4, Role::CD, Side::Home, -10.0, 5.0),
                at(10, Role::CF, Side::Home, 10.0, 5.0),
            ],
            me.position(),
        );
        let cfg = world.cfg.clone();
        let ctx = world.ctx();

        // symmetric outlets: the bonus decides
        let forward = find_relief_pass(&me, &ctx, &ReliefScoring::from(&cfg.role.forward)).unwrap();
        assert_eq!(forward.target_id, 10);
        let midfield_scoring = ReliefScoring::from(&cfg.role.midfielder);
        let midfield = find_relief_pass(&me, &ctx, &midfield_scoring).unwrap();
        assert_eq!(midfield.target_id, 4);
        assert_eq!(midfield.kind, PassKind::Relief);
    }

    #[test]
    fn test_release_state_flags() {
        let tempo = TempoConfig::default();
        let mut me = at(9, Role::CF, Side::Home, 20.0, 0.0);
        me.match_time = 10.0;
        me.tempo_hold_until = 10.4;
        let r = ReleaseState::evaluate(&me, &tempo, true, 3.0);
        assert!(r.window);
        assert!(!r.forced);
        assert!(!ReleaseState::evaluate(&me, &tempo, true, 1.0).window);
        me.space_probe_loops = tempo.space_move_patience_loops;
        assert!(ReleaseState::evaluate(&me, &tempo, false, 0.0).forced);
    }
}
