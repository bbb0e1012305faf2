//! Shared role-AI capability library
//!
//! 모든 역할이 쓰는 판단/이동 함수 모음.
//!
//! ## 구성
//! - 선수 조회: `teammates`, `opponents`, `player_by_id`
//! - 패스: `find_best_pass`, `pass_lane_quality`, `pass_power`, `execute_pass`
//! - 슈팅: `should_shoot`, `shot_angle_quality`, `execute_shot`
//! - 공 추적: `project_ball_intercept`, `move_to_receive_pass`, `pursue_loose_ball`
//! - 이동: `move_to_position` (intent tier → lane spacing → possession support)
//! - 수비: `defensive_position`, `should_press`

use super::{ActionOutcome, AiContext, PossessionChange};
use crate::engine::ball::BallState;
use crate::engine::config::{
    AttackPhase, EngineConfig, InterceptConfig, LooseBallConfig, PassingConfig,
};
use crate::engine::events::EventKind;
use crate::engine::pitch::Side;
use crate::engine::player_physics::MoveParams;
use crate::engine::player_state::{OffBallIntent, PassDecision, PassKind, PlayerMatchState};
use crate::engine::vector::Vector2D;
use crate::models::ratio;
use rand::Rng;

/// `log` target for every AI decision line.
pub const AI_TARGET: &str = "touchline::ai";

/// Debug-level decision trace: `decision!(me, "action", "k={} ...", v)`.
macro_rules! decision {
    ($me:expr, $action:expr) => {
        log::debug!(
            target: $crate::engine::behaviors::common::AI_TARGET,
            "[{:.2}s] {} {}",
            $me.match_time,
            $me,
            $action
        )
    };
    ($me:expr, $action:expr, $($arg:tt)+) => {
        log::debug!(
            target: $crate::engine::behaviors::common::AI_TARGET,
            "[{:.2}s] {} {} {}",
            $me.match_time,
            $me,
            $action,
            format_args!($($arg)+)
        )
    };
}
pub(crate) use decision;

// ============================================================================
// Lookups
// ============================================================================

pub fn teammates(
    players: &[PlayerMatchState],
    side: Side,
    me: u32,
) -> impl Iterator<Item = &PlayerMatchState> {
    players.iter().filter(move |p| p.side == side && p.player_id != me)
}

pub fn opponents(
    players: &[PlayerMatchState],
    side: Side,
) -> impl Iterator<Item = &PlayerMatchState> {
    players.iter().filter(move |p| p.side != side)
}

pub fn player_by_id(players: &[PlayerMatchState], id: Option<u32>) -> Option<&PlayerMatchState> {
    let id = id?;
    players.iter().find(|p| p.player_id == id)
}

/// Anyone on the pitch holding the ball; `me` is read from the live copy.
pub fn anyone_has_ball(me: &PlayerMatchState, players: &[PlayerMatchState]) -> bool {
    me.has_ball() || players.iter().any(|p| p.player_id != me.player_id && p.has_ball())
}

pub fn opponent_holder<'a>(
    players: &'a [PlayerMatchState],
    side: Side,
) -> Option<&'a PlayerMatchState> {
    opponents(players, side).find(|p| p.has_ball())
}

/// Ties count as closest.
pub fn is_closest_to_ball(
    me: &PlayerMatchState,
    players: &[PlayerMatchState],
    ball: Vector2D,
) -> bool {
    let mine = me.position().distance_to(ball);
    teammates(players, me.side, me.player_id).all(|p| p.position().distance_to(ball) >= mine)
}

pub fn nearest_opponent_distance(
    players: &[PlayerMatchState],
    side: Side,
    point: Vector2D,
) -> Option<f32> {
    opponents(players, side).map(|p| p.position().distance_to(point)).min_by(f32::total_cmp)
}

pub fn under_pressure(me: &PlayerMatchState, players: &[PlayerMatchState], radius: f32) -> bool {
    opponents(players, me.side).any(|p| p.position().distance_to(me.position()) < radius)
}

#[inline]
pub fn can_kick_ball(me: &PlayerMatchState, ball: &BallState, cfg: &EngineConfig) -> bool {
    me.position().distance_to(ball.position()) <= cfg.possession.max_control_distance
}

/// Uniform sample that tolerates an empty range.
pub fn uniform<R: Rng + ?Sized>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if hi > lo {
        rng.gen_range(lo..hi)
    } else {
        lo
    }
}

// ============================================================================
// Ball handling
// ============================================================================

/// Holder stands still with the ball at their feet.
pub fn shield_ball(me: &mut PlayerMatchState, ball: &mut BallState, reason: &str) {
    me.state.velocity = Vector2D::ZERO;
    ball.set_position(me.position());
    ball.set_velocity(Vector2D::ZERO);
    decision!(me, "shield", "reason={} tempo_hold={:.2}s", reason, me.hold_remaining());
}

/// Keep the ball glued to a dribbler moving at `velocity`.
pub fn carry_ball(me: &mut PlayerMatchState, ball: &mut BallState, velocity: Vector2D) {
    me.state.velocity = velocity;
    ball.set_position(me.position());
    ball.set_velocity(Vector2D::ZERO);
}

/// Holder too far from the ball to strike it walks back onto it.
pub fn move_closer_to_ball(me: &mut PlayerMatchState, ctx: &AiContext<'_>) -> bool {
    if can_kick_ball(me, ctx.ball, ctx.cfg) {
        return false;
    }
    let ball = ctx.ball.position();
    let speed = ctx.cfg.player_movement.attribute_speed(me.attributes.speed);
    me.state.velocity = (ball - me.position()).normalize() * speed;
    me.current_target = Some(ball);
    decision!(
        me,
        "move_to_ball",
        "distance={:.2}m control_limit={:.2}m",
        me.position().distance_to(ball),
        ctx.cfg.possession.max_control_distance
    );
    true
}

// ============================================================================
// Passing
// ============================================================================

/// 0..1 clearance of the straight lane `from → to`.
///
/// Only opponents whose projection falls between the endpoints count; each
/// one closer than `block_distance` to the line scales quality by
/// `perp / block_distance`.
pub fn pass_lane_quality<I>(from: Vector2D, to: Vector2D, opponents: I, block_distance: f32) -> f32
where
    I: IntoIterator<Item = Vector2D>,
{
    let lane = to - from;
    let length = lane.magnitude();
    if length < 0.1 {
        return 0.0;
    }
    let mut quality = 1.0;
    for opp in opponents {
        let rel = opp - from;
        let projection = rel.dot(lane) / (length * length);
        if !(0.0..=1.0).contains(&projection) {
            continue;
        }
        let perp = ((lane.y * rel.x - lane.x * rel.y) / length).abs();
        if perp < block_distance {
            quality *= perp / block_distance;
        }
    }
    quality
}

/// Kick speed for a pass of `distance` metres, eased so long balls stay below shot pace.
pub fn pass_power(distance: f32, passing_attr: u8, cfg: &PassingConfig) -> f32 {
    let accuracy = ratio(passing_attr);
    let min_speed = cfg.power_min_base + cfg.power_min_bonus * accuracy;
    let max_speed = cfg.power_max_base + cfg.power_max_bonus * accuracy;
    let eased = (distance / cfg.distance_norm).min(1.0).powf(cfg.easing_exponent);
    min_speed + (max_speed - min_speed) * eased
}

fn repeat_penalty(ball: &BallState, me: u32, mate: u32, cfg: &PassingConfig) -> f32 {
    let mut penalty = 0.0;
    if ball.recent_pass_pairs.back() == Some(&(mate, me)) {
        penalty += cfg.immediate_return_penalty;
    }
    if let Some(idx) = ball.recent_pass_pairs.iter().rev().position(|&pair| pair == (me, mate)) {
        penalty += (cfg.repeat_penalty_base - cfg.repeat_penalty_decay * idx as f32).max(0.0);
    }
    penalty
}

/// Best scored pass, or `None` when nothing clears the threshold.
pub fn find_best_pass(me: &PlayerMatchState, ctx: &AiContext<'_>) -> Option<PassDecision> {
    let cfg = &ctx.cfg.role.passing;
    let players = ctx.players;
    let goal = ctx.pitch.attacking_goal(me.side);
    let pressure =
        nearest_opponent_distance(players, me.side, me.position()).unwrap_or(f32::INFINITY);
    let pressed = pressure <= cfg.under_pressure_radius;
    let vision_scale = 0.55 + ratio(me.attributes.vision) * 0.45;
    let max_distance =
        cfg.max_distance_base + ratio(me.attributes.passing) * cfg.max_distance_bonus;
    let my_goal_distance = me.position().distance_to(goal);

    let mut best: Option<PassDecision> = None;
    for mate in teammates(players, me.side, me.player_id) {
        let distance = me.position().distance_to(mate.position());
        if distance > max_distance || distance < cfg.min_distance {
            continue;
        }
        let lane = pass_lane_quality(
            me.position(),
            mate.position(),
            opponents(players, me.side).map(|o| o.position()),
            cfg.lane_block_distance,
        );
        let gain = (my_goal_distance - mate.position().distance_to(goal)).max(0.0);
        let receiver_space =
            nearest_opponent_distance(players, me.side, mate.position()).unwrap_or(f32::INFINITY);

        let mut progress = gain / 50.0;
        let mut multiplier = 1.0;
        if gain <= cfg.progressive_gain_min && !pressed {
            multiplier *= 0.35;
        }
        if gain > cfg.progressive_gain_min {
            progress += (gain - cfg.progressive_gain_min) / 25.0 * cfg.progress_bonus_weight;
        }
        if receiver_space < cfg.space_release_threshold {
            multiplier *= 0.5;
        } else if pressed {
            multiplier *= 1.15;
        }
        progress *= multiplier;

        let distance_score = 1.0 - distance / max_distance;
        let score = (lane * cfg.lane_weight
            + distance_score * cfg.distance_weight
            + progress * cfg.progress_weight)
            * vision_scale
            - repeat_penalty(ctx.ball, me.player_id, mate.player_id, cfg);

        log::trace!(
            target: AI_TARGET,
            "{} pass option #{} s={:.2} lane={:.2} prog={:.1}",
            me,
            mate.player_id,
            score,
            lane,
            gain
        );
        if best.map_or(true, |b| score > b.score) {
            best = Some(PassDecision {
                target_id: mate.player_id,
                kind: PassKind::Progressive,
                power: pass_power(distance, me.attributes.passing, cfg),
                score,
                lane_quality: lane,
                lead_point: mate.position(),
            });
        }
    }

    match best {
        Some(b) if b.score > cfg.score_threshold => Some(b),
        _ => {
            decision!(me, "pass_candidates", "best=none thresh={:.2}", cfg.score_threshold);
            None
        }
    }
}

/// Strike the ball toward `pass.lead_point` with passing-scaled jitter.
/// Returns `false` (and changes nothing) when the ball is out of reach or the
/// kick is not authorised.
pub fn execute_pass(
    me: &PlayerMatchState,
    pass: &PassDecision,
    ctx: &mut AiContext<'_>,
    out: &mut ActionOutcome,
) -> bool {
    if !can_kick_ball(me, ctx.ball, ctx.cfg) {
        decision!(
            me,
            "pass_blocked",
            "target=#{} distance_to_ball={:.2}m",
            pass.target_id,
            me.position().distance_to(ctx.ball.position())
        );
        return false;
    }
    let inaccuracy = (1.0 - ratio(me.attributes.passing)) * ctx.cfg.role.passing.inaccuracy_max;
    let offset = Vector2D::new(
        uniform(ctx.rng, -inaccuracy, inaccuracy),
        uniform(ctx.rng, -inaccuracy, inaccuracy),
    );
    let direction = (pass.lead_point + offset - me.position()).normalize();
    if !ctx.ball.kick(direction, pass.power, me.player_id, ctx.time, Some(pass.target_id)) {
        return false;
    }
    out.possession = PossessionChange::Release;
    out.push_event(
        EventKind::Pass,
        format!("{} pass by {} to #{}", pass.kind.as_str(), me, pass.target_id),
    );
    decision!(
        me,
        "pass",
        "kind={} target=#{} power={:.1} offset=({:.2},{:.2})",
        pass.kind.as_str(),
        pass.target_id,
        pass.power,
        offset.x,
        offset.y
    );
    true
}

// ============================================================================
// Shooting
// ============================================================================

fn angle_between(pos: Vector2D, a: Vector2D, b: Vector2D) -> f32 {
    let v1 = (a - pos).normalize();
    let v2 = (b - pos).normalize();
    v1.dot(v2).clamp(-1.0, 1.0).acos().to_degrees()
}

/// Subtended angle to the posts, normalised so 30° or more is 1.0.
pub fn shot_angle_quality(pos: Vector2D, goal: Vector2D, goal_width: f32) -> f32 {
    let half = goal_width / 2.0;
    let left = Vector2D::new(goal.x, goal.y + half);
    let right = Vector2D::new(goal.x, goal.y - half);
    let total = (angle_between(pos, left, goal) + angle_between(pos, right, goal)).abs();
    (total / 30.0).min(1.0)
}

pub fn should_shoot(me: &PlayerMatchState, ctx: &mut AiContext<'_>) -> bool {
    let cfg = &ctx.cfg.role.shooting;
    let goal = ctx.pitch.attacking_goal(me.side);
    let distance = me.position().distance_to(goal);
    let shooting = ratio(me.attributes.shooting);
    let max_distance = cfg.max_distance_base + shooting * cfg.max_distance_bonus;
    if distance > max_distance {
        return false;
    }
    if distance > cfg.long_range_distance
        && shot_angle_quality(me.position(), goal, ctx.pitch.goal_width) < cfg.angle_threshold
    {
        return false;
    }
    let probability = (1.0 - distance / max_distance) * shooting * cfg.probability_scale;
    ctx.rng.gen::<f32>() < probability
}

fn point_to_segment_distance(point: Vector2D, start: Vector2D, end: Vector2D) -> f32 {
    let segment = end - start;
    let len_sq = segment.dot(segment);
    if len_sq <= 1e-9 {
        return point.distance_to(start);
    }
    let t = ((point - start).dot(segment) / len_sq).clamp(0.0, 1.0);
    point.distance_to(start + segment * t)
}

/// Shoot at the corner the keeper covers worst.
pub fn execute_shot(
    me: &PlayerMatchState,
    ctx: &mut AiContext<'_>,
    out: &mut ActionOutcome,
) -> bool {
    if !can_kick_ball(me, ctx.ball, ctx.cfg) {
        return false;
    }
    let cfg = &ctx.cfg.role.shooting;
    let goal = ctx.pitch.attacking_goal(me.side);
    let shooter = me.position();
    let half = ctx.pitch.goal_width / 2.0;
    let corners = [Vector2D::new(goal.x, half), Vector2D::new(goal.x, -half)];

    let keeper = opponents(ctx.players, me.side)
        .find(|p| p.role.is_goalkeeper())
        .or_else(|| {
            opponents(ctx.players, me.side).min_by(|a, b| {
                a.position().distance_to(goal).total_cmp(&b.position().distance_to(goal))
            })
        })
        .map(|p| p.position());
    let corner = match keeper {
        Some(gk) => {
            if point_to_segment_distance(gk, shooter, corners[1])
                > point_to_segment_distance(gk, shooter, corners[0])
            {
                corners[1]
            } else {
                corners[0]
            }
        }
        None => {
            if (corners[1].y - shooter.y).abs() > (corners[0].y - shooter.y).abs() {
                corners[1]
            } else {
                corners[0]
            }
        }
    };

    let accuracy = ratio(me.attributes.shooting);
    let inset = uniform(ctx.rng, 0.0, cfg.goal_offset_range * (1.0 - accuracy));
    let depth =
        cfg.corner_depth_bias + uniform(ctx.rng, 0.0, cfg.corner_depth_spread * (1.0 - accuracy));
    let target =
        Vector2D::new(corner.x + depth.copysign(corner.x), corner.y - inset.copysign(corner.y));
    let distance = shooter.distance_to(goal);
    let power = (distance * cfg.power_distance_scale + cfg.power_base).min(cfg.power_clamp)
        * (cfg.power_accuracy_base + accuracy * cfg.power_accuracy_scale);

    if !ctx.ball.kick((target - shooter).normalize(), power, me.player_id, ctx.time, None) {
        return false;
    }
    out.possession = PossessionChange::Release;
    out.push_event(EventKind::Shot, format!("SHOT by player {}", me.player_id));
    decision!(
        me,
        "shot",
        "dist={:.1}m power={:.1} target=({:.1}, {:.1})",
        distance,
        power,
        target.x,
        target.y
    );
    true
}

// ============================================================================
// Ball chasing
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterceptParams {
    pub min_ball_speed: f32,
    pub max_time: f32,
    pub time_step: f32,
    pub reaction_buffer: f32,
    pub fallback_fraction: f32,
    pub fallback_cap: f32,
}

impl InterceptParams {
    pub fn standard(cfg: &InterceptConfig) -> Self {
        Self {
            min_ball_speed: cfg.min_ball_speed,
            max_time: cfg.max_time,
            time_step: cfg.time_step,
            reaction_buffer: cfg.reaction_buffer,
            fallback_fraction: cfg.fallback_fraction,
            fallback_cap: cfg.fallback_cap,
        }
    }

    pub fn loose_ball(cfg: &InterceptConfig, loose: &LooseBallConfig) -> Self {
        Self {
            max_time: loose.intercept_max_time,
            reaction_buffer: loose.intercept_reaction_buffer,
            fallback_fraction: loose.intercept_fallback_fraction,
            fallback_cap: loose.intercept_fallback_cap,
            ..Self::standard(cfg)
        }
    }
}

/// Earliest sampled ball position the chaser can reach in time.
pub fn project_ball_intercept(
    chaser: Vector2D,
    ball_pos: Vector2D,
    ball_vel: Vector2D,
    chaser_speed: f32,
    p: InterceptParams,
) -> Vector2D {
    let speed = ball_vel.magnitude();
    if speed < p.min_ball_speed {
        return ball_pos;
    }
    if p.time_step > 0.0 {
        let steps = (p.max_time / p.time_step) as u32;
        for i in 1..=steps {
            let t = i as f32 * p.time_step;
            let future = ball_pos + ball_vel * t;
            if chaser.distance_to(future) <= chaser_speed * (t + p.reaction_buffer) {
                return future;
            }
        }
    }
    ball_pos + ball_vel.normalize() * (speed * p.fallback_fraction).min(p.fallback_cap)
}

/// Registered recipient runs onto the pass.
pub fn move_to_receive_pass(me: &mut PlayerMatchState, ctx: &mut AiContext<'_>) -> bool {
    if ctx.ball.intended_recipient != Some(me.player_id) {
        return false;
    }
    if me.has_ball() {
        ctx.ball.intended_recipient = None;
        return false;
    }
    let cfg = &ctx.cfg.role.receive_pass;
    let speed = ratio(me.attributes.speed);
    let chase = cfg.player_speed_base + speed * cfg.player_speed_attr_scale;
    let intercept = project_ball_intercept(
        me.position(),
        ctx.ball.position(),
        ctx.ball.velocity(),
        chase,
        InterceptParams::standard(&ctx.cfg.role.intercept),
    );
    let to_intercept = intercept - me.position();
    if to_intercept.magnitude() < cfg.stop_distance {
        me.state.velocity = Vector2D::ZERO;
        return true;
    }
    let move_speed = cfg.move_base_speed + speed * cfg.move_attr_scale;
    me.state.velocity = to_intercept.normalize() * move_speed;
    me.current_target = Some(intercept);
    decision!(me, "move_to_receive_pass", "intercept=({:.1}, {:.1})", intercept.x, intercept.y);
    true
}

/// Team's closest player chases an unaddressed, unowned ball.
pub fn pursue_loose_ball(me: &mut PlayerMatchState, ctx: &AiContext<'_>) -> bool {
    if ctx.ball.intended_recipient.is_some() || anyone_has_ball(me, ctx.players) {
        return false;
    }
    let ball_pos = ctx.ball.position();
    if !is_closest_to_ball(me, ctx.players, ball_pos) {
        return false;
    }
    let cfg = &ctx.cfg.role.loose_ball;
    let speed = ratio(me.attributes.speed);
    let chase = cfg.player_speed_base + speed * cfg.player_speed_attr_scale;
    let ball_vel = ctx.ball.velocity();
    let mut intercept = project_ball_intercept(
        me.position(),
        ball_pos,
        ball_vel,
        chase,
        InterceptParams::loose_ball(&ctx.cfg.role.intercept, cfg),
    );

    // never run back along the path of a ball that is already coming to us
    if ball_vel.magnitude() > 0.0 {
        let heading = ball_vel.normalize();
        let player_along = (me.position() - ball_pos).dot(heading);
        let intercept_along = (intercept - ball_pos).dot(heading);
        if player_along >= 0.0 && intercept_along > player_along {
            intercept = ball_pos + heading * player_along;
        }
    }

    let to_intercept = intercept - me.position();
    me.current_target = Some(intercept);
    if to_intercept.magnitude() < cfg.stop_distance {
        me.state.velocity = Vector2D::ZERO;
        return true;
    }
    let move_speed = cfg.move_base_speed + speed * cfg.move_attr_scale;
    me.state.velocity = to_intercept.normalize() * move_speed;
    decision!(me, "pursue_loose_ball", "ball_speed={:.2}mps", ball_vel.magnitude());
    true
}

// ============================================================================
// Movement
// ============================================================================

/// Steer toward `target` using the intent's speed tier.
///
/// Outfield targets are first pulled toward the formation lane and away
/// from crowding teammates, then nudged by possession support. Only velocity
/// and stamina change here; the match loop integrates position.
pub fn move_to_position(
    me: &mut PlayerMatchState,
    target: Vector2D,
    speed_attr: u8,
    ctx: &AiContext<'_>,
    intent: OffBallIntent,
) {
    let mv = &ctx.cfg.player_movement;
    let profile = mv.role_profiles.for_role(me.role);
    let r = ratio(speed_attr).clamp(0.0, 1.0);
    let speed_scale = mv.speed_scale_min + (mv.speed_scale_max - mv.speed_scale_min) * r;
    let accel_scale =
        mv.acceleration_scale_min + (mv.acceleration_scale_max - mv.acceleration_scale_min) * r;
    let decel_scale =
        mv.deceleration_scale_min + (mv.deceleration_scale_max - mv.deceleration_scale_min) * r;
    let jog = profile.jog_speed * speed_scale;
    let run = profile.run_speed * speed_scale;

    let (max_speed, scale) = match intent {
        OffBallIntent::Press => (profile.sprint_speed * speed_scale, mv.intent_press),
        OffBallIntent::Mark => (run, mv.intent_mark),
        OffBallIntent::Shape => (jog, mv.intent_shape),
        OffBallIntent::Support | OffBallIntent::Idle => {
            let blend = mv.intent_support_speed_blend.clamp(0.0, 1.0);
            (jog + (run - jog) * blend, mv.intent_support)
        }
    };
    let params = MoveParams {
        max_speed,
        acceleration: profile.acceleration * accel_scale * scale.accel,
        deceleration: profile.deceleration * decel_scale * scale.decel,
        arrive_radius: mv.arrive_radius * scale.arrive,
    };

    let mut adjusted = target;
    if !me.role.is_goalkeeper() {
        adjusted = apply_lane_spacing(me, adjusted, ctx);
    }
    adjusted = apply_possession_support(me, adjusted, ctx);

    me.current_target = Some(adjusted);
    if !me.has_ball() {
        me.off_ball_state = intent;
    }
    me.state.steer_towards(adjusted, ctx.dt, params, mv);
}

/// Pull toward the formation lane, push away from crowding teammates.
pub fn apply_lane_spacing(
    me: &PlayerMatchState,
    target: Vector2D,
    ctx: &AiContext<'_>,
) -> Vector2D {
    let cfg = &ctx.cfg.role.lane_spacing;
    let mut adjusted = target;
    if !me.has_ball() {
        adjusted = adjusted.lerp(me.role_position, cfg.lane_weight);
    }
    let mut separation = Vector2D::ZERO;
    for mate in teammates(ctx.players, me.side, me.player_id) {
        let offset = adjusted - mate.position();
        let distance = offset.magnitude();
        if distance < 1e-3 || distance >= cfg.min_spacing {
            continue;
        }
        let push = (cfg.min_spacing - distance) / cfg.min_spacing;
        separation += offset.normalize() * (push * cfg.min_spacing * cfg.separation_scale);
    }
    adjusted + separation
}

/// How far the ball has travelled from possessor to a same-team recipient, 0..1.
pub fn pass_progress_fraction(
    possessor: Option<&PlayerMatchState>,
    recipient: Option<&PlayerMatchState>,
    ball: Vector2D,
) -> f32 {
    let (Some(from), Some(to)) = (possessor, recipient) else {
        return 0.0;
    };
    if from.side != to.side {
        return 0.0;
    }
    let total = from.position().distance_to(to.position());
    if total <= 1e-3 {
        return 1.0;
    }
    (1.0 - ball.distance_to(to.position()) / total).clamp(0.0, 1.0)
}

/// Build-up, midfield or final third, from the side's point of view.
pub fn possession_phase(
    side: Side,
    ball: Vector2D,
    anchor: Option<&PlayerMatchState>,
    recipient: Option<&PlayerMatchState>,
    cfg: &EngineConfig,
) -> AttackPhase {
    let support = &cfg.role.possession_support;
    let mut anchor_x = ball.x;
    if let Some(a) = anchor.filter(|a| a.side == side) {
        anchor_x = a.position().x;
    }
    if let Some(r) = recipient.filter(|r| r.side == side) {
        let blend =
            support.release_recipient_window * pass_progress_fraction(anchor, Some(r), ball);
        anchor_x = anchor_x * (1.0 - blend) + r.position().x * blend;
    }
    let relative = anchor_x * side.attack_sign();
    if relative <= support.build_up_limit {
        AttackPhase::BuildUp
    } else if relative <= support.midfield_limit {
        AttackPhase::Midfield
    } else {
        AttackPhase::FinalThird
    }
}

/// Nudge an off-ball target forward while our side controls the ball.
pub fn apply_possession_support(
    me: &PlayerMatchState,
    target: Vector2D,
    ctx: &AiContext<'_>,
) -> Vector2D {
    if me.has_ball() {
        return target;
    }
    let players = ctx.players;
    let ball = ctx.ball.position();
    let recipient = player_by_id(players, ctx.ball.intended_recipient);
    let mut anchor = player_by_id(players, ctx.ball.last_touched_by).filter(|p| p.side == me.side);
    let team_controls = anchor.is_some() || ctx.team_in_possession == Some(me.side);
    if !team_controls {
        return target;
    }
    if anchor.is_none() {
        anchor = player_by_id(players, ctx.last_possession_player_id).filter(|p| p.side == me.side);
    }
    if anchor.map_or(false, |a| a.player_id == me.player_id) {
        return target;
    }

    let cfg = &ctx.cfg.role.possession_support;
    let phase = possession_phase(me.side, ball, anchor, recipient, ctx.cfg);
    let dir = me.side.attack_sign();
    let rel_target = target.x * dir;
    let rel_ball = ball.x * dir;
    let rel_possessor = anchor.map_or(rel_ball, |a| a.position().x * dir);

    let (rel_recipient, influence) = match recipient.filter(|r| r.side == me.side) {
        Some(r) => {
            let progress = pass_progress_fraction(anchor, Some(r), ball);
            (r.position().x * dir, cfg.release_recipient_window * progress)
        }
        None => (rel_possessor, 0.0),
    };
    let anchor_rel = rel_possessor * (1.0 - influence) + rel_recipient * influence;

    let profile = cfg.profiles.for_role(me.role).for_phase(phase);
    if profile.push <= 0.0 && profile.forward <= 0.0 {
        return target;
    }
    let gap = (anchor_rel - rel_target).max(0.0);
    let desired =
        rel_target + profile.push.min(gap * cfg.gap_weight + profile.push * cfg.push_bias);
    let max_forward = rel_ball + profile.forward;
    let min_forward = rel_ball - profile.trail;
    let mut new_rel = desired.min(max_forward).max(min_forward);
    if profile.forward > 0.0 {
        let ahead = if rel_ball < cfg.ahead_threshold {
            cfg.ahead_factor_low
        } else {
            cfg.ahead_factor_high
        };
        new_rel = new_rel.max(rel_ball + profile.forward * ahead).min(max_forward);
    }
    if new_rel <= rel_target + 1e-3 {
        return target;
    }
    Vector2D::new(new_rel * dir, target.y)
}

// ============================================================================
// Defending
// ============================================================================

/// Defensive line slot: slides with the ball's distance to our goal.
pub fn defensive_position(
    side: Side,
    own_goal: Vector2D,
    ball: Vector2D,
    base: Vector2D,
    cfg: &EngineConfig,
) -> Vector2D {
    let d = &cfg.role.defensive;
    let into_field = side.attack_sign();
    let ball_to_goal = (ball.x - own_goal.x).abs();
    let x = if ball_to_goal > d.far_threshold {
        base.x
    } else if ball_to_goal < d.close_threshold {
        own_goal.x + into_field * d.close_offset
    } else {
        let span = (d.far_threshold - d.close_threshold).max(1e-6);
        let t = (d.far_threshold - ball_to_goal) / span;
        base.x * (1.0 - t) + (own_goal.x + into_field * d.advanced_offset) * t
    };
    Vector2D::new(x, base.y + (ball.y - base.y) * d.y_pull_factor)
}

/// Fresh enough, close enough, and an opponent holds the ball.
pub fn should_press(me: &PlayerMatchState, ctx: &AiContext<'_>, stamina_threshold: f32) -> bool {
    if me.state.stamina < stamina_threshold {
        return false;
    }
    if me.position().distance_to(ctx.ball.position()) >= ctx.cfg.role.pressing.distance_threshold {
        return false;
    }
    opponent_holder(ctx.players, me.side).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::EngineConfig;

    #[test]
    fn test_lane_quality_scales_with_blocker_distance() {
        let from = Vector2D::new(0.0, 0.0);
        let to = Vector2D::new(20.0, 0.0);
        assert_eq!(pass_lane_quality(from, to, [], 5.0), 1.0);
        // behind the passer: ignored
        assert_eq!(pass_lane_quality(from, to, [Vector2D::new(-2.0, 0.5)], 5.0), 1.0);
        let q = pass_lane_quality(from, to, [Vector2D::new(10.0, 2.5)], 5.0);
        assert!((q - 0.5).abs() < 1e-5);
        assert_eq!(pass_lane_quality(from, from, [], 5.0), 0.0);
    }

    #[test]
    fn test_lane_quality_monotone_as_blocker_approaches() {
        let from = Vector2D::new(-10.0, 3.0);
        let to = Vector2D::new(12.0, -4.0);
        let lane = to - from;
        let normal = lane.perpendicular().normalize();
        let mid = from + lane * 0.4;
        let mut previous = -1.0;
        for step in 0..=20 {
            // offset shrinks from 6 m to 0
            let offset = 6.0 - step as f32 * 0.3;
            let q = pass_lane_quality(from, to, [mid + normal * offset], 5.0);
            if previous >= 0.0 {
                assert!(q <= previous + 1e-6, "q={q} prev={previous}");
            }
            previous = q;
        }
    }

    #[test]
    fn test_pass_power_eases_with_distance() {
        let cfg = PassingConfig::default();
        let short = pass_power(5.0, 70, &cfg);
        let long = pass_power(60.0, 70, &cfg);
        assert!(short < long);
        assert!((long - (13.0 + 5.5 * 0.7)).abs() < 1e-4);
        assert!(short > 2.8 + 2.5 * 0.7);
    }

    #[test]
    fn test_intercept_projection_and_fallback() {
        let p = InterceptParams::standard(&EngineConfig::default().role.intercept);
        // slow ball: stay on it
        let still = project_ball_intercept(
            Vector2D::ZERO,
            Vector2D::new(5.0, 0.0),
            Vector2D::new(0.1, 0.0),
            6.0,
            p,
        );
        assert_eq!(still, Vector2D::new(5.0, 0.0));
        // ball rolling toward a fast chaser is met early
        let met = project_ball_intercept(
            Vector2D::ZERO,
            Vector2D::new(10.0, 0.0),
            Vector2D::new(-5.0, 0.0),
            8.0,
            p,
        );
        assert!(met.x < 10.0 && met.x > 0.0);
        // unreachable: capped fallback along the heading
        let far = project_ball_intercept(
            Vector2D::new(0.0, 80.0),
            Vector2D::ZERO,
            Vector2D::new(30.0, 0.0),
            1.0,
            p,
        );
        assert!((far.x - 4.5).abs() < 1e-4);
    }

    #[test]
    fn test_angle_quality_prefers_central_positions() {
        let goal = Vector2D::new(52.5, 0.0);
        let central = shot_angle_quality(Vector2D::new(40.0, 0.0), goal, 7.32);
        let wide = shot_angle_quality(Vector2D::new(40.0, 25.0), goal, 7.32);
        assert!(central > wide);
        assert!(central <= 1.0);
    }

    #[test]
    fn test_defensive_position_zones() {
        let cfg = EngineConfig::default();
        let own_goal = Vector2D::new(-52.5, 0.0);
        let base = Vector2D::new(-35.0, -12.0);
        let far = defensive_position(Side::Home, own_goal, Vector2D::new(20.0, 0.0), base, &cfg);
        assert_eq!(far.x, -35.0);
        let ball = Vector2D::new(-40.0, 10.0);
        let close = defensive_position(Side::Home, own_goal, ball, base, &cfg);
        assert!((close.x - (-37.5)).abs() < 1e-4);
        assert!((close.y - (-12.0 + 22.0 * 0.2)).abs() < 1e-4);
        let away_goal = Vector2D::new(52.5, 0.0);
        let ball = Vector2D::new(40.0, 0.0);
        let away_close = defensive_position(Side::Away, away_goal, ball, base, &cfg);
        assert!((away_close.x - 37.5).abs() < 1e-4);
    }
}

#[cfg(all(test, feature = "proptest"))]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn lane_quality_never_increases_when_blocker_moves_closer(
            fx in -50.0f32..50.0, fy in -30.0f32..30.0,
            tx in -50.0f32..50.0, ty in -30.0f32..30.0,
            along in 0.05f32..0.95,
            far in 0.0f32..10.0,
            shrink in 0.0f32..1.0,
        ) {
            let from = Vector2D::new(fx, fy);
            let to = Vector2D::new(tx, ty);
            prop_assume!(from.distance_to(to) > 1.0);
            let lane = to - from;
            let normal = lane.perpendicular().normalize();
            let base = from + lane * along;
            let near = far * shrink;
            let q_far = pass_lane_quality(from, to, [base + normal * far], 5.0);
            let q_near = pass_lane_quality(from, to, [base + normal * near], 5.0);
            prop_assert!(q_near <= q_far + 1e-4);
            prop_assert!((0.0..=1.0).contains(&q_near));
        }
    }
}
