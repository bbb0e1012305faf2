//! Defender: play out, tackle, intercept, mark, hold the line.
//!
//! Flank only changes the shape adjustment:
//! - `Right` / `Left`: keep at least `fullback_min_width` from the centre line
//! - `Central`: own slot offset, shifted a fraction toward the ball

use super::common::{
    can_kick_ball, carry_ball, decision, defensive_position, execute_pass, find_best_pass,
    move_to_position, move_to_receive_pass, opponent_holder, opponents, pursue_loose_ball,
    teammates,
};
use super::{ActionOutcome, AiContext, Flank, PossessionChange};
use crate::engine::events::EventKind;
use crate::engine::player_state::{OffBallIntent, PlayerMatchState};
use crate::engine::vector::Vector2D;
use crate::models::ratio;
use rand::Rng;

pub fn decide(
    flank: Flank,
    me: &mut PlayerMatchState,
    ctx: &mut AiContext<'_>,
    out: &mut ActionOutcome,
) {
    if move_to_receive_pass(me, ctx) {
        return;
    }
    if pursue_loose_ball(me, ctx) {
        return;
    }
    if me.has_ball() {
        play_out_from_back(me, ctx, out);
        return;
    }
    if should_tackle(me, ctx) {
        attempt_tackle(me, ctx, out);
        return;
    }
    if should_intercept(me, ctx) {
        attempt_intercept(me, ctx);
        return;
    }
    if let Some(threat) = biggest_threat(me, ctx) {
        mark_opponent(me, threat, ctx);
        return;
    }
    let base = defensive_position(
        me.side,
        ctx.pitch.own_goal(me.side),
        ctx.ball.position(),
        me.role_position,
        ctx.cfg,
    );
    let target = adjust_for_flank(flank, me, base, ctx);
    let positioning = me.attributes.positioning;
    move_to_position(me, target, positioning, ctx, OffBallIntent::Shape);
}

fn play_out_from_back(me: &mut PlayerMatchState, ctx: &mut AiContext<'_>, out: &mut ActionOutcome) {
    if let Some(pass) = find_best_pass(me, ctx) {
        execute_pass(me, &pass, ctx, out);
        return;
    }
    let direction = (ctx.pitch.attacking_goal(me.side) - me.position()).normalize();
    carry_ball(me, ctx.ball, direction * ctx.cfg.role.defender.dribble_speed);
    decision!(me, "carry_out", "speed={:.1}", ctx.cfg.role.defender.dribble_speed);
}

fn should_tackle(me: &PlayerMatchState, ctx: &AiContext<'_>) -> bool {
    let d = &ctx.cfg.role.defender;
    if me.position().distance_to(ctx.ball.position()) > d.tackle_ball_distance {
        return false;
    }
    match opponent_holder(ctx.players, me.side) {
        Some(holder) => {
            let reach =
                d.tackle_range_base + ratio(me.attributes.tackling) * d.tackle_range_attr_scale;
            me.position().distance_to(holder.position()) < reach
        }
        None => false,
    }
}

fn attempt_tackle(me: &mut PlayerMatchState, ctx: &mut AiContext<'_>, out: &mut ActionOutcome) {
    let d = ctx.cfg.role.defender;
    let ball = ctx.ball.position();
    let speed = me.attributes.speed;
    move_to_position(me, ball, speed, ctx, OffBallIntent::Press);
    if me.position().distance_to(ball) >= d.tackle_success_distance {
        return;
    }
    let chance = ratio(me.attributes.tackling) * d.tackle_success_scale;
    if ctx.rng.gen::<f32>() >= chance {
        decision!(me, "tackle_missed", "chance={:.2}", chance);
        return;
    }
    if !can_kick_ball(me, ctx.ball, ctx.cfg) {
        return;
    }
    // winning the ball is a touch: the clearance is then ours to kick
    ctx.ball.last_touched_by = Some(me.player_id);
    ctx.ball.last_touched_time = ctx.time;
    let clear = (ball - ctx.pitch.own_goal(me.side)).normalize();
    if ctx.ball.kick(clear, d.clear_power, me.player_id, ctx.time, None) {
        out.possession = PossessionChange::Dispossess;
        out.push_event(EventKind::Tackle, format!("Tackle won by {}", me));
        decision!(me, "tackle_won", "clear=({:.2}, {:.2})", clear.x, clear.y);
    }
}

fn should_intercept(me: &PlayerMatchState, ctx: &AiContext<'_>) -> bool {
    let d = &ctx.cfg.role.defender;
    let speed = ctx.ball.speed();
    if speed < d.intercept_ball_speed_min {
        return false;
    }
    let distance = me.position().distance_to(ctx.ball.position());
    if distance > d.intercept_distance_limit {
        return false;
    }
    let speed_factor = ratio(me.attributes.speed).max(0.01);
    let time_to_reach = distance / (speed_factor * d.intercept_speed_scale);
    let future = ctx.ball.position() + ctx.ball.velocity() * time_to_reach;
    me.position().distance_to(future) < distance * d.intercept_improvement_factor
}

fn attempt_intercept(me: &mut PlayerMatchState, ctx: &AiContext<'_>) {
    let d = &ctx.cfg.role.defender;
    let distance = me.position().distance_to(ctx.ball.position());
    let player_speed = (ratio(me.attributes.speed) * d.intercept_speed_scale).max(0.1);
    let target = ctx.ball.position() + ctx.ball.velocity() * (distance / player_speed);
    let speed = me.attributes.speed;
    move_to_position(me, target, speed, ctx, OffBallIntent::Press);
    decision!(me, "intercept", "target=({:.1}, {:.1})", target.x, target.y);
}

/// Highest-scoring outfield opponent inside marking range.
pub fn biggest_threat<'p>(
    me: &PlayerMatchState,
    ctx: &AiContext<'p>,
) -> Option<&'p PlayerMatchState> {
    let d = &ctx.cfg.role.defender;
    let players: &'p [PlayerMatchState] = ctx.players;
    let own_goal = ctx.pitch.own_goal(me.side);
    let ball = ctx.ball.position();

    let mut best: Option<(&'p PlayerMatchState, f32)> = None;
    for opp in opponents(players, me.side) {
        if opp.role.is_goalkeeper() {
            continue;
        }
        let to_me = me.position().distance_to(opp.position());
        if to_me > d.threat_marking_range {
            continue;
        }
        let marked = teammates(players, me.side, me.player_id)
            .any(|t| t.position().distance_to(opp.position()) < d.threat_marked_distance);
        let ball_threat =
            (1.0 - opp.position().distance_to(ball) / d.threat_ball_distance).max(0.0);
        let goal_threat =
            (1.0 - opp.position().distance_to(own_goal) / d.threat_goal_distance).max(0.0);
        let unmarked = if marked { 0.0 } else { d.threat_unmarked_bonus };
        let proximity = (1.0 - to_me / d.threat_proximity_distance).max(0.0);
        let score = ball_threat * d.threat_ball_weight
            + goal_threat * d.threat_goal_weight
            + unmarked * d.threat_marking_weight
            + proximity * d.threat_proximity_weight;
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((opp, score));
        }
    }
    best.map(|(opp, _)| opp)
}

/// Goal-side of the opponent, nudged toward the ball when it is close.
pub fn marking_position(
    me: &PlayerMatchState,
    opponent: &PlayerMatchState,
    ctx: &AiContext<'_>,
) -> Vector2D {
    let d = &ctx.cfg.role.defender;
    let own_goal = ctx.pitch.own_goal(me.side);
    let ball = ctx.ball.position();
    let gap =
        d.marking_distance_base + ratio(me.attributes.positioning) * d.marking_distance_attr_scale;
    let mut target = opponent.position() + (own_goal - opponent.position()).normalize() * gap;
    if ball.distance_to(opponent.position()) < d.marking_ball_distance {
        target += (opponent.position() - ball).normalize() * d.marking_ball_adjustment;
    }
    target
}

fn mark_opponent(me: &mut PlayerMatchState, opponent: &PlayerMatchState, ctx: &AiContext<'_>) {
    let target = marking_position(me, opponent, ctx);
    decision!(me, "mark", "opponent=#{}", opponent.player_id);
    let speed_attr = ctx.cfg.role.defender.marking_speed_attr;
    move_to_position(me, target, speed_attr, ctx, OffBallIntent::Mark);
}

fn adjust_for_flank(
    flank: Flank,
    me: &PlayerMatchState,
    position: Vector2D,
    ctx: &AiContext<'_>,
) -> Vector2D {
    let d = &ctx.cfg.role.defender;
    let y = match flank {
        Flank::Right => position.y.min(-d.fullback_min_width),
        Flank::Left => position.y.max(d.fullback_min_width),
        Flank::Central => {
            let shift = (ctx.ball.position().y - position.y) * d.centreback_shift_factor;
            (me.role_position.y + shift).clamp(-d.centreback_max_width, d.centreback_max_width)
        }
    };
    Vector2D::new(position.x, y)
}
