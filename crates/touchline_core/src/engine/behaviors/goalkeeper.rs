//! Goalkeeper: save window, box sweeping, angle positioning, distribution.

use super::common::{
    decision, execute_pass, find_best_pass, move_to_position, move_to_receive_pass, opponents,
    pursue_loose_ball, shield_ball,
};
use super::{ActionOutcome, AiContext, PossessionChange};
use crate::engine::events::EventKind;
use crate::engine::player_state::{OffBallIntent, PlayerMatchState};
use crate::engine::vector::Vector2D;
use crate::models::ratio;

pub fn decide(me: &mut PlayerMatchState, ctx: &mut AiContext<'_>, out: &mut ActionOutcome) {
    if move_to_receive_pass(me, ctx) {
        return;
    }
    if me.has_ball() {
        distribute(me, ctx, out);
        return;
    }
    if ball_is_dangerous(me, ctx) {
        attempt_save(me, ctx, out);
        return;
    }
    if pursue_loose_ball(me, ctx) {
        return;
    }
    if should_collect(me, ctx) {
        collect(me, ctx, out);
        return;
    }
    position_for_shot(me, ctx);
}

/// Where and when an incoming ball crosses the keeper's plane, if it is a threat.
pub fn save_window(me: &PlayerMatchState, ctx: &AiContext<'_>) -> Option<(Vector2D, f32)> {
    let gk = &ctx.cfg.role.goalkeeper;
    let ball_pos = ctx.ball.position();
    let ball_vel = ctx.ball.velocity();
    if ball_vel.magnitude() < gk.save_min_ball_speed {
        return None;
    }
    let goal = ctx.pitch.own_goal(me.side);
    if ball_vel.normalize().dot(goal - ball_pos) <= 0.0 {
        return None;
    }
    let goal_sign = -me.side.attack_sign();
    let forward_speed = ball_vel.x * goal_sign;
    if forward_speed <= gk.save_forward_speed_threshold {
        return None;
    }
    let distance_to_plane = (me.position().x - ball_pos.x) * goal_sign;
    if distance_to_plane < -gk.save_plane_buffer {
        return None;
    }
    let eta = distance_to_plane / forward_speed;
    if !(0.0..=gk.save_time_horizon).contains(&eta) {
        return None;
    }
    let intercept = ball_pos + ball_vel * eta;
    if (intercept.y - goal.y).abs() > ctx.pitch.goal_width / 2.0 + gk.save_post_buffer {
        return None;
    }
    if (intercept.x - goal.x).abs() > ctx.pitch.penalty_area_depth + gk.save_box_buffer {
        return None;
    }
    Some((intercept, eta))
}

fn ball_is_dangerous(me: &mut PlayerMatchState, ctx: &AiContext<'_>) -> bool {
    match save_window(me, ctx) {
        Some((target, eta)) => {
            me.pending_save_target = Some(target);
            me.pending_save_eta = eta;
            true
        }
        None => {
            me.clear_pending_save();
            false
        }
    }
}

fn attempt_save(me: &mut PlayerMatchState, ctx: &mut AiContext<'_>, out: &mut ActionOutcome) {
    let gk = ctx.cfg.role.goalkeeper;
    let (target, eta) = match save_window(me, ctx) {
        Some((target, eta)) => {
            me.pending_save_target = Some(target);
            me.pending_save_eta = eta;
            (target, eta)
        }
        None => {
            let target = me
                .pending_save_target
                .unwrap_or_else(|| ctx.ball.position() + ctx.ball.velocity() * 0.2);
            let eta = if me.pending_save_eta.is_finite() {
                (me.pending_save_eta - ctx.dt).max(0.0)
            } else {
                0.2
            };
            me.pending_save_eta = eta;
            (target, eta)
        }
    };

    let mv = &ctx.cfg.player_movement;
    let speed_factor = mv.base_multiplier + ratio(me.attributes.speed) * mv.attribute_multiplier;
    let max_speed = mv.base_speed * speed_factor * mv.sprint_multiplier;
    let travel = me.position().distance_to(target);
    let reachable = max_speed * (eta.max(ctx.dt) + gk.reach_reaction_buffer);
    let can_reach = travel <= reachable + gk.reach_distance_buffer;

    let speed = me.attributes.speed;
    move_to_position(me, target, speed, ctx, OffBallIntent::Press);
    let distance = me.position().distance_to(ctx.ball.position());
    let success = distance < gk.success_distance || (can_reach && eta <= gk.success_eta_threshold);

    let log_window = eta <= gk.log_eta_threshold || success;
    if log_window && (success || ctx.time - me.last_save_log_time > 0.25) {
        let reason = if success {
            "secured"
        } else if !can_reach {
            "unreachable_window"
        } else {
            "distance_too_large"
        };
        let mut detail = format!(
            "GK {} save attempt {}: distance={:.2}m ball_speed={:.2}m/s",
            me.player_id,
            if success { "success" } else { "failed" },
            distance,
            ctx.ball.speed()
        );
        if !success {
            detail.push_str(&format!(" threshold={:.2}m eta={:.2}s", gk.success_distance, eta));
        }
        detail.push_str(&format!(" reason={}", reason));
        out.push_event(EventKind::SaveAttempt, detail);
        me.last_save_log_time = ctx.time;
    }

    if success {
        if can_reach {
            me.state.position = target;
            ctx.ball.set_position(target);
        }
        me.state.velocity = Vector2D::ZERO;
        ctx.ball.set_velocity(Vector2D::ZERO);
        ctx.ball.last_touched_by = Some(me.player_id);
        ctx.ball.last_touched_time = ctx.time;
        ctx.ball.intended_recipient = None;
        me.clear_pending_save();
        out.possession = PossessionChange::Claim;
        decision!(me, "save", "teleport={} eta={:.2}s", can_reach, eta);
    }
}

fn should_collect(me: &PlayerMatchState, ctx: &AiContext<'_>) -> bool {
    let gk = &ctx.cfg.role.goalkeeper;
    let goal = ctx.pitch.own_goal(me.side);
    let ball = ctx.ball.position();
    let in_box = (ball.x - goal.x).abs() < ctx.pitch.penalty_area_depth
        && (ball.y - goal.y).abs() < ctx.pitch.penalty_area_width / 2.0;
    if !in_box || ctx.ball.speed() > gk.collect_speed_threshold {
        return false;
    }
    let safe = gk.collect_safe_distance_base
        + ratio(me.attributes.decisions) * gk.collect_safe_distance_attr_scale;
    opponents(ctx.players, me.side).all(|opp| opp.position().distance_to(ball) >= safe)
}

fn collect(me: &mut PlayerMatchState, ctx: &mut AiContext<'_>, out: &mut ActionOutcome) {
    let ball = ctx.ball.position();
    let speed = me.attributes.speed;
    move_to_position(me, ball, speed, ctx, OffBallIntent::Press);
    if me.position().distance_to(ball) < ctx.cfg.role.goalkeeper.collect_success_distance {
        ctx.ball.set_velocity(Vector2D::ZERO);
        out.possession = PossessionChange::Claim;
        decision!(me, "collect");
    }
}

/// Bisect the shooting angle a few metres off the line.
pub fn shot_stopping_position(me: &PlayerMatchState, ctx: &AiContext<'_>) -> Vector2D {
    let gk = &ctx.cfg.role.goalkeeper;
    let goal = ctx.pitch.own_goal(me.side);
    let ball = ctx.ball.position();
    let to_ball = (ball - goal).normalize();
    let depth = gk.positioning_distance_base
        + ratio(me.attributes.positioning) * gk.positioning_distance_attr_scale;
    let into_field = me.side.attack_sign();
    let mut x = goal.x + to_ball.x * depth;
    if (x - goal.x) * into_field < gk.positioning_min_offset {
        x = goal.x + into_field * gk.positioning_min_offset;
    }
    let y = (goal.y + (ball.y - goal.y) * gk.positioning_angle_factor)
        .clamp(-gk.positioning_max_lateral, gk.positioning_max_lateral);
    Vector2D::new(x, y)
}

fn position_for_shot(me: &mut PlayerMatchState, ctx: &AiContext<'_>) {
    let target = shot_stopping_position(me, ctx);
    let speed_attr = ctx.cfg.role.goalkeeper.positioning_speed_attr;
    move_to_position(me, target, speed_attr, ctx, OffBallIntent::Shape);
}

fn distribute(me: &mut PlayerMatchState, ctx: &mut AiContext<'_>, out: &mut ActionOutcome) {
    match find_best_pass(me, ctx) {
        Some(pass) => {
            execute_pass(me, &pass, ctx, out);
        }
        // nothing on: keep it and wait for runners
        None => shield_ball(me, ctx.ball, "no_distribution_option"),
    }
}
