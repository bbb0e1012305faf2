//! Forward: finish, carry at goal, release under pressure, make runs.
//!
//! ## 공 소유 시 우선순위
//! 1. shoot (inside `shoot_distance_threshold`)
//! 2. progressive / forced / deadline pass
//! 3. open lane → dribble at goal
//! 4. blocked + pressure → relief, backpass, dribble
//! 5. blocked, free → probe, hold, backpass, dribble

use super::common::{
    anyone_has_ball, decision, execute_pass, execute_shot, find_best_pass, move_closer_to_ball,
    move_to_position, move_to_receive_pass, opponent_holder, opponents, player_by_id,
    project_ball_intercept, pursue_loose_ball, should_shoot, teammates, under_pressure, uniform,
    InterceptParams,
};
use super::tempo::{
    attempt_backpass, begin_hold_window, find_relief_pass, forward_lane_blocked,
    move_to_support_space, settle_active_hold, ReleaseState, ReliefScoring,
};
use super::{ActionOutcome, AiContext, Flank};
use crate::engine::config::{EngineConfig, ForwardConfig};
use crate::engine::player_state::{OffBallIntent, PlayerMatchState};
use crate::engine::vector::Vector2D;
use crate::models::{ratio, Role};

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
        attack_with_ball(me, ctx, out);
        return;
    }
    if ctx.ball.possessing_side == Some(me.side) {
        make_attacking_run(flank, me, ctx);
        return;
    }
    let cfg: &EngineConfig = ctx.cfg;
    if !anyone_has_ball(me, ctx.players)
        && ctx.ball.speed() > cfg.role.forward.loose_intercept_speed
    {
        intercept_loose_ball(me, ctx);
        return;
    }
    if let Some(target) = defender_to_press(me, ctx) {
        let speed = me.attributes.speed;
        decision!(me, "press_defender");
        move_to_position(me, target, speed, ctx, OffBallIntent::Press);
        return;
    }
    hold_position(me, ctx);
}

fn attack_with_ball(me: &mut PlayerMatchState, ctx: &mut AiContext<'_>, out: &mut ActionOutcome) {
    if move_closer_to_ball(me, ctx) {
        return;
    }
    let cfg: &EngineConfig = ctx.cfg;
    let f = &cfg.role.forward;
    let tempo = &f.tempo;
    let goal = ctx.pitch.attacking_goal(me.side);
    let distance_to_goal = me.position().distance_to(goal);
    let pressured = under_pressure(me, ctx.players, f.pressure_radius);

    if distance_to_goal < f.shoot_distance_threshold {
        if should_shoot(me, ctx) {
            me.reset_space_move(true);
            execute_shot(me, ctx, out);
            return;
        }
    } else {
        decision!(me, "skip_shoot_check", "dist={:.1}m", distance_to_goal);
    }

    let best = find_best_pass(me, ctx);
    let progress_gain = best.map_or(0.0, |p| distance_to_goal - p.lead_point.distance_to(goal));
    let release = ReleaseState::evaluate(me, tempo, best.is_some(), progress_gain);
    let pass_viable = best.is_some()
        && (progress_gain >= tempo.pass_progress_break_threshold
            || (pressured && me.attributes.vision >= f.vision_pressure_release_threshold)
            || release.forced
            || release.window);

    if settle_active_hold(me, ctx, release, pass_viable) {
        return;
    }
    if pass_viable {
        if let Some(pass) = best {
            decision!(
                me,
                "execute_pass",
                "target=#{} progress={:.1}m",
                pass.target_id,
                progress_gain
            );
            me.reset_space_move(true);
            execute_pass(me, &pass, ctx, out);
            return;
        }
    }

    let blocked = forward_lane_blocked(
        me,
        ctx,
        goal,
        tempo.hold_lane_block_distance,
        tempo.hold_lane_block_width,
        tempo.hold_blocker_count,
    );
    if !blocked {
        decision!(me, "dribble_lane_clear");
        dribble_at_goal(me, ctx, out);
        return;
    }

    let relief = ReliefScoring::from(f);
    if pressured {
        if let Some(pass) = find_relief_pass(me, ctx, &relief) {
            me.reset_space_move(true);
            execute_pass(me, &pass, ctx, out);
            return;
        }
        if attempt_backpass(me, ctx, tempo, out) {
            me.reset_space_move(true);
            return;
        }
        dribble_at_goal(me, ctx, out);
        return;
    }

    if move_to_support_space(me, ctx, tempo) {
        return;
    }
    if begin_hold_window(me, ctx, tempo) {
        return;
    }
    if attempt_backpass(me, ctx, tempo, out) {
        me.reset_space_move(true);
        return;
    }
    decision!(me, "dribble_default", "lane_blocked={}", blocked);
    dribble_at_goal(me, ctx, out);
}

fn dribble_at_goal(me: &mut PlayerMatchState, ctx: &mut AiContext<'_>, out: &mut ActionOutcome) {
    me.reset_space_move(true);
    let cfg: &EngineConfig = ctx.cfg;
    let f = &cfg.role.forward;
    let goal = ctx.pitch.attacking_goal(me.side);
    let dribbling = ratio(me.attributes.dribbling);

    if under_pressure(me, ctx.players, f.pressure_radius)
        && me.attributes.dribbling < f.pressure_dribble_threshold
    {
        if let Some(pass) = find_relief_pass(me, ctx, &ReliefScoring::from(f)) {
            decision!(me, "relief_pass", "target=#{} context=dribble_pressure", pass.target_id);
            execute_pass(me, &pass, ctx, out);
            return;
        }
        let heading = escape_direction(me, ctx, f);
        let speed = f.dribble_pressure_base + dribbling * f.dribble_pressure_attr_scale;
        me.state.velocity = heading * speed;
        decision!(me, "dribble_escape", "speed={:.2}", speed);
    } else {
        let speed = f.dribble_speed_base + dribbling * f.dribble_speed_attr_scale;
        me.state.velocity = (goal - me.position()).normalize() * speed;
        decision!(me, "dribble_goal", "speed={:.2}", speed);
    }

    // 공은 진행 방향 앞쪽으로 끌려간다
    let velocity = me.state.velocity;
    if velocity.magnitude() > 0.0 {
        let ahead = me.position() + velocity.normalize() * f.dribble_control_offset;
        let pos = ctx.ball.position().lerp(ahead, 0.6);
        ctx.ball.set_position(pos);
        ctx.ball.set_velocity(velocity * f.dribble_velocity_blend);
    } else {
        ctx.ball.set_position(me.position());
        ctx.ball.set_velocity(Vector2D::ZERO);
    }
}

/// Compass heading with the fewest opponents in front of it.
pub fn escape_direction(me: &PlayerMatchState, ctx: &AiContext<'_>, f: &ForwardConfig) -> Vector2D {
    let step = f.escape_angle_step.clamp(1, 360);
    let mut best = Vector2D::new(1.0, 0.0);
    let mut max_space = f32::NEG_INFINITY;
    for angle in (0..360).step_by(step as usize) {
        let direction = Vector2D::from_degrees(angle as f32);
        let crowding: f32 = opponents(ctx.players, me.side)
            .map(|opp| opp.position() - me.position())
            .filter(|to_opp| to_opp.dot(direction) > 0.0)
            .map(|to_opp| f.escape_opponent_scale / to_opp.magnitude().max(1.0))
            .sum();
        let space = f.escape_base_space - crowding;
        if space > max_space {
            max_space = space;
            best = direction;
        }
    }
    best
}

/// Run target before the flank adjustment: goal-biased, onside, on the pitch.
pub fn attacking_space(me: &PlayerMatchState, ctx: &AiContext<'_>) -> Vector2D {
    let f = &ctx.cfg.role.forward;
    let goal = ctx.pitch.attacking_goal(me.side);
    let ball = ctx.ball.position();
    let mut x = goal.x * f.run_goal_weight + ball.x * f.run_ball_weight;

    let deepest = opponents(ctx.players, me.side)
        .filter(|o| !o.role.is_goalkeeper())
        .map(|o| o.position().x)
        .fold(goal.x, |deepest, ox| {
            if (ox - goal.x).abs() < (deepest - goal.x).abs() {
                ox
            } else {
                deepest
            }
        });
    x = if me.side.attack_sign() > 0.0 {
        x.min(deepest - f.onside_margin)
    } else {
        x.max(deepest + f.onside_margin)
    };

    let max_x = ctx.pitch.half_width() - 2.0;
    let max_y = ctx.pitch.half_height() - 2.0;
    let clamped = x.clamp(-max_x, max_x);
    if (clamped - x).abs() > 0.1 {
        decision!(me, "clamp_run_target", "unclamped={:.1} clamped={:.1}", x, clamped);
    }
    Vector2D::new(clamped, ball.y.clamp(-max_y, max_y))
}

/// Central forwards stay narrow; wide forwards hold the touchline or cut in.
pub fn adjust_run_for_flank(
    flank: Flank,
    position: Vector2D,
    ball: Vector2D,
    f: &ForwardConfig,
) -> Vector2D {
    let y = match flank {
        Flank::Central => {
            (position.y * f.centre_adjust_factor).clamp(-f.centre_max_width, f.centre_max_width)
        }
        Flank::Left => {
            if ball.y < 0.0 {
                position.y.max(f.wide_min_offset).min(f.wide_max_width)
            } else {
                position.y * f.cut_inside_factor
            }
        }
        Flank::Right => {
            if ball.y > 0.0 {
                position.y.min(-f.wide_min_offset).max(-f.wide_max_width)
            } else {
                position.y * f.cut_inside_factor
            }
        }
    };
    Vector2D::new(position.x, y)
}

fn make_attacking_run(flank: Flank, me: &mut PlayerMatchState, ctx: &AiContext<'_>) {
    let f = &ctx.cfg.role.forward;
    let raw = attacking_space(me, ctx);

    let carrier = teammates(ctx.players, me.side, me.player_id).find(|p| p.has_ball());
    let mut sprint = carrier
        .map_or(false, |c| c.position().distance_to(me.position()) < f.run_ballcarrier_distance);
    if let Some(recipient) = player_by_id(ctx.players, ctx.ball.intended_recipient) {
        if recipient.side == me.side {
            if recipient.player_id == me.player_id {
                sprint = true;
            } else if recipient.position().distance_to(me.position())
                < f.run_ballcarrier_distance * 0.8
            {
                sprint = true;
            }
        }
    }

    let target = adjust_run_for_flank(flank, raw, ctx.ball.position(), f);
    let intent =
        if sprint && carrier.is_some() { OffBallIntent::Press } else { OffBallIntent::Support };
    let speed = me.attributes.speed;
    decision!(me, "attacking_run", "target=({:.1}, {:.1}) sprint={}", target.x, target.y, sprint);
    move_to_position(me, target, speed, ctx, intent);
}

fn intercept_loose_ball(me: &mut PlayerMatchState, ctx: &AiContext<'_>) {
    let chase = ctx.cfg.player_movement.attribute_speed(me.attributes.speed);
    let target = project_ball_intercept(
        me.position(),
        ctx.ball.position(),
        ctx.ball.velocity(),
        chase,
        InterceptParams::standard(&ctx.cfg.role.intercept),
    );
    let speed = me.attributes.speed;
    decision!(me, "intercept", "target=({:.1}, {:.1})", target.x, target.y);
    move_to_position(me, target, speed, ctx, OffBallIntent::Press);
}

/// Position of a back-line opponent on the ball within pressing range.
fn defender_to_press(me: &PlayerMatchState, ctx: &AiContext<'_>) -> Option<Vector2D> {
    let holder = opponent_holder(ctx.players, me.side)?;
    if !matches!(holder.role, Role::GK | Role::CD | Role::LD | Role::RD) {
        return None;
    }
    let distance = holder.position().distance_to(me.position());
    (distance < ctx.cfg.role.forward.pressing_distance).then(|| holder.position())
}

fn hold_position(me: &mut PlayerMatchState, ctx: &mut AiContext<'_>) {
    let jitter = ctx.cfg.role.forward.hold_position_jitter;
    let offset =
        Vector2D::new(uniform(ctx.rng, -jitter, jitter), uniform(ctx.rng, -jitter, jitter));
    let target = me.role_position + offset;
    let positioning = me.attributes.positioning;
    move_to_position(me, target, positioning, ctx, OffBallIntent::Shape);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ball::BallState;
    use crate::engine::behaviors::{PossessionChange, RoleBehaviour};
    use crate::engine::pitch::{Pitch, Side};
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
        p.match_time = 10.0;
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
                rng: ChaCha8Rng::seed_from_u64(11),
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
                dt: 0.05,
                team_in_possession: Some(Side::Home),
                last_possession_player_id: None,
            }
        }

        fn decide(&mut self, me: &mut PlayerMatchState) -> ActionOutcome {
            let behaviour = me.behaviour;
            let mut ctx = self.ctx();
            behaviour.decide_action(me, &mut ctx)
        }
    }

    /// Striker on the ball with a hold running and one teammate nearby.
    fn holding_striker(loops: u32, hold_left: f32) -> (World, PlayerMatchState) {
        let mut cf = at(9, Role::CF, Side::Home, 20.0, 0.0);
        cf.state.has_ball = true;
        cf.space_probe_loops = loops;
        cf.tempo_hold_until = cf.match_time + hold_left;
        let mate = at(10, Role::LCF, Side::Home, 25.0, 8.0);
        let world = World::new(vec![cf.clone(), mate], Vector2D::new(20.0, 0.0));
        (world, cf)
    }

    #[test]
    fn test_forced_release_passes_after_patience() {
        let (mut world, mut cf) = holding_striker(2, 1.0);
        let out = world.decide(&mut cf);
        assert_eq!(out.possession, PossessionChange::Release);
        assert_eq!(world.ball.intended_recipient, Some(10));
        assert_eq!(cf.tempo_hold_until, 0.0);
        assert_eq!(cf.space_probe_loops, 0);
    }

    #[test]
    fn test_hold_keeps_shielding_without_release() {
        let (mut world, mut cf) = holding_striker(0, 1.0);
        let out = world.decide(&mut cf);
        assert_eq!(out.possession, PossessionChange::None);
        assert_eq!(cf.state.velocity, Vector2D::ZERO);
        assert_eq!(world.ball.velocity(), Vector2D::ZERO);
        assert!(cf.tempo_hold_until > cf.match_time);
    }

    #[test]
    fn test_hold_deadline_releases_progressive_pass() {
        let (mut world, mut cf) = holding_striker(0, 0.4);
        let out = world.decide(&mut cf);
        assert_eq!(out.possession, PossessionChange::Release);
        assert_eq!(world.ball.intended_recipient, Some(10));
    }

    #[test]
    fn test_open_lane_carries_ball_ahead() {
        let mut cf = at(9, Role::CF, Side::Home, 0.0, 0.0);
        cf.state.has_ball = true;
        let mut world = World::new(vec![cf.clone()], Vector2D::new(0.0, 0.0));
        world.decide(&mut cf);
        // 3.5 + 0.7 * 2.5
        assert!((cf.state.velocity.x - 5.25).abs() < 1e-4);
        assert!(world.ball.position().x > 0.0);
        assert!((world.ball.velocity().x - 5.25 * 0.85).abs() < 1e-4);
    }

    #[test]
    fn test_escape_avoids_crowded_side() {
        let cf = at(9, Role::CF, Side::Home, 0.0, 0.0);
        let players = vec![
            cf.clone(),
            at(20, Role::CD, Side::Away, 2.0, 0.0),
            at(21, Role::CD, Side::Away, 1.5, 1.5),
            at(22, Role::CD, Side::Away, 1.5, -1.5),
        ];
        let mut world = World::new(players, Vector2D::new(0.0, 0.0));
        let cfg = world.cfg.clone();
        let ctx = world.ctx();
        let heading = escape_direction(&cf, &ctx, &cfg.role.forward);
        assert!(heading.x < 0.0);
    }

    #[test]
    fn test_run_stays_onside_and_narrow() {
        let cf = at(9, Role::CF, Side::Home, 10.0, 10.0);
        let players = vec![
            cf.clone(),
            at(20, Role::CD, Side::Away, 30.0, 0.0),
            at(21, Role::GK, Side::Away, 50.0, 0.0),
        ];
        let mut world = World::new(players, Vector2D::new(0.0, 20.0));
        let ctx = world.ctx();
        let raw = attacking_space(&cf, &ctx);
        assert_eq!(raw.x, 28.0);
        let f = &ctx.cfg.role.forward;
        let central = adjust_run_for_flank(Flank::Central, raw, ctx.ball.position(), f);
        assert!((central.y - 6.0).abs() < 1e-4);
        // ball on the far side: the right forward keeps its width
        let right = adjust_run_for_flank(Flank::Right, raw, ctx.ball.position(), f);
        assert_eq!(right.y, -5.0);
        let wide_run = Vector2D::new(28.0, -20.0);
        let ball_right = Vector2D::new(0.0, -5.0);
        let inside = adjust_run_for_flank(Flank::Right, wide_run, ball_right, f);
        assert!((inside.y + 14.0).abs() < 1e-4);
        let left = adjust_run_for_flank(Flank::Left, wide_run, ball_right, f);
        assert_eq!(left.y, 5.0);
    }
}
