//! Midfielder: link play with tempo management, press, support.

use super::common::{
    decision, defensive_position, execute_pass, execute_shot, find_best_pass, move_closer_to_ball,
    move_to_position, move_to_receive_pass, opponent_holder, pursue_loose_ball, should_press,
    should_shoot, teammates, under_pressure,
};
use super::tempo::{
    attempt_backpass, begin_hold_window, find_relief_pass, forward_lane_blocked,
    move_to_support_space, settle_active_hold, ReleaseState, ReliefScoring,
};
use super::{ActionOutcome, AiContext, Flank, PossessionChange};
use crate::engine::config::{EngineConfig, MidfielderConfig};
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
        play_with_ball(me, ctx, out);
        return;
    }
    let cfg: &EngineConfig = ctx.cfg;
    if should_press(me, ctx, cfg.role.midfielder.press_stamina_threshold) {
        press_opponent(me, ctx, out);
        return;
    }
    if team_has_ball(me, ctx) {
        support_attack(flank, me, ctx);
        return;
    }
    support_defense(me, ctx);
}

fn team_has_ball(me: &PlayerMatchState, ctx: &AiContext<'_>) -> bool {
    me.has_ball() || teammates(ctx.players, me.side, me.player_id).any(|p| p.has_ball())
}

fn play_with_ball(me: &mut PlayerMatchState, ctx: &mut AiContext<'_>, out: &mut ActionOutcome) {
    if move_closer_to_ball(me, ctx) {
        return;
    }
    if should_shoot(me, ctx) {
        if execute_shot(me, ctx, out) {
            me.reset_space_move(true);
        }
        return;
    }

    let cfg: &EngineConfig = ctx.cfg;
    let m = &cfg.role.midfielder;
    let tempo = &m.tempo;
    let goal = ctx.pitch.attacking_goal(me.side);
    let my_goal_distance = me.position().distance_to(goal);
    let pressured = under_pressure(me, ctx.players, m.pressure_radius);

    let best = find_best_pass(me, ctx);
    let progress_gain = best.map_or(0.0, |p| my_goal_distance - p.lead_point.distance_to(goal));
    let target_closer = progress_gain > 0.0;
    let release = ReleaseState::evaluate(me, tempo, best.is_some(), progress_gain);
    let pass_viable = best.is_some()
        && (target_closer
            || me.attributes.vision >= m.progressive_pass_vision_threshold
            || pressured
            || release.forced
            || release.window);

    if settle_active_hold(me, ctx, release, pass_viable) {
        return;
    }
    if pass_viable {
        if let Some(pass) = best {
            me.reset_space_move(true);
            decision!(
                me,
                "pass",
                "target=#{} gain={:.1} forced={} window={}",
                pass.target_id,
                progress_gain,
                release.forced,
                release.window
            );
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
    if !blocked || pressured {
        dribble_forward(me, ctx, out, pressured);
        return;
    }

    // lane blocked, no pressure: probe, then hold, until patience runs out
    if !release.forced {
        if move_to_support_space(me, ctx, tempo) {
            return;
        }
        if begin_hold_window(me, ctx, tempo) {
            return;
        }
    }
    if attempt_backpass(me, ctx, tempo, out) {
        me.reset_space_move(true);
        return;
    }
    me.reset_space_move(true);
    dribble_forward(me, ctx, out, pressured);
}

fn dribble_forward(
    me: &mut PlayerMatchState,
    ctx: &mut AiContext<'_>,
    out: &mut ActionOutcome,
    pressured: bool,
) {
    let cfg: &EngineConfig = ctx.cfg;
    let m = &cfg.role.midfielder;
    let goal = ctx.pitch.attacking_goal(me.side);
    let dribbling = ratio(me.attributes.dribbling);

    if pressured && me.attributes.dribbling < m.pressure_dribble_threshold {
        if let Some(pass) = find_relief_pass(me, ctx, &ReliefScoring::from(m)) {
            execute_pass(me, &pass, ctx, out);
            return;
        }
        // 뒤로 물러나며 공 보호
        let retreat = (me.position() - goal).normalize();
        me.state.velocity = retreat * m.retreat_speed;
        ctx.ball.set_position(me.position());
        ctx.ball.set_velocity(Vector2D::ZERO);
        decision!(me, "retreat_shield");
        return;
    }

    let (base, scale) = if pressured {
        (m.dribble_pressure_base, m.dribble_pressure_attr_scale)
    } else {
        (m.dribble_speed_base, m.dribble_speed_attr_scale)
    };
    let speed = base + dribbling * scale;
    me.state.velocity = (goal - me.position()).normalize() * speed;
    ctx.ball.set_position(me.position());
    ctx.ball.set_velocity(Vector2D::ZERO);
    decision!(me, "dribble", "speed={:.2} pressured={}", speed, pressured);
}

fn press_opponent(me: &mut PlayerMatchState, ctx: &mut AiContext<'_>, out: &mut ActionOutcome) {
    let Some(holder) = opponent_holder(ctx.players, me.side) else {
        return;
    };
    let target = holder.position();
    let holder_id = holder.player_id;
    let speed = me.attributes.speed;
    move_to_position(me, target, speed, ctx, OffBallIntent::Press);

    let m: &MidfielderConfig = &ctx.cfg.role.midfielder;
    if me.position().distance_to(target) >= m.press_success_distance {
        return;
    }
    let chance = ratio(me.attributes.tackling) * m.press_success_scale;
    if ctx.rng.gen::<f32>() < chance {
        ctx.ball.set_velocity(Vector2D::ZERO);
        out.possession = PossessionChange::Claim;
        out.push_event(EventKind::Tackle, format!("Press won by {} from #{}", me, holder_id));
        decision!(me, "press_won", "from=#{}", holder_id);
    }
}

/// Ahead of the ball when it is behind us, trailing it when it is ahead.
pub fn support_target(flank: Flank, me: &PlayerMatchState, ctx: &AiContext<'_>) -> Vector2D {
    let m = &ctx.cfg.role.midfielder;
    let goal = ctx.pitch.attacking_goal(me.side);
    let ball = ctx.ball.position();
    let toward_goal = (goal - ball).normalize();
    let raw = if ball.distance_to(goal) < me.position().distance_to(goal) {
        ball - toward_goal * m.support_trail_distance
    } else {
        ball + toward_goal * m.support_forward_distance
    };
    let y = match flank {
        Flank::Right => raw.y.min(-m.right_width),
        Flank::Left => raw.y.max(m.left_width),
        Flank::Central => {
            let shifted = raw.y + (ball.y - raw.y) * m.central_shift_factor;
            shifted.clamp(-m.central_max_width, m.central_max_width)
        }
    };
    Vector2D::new(raw.x, y)
}

fn support_attack(flank: Flank, me: &mut PlayerMatchState, ctx: &AiContext<'_>) {
    let target = support_target(flank, me, ctx);
    let speed = me.attributes.speed;
    move_to_position(me, target, speed, ctx, OffBallIntent::Support);
}

fn support_defense(me: &mut PlayerMatchState, ctx: &AiContext<'_>) {
    let own_goal = ctx.pitch.own_goal(me.side);
    let base =
        defensive_position(me.side, own_goal, ctx.ball.position(), me.role_position, ctx.cfg);
    let push = (ctx.pitch.attacking_goal(me.side) - own_goal).normalize()
        * ctx.cfg.role.midfielder.support_defense_push;
    let tackling = me.attributes.tackling;
    move_to_position(me, base + push, tackling, ctx, OffBallIntent::Shape);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ball::BallState;
    use crate::engine::behaviors::RoleBehaviour;
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
                rng: ChaCha8Rng::seed_from_u64(3),
                pitch: Pitch::new(&cfg.pitch),
                cfg,
            }
        }

        fn decide(&mut self, idx: usize) -> (PlayerMatchState, ActionOutcome) {
            let mut me = self.players[idx].clone();
            let mut ctx = AiContext {
                players: &self.players,
                ball: &mut self.ball,
                rng: &mut self.rng,
                cfg: &self.cfg,
                pitch: &self.pitch,
                time: 10.0,
                dt: 0.05,
                team_in_possession: None,
                last_possession_player_id: None,
            };
            let behaviour = me.behaviour;
            let out = behaviour.decide_action(&mut me, &mut ctx);
            (me, out)
        }
    }

    #[test]
    fn test_progressive_pass_is_taken() {
        let mut cm = at(6, Role::CM, Side::Home, 0.0, 0.0);
        cm.state.has_ball = true;
        let cf = at(9, Role::CF, Side::Home, 15.0, 3.0);
        let mut world = World::new(vec![cm, cf], Vector2D::new(0.0, 0.0));
        let (_, out) = world.decide(0);
        assert_eq!(out.possession, PossessionChange::Release);
        assert_eq!(world.ball.intended_recipient, Some(9));
        assert!(world.ball.velocity().x > 0.0);
    }

    #[test]
    fn test_open_lane_dribbles_with_ball_at_feet() {
        let mut cm = at(6, Role::CM, Side::Home, 0.0, 0.0);
        cm.state.has_ball = true;
        let mut world = World::new(vec![cm], Vector2D::new(0.0, 0.0));
        let (me, out) = world.decide(0);
        assert_eq!(out.possession, PossessionChange::None);
        // 3 + 0.7 * 2
        assert!((me.state.velocity.x - 4.4).abs() < 1e-4);
        assert_eq!(world.ball.velocity(), Vector2D::ZERO);
        assert_eq!(world.ball.position(), me.position());
    }

    #[test]
    fn test_blocked_lane_starts_probe() {
        let mut cm = at(6, Role::CM, Side::Home, 0.0, 0.0);
        cm.state.has_ball = true;
        let players = vec![
            cm,
            at(20, Role::CD, Side::Away, 6.0, 0.5),
            at(21, Role::CD, Side::Away, 9.0, -0.5),
        ];
        let mut world = World::new(players, Vector2D::new(0.0, 0.0));
        let (me, _) = world.decide(0);
        assert!(me.space_move_heading.is_some());
        assert!(me.space_move_until > 10.0);
        // lateral only
        assert!(me.state.velocity.x.abs() < 1e-4);
    }

    #[test]
    fn test_support_widths_per_flank() {
        let rm = at(7, Role::RM, Side::Home, -10.0, -5.0);
        let lm = at(8, Role::LM, Side::Home, -10.0, 5.0);
        let mut world = World::new(vec![rm.clone(), lm.clone()], Vector2D::new(0.0, 0.0));
        let cfg = EngineConfig::deterministic();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let ctx = AiContext {
            players: &world.players,
            ball: &mut world.ball,
            rng: &mut rng,
            cfg: &cfg,
            pitch: &world.pitch,
            time: 10.0,
            dt: 0.05,
            team_in_possession: Some(Side::Home),
            last_possession_player_id: None,
        };
        // ball ahead of both: trail it
        let right = support_target(Flank::Right, &rm, &ctx);
        assert!(right.x < 0.0);
        assert_eq!(right.y, -12.0);
        assert_eq!(support_target(Flank::Left, &lm, &ctx).y, 12.0);
    }

    #[test]
    fn test_defensive_support_sits_ahead_of_line() {
        let cm = at(6, Role::CM, Side::Home, -20.0, 0.0);
        let mut holder = at(20, Role::CF, Side::Away, 30.0, 0.0);
        holder.state.has_ball = true;
        let mut world = World::new(vec![cm, holder], Vector2D::new(30.0, 0.0));
        let (me, out) = world.decide(0);
        assert_eq!(out.possession, PossessionChange::None);
        assert_eq!(me.off_ball_state, OffBallIntent::Shape);
        assert!(me.current_target.is_some());
    }
}
