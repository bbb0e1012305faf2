//! # Match Engine
//!
//! 고정 timestep 실시간 경기 루프. `advance(dt)` 한 번이 한 틱이다.
//!
//! ## 틱 순서
//! ```text
//! half-time check → ball physics → referee (goal / restart) → clock
//!   → possession resolver → role AI (22명, 홈 먼저) → integrate + stamina → sink
//! ```
//!
//! ## 결정론
//! 모든 난수는 생성자에 넘긴 seed 의 `ChaCha8Rng` 하나에서 나온다. 같은 로스터,
//! 같은 설정, 같은 seed, 같은 `dt` 열이면 `fingerprint()` 가 같다.
//!
//! ## 사용법
//! ```rust,ignore
//! let mut engine = MatchEngine::new(home, away, EngineConfig::default().into_shared(), 42)?;
//! engine.attach_sink(Box::new(MatchDebugger::create_in_dir("debug_logs")?));
//! engine.run_to_full_time(0.05);
//! engine.stop()?;
//! ```

use super::ball::BallTraceHook;
use super::behaviors::{ActionOutcome, AiContext, PossessionChange};
use super::config::{EngineConfig, DEFAULT_CONFIG};
use super::events::{EventKind, EventLog, EventSink, MatchEvent};
use super::match_state::MatchState;
use super::pitch::Side;
use super::possession::resolve_possession;
use super::referee::{Referee, RefereeDecision, RestartKind};
use super::vector::Vector2D;
use crate::error::Result;
use crate::models::{Role, Team};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// Kick-off taker preference, first match wins.
const KICKOFF_PRIORITY: [Role; 6] = [Role::CF, Role::RCF, Role::LCF, Role::CM, Role::RM, Role::LM];
/// Throw-in release speed (m/s)
const THROW_IN_SPEED: f32 = 8.0;
/// Throw-in spot distance inside the touchline
const THROW_IN_INSET: f32 = 0.2;
/// Throw-in spot margin from the goal lines
const THROW_IN_END_MARGIN: f32 = 0.5;

pub struct MatchEngine {
    config: Arc<EngineConfig>,
    state: MatchState,
    referee: Referee,
    rng: ChaCha8Rng,
    seed: u64,
    sink: Option<Box<dyn EventSink>>,
    ticks: u64,
    stopped: bool,
}

impl MatchEngine {
    /// Validate the teams, place both line-ups and set up the first-half kick-off.
    pub fn new(home: Team, away: Team, config: Arc<EngineConfig>, seed: u64) -> Result<Self> {
        let state = MatchState::new(home, away, &config)?;
        let referee = Referee::new(state.pitch);
        log::info!(
            "match created: {} vs {} (seed={}, duration={:.0}s)",
            state.home_team.name,
            state.away_team.name,
            seed,
            config.simulation.match_duration
        );
        let mut engine = Self {
            config,
            state,
            referee,
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            sink: None,
            ticks: 0,
            stopped: false,
        };
        let side = engine.state.starting_kickoff_side;
        engine.prepare_kickoff(side, false, "First half kickoff");
        Ok(engine)
    }

    /// [`MatchEngine::new`] with the shared default tuning.
    pub fn with_default_config(home: Team, away: Team, seed: u64) -> Result<Self> {
        Self::new(home, away, Arc::clone(&*DEFAULT_CONFIG), seed)
    }

    // ========== Accessors ==========

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn events(&self) -> &EventLog {
        &self.state.events
    }

    pub fn score(&self) -> (u32, u32) {
        self.state.score()
    }

    pub fn match_time(&self) -> f32 {
        self.state.match_time
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    pub fn is_finished(&self) -> bool {
        self.state.match_time >= self.config.simulation.match_duration
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    // ========== Hooks ==========

    /// Attach a sink for events and per-tick snapshots. Replaces any previous sink.
    pub fn attach_sink(&mut self, sink: Box<dyn EventSink>) {
        self.sink = Some(sink);
    }

    /// Observe every ball position/velocity write. `None` disables tracing.
    pub fn set_ball_trace(&mut self, hook: Option<BallTraceHook>) {
        self.state.ball.set_trace_hook(hook);
    }

    /// Stop the match and close the sink. Later `advance` calls do nothing.
    pub fn stop(&mut self) -> Result<()> {
        if self.stopped {
            return Ok(());
        }
        self.stopped = true;
        log::info!(
            "match stopped at {:.1}s after {} ticks, score {}-{}",
            self.state.match_time,
            self.ticks,
            self.state.home_score,
            self.state.away_score
        );
        if let Some(mut sink) = self.sink.take() {
            sink.close()?;
        }
        Ok(())
    }

    /// Goal kick for `defending_side` as if the ball went out at the centre of its goal line.
    pub fn force_goal_kick(&mut self, defending_side: Side) {
        let goal_line = self.state.pitch.own_goal(defending_side);
        self.restart_goal_kick(defending_side, Vector2D::new(goal_line.x, 0.0));
    }

    /// Throw-in for `awarded_side` on the touchline nearest `y_hint`, at halfway.
    pub fn force_throw_in(&mut self, awarded_side: Side, y_hint: f32) {
        self.restart_throw_in(awarded_side, Vector2D::new(0.0, y_hint));
    }

    // ========== Tick ==========

    /// Advance the match by `dt` seconds. No-op once finished or stopped.
    pub fn advance(&mut self, dt: f32) {
        if self.stopped || self.is_finished() || !dt.is_finite() || dt <= 0.0 {
            return;
        }
        self.ticks += 1;

        let half_time_mark = self.config.simulation.match_duration / 2.0;
        if !self.state.halftime_triggered && self.state.match_time >= half_time_mark {
            self.start_second_half(half_time_mark);
            return;
        }

        self.state.ball.set_match_time(self.state.match_time);
        self.state.ball.update(dt);

        let last_touch_side = self.state.side_of(self.state.ball.last_touched_by);
        let possession_hint = self.state.holder().map(|p| p.side);
        let decision = self.referee.observe_ball(
            &self.state.ball,
            self.state.match_time,
            last_touch_side,
            possession_hint,
        );
        if decision.is_goal() {
            if let Some(side) = decision.scoring_side {
                self.handle_goal(side);
            }
        } else if decision.is_ball_out() {
            self.apply_restart(&decision);
        }

        self.state.match_time += dt;
        let time = self.state.match_time;
        for p in &mut self.state.players {
            p.match_time = time;
        }
        self.state.ball.set_match_time(time);

        let resolution = resolve_possession(&mut self.state, &self.config.possession);
        if let Some(index) = resolution.new_holder() {
            let holder = &self.state.players[index];
            let (side, description) = (holder.side, format!("{} gains possession", holder));
            self.record(EventKind::Possession, Some(side), description);
        }

        self.run_role_ai(dt);
        self.log_tick();

        if self.is_finished() && !self.state.fulltime_recorded {
            self.state.fulltime_recorded = true;
            let (h, a) = self.state.score();
            let description = format!(
                "Full time: {} {}-{} {}",
                self.state.home_team.name, h, a, self.state.away_team.name
            );
            log::info!("{}", description);
            self.record(EventKind::FullTime, None, description);
        }
    }

    /// Tick until full time (or a stop). Returns the number of ticks run.
    pub fn run_to_full_time(&mut self, dt: f32) -> u64 {
        if !dt.is_finite() || dt <= 0.0 {
            return 0;
        }
        let start = self.ticks;
        while !self.stopped && !self.is_finished() {
            self.advance(dt);
        }
        self.ticks - start
    }

    fn run_role_ai(&mut self, dt: f32) {
        let cfg = Arc::clone(&self.config);
        let time = self.state.match_time;
        for index in 0..self.state.players.len() {
            let mut me = self.state.players[index].clone();
            let behaviour = me.behaviour;
            let outcome = {
                let state = &mut self.state;
                let mut ctx = AiContext {
                    players: &state.players,
                    ball: &mut state.ball,
                    rng: &mut self.rng,
                    cfg: cfg.as_ref(),
                    pitch: &state.pitch,
                    time,
                    dt,
                    team_in_possession: state.team_in_possession,
                    last_possession_player_id: state.last_possession_player_id,
                };
                behaviour.decide_action(&mut me, &mut ctx)
            };
            self.state.players[index] = me;
            self.apply_outcome(index, outcome);

            let player = &mut self.state.players[index];
            player.state.position += player.state.velocity * dt;
            player.state.recover_stamina(dt, &cfg.player_movement);
        }
    }

    /// Single writer for possession flags requested by the role AI.
    fn apply_outcome(&mut self, index: usize, outcome: ActionOutcome) {
        let (id, side) = (self.state.players[index].player_id, self.state.players[index].side);
        match outcome.possession {
            PossessionChange::None => {}
            PossessionChange::Claim => {
                self.state.clear_possession_flags();
                self.state.players[index].state.has_ball = true;
                let ball = &mut self.state.ball;
                ball.last_touched_by = Some(id);
                ball.last_touched_time = self.state.match_time;
                ball.intended_recipient = None;
                ball.possessing_side = Some(side);
                self.state.team_in_possession = Some(side);
                self.state.last_possession_player_id = Some(id);
            }
            PossessionChange::Release => self.state.players[index].state.has_ball = false,
            PossessionChange::Dispossess => self.state.clear_possession_flags(),
        }
        for (kind, description) in outcome.events {
            self.record(kind, Some(side), description);
        }
    }

    fn log_tick(&mut self) {
        let Some(sink) = self.sink.as_mut() else {
            return;
        };
        let state = &self.state;
        let time = state.match_time;
        let possession = state.holder().map(|p| &*p.team_name);
        sink.ball_state(time, state.ball.position(), state.ball.velocity(), possession);
        for p in state.players.iter().filter(|p| p.current_target.is_some()) {
            sink.player_state(time, &p.trace());
        }
    }

    fn record(&mut self, kind: EventKind, side: Option<Side>, description: String) {
        let team_name = side.map(|s| self.state.team(s).name.clone()).unwrap_or_default();
        let event =
            MatchEvent { timestamp: self.state.match_time, kind, side, team_name, description };
        log::debug!(target: "touchline::engine", "{}", event);
        if let Some(sink) = self.sink.as_mut() {
            sink.record_event(&event);
        }
        self.state.events.push(event);
    }

    // ========== Goals, halves, kick-offs ==========

    fn handle_goal(&mut self, side: Side) {
        self.state.add_goal(side);
        let (h, a) = self.state.score();
        let description = format!("GOAL! Scored by {} ({}-{})", self.state.team(side).name, h, a);
        log::info!("[{:.1}s] {}", self.state.match_time, description);
        self.record(EventKind::Goal, Some(side), description);
        self.prepare_kickoff(side.opponent(), true, "Kickoff after goal");
    }

    fn start_second_half(&mut self, half_time_mark: f32) {
        self.state.halftime_triggered = true;
        self.state.current_half = 2;
        self.state.match_time = half_time_mark;
        let (h, a) = self.state.score();
        log::info!("half-time at {:.1}s, {}-{}", half_time_mark, h, a);
        self.record(EventKind::HalfTime, None, format!("Half-time: {}-{}", h, a));
        let side = self.state.starting_kickoff_side.opponent();
        self.prepare_kickoff(side, true, "Second half kickoff");
    }

    fn prepare_kickoff(&mut self, side: Side, reset_players: bool, reason: &str) {
        if reset_players {
            self.state.reset_players();
        } else {
            for p in &mut self.state.players {
                p.state.has_ball = false;
                p.state.velocity = Vector2D::ZERO;
            }
        }
        self.state.current_kickoff_side = side;

        let time = self.state.match_time;
        let ball = &mut self.state.ball;
        ball.reset_at(Vector2D::ZERO, time);
        ball.last_touched_by = None;
        ball.possessing_side = Some(side);
        self.state.team_in_possession = Some(side);
        self.state.last_possession_player_id = None;

        let candidates = self.state.indices_of(side);
        if let Some(kicker) = self.select_kickoff_player(&candidates) {
            let kicker_id = {
                let p = &mut self.state.players[kicker];
                p.state.position = Vector2D::ZERO;
                p.state.velocity = Vector2D::ZERO;
                p.state.has_ball = true;
                p.current_target = None;
                p.player_id
            };
            self.state.ball.last_touched_by = Some(kicker_id);
            self.state.ball.last_touched_time = time;
            self.state.last_possession_player_id = Some(kicker_id);

            let support = candidates
                .iter()
                .copied()
                .filter(|&i| i != kicker)
                .min_by(|&a, &b| {
                    let da = self.state.players[a].position().manhattan_to(Vector2D::ZERO);
                    let db = self.state.players[b].position().manhattan_to(Vector2D::ZERO);
                    da.total_cmp(&db)
                });
            if let Some(support) = support {
                let p = &mut self.state.players[support];
                p.state.position = Vector2D::new(side.attack_sign(), 0.0);
                p.state.velocity = Vector2D::ZERO;
                p.state.has_ball = false;
                p.current_target = None;
                self.state.ball.intended_recipient = Some(p.player_id);
            }
        }

        log::info!("[{:.1}s] {} - {} team to start", time, reason, side);
        self.record(EventKind::Kickoff, Some(side), format!("{} - {} team to start", reason, side));
    }

    fn select_kickoff_player(&self, candidates: &[usize]) -> Option<usize> {
        for role in KICKOFF_PRIORITY {
            if let Some(&i) = candidates.iter().find(|&&i| self.state.players[i].role == role) {
                return Some(i);
            }
        }
        candidates.iter().copied().min_by(|&a, &b| {
            let da = self.state.players[a].position().manhattan_to(Vector2D::ZERO);
            let db = self.state.players[b].position().manhattan_to(Vector2D::ZERO);
            da.total_cmp(&db)
        })
    }

    // ========== Restarts ==========

    fn apply_restart(&mut self, decision: &RefereeDecision) {
        let spot = decision.restart_spot.unwrap_or_else(|| self.state.ball.position());
        match (decision.restart, decision.awarded_side) {
            (RestartKind::GoalKick, Some(side)) => self.restart_goal_kick(side, spot),
            (RestartKind::ThrowIn, Some(side)) => self.restart_throw_in(side, spot),
            (RestartKind::Corner, side) => {
                // corner routines are not simulated: the ball is simply returned to play
                self.place_dead_ball(spot);
                let team = side.map(|s| self.state.team(s).name.clone()).unwrap_or_default();
                log::debug!("[{:.1}s] corner to {} returned to play", self.state.match_time, team);
                let description = format!("Corner awarded to {}; ball returned to play.", team);
                self.record(EventKind::Corner, side, description);
            }
            _ => self.place_dead_ball(spot),
        }
    }

    fn place_dead_ball(&mut self, spot: Vector2D) {
        let inside = self.state.pitch.constrain_to_bounds(spot);
        let ball = &mut self.state.ball;
        ball.set_position(inside);
        ball.set_velocity(Vector2D::ZERO);
        ball.ground();
    }

    /// Everybody stops, nobody holds the ball, targets are dropped.
    fn clear_possession(&mut self) {
        for p in &mut self.state.players {
            p.state.has_ball = false;
            p.state.velocity = Vector2D::ZERO;
            p.current_target = None;
        }
    }

    fn restart_goal_kick(&mut self, side: Side, out_position: Vector2D) {
        self.clear_possession();
        let team = self.state.indices_of(side);
        let kicker =
            team.iter().copied().find(|&i| self.state.players[i].role.is_goalkeeper()).or_else(|| {
                team.iter().copied().min_by(|&a, &b| {
                    let da = self.state.players[a].position().distance_to(out_position);
                    let db = self.state.players[b].position().distance_to(out_position);
                    da.total_cmp(&db)
                })
            });
        let Some(kicker) = kicker else {
            return;
        };

        let pitch = self.state.pitch;
        let depth = pitch.goal_area_depth;
        let inside_offset = (depth - 0.5).max(depth * 0.5);
        let restart_x = pitch.own_goal(side).x + side.attack_sign() * inside_offset;
        let lateral_limit = pitch.goal_area_width / 2.0;
        let restart_y = out_position.y.clamp(-lateral_limit, lateral_limit);
        let spot = Vector2D::new(restart_x, restart_y);

        let kicker_id = {
            let p = &mut self.state.players[kicker];
            p.state.position = spot;
            p.state.velocity = Vector2D::ZERO;
            p.state.has_ball = true;
            p.current_target = None;
            p.player_id
        };

        let time = self.state.match_time;
        let ball = &mut self.state.ball;
        ball.reset_at(spot, time);
        ball.last_touched_by = Some(kicker_id);
        ball.possessing_side = Some(side);
        self.state.team_in_possession = Some(side);
        self.state.last_possession_player_id = Some(kicker_id);

        let description = format!("Goal kick awarded to {}.", self.state.team(side).name);
        log::debug!("[{:.1}s] {} spot {}", time, description, spot);
        self.record(EventKind::GoalKick, Some(side), description);
    }

    fn restart_throw_in(&mut self, side: Side, out_position: Vector2D) {
        self.clear_possession();
        let team = self.state.indices_of(side);
        if team.is_empty() {
            return;
        }

        let pitch = self.state.pitch;
        let line_y = if out_position.y >= 0.0 { pitch.half_height() } else { -pitch.half_height() };
        let restart_y = line_y - line_y.signum() * THROW_IN_INSET;
        let x_limit = pitch.half_width() - THROW_IN_END_MARGIN;
        let spot = Vector2D::new(out_position.x.clamp(-x_limit, x_limit), restart_y);

        let nearest_to = |point: Vector2D, exclude: Option<usize>| {
            team.iter().copied().filter(|&i| Some(i) != exclude).min_by(|&a, &b| {
                let da = self.state.players[a].position().distance_to(point);
                let db = self.state.players[b].position().distance_to(point);
                da.total_cmp(&db)
            })
        };
        let Some(thrower) = nearest_to(spot, None) else {
            return;
        };
        let recipient = nearest_to(self.state.players[thrower].position(), Some(thrower));
        let recipient =
            recipient.map(|i| (self.state.players[i].player_id, self.state.players[i].position()));

        let thrower_id = {
            let p = &mut self.state.players[thrower];
            p.state.position = spot;
            p.state.velocity = Vector2D::ZERO;
            p.state.has_ball = false;
            p.current_target = None;
            p.player_id
        };

        let time = self.state.match_time;
        let ball = &mut self.state.ball;
        ball.reset_at(spot, time);
        ball.last_touched_by = Some(thrower_id);
        ball.possessing_side = Some(side);
        let mut target = None;
        if let Some((recipient_id, recipient_pos)) = recipient {
            let direction = recipient_pos - spot;
            if direction.magnitude() > 0.0 {
                ball.set_velocity(direction.normalize() * THROW_IN_SPEED);
                ball.intended_recipient = Some(recipient_id);
                ball.record_pass_pair(thrower_id, recipient_id);
                target = Some(recipient_id);
            }
        }
        self.state.team_in_possession = Some(side);
        self.state.last_possession_player_id = Some(thrower_id);

        let team_name = &self.state.team(side).name;
        let description = match target {
            Some(to) => format!(
                "Throw-in awarded to {}. Thrower #{} targeting #{}.",
                team_name, thrower_id, to
            ),
            None => format!("Throw-in awarded to {}.", team_name),
        };
        log::debug!("[{:.1}s] {}", time, description);
        self.record(EventKind::ThrowIn, Some(side), description);
    }

    // ========== Determinism ==========

    /// SHA-256 over clock, score, ball and every player's kinematic state.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        let s = &self.state;
        hasher.update(s.match_time.to_bits().to_le_bytes());
        hasher.update(s.home_score.to_le_bytes());
        hasher.update(s.away_score.to_le_bytes());
        for v in [s.ball.position(), s.ball.velocity()] {
            hasher.update(v.x.to_bits().to_le_bytes());
            hasher.update(v.y.to_bits().to_le_bytes());
        }
        for p in &s.players {
            hasher.update(p.player_id.to_le_bytes());
            for v in [p.state.position, p.state.velocity] {
                hasher.update(v.x.to_bits().to_le_bytes());
                hasher.update(v.y.to_bits().to_le_bytes());
            }
            hasher.update(p.state.stamina.to_bits().to_le_bytes());
            hasher.update([p.state.has_ball as u8]);
        }
        let digest = hasher.finalize();
        let mut out = String::with_capacity(digest.len() * 2);
        for b in digest {
            out.push_str(&format!("{:02x}", b));
        }
        out
    }
}
