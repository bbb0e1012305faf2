//! Ball state and physics
//!
//! - position/velocity 는 setter 를 통해서만 변경 (trace hook 지점)
//! - kick 권한: 재터치 간격 경과 OR 마지막 터치한 선수 본인
//! - 비행 → 바운스 → 지면 마찰 → 정지

use super::config::BallPhysicsConfig;
use super::pitch::Side;
use super::vector::Vector2D;
use std::collections::VecDeque;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

/// Recent (passer, recipient) pairs kept for repeat-pass penalties.
pub const PASS_PAIR_HISTORY: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BallField {
    Position,
    Velocity,
}

/// One observed write to the ball, with the source location of the caller.
#[derive(Debug, Clone, Copy)]
pub struct BallWrite {
    pub field: BallField,
    pub value: Vector2D,
    pub match_time: f32,
    pub location: &'static Location<'static>,
}

impl fmt::Display for BallWrite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = match self.field {
            BallField::Position => "position",
            BallField::Velocity => "velocity",
        };
        write!(
            f,
            "Ball {} write -> {} at {}:{}",
            field,
            self.value,
            self.location.file(),
            self.location.line()
        )
    }
}

pub type BallTraceHook = Arc<dyn Fn(&BallWrite) + Send + Sync>;

#[derive(Clone)]
pub struct BallState {
    position: Vector2D,
    velocity: Vector2D,
    pub last_touched_time: f32,
    pub last_touched_by: Option<u32>,
    /// Registered target of the last pass or throw
    pub intended_recipient: Option<u32>,
    pub recent_pass_pairs: VecDeque<(u32, u32)>,
    pub is_airborne: bool,
    pub time_until_ground: f32,
    pub just_bounced: bool,
    pub possessing_side: Option<Side>,
    match_time: f32,
    physics: BallPhysicsConfig,
    trace: Option<BallTraceHook>,
}

impl fmt::Debug for BallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BallState")
            .field("position", &self.position)
            .field("velocity", &self.velocity)
            .field("last_touched_time", &self.last_touched_time)
            .field("last_touched_by", &self.last_touched_by)
            .field("intended_recipient", &self.intended_recipient)
            .field("is_airborne", &self.is_airborne)
            .field("possessing_side", &self.possessing_side)
            .field("traced", &self.trace.is_some())
            .finish()
    }
}

impl BallState {
    pub fn new(position: Vector2D, physics: BallPhysicsConfig) -> Self {
        Self {
            position,
            velocity: Vector2D::ZERO,
            last_touched_time: 0.0,
            last_touched_by: None,
            intended_recipient: None,
            recent_pass_pairs: VecDeque::with_capacity(PASS_PAIR_HISTORY),
            is_airborne: false,
            time_until_ground: 0.0,
            just_bounced: false,
            possessing_side: None,
            match_time: 0.0,
            physics,
            trace: None,
        }
    }

    #[inline]
    pub fn position(&self) -> Vector2D {
        self.position
    }

    #[inline]
    pub fn velocity(&self) -> Vector2D {
        self.velocity
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.velocity.magnitude()
    }

    pub fn physics(&self) -> &BallPhysicsConfig {
        &self.physics
    }

    /// Install or remove the write observer. Has no effect on simulation.
    pub fn set_trace_hook(&mut self, hook: Option<BallTraceHook>) {
        self.trace = hook;
    }

    /// Clock stamped onto traced writes.
    pub fn set_match_time(&mut self, match_time: f32) {
        self.match_time = match_time;
    }

    #[track_caller]
    pub fn set_position(&mut self, value: Vector2D) {
        self.position = value;
        self.emit(BallField::Position, value, Location::caller());
    }

    /// Zero velocity also grounds the ball.
    #[track_caller]
    pub fn set_velocity(&mut self, value: Vector2D) {
        self.velocity = value;
        self.emit(BallField::Velocity, value, Location::caller());
        if value == Vector2D::ZERO {
            self.ground();
        }
    }

    #[inline]
    fn emit(&self, field: BallField, value: Vector2D, location: &'static Location<'static>) {
        if let Some(hook) = &self.trace {
            hook(&BallWrite { field, value, match_time: self.match_time, location });
        }
    }

    pub fn ground(&mut self) {
        self.is_airborne = false;
        self.time_until_ground = 0.0;
        self.just_bounced = false;
    }

    pub fn record_pass_pair(&mut self, passer: u32, recipient: u32) {
        if self.recent_pass_pairs.len() == PASS_PAIR_HISTORY {
            self.recent_pass_pairs.pop_front();
        }
        self.recent_pass_pairs.push_back((passer, recipient));
    }

    /// Kick the ball. Returns false (and leaves the ball untouched) when
    /// another player touched it less than `retouch_interval` ago.
    #[track_caller]
    pub fn kick(
        &mut self,
        direction: Vector2D,
        power: f32,
        player_id: u32,
        current_time: f32,
        recipient: Option<u32>,
    ) -> bool {
        let authorised = current_time - self.last_touched_time > self.physics.retouch_interval
            || self.last_touched_by == Some(player_id);
        if !authorised {
            log::trace!(
                target: "touchline::ball",
                "kick by {} rejected: {:?} touched {:.2}s ago",
                player_id,
                self.last_touched_by,
                current_time - self.last_touched_time
            );
            return false;
        }

        let location = Location::caller();
        self.velocity = direction.normalize() * power;
        self.emit(BallField::Velocity, self.velocity, location);
        self.last_touched_time = current_time;
        self.last_touched_by = Some(player_id);
        self.intended_recipient = recipient;
        if let Some(to) = recipient {
            self.record_pass_pair(player_id, to);
        }
        log::trace!(
            target: "touchline::ball",
            "kick: player {} power={:.1} recipient={:?} -> vel={}",
            player_id,
            power,
            recipient,
            self.velocity
        );

        let speed = self.velocity.magnitude();
        if speed >= self.physics.airborne_speed_threshold {
            let excess = speed - self.physics.airborne_speed_threshold;
            self.is_airborne = true;
            self.time_until_ground =
                (excess * self.physics.airborne_time_scale).min(self.physics.airborne_time_max);
            self.just_bounced = false;
        } else {
            self.ground();
        }
        true
    }

    /// Integrate one step: move, friction, flight timer, ground drag, settle.
    pub fn update(&mut self, dt: f32) {
        let cfg = self.physics;
        self.set_position(self.position + self.velocity * dt);

        let speed = self.velocity.magnitude();
        if speed > 0.0 {
            // stronger friction at higher speed
            let factor = cfg.friction.powf(dt * (1.0 + speed / 20.0));
            self.set_velocity(self.velocity * factor);
        }

        if self.is_airborne {
            self.time_until_ground = (self.time_until_ground - dt).max(0.0);
            if self.time_until_ground == 0.0 {
                self.bounce();
            }
        }

        if !self.is_airborne && self.velocity.magnitude() > 0.0 {
            let drag = (1.0 - cfg.ground_drag * dt).max(0.0);
            self.set_velocity(self.velocity * drag);
        }

        if self.velocity.magnitude() < cfg.stop_threshold {
            self.set_velocity(Vector2D::ZERO);
            self.ground();
        }
    }

    fn bounce(&mut self) {
        let speed = self.velocity.magnitude();
        if speed <= 0.0 {
            self.ground();
            return;
        }
        let damped = speed * self.physics.bounce_damping;
        if damped < self.physics.bounce_stop_speed {
            self.set_velocity(Vector2D::ZERO);
        } else {
            self.set_velocity(self.velocity.normalize() * damped);
            self.is_airborne = false;
            self.just_bounced = true;
        }
    }

    /// Dead ball at `position`: no velocity, no recipient, no pass history.
    #[track_caller]
    pub fn reset_at(&mut self, position: Vector2D, current_time: f32) {
        self.set_velocity(Vector2D::ZERO);
        self.set_position(position);
        self.last_touched_time = current_time;
        self.intended_recipient = None;
        self.recent_pass_pairs.clear();
        self.ground();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn ball() -> BallState {
        BallState::new(Vector2D::ZERO, BallPhysicsConfig::default())
    }

    #[test]
    fn test_same_player_can_retouch_immediately() {
        let mut b = ball();
        assert!(b.kick(Vector2D::new(1.0, 0.0), 5.0, 7, 1.0, None));
        assert!(b.kick(Vector2D::new(0.0, 1.0), 4.0, 7, 1.1, None));
        assert_eq!(b.velocity(), Vector2D::new(0.0, 4.0));
        assert_eq!(b.last_touched_by, Some(7));
    }

    #[test]
    fn test_other_player_rejected_within_interval() {
        let mut b = ball();
        assert!(b.kick(Vector2D::new(1.0, 0.0), 5.0, 7, 1.0, Some(9)));
        let before = (b.velocity(), b.last_touched_by, b.last_touched_time, b.intended_recipient);

        assert!(!b.kick(Vector2D::new(-1.0, 0.0), 10.0, 3, 1.2, None));
        let after = (b.velocity(), b.last_touched_by, b.last_touched_time, b.intended_recipient);
        assert_eq!(after, before);
        assert_eq!(b.recent_pass_pairs.len(), 1);

        // after the interval anyone may play it
        assert!(b.kick(Vector2D::new(-1.0, 0.0), 10.0, 3, 1.6, None));
        assert_eq!(b.last_touched_by, Some(3));
    }

    #[test]
    fn test_hard_kick_goes_airborne_then_bounces() {
        let mut b = ball();
        assert!(b.kick(Vector2D::new(1.0, 0.0), 30.0, 1, 5.0, None));
        assert!(b.is_airborne);
        // (30 - 14) * 0.05 = 0.8s of flight
        assert!((b.time_until_ground - 0.8).abs() < 1e-4);

        let mut bounced = false;
        for _ in 0..20 {
            b.update(0.05);
            if b.just_bounced {
                bounced = true;
                break;
            }
        }
        assert!(bounced);
        assert!(!b.is_airborne);
        assert!(b.speed() > 0.0);
    }

    #[test]
    fn test_flight_time_is_capped() {
        let mut b = ball();
        b.kick(Vector2D::new(1.0, 0.0), 60.0, 1, 0.0, None);
        assert!((b.time_until_ground - 1.4).abs() < 1e-4);
    }

    #[test]
    fn test_rolling_ball_settles() {
        let mut b = ball();
        b.kick(Vector2D::new(0.0, 1.0), 3.0, 1, 0.0, None);
        assert!(!b.is_airborne);
        for _ in 0..2000 {
            b.update(0.05);
        }
        assert_eq!(b.velocity(), Vector2D::ZERO);
        assert!(b.position().y > 0.0 && b.position().is_finite());
    }

    #[test]
    fn test_pass_pair_history_is_bounded() {
        let mut b = ball();
        for i in 0..20 {
            b.record_pass_pair(i, i + 1);
        }
        assert_eq!(b.recent_pass_pairs.len(), PASS_PAIR_HISTORY);
        assert_eq!(b.recent_pass_pairs.front(), Some(&(8, 9)));
    }

    #[test]
    fn test_trace_hook_sees_caller_location() {
        let seen: Arc<Mutex<Vec<(BallField, u32)>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut b = ball();
        b.set_trace_hook(Some(Arc::new(move |w: &BallWrite| {
            sink.lock().unwrap().push((w.field, w.location.line()));
        })));
        b.set_match_time(12.0);
        let line = line!() + 1;
        b.set_position(Vector2D::new(1.0, 2.0));
        let writes = seen.lock().unwrap();
        assert_eq!(writes.as_slice(), &[(BallField::Position, line)]);
    }

    #[test]
    fn test_trace_hook_does_not_change_outcome() {
        let mut plain = ball();
        let mut traced = ball();
        traced.set_trace_hook(Some(Arc::new(|_: &BallWrite| {})));
        for b in [&mut plain, &mut traced] {
            b.kick(Vector2D::new(1.0, 0.3), 18.0, 4, 0.0, Some(5));
            for _ in 0..40 {
                b.update(0.05);
            }
        }
        assert_eq!(plain.position(), traced.position());
        assert_eq!(plain.velocity(), traced.velocity());
    }
}
