//! Player locomotion with acceleration limits, arrival easing and stamina.
//!
//! # 핵심 원칙
//! - 목표 반경 안에서는 감속 (arrival)
//! - 반대 방향 전환 시 먼저 감속 후 재가속
//! - 최고 속도는 stamina/100 으로 제한
//! - 스태미나 소모 ∝ (speed / max_speed) × dt

use super::config::PlayerMovementConfig;
use super::vector::Vector2D;
use serde::{Deserialize, Serialize};

/// Speed and acceleration envelope for one `move_towards` call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveParams {
    pub max_speed: f32,
    pub acceleration: f32,
    pub deceleration: f32,
    pub arrive_radius: f32,
}

/// Kinematic state of one player.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerPhysicalState {
    pub position: Vector2D,
    pub velocity: Vector2D,
    /// 0..=100
    pub stamina: f32,
    pub has_ball: bool,
}

impl PlayerPhysicalState {
    pub fn new(position: Vector2D) -> Self {
        Self { position, velocity: Vector2D::ZERO, stamina: 100.0, has_ball: false }
    }

    fn drain(&mut self, speed: f32, max_speed: f32, dt: f32, cfg: &PlayerMovementConfig) {
        if max_speed > 0.0 && speed > 0.0 {
            let drain = (speed / max_speed) * dt * cfg.stamina_drain_factor;
            self.stamina = (self.stamina - drain).clamp(0.0, 100.0);
        }
    }

    /// Steer toward `target` and integrate one step.
    pub fn move_towards(
        &mut self,
        target: Vector2D,
        dt: f32,
        params: MoveParams,
        cfg: &PlayerMovementConfig,
    ) {
        if dt <= 0.0 {
            return;
        }
        self.steer_towards(target, dt, params, cfg);
        self.position += self.velocity * dt;
    }

    /// Velocity and stamina half of `move_towards`; position is left to the caller.
    /// The match loop integrates every player once per tick after the AI ran.
    pub fn steer_towards(
        &mut self,
        target: Vector2D,
        dt: f32,
        params: MoveParams,
        cfg: &PlayerMovementConfig,
    ) {
        if dt <= 0.0 {
            return;
        }
        let MoveParams { max_speed, acceleration, deceleration, arrive_radius } = params;
        let offset = target - self.position;
        let distance = offset.magnitude();
        let stamina_scale = (self.stamina / 100.0).max(0.0);

        // No usable heading: bleed off existing speed.
        if distance < 1e-4 || max_speed <= 0.0 {
            let current_speed = self.velocity.magnitude();
            if current_speed > 0.0 {
                let remaining = current_speed - current_speed.min(deceleration * dt);
                self.velocity = if remaining <= 1e-4 {
                    Vector2D::ZERO
                } else {
                    self.velocity.normalize() * remaining
                };
                self.drain(current_speed, max_speed, dt, cfg);
            }
            return;
        }

        let direction = offset.normalize();
        let mut desired_speed = max_speed;
        if arrive_radius > 0.0 {
            desired_speed *= (distance / arrive_radius).min(1.0);
        }
        // never overshoot in a single step
        desired_speed = desired_speed.min(distance / dt);
        desired_speed = (desired_speed * stamina_scale).max(0.0);

        let current_speed = self.velocity.magnitude();
        let alignment =
            if current_speed > 1e-6 { self.velocity.dot(direction) / current_speed } else { 1.0 };
        let effective_speed = if alignment < 0.0 {
            (current_speed - deceleration * dt).max(0.0)
        } else {
            current_speed
        };

        let mut new_speed = if desired_speed > effective_speed {
            effective_speed + (desired_speed - effective_speed).min(acceleration * dt)
        } else {
            effective_speed - (effective_speed - desired_speed).min(deceleration * dt)
        };
        let speed_cap = max_speed * stamina_scale;
        if speed_cap > 0.0 {
            new_speed = new_speed.min(speed_cap);
        }

        self.velocity = if new_speed <= 1e-4 { Vector2D::ZERO } else { direction * new_speed };
        self.drain(new_speed, max_speed, dt, cfg);
    }

    /// Near-stationary players regain stamina.
    pub fn recover_stamina(&mut self, dt: f32, cfg: &PlayerMovementConfig) {
        if self.velocity.magnitude() < cfg.recovery_threshold {
            self.stamina = (self.stamina + dt * cfg.recovery_rate).min(100.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(max_speed: f32) -> MoveParams {
        MoveParams { max_speed, acceleration: 8.0, deceleration: 10.0, arrive_radius: 3.5 }
    }

    #[test]
    fn test_accelerates_toward_target() {
        let cfg = PlayerMovementConfig::default();
        let mut p = PlayerPhysicalState::new(Vector2D::ZERO);
        p.move_towards(Vector2D::new(20.0, 0.0), 0.1, params(6.0), &cfg);
        // one step of acceleration: 8 * 0.1
        assert!((p.velocity.x - 0.8).abs() < 1e-4);
        assert!(p.position.x > 0.0);
        assert!(p.stamina < 100.0);
    }

    #[test]
    fn test_speed_capped_by_stamina() {
        let cfg = PlayerMovementConfig::default();
        let mut p = PlayerPhysicalState::new(Vector2D::ZERO);
        p.stamina = 50.0;
        for _ in 0..100 {
            p.move_towards(Vector2D::new(500.0, 0.0), 0.05, params(6.0), &cfg);
        }
        assert!(p.velocity.magnitude() <= 3.0 + 1e-3);
    }

    #[test]
    fn test_turnaround_costs_deceleration() {
        let cfg = PlayerMovementConfig::default();
        let mut p = PlayerPhysicalState::new(Vector2D::ZERO);
        p.velocity = Vector2D::new(5.0, 0.0);
        p.move_towards(Vector2D::new(-20.0, 0.0), 0.1, params(6.0), &cfg);
        // shed 1.0 of speed first, then accelerate by at most 0.8 in the new direction
        assert!(p.velocity.x < 0.0);
        assert!(p.velocity.magnitude() <= 4.8 + 1e-4);
    }

    #[test]
    fn test_no_overshoot() {
        let cfg = PlayerMovementConfig::default();
        let mut p = PlayerPhysicalState::new(Vector2D::ZERO);
        let target = Vector2D::new(0.1, 0.0);
        let quick = MoveParams { acceleration: 100.0, arrive_radius: 0.0, ..params(6.0) };
        p.move_towards(target, 0.05, quick, &cfg);
        assert!(p.position.x <= 0.1 + 1e-4);
    }

    #[test]
    fn test_stamina_stays_in_bounds() {
        let cfg = PlayerMovementConfig::default();
        let mut p = PlayerPhysicalState::new(Vector2D::ZERO);
        p.stamina = 0.01;
        p.move_towards(Vector2D::new(50.0, 0.0), 1.0, params(6.0), &cfg);
        assert!(p.stamina >= 0.0);

        p.velocity = Vector2D::ZERO;
        p.stamina = 99.9;
        p.recover_stamina(10.0, &cfg);
        assert_eq!(p.stamina, 100.0);
    }

    #[test]
    fn test_steer_leaves_position() {
        let cfg = PlayerMovementConfig::default();
        let mut p = PlayerPhysicalState::new(Vector2D::new(1.0, 1.0));
        p.steer_towards(Vector2D::new(20.0, 1.0), 0.1, params(6.0), &cfg);
        assert_eq!(p.position, Vector2D::new(1.0, 1.0));
        assert!(p.velocity.x > 0.0);
    }

    #[test]
    fn test_zero_target_bleeds_speed() {
        let cfg = PlayerMovementConfig::default();
        let mut p = PlayerPhysicalState::new(Vector2D::ZERO);
        p.velocity = Vector2D::new(0.5, 0.0);
        p.move_towards(p.position, 0.1, params(6.0), &cfg);
        assert_eq!(p.velocity, Vector2D::ZERO);
    }
}
