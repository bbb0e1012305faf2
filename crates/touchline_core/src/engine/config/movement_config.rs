//! Player locomotion tuning: speed tiers per role and per movement intent.

use crate::models::Role;
use serde::{Deserialize, Serialize};

/// Jog/run/sprint tiers plus acceleration limits for one role family.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RoleSpeedProfile {
    pub jog_speed: f32,
    pub run_speed: f32,
    pub sprint_speed: f32,
    pub acceleration: f32,
    pub deceleration: f32,
}

impl RoleSpeedProfile {
    pub const fn new(
        jog_speed: f32,
        run_speed: f32,
        sprint_speed: f32,
        acceleration: f32,
        deceleration: f32,
    ) -> Self {
        Self { jog_speed, run_speed, sprint_speed, acceleration, deceleration }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RoleSpeedProfiles {
    pub goalkeeper: RoleSpeedProfile,
    pub central_defender: RoleSpeedProfile,
    pub wide_defender: RoleSpeedProfile,
    pub central_midfielder: RoleSpeedProfile,
    pub wide_midfielder: RoleSpeedProfile,
    pub forward: RoleSpeedProfile,
}

impl Default for RoleSpeedProfiles {
    fn default() -> Self {
        Self {
            goalkeeper: RoleSpeedProfile::new(3.4, 4.8, 5.6, 7.2, 9.5),
            central_defender: RoleSpeedProfile::new(4.1, 5.6, 6.6, 8.6, 11.2),
            wide_defender: RoleSpeedProfile::new(4.4, 6.1, 7.4, 9.4, 12.0),
            central_midfielder: RoleSpeedProfile::new(4.5, 6.3, 7.5, 9.6, 12.4),
            wide_midfielder: RoleSpeedProfile::new(4.6, 6.6, 7.8, 9.9, 12.8),
            forward: RoleSpeedProfile::new(4.7, 6.7, 7.9, 10.0, 13.0),
        }
    }
}

impl RoleSpeedProfiles {
    pub fn for_role(&self, role: Role) -> &RoleSpeedProfile {
        match role {
            Role::GK => &self.goalkeeper,
            Role::CD => &self.central_defender,
            Role::LD | Role::RD => &self.wide_defender,
            Role::CM => &self.central_midfielder,
            Role::LM | Role::RM => &self.wide_midfielder,
            Role::CF | Role::LCF | Role::RCF => &self.forward,
        }
    }
}

/// Acceleration, deceleration and arrival-radius multipliers for one intent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct IntentScale {
    pub accel: f32,
    pub decel: f32,
    pub arrive: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlayerMovementConfig {
    pub base_speed: f32,
    pub base_multiplier: f32,
    pub attribute_multiplier: f32,
    pub sprint_multiplier: f32,
    /// 스태미나 소모 계수 (speed ratio × dt × factor)
    pub stamina_drain_factor: f32,
    /// Recovery only happens below this speed
    pub recovery_threshold: f32,
    pub recovery_rate: f32,
    pub arrive_radius: f32,
    pub speed_scale_min: f32,
    pub speed_scale_max: f32,
    pub acceleration_scale_min: f32,
    pub acceleration_scale_max: f32,
    pub deceleration_scale_min: f32,
    pub deceleration_scale_max: f32,
    pub intent_press: IntentScale,
    pub intent_mark: IntentScale,
    pub intent_shape: IntentScale,
    pub intent_support: IntentScale,
    /// Support speed sits this far between jog and run
    pub intent_support_speed_blend: f32,
    pub role_profiles: RoleSpeedProfiles,
}

impl Default for PlayerMovementConfig {
    fn default() -> Self {
        Self {
            base_speed: 6.0,
            base_multiplier: 0.7,
            attribute_multiplier: 0.6,
            sprint_multiplier: 1.4,
            stamina_drain_factor: 0.8,
            recovery_threshold: 1.0,
            recovery_rate: 5.0,
            arrive_radius: 3.5,
            speed_scale_min: 0.75,
            speed_scale_max: 1.25,
            acceleration_scale_min: 0.75,
            acceleration_scale_max: 1.25,
            deceleration_scale_min: 0.8,
            deceleration_scale_max: 1.2,
            intent_press: IntentScale { accel: 1.0, decel: 1.0, arrive: 0.6 },
            intent_mark: IntentScale { accel: 1.0, decel: 1.0, arrive: 1.0 },
            intent_shape: IntentScale { accel: 0.7, decel: 0.85, arrive: 1.2 },
            intent_support: IntentScale { accel: 0.85, decel: 0.95, arrive: 1.0 },
            intent_support_speed_blend: 0.5,
            role_profiles: RoleSpeedProfiles::default(),
        }
    }
}

impl PlayerMovementConfig {
    /// Straight-line speed used by helpers that set velocity directly.
    pub fn attribute_speed(&self, speed_attr: u8) -> f32 {
        let base = self.base_speed * self.base_multiplier;
        base + base * self.attribute_multiplier * (speed_attr as f32 / 100.0)
    }
}
