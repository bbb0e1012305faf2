//! Shared role-AI tuning: shooting, passing, interception, support shape.
//!
//! These sections feed the capability library every role behaviour uses.
//! Role specific tables live in `position_config`.

use crate::models::Role;
use serde::{Deserialize, Serialize};

// ============================================================================
// Shooting / Passing
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShootingConfig {
    /// 최대 슈팅 거리 = base + bonus × shooting (기본: 25 + 15a)
    pub max_distance_base: f32,
    pub max_distance_bonus: f32,
    /// Beyond this the shot angle must clear `angle_threshold`
    pub long_range_distance: f32,
    pub angle_threshold: f32,
    pub probability_scale: f32,
    /// Maximum inset from the post when aiming a corner
    pub goal_offset_range: f32,
    pub corner_depth_bias: f32,
    pub corner_depth_spread: f32,
    pub power_distance_scale: f32,
    pub power_base: f32,
    pub power_clamp: f32,
    pub power_accuracy_base: f32,
    pub power_accuracy_scale: f32,
}

impl Default for ShootingConfig {
    fn default() -> Self {
        Self {
            max_distance_base: 25.0,
            max_distance_bonus: 15.0,
            long_range_distance: 20.0,
            angle_threshold: 0.3,
            probability_scale: 0.2,
            goal_offset_range: 3.0,
            corner_depth_bias: 0.8,
            corner_depth_spread: 0.6,
            power_distance_scale: 1.2,
            power_base: 15.0,
            power_clamp: 35.0,
            power_accuracy_base: 0.8,
            power_accuracy_scale: 0.4,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PassingConfig {
    pub max_distance_base: f32,
    pub max_distance_bonus: f32,
    pub min_distance: f32,
    pub lane_weight: f32,
    pub distance_weight: f32,
    pub progress_weight: f32,
    /// Best candidate must score strictly above this
    pub score_threshold: f32,
    /// Opponents nearer than this to the lane reduce its quality
    pub lane_block_distance: f32,
    pub power_min_base: f32,
    pub power_min_bonus: f32,
    pub power_max_base: f32,
    pub power_max_bonus: f32,
    pub distance_norm: f32,
    pub easing_exponent: f32,
    /// Target jitter at zero passing ability, shrinks linearly to 0 at 100
    pub inaccuracy_max: f32,
    pub repeat_penalty_base: f32,
    pub repeat_penalty_decay: f32,
    pub immediate_return_penalty: f32,
    pub under_pressure_radius: f32,
    /// Receivers with less free space than this are downgraded
    pub space_release_threshold: f32,
    pub progressive_gain_min: f32,
    pub progress_bonus_weight: f32,
}

impl Default for PassingConfig {
    fn default() -> Self {
        Self {
            max_distance_base: 30.0,
            max_distance_bonus: 30.0,
            min_distance: 5.0,
            lane_weight: 0.4,
            distance_weight: 0.3,
            progress_weight: 0.3,
            score_threshold: 0.3,
            lane_block_distance: 5.0,
            power_min_base: 2.8,
            power_min_bonus: 2.5,
            power_max_base: 13.0,
            power_max_bonus: 5.5,
            distance_norm: 30.0,
            easing_exponent: 0.5,
            inaccuracy_max: 2.0,
            repeat_penalty_base: 0.25,
            repeat_penalty_decay: 0.05,
            immediate_return_penalty: 0.3,
            under_pressure_radius: 6.0,
            space_release_threshold: 3.0,
            progressive_gain_min: 4.0,
            progress_bonus_weight: 0.5,
        }
    }
}

// ============================================================================
// Ball chasing
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InterceptConfig {
    pub min_ball_speed: f32,
    /// Projection horizon in seconds
    pub max_time: f32,
    pub time_step: f32,
    pub reaction_buffer: f32,
    pub fallback_fraction: f32,
    pub fallback_cap: f32,
}

impl Default for InterceptConfig {
    fn default() -> Self {
        Self {
            min_ball_speed: 0.2,
            max_time: 3.0,
            time_step: 0.2,
            reaction_buffer: 0.15,
            fallback_fraction: 0.25,
            fallback_cap: 4.5,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReceivePassConfig {
    pub player_speed_base: f32,
    pub player_speed_attr_scale: f32,
    pub stop_distance: f32,
    pub move_base_speed: f32,
    pub move_attr_scale: f32,
}

impl Default for ReceivePassConfig {
    fn default() -> Self {
        Self {
            player_speed_base: 4.3,
            player_speed_attr_scale: 3.2,
            stop_distance: 0.4,
            move_base_speed: 4.5,
            move_attr_scale: 3.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LooseBallConfig {
    pub player_speed_base: f32,
    pub player_speed_attr_scale: f32,
    pub intercept_max_time: f32,
    pub intercept_reaction_buffer: f32,
    pub intercept_fallback_fraction: f32,
    pub intercept_fallback_cap: f32,
    pub stop_distance: f32,
    pub move_base_speed: f32,
    pub move_attr_scale: f32,
}

impl Default for LooseBallConfig {
    fn default() -> Self {
        Self {
            player_speed_base: 4.6,
            player_speed_attr_scale: 3.4,
            intercept_max_time: 3.2,
            intercept_reaction_buffer: 0.18,
            intercept_fallback_fraction: 0.18,
            intercept_fallback_cap: 4.5,
            stop_distance: 0.35,
            move_base_speed: 5.0,
            move_attr_scale: 3.2,
        }
    }
}

// ============================================================================
// Off-ball shape
// ============================================================================

/// Push distance, trailing buffer and forward margin for one phase.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct SupportProfile {
    pub push: f32,
    pub trail: f32,
    pub forward: f32,
}

impl SupportProfile {
    pub const fn new(push: f32, trail: f32, forward: f32) -> Self {
        Self { push, trail, forward }
    }
}

/// Attack phase relative to the attacking goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackPhase {
    BuildUp,
    Midfield,
    FinalThird,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PhaseProfile {
    pub build: SupportProfile,
    pub mid: SupportProfile,
    pub final_third: SupportProfile,
}

impl PhaseProfile {
    pub fn for_phase(&self, phase: AttackPhase) -> SupportProfile {
        match phase {
            AttackPhase::BuildUp => self.build,
            AttackPhase::Midfield => self.mid,
            AttackPhase::FinalThird => self.final_third,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SupportProfiles {
    pub goalkeeper: PhaseProfile,
    pub defender: PhaseProfile,
    pub midfielder: PhaseProfile,
    pub forward: PhaseProfile,
}

impl Default for SupportProfiles {
    fn default() -> Self {
        let keeper = SupportProfile::new(0.0, 12.0, 0.0);
        Self {
            goalkeeper: PhaseProfile { build: keeper, mid: keeper, final_third: keeper },
            defender: PhaseProfile {
                build: SupportProfile::new(6.0, 16.0, 2.0),
                mid: SupportProfile::new(8.0, 14.0, 4.0),
                final_third: SupportProfile::new(10.0, 12.0, 6.0),
            },
            midfielder: PhaseProfile {
                build: SupportProfile::new(12.0, 10.0, 8.0),
                mid: SupportProfile::new(14.0, 8.0, 12.0),
                final_third: SupportProfile::new(16.0, 6.0, 14.0),
            },
            forward: PhaseProfile {
                build: SupportProfile::new(8.0, 6.0, 8.0),
                mid: SupportProfile::new(9.0, 5.0, 10.0),
                final_third: SupportProfile::new(10.0, 4.0, 12.0),
            },
        }
    }
}

impl SupportProfiles {
    pub fn for_role(&self, role: Role) -> &PhaseProfile {
        if role.is_goalkeeper() {
            &self.goalkeeper
        } else if role.is_defender() {
            &self.defender
        } else if role.is_midfielder() {
            &self.midfielder
        } else {
            &self.forward
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PossessionSupportConfig {
    pub gap_weight: f32,
    pub push_bias: f32,
    pub ahead_threshold: f32,
    pub ahead_factor_low: f32,
    pub ahead_factor_high: f32,
    /// A pass recipient this close to the release time still counts as in possession
    pub release_recipient_window: f32,
    /// Ball x (toward goal) below this is build-up
    pub build_up_limit: f32,
    /// Ball x (toward goal) above this is the final third
    pub midfield_limit: f32,
    pub profiles: SupportProfiles,
}

impl Default for PossessionSupportConfig {
    fn default() -> Self {
        Self {
            gap_weight: 0.8,
            push_bias: 0.3,
            ahead_threshold: 15.0,
            ahead_factor_low: 0.4,
            ahead_factor_high: 0.7,
            release_recipient_window: 0.6,
            build_up_limit: -15.0,
            midfield_limit: 15.0,
            profiles: SupportProfiles::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LaneSpacingConfig {
    pub lane_weight: f32,
    pub min_spacing: f32,
    pub separation_scale: f32,
}

impl Default for LaneSpacingConfig {
    fn default() -> Self {
        Self { lane_weight: 0.25, min_spacing: 6.0, separation_scale: 0.5 }
    }
}

/// 수비 라인 높이
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DefensiveLineConfig {
    pub far_threshold: f32,
    pub close_threshold: f32,
    pub close_offset: f32,
    pub advanced_offset: f32,
    pub y_pull_factor: f32,
}

impl Default for DefensiveLineConfig {
    fn default() -> Self {
        Self {
            far_threshold: 40.0,
            close_threshold: 20.0,
            close_offset: 15.0,
            advanced_offset: 25.0,
            y_pull_factor: 0.2,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PressingConfig {
    pub stamina_threshold: f32,
    pub distance_threshold: f32,
}

impl Default for PressingConfig {
    fn default() -> Self {
        Self { stamina_threshold: 30.0, distance_threshold: 15.0 }
    }
}
