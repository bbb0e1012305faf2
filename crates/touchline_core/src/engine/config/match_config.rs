//! Pitch, clock, possession, formation and ball physics tuning.

use serde::{Deserialize, Serialize};

/// 경기장 규격 (미터)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PitchConfig {
    pub width: f32,
    pub height: f32,
    pub goal_width: f32,
    pub penalty_area_width: f32,
    pub penalty_area_depth: f32,
    pub goal_area_width: f32,
    pub goal_area_depth: f32,
}

impl Default for PitchConfig {
    fn default() -> Self {
        Self {
            width: 105.0,
            height: 68.0,
            goal_width: 7.32,
            penalty_area_width: 40.32,
            penalty_area_depth: 16.5,
            goal_area_width: 18.32,
            goal_area_depth: 5.5,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    /// Full-time clock in seconds (기본: 5400)
    pub match_duration: f32,
    /// Fixed timestep callers are expected to use
    pub recommended_dt: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self { match_duration: 90.0 * 60.0, recommended_dt: 0.05 }
    }
}

/// Possession resolver radii and dribble carry parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PossessionConfig {
    /// Above this speed nobody can claim an unaddressed ball
    pub loose_ball_speed_threshold: f32,
    pub target_radius_min: f32,
    pub target_radius_max: f32,
    pub target_radius_speed_factor: f32,
    /// Minimum dot(ball heading, direction to recipient)
    pub direction_alignment_min: f32,
    pub base_radius: f32,
    pub medium_speed_threshold: f32,
    pub medium_radius: f32,
    pub slow_speed_threshold: f32,
    pub slow_radius: f32,
    pub continue_control_offset: f32,
    pub continue_velocity_blend: f32,
    pub continue_position_lerp: f32,
    /// Ball must be this close before a holder may strike it
    pub max_control_distance: f32,
}

impl Default for PossessionConfig {
    fn default() -> Self {
        Self {
            loose_ball_speed_threshold: 5.0,
            target_radius_min: 1.1,
            target_radius_max: 1.3,
            target_radius_speed_factor: 0.08,
            direction_alignment_min: -0.1,
            base_radius: 0.5,
            medium_speed_threshold: 1.5,
            medium_radius: 0.8,
            slow_speed_threshold: 0.3,
            slow_radius: 1.0,
            continue_control_offset: 0.45,
            continue_velocity_blend: 0.8,
            continue_position_lerp: 0.5,
            max_control_distance: 0.6,
        }
    }
}

/// Nominal formation slots, expressed for the side attacking -x.
/// The home side mirrors x.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FormationConfig {
    pub goalkeeper_x: f32,
    pub fullback_x: f32,
    pub fullback_base_offset: f32,
    pub fullback_stagger: f32,
    pub centreback_x: f32,
    pub centreback_offsets: Vec<f32>,
    pub wide_midfielder_x: f32,
    pub wide_midfielder_base_offset: f32,
    pub wide_midfielder_stagger: f32,
    pub central_midfielder_x: f32,
    pub central_midfielder_offsets: Vec<f32>,
    pub centre_forward_x: f32,
    pub centre_forward_offsets: Vec<f32>,
    pub wide_forward_base_offset: f32,
    pub wide_forward_stagger: f32,
}

impl Default for FormationConfig {
    fn default() -> Self {
        Self {
            goalkeeper_x: 45.0,
            fullback_x: 35.0,
            fullback_base_offset: 12.0,
            fullback_stagger: 2.0,
            centreback_x: 35.0,
            centreback_offsets: vec![-6.0, 6.0, -12.0, 12.0],
            wide_midfielder_x: 20.0,
            wide_midfielder_base_offset: 15.0,
            wide_midfielder_stagger: 2.0,
            central_midfielder_x: 18.0,
            central_midfielder_offsets: vec![-8.0, 8.0, 0.0, -14.0, 14.0],
            centre_forward_x: 8.0,
            centre_forward_offsets: vec![0.0, -6.0, 6.0],
            wide_forward_base_offset: 10.0,
            wide_forward_stagger: 2.0,
        }
    }
}

/// 공 물리 파라미터
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BallPhysicsConfig {
    /// Per-second rolling friction base (기본: 0.95)
    pub friction: f32,
    /// Below this speed the ball stops and grounds
    pub stop_threshold: f32,
    pub ground_drag: f32,
    pub bounce_damping: f32,
    pub bounce_stop_speed: f32,
    pub airborne_speed_threshold: f32,
    pub airborne_time_scale: f32,
    pub airborne_time_max: f32,
    /// Another player may not re-kick within this window
    pub retouch_interval: f32,
}

impl Default for BallPhysicsConfig {
    fn default() -> Self {
        Self {
            friction: 0.95,
            stop_threshold: 0.1,
            ground_drag: 0.18,
            bounce_damping: 0.55,
            bounce_stop_speed: 1.1,
            airborne_speed_threshold: 14.0,
            airborne_time_scale: 0.05,
            airborne_time_max: 1.4,
            retouch_interval: 0.5,
        }
    }
}
