//! 포지션별 행동 튜닝
//!
//! One table per role family plus the tempo sequence (space probe, hold
//! window, forced release) shared by midfielders and forwards.

use crate::models::Role;
use serde::{Deserialize, Serialize};

// ============================================================================
// Tempo (probe / hold / release)
// ============================================================================

/// Ball-carrier tempo management.
///
/// | Stage | Trigger | Exit |
/// |-------|---------|------|
/// | probe | lane blocked, no pressure | `space_move_duration` elapsed |
/// | hold  | probe finished | deadline, or a progressive pass appears |
/// | forced release | `space_move_patience_loops` probes | pass, backpass or dribble |
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TempoConfig {
    /// Hold is cancelled for a pass when this little time remains (기본: 0.6)
    pub hold_force_release_time: f32,
    pub hold_force_release_progress: f32,
    /// Progress gain that breaks any hold immediately
    pub pass_progress_break_threshold: f32,
    pub hold_lane_block_distance: f32,
    pub hold_lane_block_width: f32,
    pub hold_blocker_count: u32,
    /// Any opponent inside this radius cancels the probe
    pub hold_pressure_release_radius: f32,
    pub space_move_duration: f32,
    pub space_move_speed: f32,
    pub hold_min_duration: f32,
    pub hold_max_duration: f32,
    pub hold_retry_cooldown: f32,
    /// 0 disables forced release
    pub space_move_patience_loops: u32,
    pub backpass_roles: Vec<Role>,
    pub backpass_min_offset: f32,
    pub backpass_max_distance: f32,
    pub backpass_space_divisor: f32,
    pub backpass_lane_weight: f32,
    pub backpass_space_weight: f32,
    pub backpass_distance_weight: f32,
    pub backpass_score_threshold: f32,
}

impl Default for TempoConfig {
    fn default() -> Self {
        Self {
            hold_force_release_time: 0.6,
            hold_force_release_progress: 2.0,
            pass_progress_break_threshold: 6.0,
            hold_lane_block_distance: 12.0,
            hold_lane_block_width: 4.0,
            hold_blocker_count: 2,
            hold_pressure_release_radius: 2.5,
            space_move_duration: 1.2,
            space_move_speed: 3.0,
            hold_min_duration: 0.8,
            hold_max_duration: 1.8,
            hold_retry_cooldown: 3.0,
            space_move_patience_loops: 2,
            backpass_roles: vec![Role::CM, Role::LM, Role::RM, Role::CD, Role::LD, Role::RD],
            backpass_min_offset: 3.0,
            backpass_max_distance: 25.0,
            backpass_space_divisor: 6.0,
            backpass_lane_weight: 0.5,
            backpass_space_weight: 0.3,
            backpass_distance_weight: 0.2,
            backpass_score_threshold: 0.35,
        }
    }
}

impl TempoConfig {
    /// Midfield variant: shorter lanes, quicker holds, recycles to the back line.
    pub fn midfield() -> Self {
        Self {
            hold_force_release_time: 0.5,
            hold_force_release_progress: 2.0,
            pass_progress_break_threshold: 6.0,
            hold_lane_block_distance: 10.0,
            hold_lane_block_width: 4.0,
            hold_blocker_count: 2,
            hold_pressure_release_radius: 2.5,
            space_move_duration: 1.0,
            space_move_speed: 2.8,
            hold_min_duration: 0.6,
            hold_max_duration: 1.5,
            hold_retry_cooldown: 3.5,
            space_move_patience_loops: 2,
            backpass_roles: vec![Role::CD, Role::LD, Role::RD, Role::GK],
            ..Self::default()
        }
    }
}

// ============================================================================
// Defender
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DefenderConfig {
    // === Tackle ===
    pub tackle_ball_distance: f32,
    pub tackle_range_base: f32,
    pub tackle_range_attr_scale: f32,
    pub tackle_success_distance: f32,
    pub tackle_success_scale: f32,
    pub clear_power: f32,

    // === Interception ===
    pub intercept_ball_speed_min: f32,
    pub intercept_distance_limit: f32,
    pub intercept_speed_scale: f32,
    /// Projected distance must fall below current × factor
    pub intercept_improvement_factor: f32,

    // === Threat scoring ===
    pub threat_marking_range: f32,
    pub threat_marked_distance: f32,
    pub threat_ball_distance: f32,
    pub threat_goal_distance: f32,
    pub threat_unmarked_bonus: f32,
    pub threat_ball_weight: f32,
    pub threat_goal_weight: f32,
    pub threat_marking_weight: f32,
    pub threat_proximity_weight: f32,
    pub threat_proximity_distance: f32,

    // === Marking ===
    pub marking_distance_base: f32,
    pub marking_distance_attr_scale: f32,
    pub marking_ball_distance: f32,
    pub marking_ball_adjustment: f32,
    pub marking_speed_attr: u8,

    // === Shape ===
    pub dribble_speed: f32,
    pub fullback_min_width: f32,
    pub centreback_shift_factor: f32,
    pub centreback_max_width: f32,
}

impl Default for DefenderConfig {
    fn default() -> Self {
        Self {
            tackle_ball_distance: 3.0,
            tackle_range_base: 1.5,
            tackle_range_attr_scale: 1.0,
            tackle_success_distance: 1.2,
            tackle_success_scale: 0.7,
            clear_power: 20.0,
            intercept_ball_speed_min: 3.0,
            intercept_distance_limit: 15.0,
            intercept_speed_scale: 7.0,
            intercept_improvement_factor: 0.8,
            threat_marking_range: 25.0,
            threat_marked_distance: 3.0,
            threat_ball_distance: 30.0,
            threat_goal_distance: 50.0,
            threat_unmarked_bonus: 0.3,
            threat_ball_weight: 0.2,
            threat_goal_weight: 0.2,
            threat_marking_weight: 0.2,
            threat_proximity_weight: 0.4,
            threat_proximity_distance: 25.0,
            marking_distance_base: 2.0,
            marking_distance_attr_scale: 1.0,
            marking_ball_distance: 10.0,
            marking_ball_adjustment: 1.0,
            marking_speed_attr: 70,
            dribble_speed: 3.0,
            fullback_min_width: 8.0,
            centreback_shift_factor: 0.15,
            centreback_max_width: 12.0,
        }
    }
}

// ============================================================================
// Midfielder
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MidfielderConfig {
    pub press_stamina_threshold: f32,
    pub pressure_radius: f32,
    pub pressure_dribble_threshold: u8,
    pub retreat_speed: f32,
    pub dribble_speed_base: f32,
    pub dribble_speed_attr_scale: f32,
    pub dribble_pressure_base: f32,
    pub dribble_pressure_attr_scale: f32,

    // === Relief pass ===
    pub relief_min_distance: f32,
    pub relief_max_distance: f32,
    pub relief_lane_weight: f32,
    pub relief_space_weight: f32,
    pub relief_distance_weight: f32,
    pub relief_progress_bonus: f32,
    pub relief_score_threshold: f32,
    pub relief_space_divisor: f32,
    pub relief_nearest_default: f32,
    pub relief_vision_base: f32,
    pub relief_vision_scale: f32,

    /// 이 시야 이상이면 진전 없는 패스도 즉시 실행
    pub progressive_pass_vision_threshold: u8,
    pub press_success_distance: f32,
    pub press_success_scale: f32,

    // === Support ===
    pub support_trail_distance: f32,
    pub support_forward_distance: f32,
    pub support_defense_push: f32,
    pub right_width: f32,
    pub left_width: f32,
    pub central_shift_factor: f32,
    pub central_max_width: f32,

    #[serde(default = "TempoConfig::midfield")]
    pub tempo: TempoConfig,
}

impl Default for MidfielderConfig {
    fn default() -> Self {
        Self {
            press_stamina_threshold: 25.0,
            pressure_radius: 4.0,
            pressure_dribble_threshold: 60,
            retreat_speed: 2.0,
            dribble_speed_base: 3.0,
            dribble_speed_attr_scale: 2.0,
            dribble_pressure_base: 2.0,
            dribble_pressure_attr_scale: 2.0,
            relief_min_distance: 3.0,
            relief_max_distance: 28.0,
            relief_lane_weight: 0.4,
            relief_space_weight: 0.3,
            relief_distance_weight: 0.1,
            relief_progress_bonus: 0.2,
            relief_score_threshold: 0.25,
            relief_space_divisor: 6.0,
            relief_nearest_default: 10.0,
            relief_vision_base: 0.7,
            relief_vision_scale: 0.3,
            progressive_pass_vision_threshold: 70,
            press_success_distance: 1.5,
            press_success_scale: 0.5,
            support_trail_distance: 12.0,
            support_forward_distance: 10.0,
            support_defense_push: 5.0,
            right_width: 12.0,
            left_width: 12.0,
            central_shift_factor: 0.3,
            central_max_width: 15.0,
            tempo: TempoConfig::midfield(),
        }
    }
}

// ============================================================================
// Forward
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ForwardConfig {
    pub shoot_distance_threshold: f32,
    pub pressure_radius: f32,
    pub pressure_dribble_threshold: u8,
    pub vision_progressive_threshold: u8,
    pub vision_pressure_release_threshold: u8,

    // === Dribble ===
    pub dribble_speed_base: f32,
    pub dribble_speed_attr_scale: f32,
    pub dribble_pressure_base: f32,
    pub dribble_pressure_attr_scale: f32,
    pub dribble_control_offset: f32,
    pub dribble_velocity_blend: f32,
    pub escape_angle_step: u32,
    pub escape_base_space: f32,
    pub escape_opponent_scale: f32,

    // === Relief pass ===
    pub relief_min_distance: f32,
    pub relief_max_distance: f32,
    pub relief_lane_weight: f32,
    pub relief_space_weight: f32,
    pub relief_distance_weight: f32,
    pub relief_progress_bonus: f32,
    pub relief_support_bonus: f32,
    pub relief_score_threshold: f32,
    pub relief_space_divisor: f32,
    pub relief_nearest_default: f32,
    pub relief_vision_base: f32,
    pub relief_vision_scale: f32,

    // === Runs ===
    pub pressing_distance: f32,
    pub run_ballcarrier_distance: f32,
    pub run_goal_weight: f32,
    pub run_ball_weight: f32,
    pub onside_margin: f32,
    pub hold_position_jitter: f32,
    pub centre_adjust_factor: f32,
    pub centre_max_width: f32,
    pub wide_min_offset: f32,
    pub wide_max_width: f32,
    pub cut_inside_factor: f32,
    /// Loose balls slower than this are left to the chase logic
    pub loose_intercept_speed: f32,

    pub tempo: TempoConfig,
}

impl Default for ForwardConfig {
    fn default() -> Self {
        Self {
            shoot_distance_threshold: 25.0,
            pressure_radius: 3.0,
            pressure_dribble_threshold: 70,
            vision_progressive_threshold: 70,
            vision_pressure_release_threshold: 50,
            dribble_speed_base: 3.5,
            dribble_speed_attr_scale: 2.5,
            dribble_pressure_base: 2.0,
            dribble_pressure_attr_scale: 2.0,
            dribble_control_offset: 0.65,
            dribble_velocity_blend: 0.85,
            escape_angle_step: 45,
            escape_base_space: 10.0,
            escape_opponent_scale: 10.0,
            relief_min_distance: 3.0,
            relief_max_distance: 25.0,
            relief_lane_weight: 0.45,
            relief_space_weight: 0.25,
            relief_distance_weight: 0.1,
            relief_progress_bonus: 0.2,
            relief_support_bonus: 0.05,
            relief_score_threshold: 0.25,
            relief_space_divisor: 5.0,
            relief_nearest_default: 10.0,
            relief_vision_base: 0.6,
            relief_vision_scale: 0.4,
            pressing_distance: 20.0,
            run_ballcarrier_distance: 30.0,
            run_goal_weight: 0.7,
            run_ball_weight: 0.3,
            onside_margin: 2.0,
            hold_position_jitter: 0.8,
            centre_adjust_factor: 0.3,
            centre_max_width: 8.0,
            wide_min_offset: 5.0,
            wide_max_width: 15.0,
            cut_inside_factor: 0.7,
            loose_intercept_speed: 2.0,
            tempo: TempoConfig::default(),
        }
    }
}

// ============================================================================
// Goalkeeper
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GoalkeeperConfig {
    // === Save window ===
    pub save_min_ball_speed: f32,
    pub save_forward_speed_threshold: f32,
    pub save_plane_buffer: f32,
    pub save_time_horizon: f32,
    pub save_post_buffer: f32,
    pub save_box_buffer: f32,
    pub reach_reaction_buffer: f32,
    pub reach_distance_buffer: f32,
    pub success_distance: f32,
    pub success_eta_threshold: f32,
    pub log_eta_threshold: f32,

    // === Collection ===
    pub collect_speed_threshold: f32,
    pub collect_safe_distance_base: f32,
    pub collect_safe_distance_attr_scale: f32,
    pub collect_success_distance: f32,

    // === Positioning ===
    pub positioning_distance_base: f32,
    pub positioning_distance_attr_scale: f32,
    pub positioning_min_offset: f32,
    pub positioning_angle_factor: f32,
    pub positioning_max_lateral: f32,
    pub positioning_speed_attr: u8,
}

impl Default for GoalkeeperConfig {
    fn default() -> Self {
        Self {
            save_min_ball_speed: 3.0,
            save_forward_speed_threshold: 0.3,
            save_plane_buffer: 0.3,
            save_time_horizon: 1.05,
            save_post_buffer: 1.4,
            save_box_buffer: 1.5,
            reach_reaction_buffer: 0.05,
            reach_distance_buffer: 0.35,
            success_distance: 1.5,
            success_eta_threshold: 0.25,
            log_eta_threshold: 0.2,
            collect_speed_threshold: 5.0,
            collect_safe_distance_base: 8.0,
            collect_safe_distance_attr_scale: 5.0,
            collect_success_distance: 1.5,
            positioning_distance_base: 2.0,
            positioning_distance_attr_scale: 2.0,
            positioning_min_offset: 0.8,
            positioning_angle_factor: 0.3,
            positioning_max_lateral: 3.0,
            positioning_speed_attr: 50,
        }
    }
}
