//! # Engine Configuration Module
//!
//! 모든 튜닝 상수를 한 값으로 묶어 엔진 생성 시 전달한다.
//! 전역 설정은 없다: `MatchEngine` 이 `Arc<EngineConfig>` 를 공, 심판,
//! 각 역할 AI 에 나눠준다.
//!
//! ## 사용법
//! ```rust
//! use touchline_core::engine::config::EngineConfig;
//!
//! let config = EngineConfig::default();
//! let quick = EngineConfig::short_match(120.0);
//! let tuned = EngineConfig::from_yaml_str("ball_physics:\n  friction: 0.9\n").unwrap();
//! assert!((tuned.pitch.width - 105.0).abs() < f32::EPSILON);
//! ```

mod match_config;
mod movement_config;
mod position_config;
mod role_config;

pub use match_config::{
    BallPhysicsConfig, FormationConfig, PitchConfig, PossessionConfig, SimulationConfig,
};
pub use movement_config::{IntentScale, PlayerMovementConfig, RoleSpeedProfile, RoleSpeedProfiles};
pub use position_config::{
    DefenderConfig, ForwardConfig, GoalkeeperConfig, MidfielderConfig, TempoConfig,
};
pub use role_config::{
    AttackPhase, DefensiveLineConfig, InterceptConfig, LaneSpacingConfig, LooseBallConfig,
    PassingConfig, PhaseProfile, PossessionSupportConfig, PressingConfig, ReceivePassConfig,
    ShootingConfig, SupportProfile, SupportProfiles,
};

use crate::error::Result;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Shared default configuration for callers that never override anything.
pub static DEFAULT_CONFIG: Lazy<Arc<EngineConfig>> =
    Lazy::new(|| Arc::new(EngineConfig::default()));

/// 역할 AI 설정 묶음
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct RoleBehaviourConfig {
    pub shooting: ShootingConfig,
    pub passing: PassingConfig,
    pub intercept: InterceptConfig,
    pub receive_pass: ReceivePassConfig,
    pub loose_ball: LooseBallConfig,
    pub possession_support: PossessionSupportConfig,
    pub lane_spacing: LaneSpacingConfig,
    pub defensive: DefensiveLineConfig,
    pub pressing: PressingConfig,
    pub defender: DefenderConfig,
    pub midfielder: MidfielderConfig,
    pub forward: ForwardConfig,
    pub goalkeeper: GoalkeeperConfig,
}

/// 엔진 전체 설정
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// 경기장 규격
    pub pitch: PitchConfig,
    /// Clock length and recommended timestep
    pub simulation: SimulationConfig,
    /// Possession resolver radii
    pub possession: PossessionConfig,
    /// Nominal formation slots
    pub formation: FormationConfig,
    pub ball_physics: BallPhysicsConfig,
    pub player_movement: PlayerMovementConfig,
    /// Role AI tables
    pub role: RoleBehaviourConfig,
}

impl EngineConfig {
    /// 테스트용 (패스/슛 오차 제거)
    pub fn deterministic() -> Self {
        let mut cfg = Self::default();
        cfg.role.passing.inaccuracy_max = 0.0;
        cfg.role.shooting.goal_offset_range = 0.0;
        cfg.role.shooting.corner_depth_spread = 0.0;
        cfg
    }

    /// Default tuning with a shorter clock, for demos and scenario tests.
    pub fn short_match(duration: f32) -> Self {
        let mut cfg = Self::default();
        cfg.simulation.match_duration = duration.max(0.0);
        cfg
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load an override file. `.json` parses as JSON, anything else as YAML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        let cfg = if is_json { Self::from_json_str(&text)? } else { Self::from_yaml_str(&text)? };
        log::info!("loaded engine config from {}", path.display());
        Ok(cfg)
    }

    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

// ========== Tests ==========

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TouchlineError;
    use crate::models::Role;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let cfg = EngineConfig::default();
        assert!((cfg.pitch.width - 105.0).abs() < 1e-4);
        assert!((cfg.simulation.match_duration - 5400.0).abs() < 1e-4);
        assert!((cfg.ball_physics.retouch_interval - 0.5).abs() < 1e-4);
        assert!((cfg.role.passing.score_threshold - 0.3).abs() < 1e-4);
        assert_eq!(cfg.role.forward.tempo.space_move_patience_loops, 2);
        assert!(cfg.role.midfielder.tempo.backpass_roles.contains(&Role::GK));
    }

    #[test]
    fn test_deterministic_removes_jitter() {
        let det = EngineConfig::deterministic();
        assert_eq!(det.role.passing.inaccuracy_max, 0.0);
        assert_eq!(det.role.shooting.goal_offset_range, 0.0);
        assert_eq!(det.role.shooting.corner_depth_spread, 0.0);
        assert_eq!(det.pitch, PitchConfig::default());
    }

    #[test]
    fn test_short_match() {
        let cfg = EngineConfig::short_match(60.0);
        assert!((cfg.simulation.match_duration - 60.0).abs() < 1e-4);
        assert_eq!(EngineConfig::short_match(-5.0).simulation.match_duration, 0.0);
    }

    #[test]
    fn test_partial_yaml_override_keeps_defaults() {
        let yaml = r#"
ball_physics:
  friction: 0.9
role:
  forward:
    tempo:
      space_move_patience_loops: 4
"#;
        let cfg = EngineConfig::from_yaml_str(yaml).unwrap();
        assert!((cfg.ball_physics.friction - 0.9).abs() < 1e-4);
        assert!((cfg.ball_physics.stop_threshold - 0.1).abs() < 1e-4);
        assert_eq!(cfg.role.forward.tempo.space_move_patience_loops, 4);
        assert!((cfg.role.forward.tempo.hold_min_duration - 0.8).abs() < 1e-4);
        assert_eq!(cfg.role.midfielder, MidfielderConfig::default());
    }

    #[test]
    fn test_partial_json_override() {
        let cfg = EngineConfig::from_json_str(r#"{"pitch": {"width": 100.0}}"#).unwrap();
        assert!((cfg.pitch.width - 100.0).abs() < 1e-4);
        assert!((cfg.pitch.height - 68.0).abs() < 1e-4);
    }

    #[test]
    fn test_load_dispatches_on_extension() {
        let dir = TempDir::new().unwrap();
        let json_path = dir.path().join("engine.json");
        std::fs::write(&json_path, r#"{"simulation": {"match_duration": 300.0}}"#).unwrap();
        let yaml_path = dir.path().join("engine.yaml");
        std::fs::write(&yaml_path, "simulation:\n  match_duration: 600.0\n").unwrap();

        let from_json = EngineConfig::load(&json_path).unwrap();
        let from_yaml = EngineConfig::load(&yaml_path).unwrap();
        assert!((from_json.simulation.match_duration - 300.0).abs() < 1e-4);
        assert!((from_yaml.simulation.match_duration - 600.0).abs() < 1e-4);
    }

    #[test]
    fn test_malformed_override_is_data_error() {
        let err = EngineConfig::from_yaml_str("pitch: wide").unwrap_err();
        assert!(matches!(err, TouchlineError::Yaml(_)));
        assert!(err.is_data_error());
    }

    #[test]
    fn test_yaml_roundtrip_of_defaults() {
        let yaml = serde_yaml::to_string(&EngineConfig::default()).unwrap();
        assert_eq!(EngineConfig::from_yaml_str(&yaml).unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_support_profiles_by_role() {
        let cfg = EngineConfig::default();
        let profiles = &cfg.role.possession_support.profiles;
        let cm = profiles.for_role(Role::CM).for_phase(AttackPhase::Midfield);
        assert_eq!(cm, SupportProfile::new(14.0, 8.0, 12.0));
        let gk = profiles.for_role(Role::GK).for_phase(AttackPhase::FinalThird);
        assert_eq!(gk.push, 0.0);
        assert_eq!(cfg.player_movement.role_profiles.for_role(Role::LCF).sprint_speed, 7.9);
    }
}
