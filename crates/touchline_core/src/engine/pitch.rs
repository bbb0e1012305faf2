//! Pitch geometry: bounds, goal mouths, boxes. Pure functions only.
//!
//! 좌표계: 원점은 센터 스팟, 홈 골라인은 x = -width/2, 원정 골라인은 x = +width/2.

use super::config::PitchConfig;
use super::vector::Vector2D;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Home attacks +x, away attacks -x.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Home,
    Away,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Side::Home => Side::Away,
            Side::Away => Side::Home,
        }
    }

    /// +1 for home, -1 for away.
    pub fn attack_sign(self) -> f32 {
        match self {
            Side::Home => 1.0,
            Side::Away => -1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Home => "home",
            Side::Away => "away",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pitch {
    pub width: f32,
    pub height: f32,
    pub goal_width: f32,
    pub penalty_area_width: f32,
    pub penalty_area_depth: f32,
    pub goal_area_width: f32,
    pub goal_area_depth: f32,
}

impl Default for Pitch {
    fn default() -> Self {
        Self::new(&PitchConfig::default())
    }
}

impl Pitch {
    pub fn new(cfg: &PitchConfig) -> Self {
        Self {
            width: cfg.width,
            height: cfg.height,
            goal_width: cfg.goal_width,
            penalty_area_width: cfg.penalty_area_width,
            penalty_area_depth: cfg.penalty_area_depth,
            goal_area_width: cfg.goal_area_width,
            goal_area_depth: cfg.goal_area_depth,
        }
    }

    #[inline]
    pub fn half_width(&self) -> f32 {
        self.width / 2.0
    }

    #[inline]
    pub fn half_height(&self) -> f32 {
        self.height / 2.0
    }

    /// Boundary lines count as in.
    pub fn is_in_bounds(&self, p: Vector2D) -> bool {
        p.x.abs() <= self.half_width() && p.y.abs() <= self.half_height()
    }

    /// Ball past a goal line between the posts. Returns the scoring side.
    pub fn goal_scored(&self, p: Vector2D) -> Option<Side> {
        if p.x.abs() > self.half_width() && p.y.abs() <= self.goal_width / 2.0 {
            // crossing the home line (-x) credits away
            Some(if p.x < 0.0 { Side::Away } else { Side::Home })
        } else {
            None
        }
    }

    /// Side whose goal line lies at the end `p` is closest to.
    pub fn defending_side_at(&self, p: Vector2D) -> Side {
        if p.x < 0.0 {
            Side::Home
        } else {
            Side::Away
        }
    }

    pub fn crossed_goal_line(&self, p: Vector2D) -> bool {
        p.x.abs() > self.half_width()
    }

    pub fn crossed_touchline(&self, p: Vector2D) -> bool {
        p.y.abs() > self.half_height()
    }

    pub fn own_goal(&self, side: Side) -> Vector2D {
        Vector2D::new(-side.attack_sign() * self.half_width(), 0.0)
    }

    pub fn attacking_goal(&self, side: Side) -> Vector2D {
        Vector2D::new(side.attack_sign() * self.half_width(), 0.0)
    }

    /// Inside `side`'s own penalty area.
    pub fn in_penalty_area(&self, p: Vector2D, side: Side) -> bool {
        let goal_x = self.own_goal(side).x;
        (p.x - goal_x).abs() <= self.penalty_area_depth
            && p.y.abs() <= self.penalty_area_width / 2.0
            && p.x.abs() <= self.half_width()
    }

    pub fn in_goal_area(&self, p: Vector2D, side: Side) -> bool {
        let goal_x = self.own_goal(side).x;
        (p.x - goal_x).abs() <= self.goal_area_depth
            && p.y.abs() <= self.goal_area_width / 2.0
            && p.x.abs() <= self.half_width()
    }

    pub fn constrain_to_bounds(&self, p: Vector2D) -> Vector2D {
        Vector2D::new(
            p.x.clamp(-self.half_width(), self.half_width()),
            p.y.clamp(-self.half_height(), self.half_height()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        let pitch = Pitch::default();
        assert!(pitch.is_in_bounds(Vector2D::new(52.5, 34.0)));
        assert!(!pitch.is_in_bounds(Vector2D::new(52.6, 0.0)));
        assert!(!pitch.is_in_bounds(Vector2D::new(0.0, -34.1)));
        assert!(pitch.crossed_touchline(Vector2D::new(0.0, -34.1)));
        assert!(!pitch.crossed_touchline(Vector2D::new(60.0, 34.0)));
        assert!(pitch.crossed_goal_line(Vector2D::new(60.0, 34.0)));
        let c = pitch.constrain_to_bounds(Vector2D::new(80.0, -50.0));
        assert_eq!(c, Vector2D::new(52.5, -34.0));
    }

    #[test]
    fn test_goal_credits_opposite_side() {
        let pitch = Pitch::default();
        assert_eq!(pitch.goal_scored(Vector2D::new(-53.0, 1.0)), Some(Side::Away));
        assert_eq!(pitch.goal_scored(Vector2D::new(53.0, -3.6)), Some(Side::Home));
        assert_eq!(pitch.goal_scored(Vector2D::new(53.0, 4.0)), None);
        assert_eq!(pitch.goal_scored(Vector2D::new(52.0, 0.0)), None);
    }

    #[test]
    fn test_boxes() {
        let pitch = Pitch::default();
        assert!(pitch.in_penalty_area(Vector2D::new(-40.0, 10.0), Side::Home));
        assert!(!pitch.in_penalty_area(Vector2D::new(-40.0, 10.0), Side::Away));
        assert!(pitch.in_goal_area(Vector2D::new(48.0, -9.0), Side::Away));
        assert!(!pitch.in_goal_area(Vector2D::new(46.0, 0.0), Side::Away));
        assert_eq!(pitch.own_goal(Side::Home), Vector2D::new(-52.5, 0.0));
        assert_eq!(pitch.attacking_goal(Side::Home), Vector2D::new(52.5, 0.0));
    }
}
