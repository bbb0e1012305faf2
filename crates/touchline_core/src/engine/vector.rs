//! Vector2D: 미터 단위 2D 좌표/변위
//!
//! 원점은 센터 서클, +x 는 홈팀 공격 방향, +y 는 왼쪽 터치라인.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector2D {
    pub x: f32,
    pub y: f32,
}

impl Vector2D {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn magnitude(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Unit vector, or zero for a zero-length input.
    #[inline]
    pub fn normalize(&self) -> Self {
        let mag = self.magnitude();
        if mag == 0.0 {
            return Self::ZERO;
        }
        Self::new(self.x / mag, self.y / mag)
    }

    #[inline]
    pub fn distance_to(&self, other: Self) -> f32 {
        (other - *self).magnitude()
    }

    #[inline]
    pub fn dot(&self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Left-hand perpendicular: (-y, x).
    #[inline]
    pub fn perpendicular(&self) -> Self {
        Self::new(-self.y, self.x)
    }

    /// 선형 보간 (t=0 → self, t=1 → target)
    #[inline]
    pub fn lerp(&self, target: Self, t: f32) -> Self {
        Self::new(self.x + (target.x - self.x) * t, self.y + (target.y - self.y) * t)
    }

    #[inline]
    pub fn manhattan_to(&self, other: Self) -> f32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Unit heading for an angle in degrees, 0° along +x.
    pub fn from_degrees(deg: f32) -> Self {
        let rad = deg.to_radians();
        Self::new(rad.cos(), rad.sin())
    }
}

impl Add for Vector2D {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vector2D {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vector2D {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vector2D {
    type Output = Self;
    fn mul(self, scalar: f32) -> Self {
        Self::new(self.x * scalar, self.y * scalar)
    }
}

impl Neg for Vector2D {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl fmt::Display for Vector2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2},{:.2})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arithmetic() {
        let a = Vector2D::new(3.0, 4.0);
        let b = Vector2D::new(1.0, -2.0);
        assert_eq!(a + b, Vector2D::new(4.0, 2.0));
        assert_eq!(a - b, Vector2D::new(2.0, 6.0));
        assert_eq!(a * 2.0, Vector2D::new(6.0, 8.0));
        assert_eq!(-b, Vector2D::new(-1.0, 2.0));
        assert!((a.magnitude() - 5.0).abs() < 1e-6);
        assert!((a.distance_to(b) - (4.0f32 + 36.0).sqrt()).abs() < 1e-5);
        assert_eq!(a.dot(b), -5.0);
    }

    #[test]
    fn test_normalize_zero_is_zero() {
        assert_eq!(Vector2D::ZERO.normalize(), Vector2D::ZERO);
        let n = Vector2D::new(0.0, -7.0).normalize();
        assert_eq!(n, Vector2D::new(0.0, -1.0));
    }

    #[test]
    fn test_lerp_and_manhattan() {
        let a = Vector2D::new(0.0, 0.0);
        let b = Vector2D::new(10.0, -4.0);
        assert_eq!(a.lerp(b, 0.5), Vector2D::new(5.0, -2.0));
        assert_eq!(a.manhattan_to(b), 14.0);
    }
}
