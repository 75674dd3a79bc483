//! Core math types for navigation.
//!
//! World coordinates use a Y-up convention: the ground plane is XZ and
//! a yaw of zero faces +Z. Distances are in world units (roughly meters).

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

/// 3D world position or direction vector.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    /// Height above the ground plane.
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    /// Create a new vector.
    #[inline]
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Zero vector (origin).
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Euclidean distance to another point.
    #[inline]
    pub fn distance(&self, other: &Vec3) -> f32 {
        (*self - *other).length()
    }

    /// Distance projected onto the ground plane (ignores height).
    #[inline]
    pub fn horizontal_distance(&self, other: &Vec3) -> f32 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        (dx * dx + dz * dz).sqrt()
    }

    /// Vector length (magnitude).
    #[inline]
    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Normalize to unit length; zero vectors pass through unchanged.
    #[inline]
    pub fn normalize(&self) -> Vec3 {
        let len = self.length();
        if len > 1e-6 {
            Vec3::new(self.x / len, self.y / len, self.z / len)
        } else {
            *self
        }
    }

    /// Dot product.
    #[inline]
    pub fn dot(&self, other: &Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Yaw angle from this point to another, in the ground plane.
    /// Zero faces +Z, positive rotates toward +X.
    #[inline]
    pub fn yaw_to(&self, other: &Vec3) -> f32 {
        let dx = other.x - self.x;
        let dz = other.z - self.z;
        dx.atan2(dz)
    }

    /// Point at a given yaw and ground-plane distance from this point.
    #[inline]
    pub fn point_at_yaw(&self, yaw: f32, distance: f32) -> Vec3 {
        Vec3::new(
            self.x + distance * yaw.sin(),
            self.y,
            self.z + distance * yaw.cos(),
        )
    }

    /// Perpendicular direction in the ground plane (left of this vector).
    #[inline]
    pub fn perpendicular(&self) -> Vec3 {
        Vec3::new(-self.z, 0.0, self.x)
    }

    /// Linear interpolation toward another point.
    #[inline]
    pub fn lerp(&self, other: &Vec3, t: f32) -> Vec3 {
        *self + (*other - *self) * t
    }
}

impl Add for Vec3 {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Vec3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Vec3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Self;

    #[inline]
    fn mul(self, scalar: f32) -> Self {
        Vec3::new(self.x * scalar, self.y * scalar, self.z * scalar)
    }
}

impl Neg for Vec3 {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

/// Vehicle pose: position plus hull yaw.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    /// Hull heading in radians, zero facing +Z.
    pub yaw: f32,
}

impl Pose {
    /// Create a new pose.
    #[inline]
    pub fn new(position: Vec3, yaw: f32) -> Self {
        Self { position, yaw }
    }

    /// Unit forward vector in the ground plane.
    #[inline]
    pub fn forward(&self) -> Vec3 {
        Vec3::new(self.yaw.sin(), 0.0, self.yaw.cos())
    }
}

/// Opaque actor identity used for self-collision filtering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(pub u64);

/// Normalized control signals handed to the actuation layer each tick.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct ControlOutput {
    /// Throttle in [-1, 1]; negative reverses.
    pub throttle: f32,
    /// Turn rate in [-1, 1]; positive turns toward +X when facing +Z.
    pub turn: f32,
    /// Desired weapon-mount heading in degrees.
    pub mount_heading_deg: f32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_distance() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(3.0, 0.0, 4.0);
        assert!((a.distance(&b) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_yaw_to() {
        let origin = Vec3::ZERO;
        let ahead = Vec3::new(0.0, 0.0, 1.0);
        let right = Vec3::new(1.0, 0.0, 0.0);

        assert!(origin.yaw_to(&ahead).abs() < 1e-6);
        assert!((origin.yaw_to(&right) - FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn test_point_at_yaw_round_trip() {
        let origin = Vec3::new(2.0, 0.0, -3.0);
        let p = origin.point_at_yaw(0.7, 10.0);
        assert!((origin.yaw_to(&p) - 0.7).abs() < 1e-5);
        assert!((origin.horizontal_distance(&p) - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_pose_forward() {
        let pose = Pose::new(Vec3::ZERO, 0.0);
        let fwd = pose.forward();
        assert!((fwd.z - 1.0).abs() < 1e-6);
        assert!(fwd.x.abs() < 1e-6);
    }
}
