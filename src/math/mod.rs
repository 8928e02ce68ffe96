//! 2D vector arithmetic and scalar utilities.
//!
//! Vectors are plain [`glam::Vec2`] values; every function here takes its
//! arguments by value and returns a new value.

mod pose;

pub use pose::Pose;

use glam::Vec2;
use thiserror::Error;

/// Magnitude at or below which a vector is considered degenerate.
pub const NORMALIZE_EPSILON: f32 = 1.0e-6;

/// Errors raised by the math utilities.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum MathError {
    /// `min` is greater than `max` (or either bound is NaN).
    #[error("invalid range: `min` ({min}) is greater than `max` ({max})")]
    InvalidRange { min: f32, max: f32 },
    /// The vector is too short (or non-finite) to have a direction.
    #[error("cannot normalize a degenerate vector")]
    DegenerateVector,
}

/// Returns the magnitude of a vector, squared.
#[inline]
pub fn magnitude_sqrd(v: Vec2) -> f32 {
    v.x * v.x + v.y * v.y
}

/// Alias for [`magnitude_sqrd`].
#[inline]
pub fn length_sqrd(v: Vec2) -> f32 {
    magnitude_sqrd(v)
}

/// Returns the magnitude of a vector.
#[inline]
pub fn magnitude(v: Vec2) -> f32 {
    magnitude_sqrd(v).sqrt()
}

/// Alias for [`magnitude`].
#[inline]
pub fn length(v: Vec2) -> f32 {
    magnitude(v)
}

/// Returns the distance between two points, squared.
#[inline]
pub fn distance_sqrd(a: Vec2, b: Vec2) -> f32 {
    magnitude_sqrd(a - b)
}

/// Returns the distance between two points.
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    magnitude(a - b)
}

/// Returns the unit vector pointing along `v`.
///
/// Fails with [`MathError::DegenerateVector`] when `v` is shorter than
/// [`NORMALIZE_EPSILON`] or not finite, so no NaN ever leaves this function.
#[inline]
pub fn normalize(v: Vec2) -> Result<Vec2, MathError> {
    let len = magnitude(v);
    if !len.is_finite() || len <= NORMALIZE_EPSILON {
        return Err(MathError::DegenerateVector);
    }
    Ok(Vec2::new(v.x / len, v.y / len))
}

/// Dot product of two vectors.
#[inline]
pub fn dot(a: Vec2, b: Vec2) -> f32 {
    a.x * b.x + a.y * b.y
}

/// 2D cross product: `a.x * b.y - a.y * b.x`.
#[inline]
pub fn cross(a: Vec2, b: Vec2) -> f32 {
    a.x * b.y - a.y * b.x
}

/// Cross product of a scalar (angular quantity) with a vector.
#[inline]
pub fn cross_sv(s: f32, v: Vec2) -> Vec2 {
    Vec2::new(-s * v.y, s * v.x)
}

/// Cross product of a vector with a scalar.
#[inline]
pub fn cross_vs(v: Vec2, s: f32) -> Vec2 {
    Vec2::new(s * v.y, -s * v.x)
}

fn check_range(min: f32, max: f32) -> Result<(), MathError> {
    if min.is_nan() || max.is_nan() || min > max {
        return Err(MathError::InvalidRange { min, max });
    }
    Ok(())
}

/// Clamps `x` into `[min, max]`.
///
/// Returns `min` when `min == max` and fails when `min > max`.
pub fn clamp(x: f32, min: f32, max: f32) -> Result<f32, MathError> {
    check_range(min, max)?;
    if min == max {
        return Ok(min);
    }
    Ok(if x < min {
        min
    } else if x > max {
        max
    } else {
        x
    })
}

/// Tests whether `x` lies strictly inside `(min, max)`.
///
/// The degenerate range `min == max` tests equality instead. Fails when
/// `min > max`.
pub fn within(x: f32, min: f32, max: f32) -> Result<bool, MathError> {
    check_range(min, max)?;
    if min == max {
        return Ok(x == min);
    }
    Ok(x > min && x < max)
}
