//! Plain coordinate value types.
//!
//! Positions follow host conventions: `Vector3` is `x y z` in blocks and
//! `Vector2` is either a rotation (`x` = pitch, `y` = yaw) or a horizontal
//! offset. String forms are space separated, matching command syntax.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;
use thiserror::Error;

/// Failure to parse a vector from a `"x y z"` string.
#[derive(Debug, Error, PartialEq)]
pub enum ParseVectorError {
    /// Wrong number of components.
    #[error("expected {expected} components, found {found}")]
    Arity {
        /// Components required.
        expected: usize,
        /// Components present.
        found: usize,
    },
    /// A component was not a number.
    #[error("invalid component {0:?}")]
    Component(String),
}

/// Two-component vector.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector2 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
}

impl Vector2 {
    /// Zero vector.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Create a new vector.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Translate by another vector.
    pub fn offset(self, other: Vector2) -> Self {
        self + other
    }

    /// Exact component check.
    pub fn check(self, x: f64, y: f64) -> bool {
        self.x == x && self.y == y
    }

    /// Euclidean length.
    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Unit vector in the same direction; zero stays zero.
    pub fn normalized(self) -> Self {
        let len = self.length();
        if len == 0.0 {
            return Self::ZERO;
        }
        Self::new(self.x / len, self.y / len)
    }

    /// Linear interpolation between `a` and `b`.
    pub fn lerp(a: Self, b: Self, t: f64) -> Self {
        a + (b - a) * t
    }
}

impl Add for Vector2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vector2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vector2 {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl fmt::Display for Vector2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.x, self.y)
    }
}

impl FromStr for Vector2 {
    type Err = ParseVectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let [x, y] = parse_components::<2>(s)?;
        Ok(Self::new(x, y))
    }
}

/// Three-component vector.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
}

impl Vector3 {
    /// Zero vector.
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Create a new vector.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Translate by another vector.
    pub fn offset(self, other: Vector3) -> Self {
        self + other
    }

    /// Exact component check.
    pub fn check(self, x: f64, y: f64, z: f64) -> bool {
        self.x == x && self.y == y && self.z == z
    }

    /// Drop the z component.
    pub fn to_vector2(self) -> Vector2 {
        Vector2::new(self.x, self.y)
    }

    /// Euclidean length.
    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Unit vector in the same direction; zero stays zero.
    pub fn normalized(self) -> Self {
        let len = self.length();
        if len == 0.0 {
            return Self::ZERO;
        }
        Self::new(self.x / len, self.y / len, self.z / len)
    }

    /// Snap every component to the nearest half block.
    pub fn center(self) -> Self {
        Self::new(
            round_to_half(self.x),
            round_to_half(self.y),
            round_to_half(self.z),
        )
    }

    /// Snap x and z to the nearest half block, keeping y.
    pub fn below_center(self) -> Self {
        Self::new(round_to_half(self.x), self.y, round_to_half(self.z))
    }

    /// Half of a structure size, floored per axis.
    pub fn size_center(self) -> Self {
        Self::new(
            (self.x / 2.0).floor(),
            (self.y / 2.0).floor(),
            (self.z / 2.0).floor(),
        )
    }

    /// Half of a structure size on the horizontal axes, zero height.
    pub fn size_below_center(self) -> Self {
        Self::new((self.x / 2.0).floor(), 0.0, (self.z / 2.0).floor())
    }

    /// Per-axis absolute extent between two corners.
    pub fn to_volume(self, other: Vector3) -> Self {
        Self::new(
            (self.x - other.x).abs(),
            (self.y - other.y).abs(),
            (self.z - other.z).abs(),
        )
    }

    /// Rotate around the vertical axis by `degrees` (yaw).
    pub fn rotate_y(self, degrees: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self::new(
            self.x * cos - self.z * sin,
            self.y,
            self.x * sin + self.z * cos,
        )
    }

    /// Linear interpolation between `a` and `b`.
    pub fn lerp(a: Self, b: Self, t: f64) -> Self {
        a + (b - a) * t
    }
}

fn round_to_half(value: f64) -> f64 {
    (value * 2.0).round() / 2.0
}

impl Add for Vector3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vector3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vector3 {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Vector3 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl fmt::Display for Vector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.x, self.y, self.z)
    }
}

impl FromStr for Vector3 {
    type Err = ParseVectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let [x, y, z] = parse_components::<3>(s)?;
        Ok(Self::new(x, y, z))
    }
}

fn parse_components<const N: usize>(s: &str) -> Result<[f64; N], ParseVectorError> {
    let parts: Vec<&str> = s.split_whitespace().collect();
    if parts.len() != N {
        return Err(ParseVectorError::Arity {
            expected: N,
            found: parts.len(),
        });
    }
    let mut out = [0.0; N];
    for (slot, part) in out.iter_mut().zip(parts) {
        *slot = part
            .parse()
            .map_err(|_| ParseVectorError::Component(part.to_string()))?;
    }
    Ok(out)
}
