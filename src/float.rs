//! Floating-point abstraction so the simulation runs on `f32` or `f64`.

use core::cmp::PartialOrd;
use core::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

/// Floating-point operations needed by the polygon solver.
///
/// Implemented for `f32` and `f64`. The `Send + Sync` bounds let whole
/// polygons move across rayon workers.
pub trait Float:
    Copy
    + Clone
    + PartialEq
    + PartialOrd
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + SubAssign
    + Default
    + Send
    + Sync
    + core::fmt::Debug
    + core::fmt::Display
    + 'static
{
    /// The additive identity (0.0).
    fn zero() -> Self;
    /// The multiplicative identity (1.0).
    fn one() -> Self;
    /// Half (0.5).
    fn half() -> Self;
    /// Two (2.0).
    fn two() -> Self;
    /// Pi (~3.14159).
    fn pi() -> Self;
    fn sqrt(self) -> Self;
    fn sin(self) -> Self;
    fn cos(self) -> Self;
    fn abs(self) -> Self;
    fn floor(self) -> Self;
    fn min(self, other: Self) -> Self;
    fn max(self, other: Self) -> Self;
    /// False for NaN and the infinities.
    fn is_finite(self) -> bool;
    /// Convert from f32 (for constants and configuration).
    fn from_f32(v: f32) -> Self;
    /// Convert a count (particle or polygon count) to a scalar.
    fn from_usize(v: usize) -> Self;
    /// Saturating conversion used for grid cell coordinates.
    fn to_i32(self) -> i32;
    /// Widening conversion for error reports and logs.
    fn to_f64(self) -> f64;

    /// Clamp self to [min, max].
    fn clamp(self, min: Self, max: Self) -> Self {
        self.max(min).min(max)
    }

    /// Check if approximately zero within epsilon.
    fn is_near_zero(self, epsilon: Self) -> bool {
        self.abs() < epsilon
    }
}

macro_rules! impl_float {
    ($t:ident) => {
        impl Float for $t {
            fn zero() -> Self { 0.0 }
            fn one() -> Self { 1.0 }
            fn half() -> Self { 0.5 }
            fn two() -> Self { 2.0 }
            fn pi() -> Self { core::$t::consts::PI }
            fn sqrt(self) -> Self { $t::sqrt(self) }
            fn sin(self) -> Self { $t::sin(self) }
            fn cos(self) -> Self { $t::cos(self) }
            fn abs(self) -> Self { $t::abs(self) }
            fn floor(self) -> Self { $t::floor(self) }
            fn min(self, other: Self) -> Self { if self < other { self } else { other } }
            fn max(self, other: Self) -> Self { if self > other { self } else { other } }
            fn is_finite(self) -> bool { $t::is_finite(self) }
            fn from_f32(v: f32) -> Self { v as $t }
            fn from_usize(v: usize) -> Self { v as $t }
            fn to_i32(self) -> i32 { self as i32 }
            fn to_f64(self) -> f64 { self as f64 }
        }
    };
}

impl_float!(f32);
impl_float!(f64);
