//! RGBA color with channels clamped to `[0, 1]`

use serde::{Serialize, Deserialize};
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Sub, SubAssign};

use crate::foundation::math::utils::clamp;

/// Linear RGBA color
///
/// Every constructor and operator clamps the result back into `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red channel
    pub r: f32,
    /// Green channel
    pub g: f32,
    /// Blue channel
    pub b: f32,
    /// Alpha channel
    pub a: f32,
}

const DIVISION_EPSILON: f32 = 1.0e-9;

impl Color {
    #[allow(missing_docs)]
    pub const BLACK: Self = Self::from_raw(0.0, 0.0, 0.0, 1.0);
    #[allow(missing_docs)]
    pub const BLUE: Self = Self::from_raw(0.0, 0.0, 1.0, 1.0);
    #[allow(missing_docs)]
    pub const CYAN: Self = Self::from_raw(0.0, 1.0, 1.0, 1.0);
    #[allow(missing_docs)]
    pub const EMERALD: Self = Self::from_raw(0.18039, 0.8, 0.44314, 1.0);
    #[allow(missing_docs)]
    pub const GREEN: Self = Self::from_raw(0.0, 1.0, 0.0, 1.0);
    #[allow(missing_docs)]
    pub const MAGENTA: Self = Self::from_raw(1.0, 0.0, 1.0, 1.0);
    #[allow(missing_docs)]
    pub const ORANGE: Self = Self::from_raw(0.95294, 0.61176, 0.07059, 1.0);
    #[allow(missing_docs)]
    pub const PURPLE: Self = Self::from_raw(0.66275, 0.02745, 0.89412, 1.0);
    #[allow(missing_docs)]
    pub const RED: Self = Self::from_raw(1.0, 0.0, 0.0, 1.0);
    #[allow(missing_docs)]
    pub const SILVER: Self = Self::from_raw(0.74118, 0.76471, 0.78039, 1.0);
    #[allow(missing_docs)]
    pub const TURQUOISE: Self = Self::from_raw(0.10196, 0.73725, 0.61176, 1.0);
    #[allow(missing_docs)]
    pub const WHITE: Self = Self::from_raw(1.0, 1.0, 1.0, 1.0);
    #[allow(missing_docs)]
    pub const YELLOW: Self = Self::from_raw(1.0, 1.0, 0.0, 1.0);

    /// Create a color, clamping every channel into `[0, 1]`
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self {
            r: clamp(r, 0.0, 1.0),
            g: clamp(g, 0.0, 1.0),
            b: clamp(b, 0.0, 1.0),
            a: clamp(a, 0.0, 1.0),
        }
    }

    /// Opaque color from RGB
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    const fn from_raw(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Channels as an array, the layout clear calls expect
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    fn map2(self, rhs: Self, op: impl Fn(f32, f32) -> f32) -> Self {
        Self::new(op(self.r, rhs.r), op(self.g, rhs.g), op(self.b, rhs.b), op(self.a, rhs.a))
    }
}

impl Add for Color {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.map2(rhs, |a, b| a + b)
    }
}

impl AddAssign for Color {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Color {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self.map2(rhs, |a, b| a - b)
    }
}

impl SubAssign for Color {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Mul for Color {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        self.map2(rhs, |a, b| a * b)
    }
}

impl MulAssign for Color {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl Mul<f32> for Color {
    type Output = Self;

    fn mul(self, scalar: f32) -> Self {
        Self::new(self.r * scalar, self.g * scalar, self.b * scalar, self.a * scalar)
    }
}

impl MulAssign<f32> for Color {
    fn mul_assign(&mut self, scalar: f32) {
        *self = *self * scalar;
    }
}

impl Div for Color {
    type Output = Self;

    fn div(self, rhs: Self) -> Self {
        debug_assert!(
            rhs.to_array().iter().all(|c| c.abs() > DIVISION_EPSILON),
            "Can't divide a color by a zero channel"
        );
        self.map2(rhs, |a, b| a / b)
    }
}

impl DivAssign for Color {
    fn div_assign(&mut self, rhs: Self) {
        *self = *self / rhs;
    }
}

impl Div<f32> for Color {
    type Output = Self;

    fn div(self, scalar: f32) -> Self {
        debug_assert!(scalar.abs() > DIVISION_EPSILON, "Can't divide a color by zero");
        self * (1.0 / scalar)
    }
}

impl DivAssign<f32> for Color {
    fn div_assign(&mut self, scalar: f32) {
        *self = *self / scalar;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_new_clamps_channels() {
        let color = Color::new(1.5, -0.5, 0.25, 2.0);
        assert_eq!(color, Color::new(1.0, 0.0, 0.25, 1.0));
    }

    #[test]
    fn test_arithmetic_saturates() {
        let mut color = Color::RED + Color::WHITE;
        assert_eq!(color, Color::WHITE);

        color -= Color::new(0.5, 0.5, 0.5, 0.0);
        assert_relative_eq!(color.r, 0.5);
        assert_relative_eq!(color.a, 1.0);

        let scaled = Color::rgb(0.2, 0.4, 0.6) * 2.0;
        assert_relative_eq!(scaled.b, 1.0);
        assert_relative_eq!(scaled.g, 0.8);
    }

    #[test]
    fn test_scalar_division() {
        let halved = Color::WHITE / 2.0;
        assert_relative_eq!(halved.r, 0.5);
        assert_relative_eq!(halved.a, 0.5);
    }
}
