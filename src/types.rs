//! Common side accessors and aggregates for 3D extents.
//!
//! `Dimensional` is the seam the dimension functors project through: boxes and
//! box-like aggregates (running sums, componentwise extrema) both implement it.

use std::fmt;

use serde::Serialize;
use utoipa::ToSchema;

use crate::rational::Rational;

/// Trait for anything with a width, height and length.
pub trait Dimensional {
    fn width(&self) -> &Rational;
    fn height(&self) -> &Rational;
    fn length(&self) -> &Rational;

    /// Product of all three sides.
    fn area(&self) -> Rational {
        self.width() * self.height() * self.length()
    }

    /// Smallest of the three sides.
    fn min_side(&self) -> &Rational {
        self.width().min(self.height()).min(self.length())
    }

    /// Largest of the three sides.
    fn max_side(&self) -> &Rational {
        self.width().max(self.height()).max(self.length())
    }

    /// All three sides are equal.
    fn is_cube(&self) -> bool {
        self.width() == self.height() && self.width() == self.length()
    }
}

/// Plain triple of exact extents.
///
/// Used for the componentwise aggregates of an instance: `min`, `max`, `max_min`
/// and `stacked`. Unlike a box it carries no orientation and may contain zeros.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct Dims3 {
    #[schema(value_type = String, example = "3")]
    pub width: Rational,
    #[schema(value_type = String, example = "3")]
    pub height: Rational,
    #[schema(value_type = String, example = "3")]
    pub length: Rational,
}

impl Dims3 {
    pub fn new(width: Rational, height: Rational, length: Rational) -> Self {
        Self {
            width,
            height,
            length,
        }
    }

    /// Same value on every axis.
    pub fn splat(value: &Rational) -> Self {
        Self::new(value.clone(), value.clone(), value.clone())
    }

    pub fn zero() -> Self {
        Self::default()
    }

    /// Adds another extent componentwise.
    pub fn accumulate<D: Dimensional + ?Sized>(&mut self, other: &D) {
        self.width += other.width();
        self.height += other.height();
        self.length += other.length();
    }

    /// Raises each component to at least the matching component of `other`.
    pub fn raise_to<D: Dimensional + ?Sized>(&mut self, other: &D) {
        if other.width() > &self.width {
            self.width = other.width().clone();
        }
        if other.height() > &self.height {
            self.height = other.height().clone();
        }
        if other.length() > &self.length {
            self.length = other.length().clone();
        }
    }

    /// Lowers each component to at most the matching component of `other`.
    pub fn lower_to<D: Dimensional + ?Sized>(&mut self, other: &D) {
        if other.width() < &self.width {
            self.width = other.width().clone();
        }
        if other.height() < &self.height {
            self.height = other.height().clone();
        }
        if other.length() < &self.length {
            self.length = other.length().clone();
        }
    }
}

impl Dimensional for Dims3 {
    fn width(&self) -> &Rational {
        &self.width
    }

    fn height(&self) -> &Rational {
        &self.height
    }

    fn length(&self) -> &Rational {
        &self.length
    }
}

impl<D: Dimensional> From<&D> for Dims3 {
    fn from(value: &D) -> Self {
        Self::new(
            value.width().clone(),
            value.height().clone(),
            value.length().clone(),
        )
    }
}

impl fmt::Display for Dims3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.width, self.height, self.length)
    }
}

/// Validation functions shared by the producers.
pub mod validation {
    use crate::rational::Rational;

    /// Validates a single side.
    ///
    /// # Returns
    /// `Ok(())` for positive values, otherwise error text
    pub fn validate_side(value: &Rational, name: &str) -> Result<(), String> {
        if !value.is_positive() {
            return Err(format!("{} must be positive, got: {}", name, value));
        }
        Ok(())
    }

    /// Validates all three sides of a box.
    pub fn validate_sides(
        width: &Rational,
        height: &Rational,
        length: &Rational,
    ) -> Result<(), String> {
        validate_side(width, "Width")?;
        validate_side(height, "Height")?;
        validate_side(length, "Length")?;
        Ok(())
    }
}
