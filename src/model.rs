//! Data models for packable boxes.
//!
//! This module defines the fundamental item type of an instance:
//! - `Orientation`: per-box rotation policy
//! - `Box3D`: three exact sides plus cached area and minimum side
//! - `BoxSpec`: the validated wire form used by producers
//!
//! Sides of a `Box3D` are private so the cached area and minimum side can never go
//! stale; every mutating method refreshes them.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::rational::Rational;
use crate::types::{Dimensional, validation};

/// Validation error for box data coming from a producer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    InvalidDimension(String),
    InvalidParameter(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidDimension(msg) => write!(f, "Invalid dimension: {}", msg),
            ValidationError::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Rotation policy of a single box.
///
/// `Unspecified` defers to the instance-wide policy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Oriented,
    Unoriented,
    #[default]
    Unspecified,
}

impl Orientation {
    /// Whether the box is locked to its axes under the instance-wide policy.
    pub fn is_locked(self, unoriented: bool) -> bool {
        match self {
            Orientation::Oriented => true,
            Orientation::Unoriented => false,
            Orientation::Unspecified => !unoriented,
        }
    }

    /// Suffix used in the textual rendering of a box.
    pub fn suffix(self) -> &'static str {
        match self {
            Orientation::Oriented => "o",
            Orientation::Unoriented => "u",
            Orientation::Unspecified => "",
        }
    }
}

/// Wire form of a box: three sides and an optional orientation tag.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct BoxSpec {
    #[schema(value_type = String, example = "3/2")]
    pub width: Rational,
    #[schema(value_type = String, example = "2")]
    pub height: Rational,
    #[schema(value_type = String, example = "1.25")]
    pub length: Rational,
    #[serde(default)]
    pub orientation: Orientation,
}

/// A packable item with three exact sides.
///
/// Two boxes are equal when their sides match in the same axis order; the
/// orientation tag does not take part in equality or ordering. Boxes order by
/// area first, then width, height and length.
///
/// # Examples
/// ```
/// use boxbound::model::{Box3D, Orientation};
/// use boxbound::rational::Rational;
///
/// let b = Box3D::new(
///     Rational::from(2u32),
///     Rational::from(3u32),
///     Rational::new(1, 2),
///     Orientation::Unspecified,
/// )
/// .unwrap();
/// assert_eq!(b.area(), &Rational::from(3u32));
/// assert_eq!(b.min_dim(), &Rational::new(1, 2));
/// assert!(b.rotatable(true));
/// assert!(!b.rotatable(false));
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "BoxSpec", into = "BoxSpec")]
pub struct Box3D {
    width: Rational,
    height: Rational,
    length: Rational,
    orientation: Orientation,
    area: Rational,
    min_dim: Rational,
}

impl Box3D {
    /// Creates a new box, rejecting non-positive sides.
    pub fn new(
        width: Rational,
        height: Rational,
        length: Rational,
        orientation: Orientation,
    ) -> Result<Self, ValidationError> {
        validation::validate_sides(&width, &height, &length)
            .map_err(ValidationError::InvalidDimension)?;
        Ok(Self::from_sides(width, height, length, orientation))
    }

    /// Creates a box whose sides are known to be positive.
    pub(crate) fn from_sides(
        width: Rational,
        height: Rational,
        length: Rational,
        orientation: Orientation,
    ) -> Self {
        let mut b = Self {
            width,
            height,
            length,
            orientation,
            area: Rational::zero(),
            min_dim: Rational::zero(),
        };
        b.refresh();
        b
    }

    /// Creates an integral box with the given sides.
    pub fn from_integers(width: u64, height: u64, length: u64) -> Result<Self, ValidationError> {
        Self::new(
            Rational::from(width),
            Rational::from(height),
            Rational::from(length),
            Orientation::Unspecified,
        )
    }

    fn refresh(&mut self) {
        self.area = &self.width * &self.height * &self.length;
        self.min_dim = Dimensional::min_side(self).clone();
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
    }

    /// Cached product of the three sides.
    pub fn area(&self) -> &Rational {
        &self.area
    }

    /// Cached smallest side.
    pub fn min_dim(&self) -> &Rational {
        &self.min_dim
    }

    pub fn max_dim(&self) -> &Rational {
        self.max_side()
    }

    /// Whether the box is locked to its axes under the instance-wide policy.
    pub fn oriented(&self, unoriented: bool) -> bool {
        self.orientation.is_locked(unoriented)
    }

    /// True iff the box may be permuted among the axes and is not a cube.
    pub fn rotatable(&self, unoriented: bool) -> bool {
        !self.oriented(unoriented) && !self.is_cube()
    }

    fn sorted_sides(&self) -> [&Rational; 3] {
        let mut sides = [&self.width, &self.height, &self.length];
        sides.sort();
        sides
    }

    /// Whether `other` is reachable from `self` by a permitted rotation.
    pub fn can_equal(&self, other: &Box3D, unoriented: bool) -> bool {
        (!self.oriented(unoriented) || !other.oriented(unoriented))
            && self.sorted_sides() == other.sorted_sides()
    }

    /// Whether `other` is `self` with width and height swapped.
    pub fn u_equal(&self, other: &Box3D) -> bool {
        self.width == other.height && self.height == other.width && self.length == other.length
    }

    /// One step of the 3-cycle `(w, h, l) -> (h, l, w)`.
    pub fn rotate(&mut self) {
        std::mem::swap(&mut self.width, &mut self.height);
        std::mem::swap(&mut self.height, &mut self.length);
    }

    /// Sets every side to the minimum side.
    pub fn relax(&mut self) {
        self.width = self.min_dim.clone();
        self.height = self.min_dim.clone();
        self.length = self.min_dim.clone();
        self.refresh();
    }

    pub fn round_up(&mut self) {
        self.width = self.width.ceil();
        self.height = self.height.ceil();
        self.length = self.length.ceil();
        self.refresh();
    }

    pub fn round_down(&mut self) {
        self.width = self.width.floor();
        self.height = self.height.floor();
        self.length = self.length.floor();
        self.refresh();
    }

    /// Multiplies every side by `factor`.
    pub fn mul_sides(&mut self, factor: &Rational) {
        self.width *= factor;
        self.height *= factor;
        self.length *= factor;
        self.refresh();
    }

    /// Divides every side by `divisor`.
    pub fn div_sides(&mut self, divisor: &Rational) {
        self.width /= divisor;
        self.height /= divisor;
        self.length /= divisor;
        self.refresh();
    }
}

impl Dimensional for Box3D {
    fn width(&self) -> &Rational {
        &self.width
    }

    fn height(&self) -> &Rational {
        &self.height
    }

    fn length(&self) -> &Rational {
        &self.length
    }

    fn area(&self) -> Rational {
        self.area.clone()
    }
}

impl PartialEq for Box3D {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width && self.height == other.height && self.length == other.length
    }
}

impl Eq for Box3D {}

impl PartialOrd for Box3D {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Box3D {
    fn cmp(&self, other: &Self) -> Ordering {
        self.area
            .cmp(&other.area)
            .then_with(|| self.width.cmp(&other.width))
            .then_with(|| self.height.cmp(&other.height))
            .then_with(|| self.length.cmp(&other.length))
    }
}

impl fmt::Display for Box3D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{}x{}{}",
            self.width,
            self.height,
            self.length,
            self.orientation.suffix()
        )
    }
}

impl TryFrom<BoxSpec> for Box3D {
    type Error = ValidationError;

    fn try_from(spec: BoxSpec) -> Result<Self, Self::Error> {
        Box3D::new(spec.width, spec.height, spec.length, spec.orientation)
    }
}

impl From<Box3D> for BoxSpec {
    fn from(b: Box3D) -> Self {
        BoxSpec {
            width: b.width,
            height: b.height,
            length: b.length,
            orientation: b.orientation,
        }
    }
}
