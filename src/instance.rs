//! Ordered collections of boxes with an accumulated scale factor.
//!
//! An `Instance` is filled once by a producer, then inferred, sorted, rescaled or rotated.
//! Every mutator drops the cached `InstanceProperties`; bound queries fall back to
//! recomputing the extrema they need, so they never see stale values.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::ops::{DivAssign, MulAssign};

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::One;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::benchmark::{Benchmark, BenchmarkError, BenchmarkParams};
use crate::model::Box3D;
use crate::properties::{Extrema, InstanceProperties};
use crate::rational::Rational;
use crate::types::Dimensional;

/// Box orderings selectable by numeric code (0 to 8).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Code 0: keep the producer's order.
    #[default]
    Insertion,
    /// Code 1: keep the current order.
    Identity,
    DecreasingArea,
    DecreasingMinDim,
    DecreasingHeight,
    DecreasingWidth,
    /// Increasing `width / height`.
    IncreasingWidthHeightRatio,
    /// Increasing `height / (width + length)`.
    IncreasingHeightRatio,
    /// Decreasing area under the unoriented policy, decreasing width otherwise.
    PolicyDependent,
}

impl SortOrder {
    pub const ALL: [SortOrder; 9] = [
        SortOrder::Insertion,
        SortOrder::Identity,
        SortOrder::DecreasingArea,
        SortOrder::DecreasingMinDim,
        SortOrder::DecreasingHeight,
        SortOrder::DecreasingWidth,
        SortOrder::IncreasingWidthHeightRatio,
        SortOrder::IncreasingHeightRatio,
        SortOrder::PolicyDependent,
    ];

    pub fn code(self) -> u8 {
        match self {
            SortOrder::Insertion => 0,
            SortOrder::Identity => 1,
            SortOrder::DecreasingArea => 2,
            SortOrder::DecreasingMinDim => 3,
            SortOrder::DecreasingHeight => 4,
            SortOrder::DecreasingWidth => 5,
            SortOrder::IncreasingWidthHeightRatio => 6,
            SortOrder::IncreasingHeightRatio => 7,
            SortOrder::PolicyDependent => 8,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|order| order.code() == code)
    }
}

/// Ordered boxes plus the instance-wide rotation policy.
///
/// # Examples
/// ```
/// use boxbound::instance::Instance;
/// use boxbound::model::Box3D;
/// use boxbound::rational::Rational;
///
/// let mut instance = Instance::with_boxes(vec![
///     Box3D::from_integers(2, 4, 6).unwrap(),
///     Box3D::from_integers(4, 8, 2).unwrap(),
/// ]);
/// assert_eq!(instance.scale_divisor(), Rational::from(2u32));
/// assert_eq!(instance.to_string(), "1x2x3,2x4x1");
/// assert_eq!(instance.scale(), &Rational::from(2u32));
/// ```
#[derive(Clone, Debug)]
pub struct Instance {
    boxes: Vec<Box3D>,
    unoriented: bool,
    benchmark: Option<Benchmark>,
    scale: Rational,
    properties: Option<InstanceProperties>,
}

impl Default for Instance {
    fn default() -> Self {
        Self::new()
    }
}

impl Instance {
    pub fn new() -> Self {
        Self::with_boxes(Vec::new())
    }

    pub fn with_boxes(boxes: Vec<Box3D>) -> Self {
        Self {
            boxes,
            unoriented: false,
            benchmark: None,
            scale: Rational::one(),
            properties: None,
        }
    }

    /// Builds the boxes of a benchmark family and remembers the family.
    pub fn from_benchmark(
        benchmark: Benchmark,
        params: &BenchmarkParams,
    ) -> Result<Self, BenchmarkError> {
        let mut instance = Self::with_boxes(benchmark.generate(params)?);
        instance.benchmark = Some(benchmark);
        Ok(instance)
    }

    pub fn boxes(&self) -> &[Box3D] {
        &self.boxes
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn push(&mut self, b: Box3D) {
        self.invalidate();
        self.boxes.push(b);
    }

    pub fn unoriented(&self) -> bool {
        self.unoriented
    }

    pub fn set_unoriented(&mut self, unoriented: bool) {
        self.invalidate();
        self.unoriented = unoriented;
    }

    pub fn benchmark(&self) -> Option<Benchmark> {
        self.benchmark
    }

    pub fn set_benchmark(&mut self, benchmark: Option<Benchmark>) {
        self.invalidate();
        self.benchmark = benchmark;
    }

    /// Factor relating current sides to the producer's: `current × scale = original`.
    pub fn scale(&self) -> &Rational {
        &self.scale
    }

    /// Properties of the current boxes, if inferred since the last mutation.
    pub fn properties(&self) -> Option<&InstanceProperties> {
        self.properties.as_ref()
    }

    pub fn infer_properties(&mut self) -> &InstanceProperties {
        let properties = InstanceProperties::infer(&self.boxes, self.unoriented, self.benchmark);
        self.properties.insert(properties)
    }

    /// Cached extrema, or freshly computed ones after a mutation.
    pub(crate) fn extrema(&self) -> Cow<'_, Extrema> {
        match &self.properties {
            Some(properties) => Cow::Borrowed(&properties.extrema),
            None => Cow::Owned(Extrema::compute(&self.boxes, self.unoriented)),
        }
    }

    fn invalidate(&mut self) {
        self.properties = None;
    }

    /// Whether `b` may be permuted among the axes under this instance's policy.
    pub fn rotatable(&self, b: &Box3D) -> bool {
        b.rotatable(self.unoriented)
    }

    fn for_each_box(&mut self, mut apply: impl FnMut(&mut Box3D)) {
        self.invalidate();
        self.boxes.iter_mut().for_each(|b| apply(b));
    }

    /// Makes every side integral by multiplying with the lcm of all denominators.
    ///
    /// Returns the multiplier; `scale` is divided by it.
    pub fn scale_discrete(&mut self) -> Rational {
        let multiplier = self
            .boxes
            .iter()
            .flat_map(|b| [b.width(), b.height(), b.length()])
            .fold(BigInt::one(), |acc, side| acc.lcm(side.denom()));
        let multiplier = Rational::from(multiplier);
        *self *= &multiplier;
        self.scale /= &multiplier;
        multiplier
    }

    /// Divides every side by the gcd of all numerators.
    ///
    /// Returns the divisor; `scale` is multiplied by it. An empty instance is left
    /// untouched and yields 1.
    pub fn scale_divisor(&mut self) -> Rational {
        let Some(first) = self.boxes.first() else {
            return Rational::one();
        };
        let divisor = self
            .boxes
            .iter()
            .flat_map(|b| [b.width(), b.height(), b.length()])
            .fold(first.width().numer().clone(), |acc, side| acc.gcd(side.numer()));
        let divisor = Rational::from(divisor);
        *self /= &divisor;
        self.scale *= &divisor;
        divisor
    }

    /// Stable sort by the given order.
    pub fn sort(&mut self, order: SortOrder) {
        let order = match order {
            SortOrder::PolicyDependent if self.unoriented => SortOrder::DecreasingArea,
            SortOrder::PolicyDependent => SortOrder::DecreasingWidth,
            other => other,
        };
        let compare: fn(&Box3D, &Box3D) -> Ordering = match order {
            SortOrder::Insertion | SortOrder::Identity | SortOrder::PolicyDependent => {
                return;
            }
            SortOrder::DecreasingArea => |a, b| b.cmp(a),
            SortOrder::DecreasingMinDim => |a, b| b.min_dim().cmp(a.min_dim()),
            SortOrder::DecreasingHeight => |a, b| b.height().cmp(a.height()),
            SortOrder::DecreasingWidth => |a, b| b.width().cmp(a.width()),
            SortOrder::IncreasingWidthHeightRatio => {
                |a, b| (a.width() / a.height()).cmp(&(b.width() / b.height()))
            }
            SortOrder::IncreasingHeightRatio => |a, b| {
                let key = |x: &Box3D| x.height() / &(x.width() + x.length());
                key(a).cmp(&key(b))
            },
        };
        self.invalidate();
        self.boxes.sort_by(compare);
    }

    /// Rotates every box one step of its `(w, h, l) -> (h, l, w)` cycle.
    pub fn rotate(&mut self) {
        self.for_each_box(Box3D::rotate);
    }

    pub fn round_up(&mut self) {
        self.for_each_box(Box3D::round_up);
    }

    pub fn round_down(&mut self) {
        self.for_each_box(Box3D::round_down);
    }
}

impl MulAssign<&Rational> for Instance {
    fn mul_assign(&mut self, factor: &Rational) {
        self.for_each_box(|b| b.mul_sides(factor));
    }
}

impl DivAssign<&Rational> for Instance {
    fn div_assign(&mut self, divisor: &Rational) {
        self.for_each_box(|b| b.div_sides(divisor));
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, b) in self.boxes.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", b)?;
        }
        Ok(())
    }
}
