//! Canonical benchmark families.
//!
//! Each family builds boxes from integer parameters `j`. Parameters come as explicit
//! values plus inclusive ranges; a lone value `v` stands for the range `1..=v`. `n` is
//! the largest parameter and feeds the families whose sides depend on it.

use std::fmt;

use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use serde_json::json;
use utoipa::ToSchema;

use crate::model::{Box3D, Orientation};
use crate::rational::Rational;

/// Error raised when a benchmark description cannot be turned into boxes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BenchmarkError {
    UnknownBenchmark(u8),
    EmptyParameters,
    ZeroParameter,
    InvalidRange(u64, u64),
    /// More parameters than `BenchmarkParams::MAX_PARAMETERS`.
    TooManyParameters(u64),
}

impl fmt::Display for BenchmarkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BenchmarkError::UnknownBenchmark(id) => {
                write!(f, "Unknown benchmark family {}", id)
            }
            BenchmarkError::EmptyParameters => {
                write!(f, "Benchmark requires at least one parameter")
            }
            BenchmarkError::ZeroParameter => write!(f, "Benchmark parameters must be at least 1"),
            BenchmarkError::InvalidRange(lower, upper) => {
                write!(f, "Invalid parameter range {}..={}", lower, upper)
            }
            BenchmarkError::TooManyParameters(count) => write!(
                f,
                "Benchmark expands to {} parameters, at most {} are allowed",
                count,
                BenchmarkParams::MAX_PARAMETERS
            ),
        }
    }
}

impl std::error::Error for BenchmarkError {}

/// The eight canonical benchmark families, identified by ids 1 to 8.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Benchmark {
    /// `(j, j, j)`
    Cube,
    /// `(j, j+1, j+2)`
    NearCube,
    /// `(j, n+1-j, j)` and its two axis variants
    Complement,
    /// `(j, 2n-j, 3n-2j)`
    Linear,
    /// `(1/j, 1/(j+1), 1/(j+2))`
    Reciprocal,
    /// `(jn+1, n(n+1-j)+1, jn+1)` and its two axis variants
    ScaledComplement,
    /// `(2j, 2j+2, 2j+4)`
    Even,
    /// `(2j-1, 2j, 2j+1)`
    Odd,
}

impl Benchmark {
    pub const ALL: [Benchmark; 8] = [
        Benchmark::Cube,
        Benchmark::NearCube,
        Benchmark::Complement,
        Benchmark::Linear,
        Benchmark::Reciprocal,
        Benchmark::ScaledComplement,
        Benchmark::Even,
        Benchmark::Odd,
    ];

    pub fn id(self) -> u8 {
        match self {
            Benchmark::Cube => 1,
            Benchmark::NearCube => 2,
            Benchmark::Complement => 3,
            Benchmark::Linear => 4,
            Benchmark::Reciprocal => 5,
            Benchmark::ScaledComplement => 6,
            Benchmark::Even => 7,
            Benchmark::Odd => 8,
        }
    }

    pub fn from_id(id: u8) -> Result<Self, BenchmarkError> {
        Self::ALL
            .into_iter()
            .find(|b| b.id() == id)
            .ok_or(BenchmarkError::UnknownBenchmark(id))
    }

    /// Families whose instances can be recognized as the sequence `f(1), …, f(n)`.
    pub fn has_sequence(self) -> bool {
        matches!(self, Benchmark::Cube | Benchmark::NearCube)
    }

    /// The `k`-th member of the canonical sequence, for families that have one.
    pub fn sequence_member(self, k: u64) -> Option<Box3D> {
        let k = Rational::from(k);
        let one = Rational::one();
        match self {
            Benchmark::Cube => Some(cube(&k)),
            Benchmark::NearCube => {
                let next = &k + &one;
                let after = &next + &one;
                Some(unspecified(k, next, after))
            }
            _ => None,
        }
    }

    /// Builds all boxes for the given parameters.
    ///
    /// Explicit values come first, then every range in order.
    ///
    /// # Examples
    /// ```
    /// use boxbound::benchmark::{Benchmark, BenchmarkParams};
    ///
    /// let boxes = Benchmark::Cube.generate(&BenchmarkParams::up_to(3)).unwrap();
    /// let rendered: Vec<String> = boxes.iter().map(|b| b.to_string()).collect();
    /// assert_eq!(rendered, ["1x1x1", "2x2x2", "3x3x3"]);
    /// ```
    pub fn generate(self, params: &BenchmarkParams) -> Result<Vec<Box3D>, BenchmarkError> {
        let parameters = params.expand()?;
        let n = parameters.iter().copied().max().unwrap_or(0);
        let mut boxes = Vec::with_capacity(parameters.len());
        for j in parameters {
            self.push_boxes(j, n, &mut boxes);
        }
        Ok(boxes)
    }

    fn push_boxes(self, j: u64, n: u64, out: &mut Vec<Box3D>) {
        let one = Rational::one();
        let two = Rational::from(2u32);
        let n = Rational::from(n);
        let j = Rational::from(j);
        match self {
            Benchmark::Cube => out.push(cube(&j)),
            Benchmark::NearCube => {
                let next = &j + &one;
                let after = &next + &one;
                out.push(unspecified(j, next, after));
            }
            Benchmark::Complement => {
                let complement = &n + &one - &j;
                push_complement_variants(j, complement, out);
            }
            Benchmark::Linear => {
                let second = &two * &n - &j;
                let third = Rational::from(3u32) * &n - &two * &j;
                out.push(unspecified(j, second, third));
            }
            Benchmark::Reciprocal => {
                let next = &j + &one;
                let after = &next + &one;
                out.push(unspecified(
                    &one / &j,
                    &one / &next,
                    &one / &after,
                ));
            }
            Benchmark::ScaledComplement => {
                let scaled = &j * &n + &one;
                let complement = &n * &(&n + &one - &j) + &one;
                push_complement_variants(scaled, complement, out);
            }
            Benchmark::Even => {
                let first = &two * &j;
                let second = &first + &two;
                let third = &second + &two;
                out.push(unspecified(first, second, third));
            }
            Benchmark::Odd => {
                let middle = &two * &j;
                out.push(unspecified(&middle - &one, middle.clone(), &middle + &one));
            }
        }
    }
}

impl fmt::Display for Benchmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({})", self, self.id())
    }
}

fn unspecified(width: Rational, height: Rational, length: Rational) -> Box3D {
    Box3D::from_sides(width, height, length, Orientation::Unspecified)
}

fn cube(side: &Rational) -> Box3D {
    unspecified(side.clone(), side.clone(), side.clone())
}

/// `(a, c, a)`, plus `(c, a, a)` and `(a, a, c)` when `a != c`.
fn push_complement_variants(a: Rational, c: Rational, out: &mut Vec<Box3D>) {
    out.push(unspecified(a.clone(), c.clone(), a.clone()));
    if a != c {
        out.push(unspecified(c.clone(), a.clone(), a.clone()));
        out.push(unspecified(a.clone(), a, c));
    }
}

/// Integer parameters of a benchmark family.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BenchmarkParams {
    #[serde(default)]
    pub values: Vec<u64>,
    /// Inclusive `[lower, upper]` ranges.
    #[serde(default)]
    #[schema(value_type = Vec<[u64; 2]>, example = json!([[1, 4]]))]
    pub ranges: Vec<(u64, u64)>,
}

impl BenchmarkParams {
    /// Upper limit on the number of expanded parameters.
    pub const MAX_PARAMETERS: u64 = 4096;

    /// The range `1..=n`.
    pub fn up_to(n: u64) -> Self {
        Self {
            values: Vec::new(),
            ranges: vec![(1, n)],
        }
    }

    /// Flattens values and ranges into the ordered list of parameters.
    fn expand(&self) -> Result<Vec<u64>, BenchmarkError> {
        if self.values.len() == 1 && self.ranges.is_empty() {
            return Self::up_to(self.values[0]).expand();
        }
        if self.values.is_empty() && self.ranges.is_empty() {
            return Err(BenchmarkError::EmptyParameters);
        }

        let mut count = self.values.len() as u64;
        for &(lower, upper) in &self.ranges {
            if lower > upper {
                return Err(BenchmarkError::InvalidRange(lower, upper));
            }
            count = count.saturating_add((upper - lower).saturating_add(1));
        }
        if count > Self::MAX_PARAMETERS {
            return Err(BenchmarkError::TooManyParameters(count));
        }

        let mut parameters = self.values.clone();
        for &(lower, upper) in &self.ranges {
            parameters.extend(lower..=upper);
        }
        if parameters.contains(&0) {
            return Err(BenchmarkError::ZeroParameter);
        }
        Ok(parameters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(benchmark: Benchmark, params: &BenchmarkParams) -> Vec<String> {
        benchmark
            .generate(params)
            .unwrap()
            .iter()
            .map(|b| b.to_string())
            .collect()
    }

    #[test]
    fn ids_round_trip() {
        for benchmark in Benchmark::ALL {
            assert_eq!(Benchmark::from_id(benchmark.id()), Ok(benchmark));
        }
        assert_eq!(Benchmark::from_id(0), Err(BenchmarkError::UnknownBenchmark(0)));
        assert_eq!(Benchmark::from_id(9), Err(BenchmarkError::UnknownBenchmark(9)));
    }

    #[test]
    fn lone_value_means_range_from_one() {
        let params = BenchmarkParams {
            values: vec![3],
            ranges: Vec::new(),
        };
        assert_eq!(
            rendered(Benchmark::Cube, &params),
            ["1x1x1", "2x2x2", "3x3x3"]
        );
    }

    #[test]
    fn explicit_values_precede_ranges() {
        let params = BenchmarkParams {
            values: vec![5, 2],
            ranges: vec![(3, 3)],
        };
        assert_eq!(
            rendered(Benchmark::NearCube, &params),
            ["5x6x7", "2x3x4", "3x4x5"]
        );
    }

    #[test]
    fn complement_family_emits_three_variants_off_the_diagonal() {
        // n = 3: j = 2 is its own complement
        assert_eq!(
            rendered(Benchmark::Complement, &BenchmarkParams::up_to(3)),
            [
                "1x3x1", "3x1x1", "1x1x3", //
                "2x2x2", //
                "3x1x3", "1x3x3", "3x3x1",
            ]
        );
    }

    #[test]
    fn scaled_complement_family() {
        // n = 2: j = 1 -> a = 3, c = 5; j = 2 -> a = 5, c = 3
        assert_eq!(
            rendered(Benchmark::ScaledComplement, &BenchmarkParams::up_to(2)),
            ["3x5x3", "5x3x3", "3x3x5", "5x3x5", "3x5x5", "5x5x3"]
        );
    }

    #[test]
    fn linear_reciprocal_even_odd() {
        let params = BenchmarkParams::up_to(2);
        assert_eq!(rendered(Benchmark::Linear, &params), ["1x3x4", "2x2x2"]);
        assert_eq!(
            rendered(Benchmark::Reciprocal, &params),
            ["1x1/2x1/3", "1/2x1/3x1/4"]
        );
        assert_eq!(rendered(Benchmark::Even, &params), ["2x4x6", "4x6x8"]);
        assert_eq!(rendered(Benchmark::Odd, &params), ["1x2x3", "3x4x5"]);
    }

    #[test]
    fn rejects_bad_parameters() {
        assert_eq!(
            Benchmark::Cube.generate(&BenchmarkParams::default()),
            Err(BenchmarkError::EmptyParameters)
        );
        assert_eq!(
            Benchmark::Cube.generate(&BenchmarkParams {
                values: vec![0, 2],
                ranges: Vec::new(),
            }),
            Err(BenchmarkError::ZeroParameter)
        );
        assert_eq!(
            Benchmark::Cube.generate(&BenchmarkParams {
                values: Vec::new(),
                ranges: vec![(4, 2)],
            }),
            Err(BenchmarkError::InvalidRange(4, 2))
        );
    }

    #[test]
    fn rejects_oversized_parameter_sets() {
        assert_eq!(
            Benchmark::Cube.generate(&BenchmarkParams {
                values: Vec::new(),
                ranges: vec![(1, u64::MAX)],
            }),
            Err(BenchmarkError::TooManyParameters(u64::MAX))
        );
        assert_eq!(
            Benchmark::Cube.generate(&BenchmarkParams {
                values: Vec::new(),
                ranges: vec![(0, u64::MAX)],
            }),
            Err(BenchmarkError::TooManyParameters(u64::MAX))
        );
        assert_eq!(
            Benchmark::Cube.generate(&BenchmarkParams {
                values: vec![10_000_000_000],
                ranges: Vec::new(),
            }),
            Err(BenchmarkError::TooManyParameters(10_000_000_000))
        );
        let at_limit = BenchmarkParams::up_to(BenchmarkParams::MAX_PARAMETERS);
        assert_eq!(
            Benchmark::Odd.generate(&at_limit).map(|boxes| boxes.len() as u64),
            Ok(BenchmarkParams::MAX_PARAMETERS)
        );
        assert!(matches!(
            Benchmark::Odd.generate(&BenchmarkParams {
                values: vec![1],
                ranges: vec![(1, BenchmarkParams::MAX_PARAMETERS)],
            }),
            Err(BenchmarkError::TooManyParameters(_))
        ));
    }

    #[test]
    fn sequence_members_exist_only_for_cube_families() {
        assert_eq!(
            Benchmark::NearCube.sequence_member(2).map(|b| b.to_string()),
            Some("2x3x4".to_string())
        );
        assert!(Benchmark::Cube.sequence_member(1).is_some());
        assert!(Benchmark::Linear.sequence_member(1).is_none());
        assert!(Benchmark::Cube.has_sequence());
        assert!(!Benchmark::Odd.has_sequence());
    }
}
