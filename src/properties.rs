//! Structural properties of an instance.
//!
//! Inference never fails. Its result is cached on the `Instance` and dropped by every
//! mutator, so a present `InstanceProperties` always describes the current boxes.

use serde::Serialize;
use utoipa::ToSchema;

use crate::benchmark::Benchmark;
use crate::model::Box3D;
use crate::rational::Rational;
use crate::types::{Dimensional, Dims3};

/// Areas and componentwise extrema of an instance.
///
/// `max_min` and `stacked` take the rotation policy into account: a rotatable box
/// contributes its smallest (for `max_min`) or largest (for `stacked`) side on every
/// axis, a locked box its actual per-axis extent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct Extrema {
    #[schema(value_type = String)]
    pub total_area: Rational,
    #[schema(value_type = String)]
    pub min_area: Rational,
    #[schema(value_type = String)]
    pub max_area: Rational,
    pub min: Dims3,
    pub max: Dims3,
    pub max_min: Dims3,
    pub stacked: Dims3,
    #[schema(value_type = String)]
    pub max_dim: Rational,
    #[schema(value_type = String)]
    pub min_dim: Rational,
}

impl Extrema {
    /// Single pass over `boxes`. An empty slice yields all zeros.
    pub fn compute(boxes: &[Box3D], unoriented: bool) -> Self {
        let Some(first) = boxes.first() else {
            return Self::default();
        };

        let mut extrema = Self {
            min_area: first.area().clone(),
            max_area: first.area().clone(),
            min: Dims3::from(first),
            max: Dims3::from(first),
            ..Self::default()
        };

        for b in boxes {
            extrema.total_area += b.area();
            if b.area() < &extrema.min_area {
                extrema.min_area = b.area().clone();
            }
            if b.area() > &extrema.max_area {
                extrema.max_area = b.area().clone();
            }
            extrema.min.lower_to(b);
            extrema.max.raise_to(b);

            if b.rotatable(unoriented) {
                extrema.max_min.raise_to(&Dims3::splat(b.min_dim()));
                extrema.stacked.accumulate(&Dims3::splat(b.max_dim()));
            } else {
                extrema.max_min.raise_to(b);
                extrema.stacked.accumulate(b);
            }
        }

        extrema.max_dim = extrema.max.max_side().clone();
        extrema.min_dim = extrema.min.min_side().clone();
        extrema
    }
}

/// Flags and extrema derived from the boxes of an instance.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct InstanceProperties {
    pub unique: bool,
    pub sequential: bool,
    pub all_squares: bool,
    pub oriented_non_squares: bool,
    pub diagonal_symmetry: bool,
    pub sorted_decreasing_area: bool,
    pub sorted_decreasing_min_dim: bool,
    pub sorted_decreasing_width: bool,
    pub sorted_decreasing_size: bool,
    pub extrema: Extrema,
}

impl InstanceProperties {
    /// Runs every inference over `boxes` in their current order.
    ///
    /// # Examples
    /// ```
    /// use boxbound::model::Box3D;
    /// use boxbound::properties::InstanceProperties;
    ///
    /// let boxes = vec![Box3D::from_integers(1, 1, 1).unwrap()];
    /// let props = InstanceProperties::infer(&boxes, true, None);
    /// assert!(props.all_squares && props.unique && props.diagonal_symmetry);
    /// ```
    pub fn infer(boxes: &[Box3D], unoriented: bool, benchmark: Option<Benchmark>) -> Self {
        let mut multiset = boxes.to_vec();
        multiset.sort();

        let oriented_non_squares = boxes
            .iter()
            .any(|b| b.oriented(unoriented) && !b.is_cube());
        let all_squares = boxes.iter().all(|b| b.is_cube());
        let unique = is_unique(&multiset, unoriented);

        Self {
            unique,
            sequential: unique && is_sequential(&multiset, benchmark),
            all_squares,
            oriented_non_squares,
            diagonal_symmetry: has_diagonal_symmetry(
                &multiset,
                unoriented,
                oriented_non_squares,
                all_squares,
            ),
            sorted_decreasing_area: non_increasing_by(boxes, |b| b.area()),
            sorted_decreasing_min_dim: non_increasing_by(boxes, |b| b.min_dim()),
            sorted_decreasing_width: non_increasing_by(boxes, |b| b.width()),
            sorted_decreasing_size: boxes
                .windows(2)
                .all(|pair| pair[1].max_side() <= pair[0].min_dim()),
            extrema: Extrema::compute(boxes, unoriented),
        }
    }
}

fn is_unique(multiset: &[Box3D], unoriented: bool) -> bool {
    multiset.iter().enumerate().all(|(i, a)| {
        multiset[i + 1..]
            .iter()
            .all(|b| a != b && !a.can_equal(b, unoriented))
    })
}

fn is_sequential(multiset: &[Box3D], benchmark: Option<Benchmark>) -> bool {
    let Some(benchmark) = benchmark.filter(|b| b.has_sequence()) else {
        return false;
    };
    (1..=multiset.len() as u64).all(|k| {
        benchmark
            .sequence_member(k)
            .is_some_and(|member| multiset.binary_search(&member).is_ok())
    })
}

fn non_increasing_by<F>(boxes: &[Box3D], key: F) -> bool
where
    F: Fn(&Box3D) -> &Rational,
{
    boxes.windows(2).all(|pair| key(&pair[1]) <= key(&pair[0]))
}

fn has_diagonal_symmetry(
    multiset: &[Box3D],
    unoriented: bool,
    oriented_non_squares: bool,
    all_squares: bool,
) -> bool {
    if !oriented_non_squares || all_squares {
        return true;
    }

    let mut remaining: Vec<&Box3D> = multiset
        .iter()
        .filter(|b| !b.is_cube() && !b.rotatable(unoriented))
        .collect();
    if remaining.len() % 2 != 0 {
        return false;
    }

    while let Some(b) = remaining.pop() {
        match remaining.iter().position(|candidate| b.u_equal(candidate)) {
            Some(partner) => {
                remaining.swap_remove(partner);
            }
            None => return false,
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benchmark::BenchmarkParams;
    use crate::model::Orientation;

    fn boxed(w: u64, h: u64, l: u64, orientation: Orientation) -> Box3D {
        let mut b = Box3D::from_integers(w, h, l).unwrap();
        b.set_orientation(orientation);
        b
    }

    fn r(value: u32) -> Rational {
        Rational::from(value)
    }

    #[test]
    fn unit_cube() {
        let boxes = [boxed(1, 1, 1, Orientation::Unspecified)];
        let props = InstanceProperties::infer(&boxes, true, None);
        assert!(props.all_squares);
        assert!(props.unique);
        assert!(props.diagonal_symmetry);
        assert!(!props.oriented_non_squares);
        assert_eq!(props.extrema.total_area, r(1));
        assert_eq!(props.extrema.max_dim, r(1));
        assert_eq!(props.extrema.min_dim, r(1));
    }

    #[test]
    fn empty_instance_has_zero_extrema() {
        let props = InstanceProperties::infer(&[], false, None);
        assert_eq!(props.extrema, Extrema::default());
        assert!(props.all_squares);
        assert!(props.unique);
        assert!(props.sorted_decreasing_area);
    }

    #[test]
    fn rotational_duplicates_are_not_unique() {
        let boxes = [
            boxed(1, 2, 3, Orientation::Unspecified),
            boxed(3, 2, 1, Orientation::Unspecified),
        ];
        assert!(!InstanceProperties::infer(&boxes, true, None).unique);
        // Locked to their axes they are distinct
        assert!(InstanceProperties::infer(&boxes, false, None).unique);

        let copies = [
            boxed(1, 2, 3, Orientation::Oriented),
            boxed(1, 2, 3, Orientation::Oriented),
        ];
        assert!(!InstanceProperties::infer(&copies, false, None).unique);
    }

    #[test]
    fn distinct_cubes_are_unique() {
        let boxes: Vec<Box3D> = (1..=4)
            .map(|s| boxed(s, s, s, Orientation::Unspecified))
            .collect();
        assert!(InstanceProperties::infer(&boxes, true, None).unique);
    }

    #[test]
    fn symmetry_requires_u_equal_partners() {
        let squares = [
            boxed(2, 2, 2, Orientation::Oriented),
            boxed(3, 3, 3, Orientation::Oriented),
        ];
        assert!(InstanceProperties::infer(&squares, false, None).diagonal_symmetry);

        let lonely = [
            boxed(1, 2, 3, Orientation::Oriented),
            boxed(3, 3, 3, Orientation::Unspecified),
        ];
        let props = InstanceProperties::infer(&lonely, false, None);
        assert!(props.oriented_non_squares);
        assert!(!props.diagonal_symmetry);

        let paired = [
            boxed(1, 2, 3, Orientation::Oriented),
            boxed(2, 1, 3, Orientation::Oriented),
        ];
        assert!(InstanceProperties::infer(&paired, false, None).diagonal_symmetry);

        let mismatched = [
            boxed(1, 2, 3, Orientation::Oriented),
            boxed(2, 1, 4, Orientation::Oriented),
        ];
        assert!(!InstanceProperties::infer(&mismatched, false, None).diagonal_symmetry);
    }

    #[test]
    fn rotatable_boxes_do_not_break_symmetry() {
        let boxes = [
            boxed(1, 2, 3, Orientation::Oriented),
            boxed(2, 1, 3, Orientation::Oriented),
            boxed(4, 5, 6, Orientation::Unoriented),
        ];
        assert!(InstanceProperties::infer(&boxes, false, None).diagonal_symmetry);
    }

    #[test]
    fn sorted_flags() {
        let decreasing = [
            boxed(3, 3, 3, Orientation::Unspecified),
            boxed(2, 2, 2, Orientation::Unspecified),
            boxed(1, 1, 1, Orientation::Unspecified),
        ];
        let props = InstanceProperties::infer(&decreasing, false, None);
        assert!(props.sorted_decreasing_area);
        assert!(props.sorted_decreasing_min_dim);
        assert!(props.sorted_decreasing_width);
        assert!(props.sorted_decreasing_size);

        let mut broken = decreasing.to_vec();
        broken.push(boxed(2, 2, 1, Orientation::Unspecified));
        let props = InstanceProperties::infer(&broken, false, None);
        assert!(!props.sorted_decreasing_area);
        assert!(!props.sorted_decreasing_size);

        // Area decreases, but a side exceeds the previous minimum
        let flat = [
            boxed(4, 4, 1, Orientation::Unspecified),
            boxed(1, 1, 2, Orientation::Unspecified),
        ];
        let props = InstanceProperties::infer(&flat, false, None);
        assert!(props.sorted_decreasing_area);
        assert!(!props.sorted_decreasing_size);
    }

    #[test]
    fn cube_benchmark_is_sequential() {
        let boxes = Benchmark::Cube
            .generate(&BenchmarkParams::up_to(3))
            .unwrap();
        let props = InstanceProperties::infer(&boxes, false, Some(Benchmark::Cube));
        assert!(props.sequential);
        assert!(!props.sorted_decreasing_area);

        // Same boxes without the family are not sequential
        assert!(!InstanceProperties::infer(&boxes, false, None).sequential);
        assert!(!InstanceProperties::infer(&boxes, false, Some(Benchmark::Linear)).sequential);
    }

    #[test]
    fn gaps_and_duplicates_are_not_sequential() {
        let gap = [
            boxed(1, 1, 1, Orientation::Unspecified),
            boxed(3, 3, 3, Orientation::Unspecified),
        ];
        assert!(!InstanceProperties::infer(&gap, false, Some(Benchmark::Cube)).sequential);

        let duplicate = [
            boxed(1, 1, 1, Orientation::Unspecified),
            boxed(1, 1, 1, Orientation::Unspecified),
        ];
        assert!(!InstanceProperties::infer(&duplicate, false, Some(Benchmark::Cube)).sequential);
    }

    #[test]
    fn extrema_respect_rotation_policy() {
        let boxes = [
            boxed(1, 2, 3, Orientation::Unspecified),
            boxed(4, 1, 1, Orientation::Oriented),
        ];
        let free = Extrema::compute(&boxes, true);
        assert_eq!(free.total_area, r(10));
        assert_eq!(free.min_area, r(4));
        assert_eq!(free.max_area, r(6));
        assert_eq!(free.min, Dims3::new(r(1), r(1), r(1)));
        assert_eq!(free.max, Dims3::new(r(4), r(2), r(3)));
        assert_eq!(free.max_min, Dims3::new(r(4), r(1), r(1)));
        assert_eq!(free.stacked, Dims3::new(r(7), r(4), r(4)));
        assert_eq!(free.max_dim, r(4));
        assert_eq!(free.min_dim, r(1));

        let locked = Extrema::compute(&boxes, false);
        assert_eq!(locked.max_min, Dims3::new(r(4), r(2), r(3)));
        assert_eq!(locked.stacked, Dims3::new(r(5), r(3), r(4)));
    }

    #[test]
    fn inference_is_idempotent() {
        let boxes = [
            boxed(2, 3, 4, Orientation::Oriented),
            boxed(1, 1, 1, Orientation::Unspecified),
        ];
        assert_eq!(
            InstanceProperties::infer(&boxes, false, None),
            InstanceProperties::infer(&boxes, false, None)
        );
    }
}
