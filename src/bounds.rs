//! Lower bounds on container extents.
//!
//! Every query takes a ceiling `n_max` on the first role of a dimension functor and
//! returns the least extent the second role, the third role, or the better of the two
//! must have for the boxes to fit. Queries are read-only: any rotation or relaxation
//! happens on local copies.
//!
//! Families:
//! - pairwise (`min_dim_pairs*`): worst pair of boxes, each box in its best rotation
//! - stacked (`min_dim*_stacked`): boxes too long to share the first axis must stack
//! - stacked ceiling (`min_dim*_stacked2`): where a greedy running-sum layout breaks

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::dims::{DimsFunctor, NUM_ROTATIONS};
use crate::instance::Instance;
use crate::model::Box3D;
use crate::rational::Rational;
use crate::types::Dimensional;

/// Role whose extent a bound constrains.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundAxis {
    Second,
    Third,
    /// The lesser of second and third.
    SecondOrThird,
}

impl BoundAxis {
    /// Extent of `d` along this role under `f`.
    pub fn extent<D: Dimensional + ?Sized>(self, f: DimsFunctor, d: &D) -> Rational {
        match self {
            BoundAxis::Second => f.d2(d).clone(),
            BoundAxis::Third => f.d3(d).clone(),
            BoundAxis::SecondOrThird => f.d2(d).min(f.d3(d)).clone(),
        }
    }
}

/// Result of a stacked-ceiling query.
///
/// A zero `ceiling` means the running sum never exceeded `n_max`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct StackedCeiling {
    #[schema(value_type = String)]
    pub ceiling: Rational,
    /// The threshold itself is excluded.
    pub open_interval: bool,
}

impl StackedCeiling {
    fn unbounded() -> Self {
        Self::default()
    }
}

impl Box3D {
    /// Least second-role extent that holds `self` under `mine` next to `other` under
    /// `theirs`.
    ///
    /// Side by side when their first-role extents fit `n_max`, stacked otherwise.
    pub fn min_dim2(
        &self,
        n_max: &Rational,
        other: &Box3D,
        mine: DimsFunctor,
        theirs: DimsFunctor,
    ) -> Rational {
        self.pair_extent(n_max, other, mine, theirs, BoundAxis::Second)
    }

    pub fn min_dim3(
        &self,
        n_max: &Rational,
        other: &Box3D,
        mine: DimsFunctor,
        theirs: DimsFunctor,
    ) -> Rational {
        self.pair_extent(n_max, other, mine, theirs, BoundAxis::Third)
    }

    /// The lesser of `min_dim2` and `min_dim3`.
    pub fn min_dim23(
        &self,
        n_max: &Rational,
        other: &Box3D,
        mine: DimsFunctor,
        theirs: DimsFunctor,
    ) -> Rational {
        self.pair_extent(n_max, other, mine, theirs, BoundAxis::SecondOrThird)
    }

    fn pair_extent(
        &self,
        n_max: &Rational,
        other: &Box3D,
        mine: DimsFunctor,
        theirs: DimsFunctor,
        axis: BoundAxis,
    ) -> Rational {
        if axis == BoundAxis::SecondOrThird {
            let second = self.pair_extent(n_max, other, mine, theirs, BoundAxis::Second);
            let third = self.pair_extent(n_max, other, mine, theirs, BoundAxis::Third);
            return second.min(third);
        }

        let a = axis.extent(mine, self);
        let b = axis.extent(theirs, other);
        if mine.d1(self) + theirs.d1(other) <= *n_max {
            a.max(b)
        } else {
            a + b
        }
    }
}

/// Functors a box may take: the rotation cycle of `f` when rotatable, else `f`.
fn orientations(f: DimsFunctor, rotatable: bool) -> impl Iterator<Item = DimsFunctor> {
    f.rotations().take(if rotatable { NUM_ROTATIONS } else { 1 })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Forcing {
    BeyondHalf,
    AtHalf,
}

/// Options for `Instance::sweep_stacked_bounds`.
#[derive(Clone, Debug, Deserialize, ToSchema)]
pub struct SweepRange {
    #[schema(value_type = String, example = "1")]
    pub from: Rational,
    #[schema(value_type = String, example = "20")]
    pub to: Rational,
    #[schema(value_type = String, example = "1")]
    pub step: Rational,
}

/// Progress of a stacked-bound sweep.
#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BoundEvent {
    Sample {
        #[schema(value_type = String)]
        n_max: Rational,
        #[schema(value_type = String)]
        second: Rational,
        #[schema(value_type = String)]
        third: Rational,
        #[schema(value_type = String)]
        either: Rational,
    },
    Finished {
        samples: usize,
        /// The sweep stopped at the sample cap before reaching `to`.
        truncated: bool,
    },
}

impl Instance {
    pub fn min_dim_pairs2(&self, n_max: &Rational, f: DimsFunctor) -> Rational {
        self.min_dim_pairs(n_max, f, BoundAxis::Second)
    }

    pub fn min_dim_pairs3(&self, n_max: &Rational, f: DimsFunctor) -> Rational {
        self.min_dim_pairs(n_max, f, BoundAxis::Third)
    }

    pub fn min_dim_pairs23(&self, n_max: &Rational, f: DimsFunctor) -> Rational {
        self.min_dim_pairs(n_max, f, BoundAxis::SecondOrThird)
    }

    /// Pairwise bound: the worst pair `(i, j > i)`, each box in its best admissible
    /// rotation, capped by the stacked extent.
    fn min_dim_pairs(&self, n_max: &Rational, f: DimsFunctor, axis: BoundAxis) -> Rational {
        let boxes = self.boxes();
        match boxes {
            [] => return Rational::zero(),
            [only] if self.rotatable(only) => return only.min_dim().clone(),
            [only] => return axis.extent(f, only),
            _ => {}
        }

        let ceiling = axis.extent(f, &self.extrema().stacked);
        let mut best = Rational::zero();
        for (i, a) in boxes.iter().enumerate() {
            let mut least = ceiling.clone();
            for fa in orientations(f, self.rotatable(a)) {
                if fa.d1(a) > n_max {
                    continue;
                }
                let mut worst = Rational::zero();
                for b in &boxes[i + 1..] {
                    let mut pair = ceiling.clone();
                    for fb in orientations(fa, self.rotatable(b)) {
                        if fb.d1(b) <= n_max {
                            pair = pair.min(a.pair_extent(n_max, b, fa, fb, axis));
                        }
                    }
                    worst = worst.max(pair);
                }
                least = least.min(worst);
            }
            best = best.max(least);
        }
        best
    }

    pub fn min_dim2_stacked(&self, n_max: &Rational, f: DimsFunctor) -> Rational {
        self.min_dim_stacked(n_max, f, BoundAxis::Second)
    }

    pub fn min_dim3_stacked(&self, n_max: &Rational, f: DimsFunctor) -> Rational {
        self.min_dim_stacked(n_max, f, BoundAxis::Third)
    }

    pub fn min_dim23_stacked(&self, n_max: &Rational, f: DimsFunctor) -> Rational {
        self.min_dim_stacked(n_max, f, BoundAxis::SecondOrThird)
    }

    /// Sum of the extents of boxes that cannot share the first axis with another
    /// box: those longer than `n_max / 2`, then those of exactly half.
    ///
    /// Non-increasing in `n_max`.
    fn min_dim_stacked(&self, n_max: &Rational, f: DimsFunctor, axis: BoundAxis) -> Rational {
        let half = n_max / &Rational::from(2u32);
        let forced: Vec<(Forcing, Rational)> = self
            .boxes()
            .iter()
            .filter_map(|b| self.forced_extent(b, n_max, &half, f, axis))
            .collect();

        let mut total = Rational::zero();
        for pass in [Forcing::BeyondHalf, Forcing::AtHalf] {
            for (forcing, extent) in &forced {
                if *forcing == pass {
                    total += extent;
                }
            }
        }
        total
    }

    fn forced_extent(
        &self,
        b: &Box3D,
        n_max: &Rational,
        half: &Rational,
        f: DimsFunctor,
        axis: BoundAxis,
    ) -> Option<(Forcing, Rational)> {
        let classify = |d1: &Rational| match d1.cmp(half) {
            std::cmp::Ordering::Greater => Some(Forcing::BeyondHalf),
            std::cmp::Ordering::Equal => Some(Forcing::AtHalf),
            std::cmp::Ordering::Less => None,
        };

        if !self.rotatable(b) {
            return classify(f.d1(b)).map(|forcing| (forcing, axis.extent(f, b)));
        }

        let mut admissible = false;
        let mut cheapest: Option<(Forcing, Rational)> = None;
        for g in f.rotations() {
            let d1 = g.d1(b);
            if d1 > n_max {
                continue;
            }
            admissible = true;
            let forcing = classify(d1)?;
            let extent = axis.extent(g, b);
            if cheapest.as_ref().is_none_or(|(_, best)| &extent < best) {
                cheapest = Some((forcing, extent));
            }
        }

        if !admissible {
            return Some((Forcing::BeyondHalf, b.max_dim().clone()));
        }
        cheapest
    }

    pub fn min_dim2_stacked2(&self, n_max: &Rational, f: DimsFunctor) -> StackedCeiling {
        self.stacked_ceiling(n_max, f, BoundAxis::Second)
    }

    pub fn min_dim3_stacked2(&self, n_max: &Rational, f: DimsFunctor) -> StackedCeiling {
        self.stacked_ceiling(n_max, f, BoundAxis::Third)
    }

    /// The lesser ceiling of `min_dim2_stacked2` and `min_dim3_stacked2`.
    ///
    /// On a tie the interval is open only if both are open.
    pub fn min_dim23_stacked2(&self, n_max: &Rational, f: DimsFunctor) -> StackedCeiling {
        let second = self.min_dim2_stacked2(n_max, f);
        let third = self.min_dim3_stacked2(n_max, f);
        match second.ceiling.cmp(&third.ceiling) {
            std::cmp::Ordering::Less => second,
            std::cmp::Ordering::Greater => third,
            std::cmp::Ordering::Equal => StackedCeiling {
                open_interval: second.open_interval && third.open_interval,
                ceiling: second.ceiling,
            },
        }
    }

    /// Lays the boxes out along the first axis, largest second-role extent first
    /// (ties by first-role extent), and reports the `axis` extent of the first box
    /// that overflows `n_max`.
    fn stacked_ceiling(&self, n_max: &Rational, f: DimsFunctor, axis: BoundAxis) -> StackedCeiling {
        let mut boxes = self.boxes().to_vec();
        for b in &mut boxes {
            if !self.rotatable(b) {
                continue;
            }
            let fits = {
                let (d1, d2, d3) = f.project(&*b);
                d1 <= n_max && d2 <= n_max && d3 <= n_max
            };
            if fits {
                b.relax();
                continue;
            }
            for _ in 0..NUM_ROTATIONS {
                if f.d1(&*b) <= n_max {
                    break;
                }
                b.rotate();
            }
        }

        boxes.sort_by(|a, b| f.d2(b).cmp(f.d2(a)).then_with(|| f.d1(b).cmp(f.d1(a))));

        let mut run = Rational::zero();
        for (idx, b) in boxes.iter().enumerate() {
            run += f.d1(b);
            if &run > n_max {
                let extent = axis.extent(f, b);
                let open_interval = idx > 0 && axis.extent(f, &boxes[idx - 1]) != extent;
                return StackedCeiling {
                    ceiling: extent * Rational::from(2u32),
                    open_interval,
                };
            }
        }
        StackedCeiling::unbounded()
    }

    /// Evaluates the three stacked bounds on the grid `from, from + step, … ≤ to`.
    ///
    /// Emits one `Sample` per grid point, at most `max_samples` of them, then a
    /// `Finished` event. Returns the number of samples.
    pub fn sweep_stacked_bounds<F>(
        &self,
        range: &SweepRange,
        f: DimsFunctor,
        max_samples: usize,
        mut on_event: F,
    ) -> usize
    where
        F: FnMut(&BoundEvent),
    {
        let mut samples = 0;
        let mut n_max = range.from.clone();
        let mut truncated = false;

        if range.step.is_positive() {
            while n_max <= range.to {
                if samples == max_samples {
                    truncated = true;
                    break;
                }
                on_event(&BoundEvent::Sample {
                    second: self.min_dim2_stacked(&n_max, f),
                    third: self.min_dim3_stacked(&n_max, f),
                    either: self.min_dim23_stacked(&n_max, f),
                    n_max: n_max.clone(),
                });
                samples += 1;
                n_max += &range.step;
            }
        }

        on_event(&BoundEvent::Finished { samples, truncated });
        samples
    }
}
