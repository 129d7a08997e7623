//! Dimension functors: fixed assignments of physical axes to semantic roles.
//!
//! A functor projects any `Dimensional` value onto an ordered triple
//! (first, second, third). Bound algorithms treat "first" as the constrained axis and
//! run unchanged under every role assignment by swapping the functor.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::rational::Rational;
use crate::types::Dimensional;

/// Number of distinct functors reachable through `rotate()` from any functor.
pub const NUM_ROTATIONS: usize = 3;

/// Physical axis of a box.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    Width,
    Height,
    Length,
}

impl Axis {
    #[inline]
    pub fn pick<D: Dimensional + ?Sized>(self, d: &D) -> &Rational {
        match self {
            Axis::Width => d.width(),
            Axis::Height => d.height(),
            Axis::Length => d.length(),
        }
    }
}

/// One of the six axis-role permutations, named by the axes playing
/// first, second and third role.
///
/// # Examples
/// ```
/// use boxbound::dims::DimsFunctor;
///
/// let f = DimsFunctor::WidthHeightLength;
/// assert_eq!(f.rotate(), DimsFunctor::HeightLengthWidth);
/// assert_eq!(f.reverse(), DimsFunctor::HeightWidthLength);
/// assert_eq!(f.rotate().rotate().rotate(), f);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DimsFunctor {
    #[default]
    WidthHeightLength,
    HeightLengthWidth,
    LengthWidthHeight,
    HeightWidthLength,
    WidthLengthHeight,
    LengthHeightWidth,
}

impl DimsFunctor {
    pub const ALL: [DimsFunctor; 6] = [
        DimsFunctor::WidthHeightLength,
        DimsFunctor::HeightLengthWidth,
        DimsFunctor::LengthWidthHeight,
        DimsFunctor::HeightWidthLength,
        DimsFunctor::WidthLengthHeight,
        DimsFunctor::LengthHeightWidth,
    ];

    /// Axes playing the first, second and third role.
    pub const fn axes(self) -> [Axis; 3] {
        match self {
            DimsFunctor::WidthHeightLength => [Axis::Width, Axis::Height, Axis::Length],
            DimsFunctor::HeightLengthWidth => [Axis::Height, Axis::Length, Axis::Width],
            DimsFunctor::LengthWidthHeight => [Axis::Length, Axis::Width, Axis::Height],
            DimsFunctor::HeightWidthLength => [Axis::Height, Axis::Width, Axis::Length],
            DimsFunctor::WidthLengthHeight => [Axis::Width, Axis::Length, Axis::Height],
            DimsFunctor::LengthHeightWidth => [Axis::Length, Axis::Height, Axis::Width],
        }
    }

    fn from_axes(axes: [Axis; 3]) -> Self {
        match axes {
            [Axis::Width, Axis::Height, _] => DimsFunctor::WidthHeightLength,
            [Axis::Height, Axis::Length, _] => DimsFunctor::HeightLengthWidth,
            [Axis::Length, Axis::Width, _] => DimsFunctor::LengthWidthHeight,
            [Axis::Height, Axis::Width, _] => DimsFunctor::HeightWidthLength,
            [Axis::Width, Axis::Length, _] => DimsFunctor::WidthLengthHeight,
            _ => DimsFunctor::LengthHeightWidth,
        }
    }

    #[inline]
    pub fn d1<'a, D: Dimensional + ?Sized>(self, d: &'a D) -> &'a Rational {
        self.axes()[0].pick(d)
    }

    #[inline]
    pub fn d2<'a, D: Dimensional + ?Sized>(self, d: &'a D) -> &'a Rational {
        self.axes()[1].pick(d)
    }

    #[inline]
    pub fn d3<'a, D: Dimensional + ?Sized>(self, d: &'a D) -> &'a Rational {
        self.axes()[2].pick(d)
    }

    /// Projects `d` onto (first, second, third).
    pub fn project<'a, D: Dimensional + ?Sized>(
        self,
        d: &'a D,
    ) -> (&'a Rational, &'a Rational, &'a Rational) {
        (self.d1(d), self.d2(d), self.d3(d))
    }

    /// Next functor of the 3-cycle: roles `(a, b, c)` become `(b, c, a)`.
    pub fn rotate(self) -> Self {
        let [a, b, c] = self.axes();
        Self::from_axes([b, c, a])
    }

    /// Functor with the first two roles swapped.
    pub fn reverse(self) -> Self {
        let [a, b, c] = self.axes();
        Self::from_axes([b, a, c])
    }

    /// The three functors of the rotation cycle, starting with `self`.
    pub fn rotations(self) -> impl Iterator<Item = DimsFunctor> {
        std::iter::successors(Some(self), |f| Some(f.rotate())).take(NUM_ROTATIONS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Dims3;

    fn sample() -> Dims3 {
        Dims3::new(
            Rational::from(1u32),
            Rational::from(2u32),
            Rational::from(3u32),
        )
    }

    fn triple(f: DimsFunctor) -> (Rational, Rational, Rational) {
        let d = sample();
        let (a, b, c) = f.project(&d);
        (a.clone(), b.clone(), c.clone())
    }

    #[test]
    fn projections_follow_axis_names() {
        let r = |v: u32| Rational::from(v);
        assert_eq!(triple(DimsFunctor::WidthHeightLength), (r(1), r(2), r(3)));
        assert_eq!(triple(DimsFunctor::HeightLengthWidth), (r(2), r(3), r(1)));
        assert_eq!(triple(DimsFunctor::LengthWidthHeight), (r(3), r(1), r(2)));
        assert_eq!(triple(DimsFunctor::HeightWidthLength), (r(2), r(1), r(3)));
        assert_eq!(triple(DimsFunctor::WidthLengthHeight), (r(1), r(3), r(2)));
        assert_eq!(triple(DimsFunctor::LengthHeightWidth), (r(3), r(2), r(1)));
    }

    #[test]
    fn rotation_is_a_three_cycle() {
        for f in DimsFunctor::ALL {
            assert_ne!(f.rotate(), f);
            assert_eq!(f.rotate().rotate().rotate(), f);
            let firsts: Vec<Axis> = f.rotations().map(|g| g.axes()[0]).collect();
            assert_eq!(firsts.len(), NUM_ROTATIONS);
            assert!(firsts.contains(&Axis::Width));
            assert!(firsts.contains(&Axis::Height));
            assert!(firsts.contains(&Axis::Length));
        }
    }

    #[test]
    fn reverse_swaps_first_two_roles() {
        for f in DimsFunctor::ALL {
            let r = f.reverse();
            assert_eq!(r.reverse(), f);
            assert_eq!(r.axes()[0], f.axes()[1]);
            assert_eq!(r.axes()[1], f.axes()[0]);
            assert_eq!(r.axes()[2], f.axes()[2]);
        }
    }

    #[test]
    fn rotation_preserves_handedness() {
        let cycle: Vec<DimsFunctor> = DimsFunctor::WidthHeightLength.rotations().collect();
        assert_eq!(
            cycle,
            vec![
                DimsFunctor::WidthHeightLength,
                DimsFunctor::HeightLengthWidth,
                DimsFunctor::LengthWidthHeight,
            ]
        );
        let mirrored: Vec<DimsFunctor> = DimsFunctor::HeightWidthLength.rotations().collect();
        assert_eq!(
            mirrored,
            vec![
                DimsFunctor::HeightWidthLength,
                DimsFunctor::WidthLengthHeight,
                DimsFunctor::LengthHeightWidth,
            ]
        );
    }
}
