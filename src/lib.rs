//! Exact lower bounds and structural properties for 3D box packing instances.
//!
//! Sides are exact rationals throughout. An [`instance::Instance`] holds the boxes,
//! [`properties`] classifies them for symmetry pruning, and [`bounds`] derives lower
//! bounds on container extents under any [`dims::DimsFunctor`] role assignment.
//!
//! # Examples
//! ```
//! use boxbound::benchmark::{Benchmark, BenchmarkParams};
//! use boxbound::dims::DimsFunctor;
//! use boxbound::instance::{Instance, SortOrder};
//! use boxbound::rational::Rational;
//!
//! let mut instance = Instance::from_benchmark(Benchmark::Cube, &BenchmarkParams::up_to(3)).unwrap();
//! assert!(instance.infer_properties().sequential);
//!
//! instance.sort(SortOrder::DecreasingArea);
//! assert!(instance.properties().is_none());
//! assert!(instance.infer_properties().sorted_decreasing_area);
//!
//! // Cubes of side 2 and 3 cannot share a width of 4
//! let bound = instance.min_dim2_stacked(&Rational::from(4u32), DimsFunctor::default());
//! assert_eq!(bound, Rational::from(5u32));
//! ```

pub mod api;
pub mod benchmark;
pub mod bounds;
pub mod config;
pub mod dims;
pub mod instance;
pub mod model;
pub mod properties;
pub mod rational;
pub mod types;
