//! Order-invariant statistical primitives for Profile Pattern Diagnostics.
//!
//! This crate provides the numeric building blocks used by the diagnostic engine:
//!
//! - **Descriptive statistics**: mean, median, population variance and standard deviation,
//!   min, max and range
//! - **Percentiles**: linearly interpolated percentile queries over order statistics
//! - **Percentile ranks**: midrank position of a value within a distribution
//! - **Comprehensive statistics**: descriptive statistics, IQR and percentiles combined
//!
//! Every computation works on values sorted with [`f64::total_cmp`], so results
//! never depend on the order in which values were supplied.
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics for summarizing datasets
//! - [`percentiles`]: Percentile computation, storage and percentile ranks
//! - [`comprehensive`]: Summary combining descriptive statistics and percentiles
//!
//! # Examples
//!
//! ## Computing descriptive statistics
//!
//! ```
//! use ppd_stats::descriptive::DescriptiveStats;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! ```
//!
//! ## Computing percentiles
//!
//! ```
//! use ppd_stats::percentiles::Percentiles;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let percentiles = Percentiles::new(&values, &[25.0, 50.0, 75.0]);
//! assert_eq!(percentiles.get(50.0), Some(3.0));
//! ```
//!
//! ## Locating a value within a distribution
//!
//! ```
//! use ppd_stats::percentiles::percentile_rank;
//!
//! let sorted = [0.1, 0.5, 0.9];
//! assert_eq!(percentile_rank(&sorted, 0.5), 50.0);
//! ```

pub mod comprehensive;
pub mod descriptive;
pub mod percentiles;
