//! Versioned threshold configuration
//!
//! Every pattern predicate and breach rate is evaluated against a
//! [`Thresholds`] value that is supplied once, validated once, and then
//! passed by reference into every computation. Nothing in the engine
//! derives, fits, or mutates a threshold.
//!
//! Changing any value changes the meaning of all outputs, so the
//! configuration carries a `version` string that is stamped into reports.

use serde::{Deserialize, Serialize};

use crate::descriptor::GroupStatistic;

/// Version of [`Thresholds::default`]. Bump it whenever a default value changes.
pub const DEFAULT_VERSION: &str = "1.1.2-rs.1";

/// Percentile ranks reported by default (P10/P25/P50/P75/P90).
pub const DEFAULT_PERCENTILES: [f64; 5] = [10.0, 25.0, 50.0, 75.0, 90.0];

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
#[display("invalid threshold configuration '{version}': {reason}")]
pub struct ThresholdError {
    pub version: String,
    pub reason: String,
}

/// Named, immutable set of pattern and breach thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Thresholds {
    pub version: String,
    /// Low tail: bottleneck floor and polarised low side (`min <= tau_low`)
    pub tau_low: f64,
    /// High tail: polarised high side (`max >= tau_high`)
    pub tau_high: f64,
    /// Bottleneck requires `mean >= tau_bottleneck_mean`
    pub tau_bottleneck_mean: f64,
    /// Noisy requires `std >= tau_dispersion`
    pub tau_dispersion: f64,
    /// Balanced requires `std <= tau_balance_dispersion`
    pub tau_balance_dispersion: f64,
    /// Polarised requires `range >= tau_polarised_range`
    pub tau_polarised_range: f64,
    /// Balanced groups with `mean >= tau_high_level` are uniformly high
    pub tau_high_level: f64,
    /// Balanced groups with `mean <= tau_low_level` are uniformly low
    pub tau_low_level: f64,
    /// `|z|` at or above which a dimension is listed as a polarised extreme
    pub polarised_z_threshold: f64,
    /// Percentile ranks the cohort pass reports
    pub percentiles: Vec<f64>,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            version: DEFAULT_VERSION.to_owned(),
            tau_low: 0.30,
            tau_high: 0.70,
            tau_bottleneck_mean: 0.50,
            tau_dispersion: 0.22,
            tau_balance_dispersion: 0.12,
            tau_polarised_range: 0.70,
            tau_high_level: 0.70,
            tau_low_level: 0.30,
            polarised_z_threshold: 1.0,
            percentiles: DEFAULT_PERCENTILES.to_vec(),
        }
    }
}

/// Which side of a tau counts as crossing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreachDirection {
    /// `value <= tau`
    AtOrBelow,
    /// `value < tau`
    Below,
    /// `value >= tau`
    AtOrAbove,
}

impl BreachDirection {
    #[must_use]
    pub fn crosses(self, value: f64, tau: f64) -> bool {
        match self {
            Self::AtOrBelow => value <= tau,
            Self::Below => value < tau,
            Self::AtOrAbove => value >= tau,
        }
    }
}

/// A declared tau together with the statistic it constrains.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tau {
    pub name: &'static str,
    pub value: f64,
    pub direction: BreachDirection,
    /// Group descriptor the tau is compared against
    pub group_statistic: GroupStatistic,
    /// Whether the tau is also meaningful for a single dimension score
    pub applies_to_dimensions: bool,
}

impl Thresholds {
    /// Checks that the configuration describes a coherent set of bands.
    ///
    /// # Examples
    ///
    /// ```
    /// use ppd_core::thresholds::Thresholds;
    ///
    /// assert!(Thresholds::default().validate().is_ok());
    ///
    /// let inverted = Thresholds { tau_low: 0.8, ..Thresholds::default() };
    /// assert!(inverted.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), ThresholdError> {
        let fail = |reason: String| {
            Err(ThresholdError {
                version: self.version.clone(),
                reason,
            })
        };

        if self.version.trim().is_empty() {
            return fail("version must be non-empty".to_owned());
        }
        for tau in self.taus() {
            if !tau.value.is_finite() || !(0.0..=1.0).contains(&tau.value) {
                return fail(format!("{} = {} is outside [0, 1]", tau.name, tau.value));
            }
        }
        if !self.polarised_z_threshold.is_finite() || self.polarised_z_threshold < 0.0 {
            return fail(format!(
                "polarised_z_threshold = {} must be a non-negative number",
                self.polarised_z_threshold
            ));
        }
        if self.tau_low >= self.tau_high {
            return fail("tau_low must be below tau_high".to_owned());
        }
        if self.tau_low_level >= self.tau_high_level {
            return fail("tau_low_level must be below tau_high_level".to_owned());
        }
        if self.tau_balance_dispersion >= self.tau_dispersion {
            return fail("tau_balance_dispersion must be below tau_dispersion".to_owned());
        }
        if let Some(p) = self
            .percentiles
            .iter()
            .find(|p| !p.is_finite() || !(0.0..=100.0).contains(*p))
        {
            return fail(format!("percentile {p} is outside [0, 100]"));
        }
        Ok(())
    }

    /// Every tau used by the pattern classifier, with its breach semantics.
    #[must_use]
    pub fn taus(&self) -> [Tau; 8] {
        use BreachDirection::{AtOrAbove, AtOrBelow, Below};
        use GroupStatistic::{Max, Mean, Min, Range, Std};

        let tau = |name, value, direction, group_statistic, applies_to_dimensions| Tau {
            name,
            value,
            direction,
            group_statistic,
            applies_to_dimensions,
        };
        [
            tau("tau_low", self.tau_low, AtOrBelow, Min, true),
            tau("tau_high", self.tau_high, AtOrAbove, Max, true),
            tau(
                "tau_bottleneck_mean",
                self.tau_bottleneck_mean,
                Below,
                Mean,
                false,
            ),
            tau("tau_dispersion", self.tau_dispersion, AtOrAbove, Std, false),
            tau(
                "tau_balance_dispersion",
                self.tau_balance_dispersion,
                AtOrBelow,
                Std,
                false,
            ),
            tau(
                "tau_polarised_range",
                self.tau_polarised_range,
                AtOrAbove,
                Range,
                false,
            ),
            tau("tau_high_level", self.tau_high_level, AtOrAbove, Mean, true),
            tau("tau_low_level", self.tau_low_level, AtOrBelow, Mean, true),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        Thresholds::default().validate().unwrap();
    }

    #[test]
    fn test_default_version_is_its_own() {
        let defaults = Thresholds::default();
        assert_eq!(defaults.version, DEFAULT_VERSION);
        assert_ne!(defaults.version, "1.1.2");
        assert_eq!(defaults.tau_polarised_range, 0.70);
    }

    #[test]
    fn test_rejects_incoherent_bands() {
        let base = Thresholds::default();
        let cases = [
            Thresholds {
                tau_high: 0.2,
                ..base.clone()
            },
            Thresholds {
                tau_low_level: 0.9,
                ..base.clone()
            },
            Thresholds {
                tau_balance_dispersion: 0.3,
                ..base.clone()
            },
            Thresholds {
                tau_dispersion: f64::NAN,
                ..base.clone()
            },
            Thresholds {
                tau_polarised_range: 1.5,
                ..base.clone()
            },
            Thresholds {
                percentiles: vec![50.0, 101.0],
                ..base.clone()
            },
            Thresholds {
                polarised_z_threshold: -1.0,
                ..base.clone()
            },
            Thresholds {
                version: " ".to_owned(),
                ..base.clone()
            },
        ];
        for case in cases {
            assert!(case.validate().is_err(), "{case:?}");
        }
    }

    #[test]
    fn test_breach_directions_include_boundary() {
        assert!(BreachDirection::AtOrBelow.crosses(0.3, 0.3));
        assert!(BreachDirection::AtOrAbove.crosses(0.7, 0.7));
        assert!(!BreachDirection::Below.crosses(0.5, 0.5));
    }

    #[test]
    fn test_every_tau_is_listed_once() {
        let thresholds = Thresholds::default();
        let names = thresholds.taus().map(|t| t.name);
        let mut unique = names.to_vec();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), names.len());
    }

    #[test]
    fn test_json_rejects_unknown_fields() {
        let mut value = serde_json::to_value(Thresholds::default()).unwrap();
        value["tau_operational"] = serde_json::json!(0.6);
        assert!(serde_json::from_value::<Thresholds>(value).is_err());
    }
}
