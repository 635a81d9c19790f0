//! Rubric score scale and normalization
//!
//! Raw rubric scores live on a fixed ordinal scale (0-5 by default) and are
//! mapped linearly onto `[0, 1]`:
//!
//! ```text
//! normalized = (raw - min) / (max - min)
//! ```
//!
//! Out-of-range input is an ingestion error, never silently clamped. The
//! only clamping applied is to floating-point noise at the boundaries.

use serde::{Deserialize, Serialize};

/// Error raised when a raw score lies outside the declared scale.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
#[display("raw score {value} is outside the scale [{min}, {max}]")]
pub struct OutOfRangeError {
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

/// Error raised when scale bounds do not describe a non-empty interval.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
#[display("invalid score scale bounds: min={min}, max={max}")]
pub struct InvalidScaleError {
    pub min: f64,
    pub max: f64,
}

/// Fixed ordinal scale shared by every rubric score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ScaleBounds", into = "ScaleBounds")]
pub struct ScoreScale {
    min: f64,
    max: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct ScaleBounds {
    min: f64,
    max: f64,
}

impl TryFrom<ScaleBounds> for ScoreScale {
    type Error = InvalidScaleError;

    fn try_from(bounds: ScaleBounds) -> Result<Self, Self::Error> {
        Self::new(bounds.min, bounds.max)
    }
}

impl From<ScoreScale> for ScaleBounds {
    fn from(scale: ScoreScale) -> Self {
        Self {
            min: scale.min,
            max: scale.max,
        }
    }
}

impl Default for ScoreScale {
    /// The 0-5 rubric scale.
    fn default() -> Self {
        Self { min: 0.0, max: 5.0 }
    }
}

impl ScoreScale {
    /// Creates a scale, rejecting non-finite or empty intervals.
    pub fn new(min: f64, max: f64) -> Result<Self, InvalidScaleError> {
        if !min.is_finite() || !max.is_finite() || min >= max {
            return Err(InvalidScaleError { min, max });
        }
        Ok(Self { min, max })
    }

    #[must_use]
    pub fn min(&self) -> f64 {
        self.min
    }

    #[must_use]
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Maps a raw score onto `[0, 1]`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ppd_core::scale::ScoreScale;
    ///
    /// let scale = ScoreScale::default();
    /// assert_eq!(scale.normalize(4.0).unwrap(), 0.8);
    /// assert!(scale.normalize(5.5).is_err());
    /// ```
    pub fn normalize(&self, raw: f64) -> Result<f64, OutOfRangeError> {
        if !raw.is_finite() || raw < self.min || raw > self.max {
            return Err(OutOfRangeError {
                value: raw,
                min: self.min,
                max: self.max,
            });
        }
        Ok(((raw - self.min) / (self.max - self.min)).clamp(0.0, 1.0))
    }

    /// Maps a normalized value back onto the raw scale.
    #[must_use]
    pub fn denormalize(&self, normalized: f64) -> f64 {
        normalized * (self.max - self.min) + self.min
    }
}

#[cfg(test)]
mod tests {
    use rand::{Rng as _, SeedableRng as _};
    use rand_pcg::Pcg32;

    use super::*;

    #[test]
    fn test_bounds_map_to_unit_interval() {
        let scale = ScoreScale::new(1.0, 5.0).unwrap();
        assert_eq!(scale.normalize(1.0).unwrap(), 0.0);
        assert_eq!(scale.normalize(5.0).unwrap(), 1.0);
        assert_eq!(scale.normalize(3.0).unwrap(), 0.5);
    }

    #[test]
    fn test_out_of_range_is_rejected_not_clamped() {
        let scale = ScoreScale::default();
        let err = scale.normalize(-0.1).unwrap_err();
        assert_eq!(err.value, -0.1);
        assert!(scale.normalize(5.000_001).is_err());
        assert!(scale.normalize(f64::NAN).is_err());
        assert!(scale.normalize(f64::INFINITY).is_err());
    }

    #[test]
    fn test_invalid_scale() {
        assert!(ScoreScale::new(5.0, 5.0).is_err());
        assert!(ScoreScale::new(5.0, 1.0).is_err());
        assert!(ScoreScale::new(0.0, f64::NAN).is_err());
    }

    #[test]
    fn test_round_trip() {
        let mut rng = Pcg32::seed_from_u64(3);
        for (min, max) in [(0.0, 5.0), (1.0, 5.0), (0.0, 100.0)] {
            let scale = ScoreScale::new(min, max).unwrap();
            for _ in 0..500 {
                let raw: f64 = rng.random_range(min..=max);
                let back = scale.denormalize(scale.normalize(raw).unwrap());
                assert!((back - raw).abs() < 1e-9, "{raw} -> {back}");
            }
        }
    }

    #[test]
    fn test_deserialize_validates_bounds() {
        let scale: ScoreScale = serde_json::from_str(r#"{"min": 1.0, "max": 5.0}"#).unwrap();
        assert_eq!(scale.min(), 1.0);
        assert!(serde_json::from_str::<ScoreScale>(r#"{"min": 5.0, "max": 1.0}"#).is_err());
    }
}
