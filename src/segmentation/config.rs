use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackError};

pub const SECONDS_PER_DAY: u32 = 24 * 3600;

/// How many interval summaries a day must hold before any of them are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DayCompleteness {
    /// Exactly `interval_count` summaries.
    #[default]
    Strict,
    /// At least `interval_count - 1` summaries.
    Lenient,
    /// Every day is emitted whatever it holds.
    Off,
}

impl DayCompleteness {
    pub fn required_intervals(&self, interval_count: u32) -> usize {
        let count = interval_count as usize;
        match self {
            DayCompleteness::Strict => count,
            DayCompleteness::Lenient => count.saturating_sub(1),
            DayCompleteness::Off => 0,
        }
    }

    pub fn is_satisfied(&self, held: usize, interval_count: u32) -> bool {
        held >= self.required_intervals(interval_count)
    }
}

/// When the segment crossing an interval edge is split with a synthetic point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum BoundaryGap {
    /// The next sample lies in the interval directly after the current one
    /// (last interval of a day is adjacent to the first of the next day).
    #[default]
    AdjacentInterval,
    /// The next sample is at most one interval length after the last
    /// accepted sample.
    WithinIntervalLength,
}

/// Tunable thresholds for interval segmentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SegmentationConfig {
    /// Equal intervals per 24h day. Must divide 86400 evenly.
    pub interval_count: u32,

    /// Target cadence between accepted samples
    pub min_sample_spacing_secs: i64,

    /// Slack subtracted from the cadence: samples closer than
    /// `min_sample_spacing_secs - spacing_tolerance_secs` to the last
    /// accepted one are skipped.
    pub spacing_tolerance_secs: i64,

    /// Intervals with fewer points (boundary points included) are dropped.
    pub min_points_per_interval: usize,

    pub day_completeness: DayCompleteness,
    pub boundary_gap: BoundaryGap,

    pub compute_area: bool,
    pub compute_max_displacement: bool,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            interval_count: 24,
            min_sample_spacing_secs: 30 * 60,
            spacing_tolerance_secs: 5 * 60,
            min_points_per_interval: 2,
            day_completeness: DayCompleteness::Strict,
            boundary_gap: BoundaryGap::AdjacentInterval,
            compute_area: false,
            compute_max_displacement: false,
        }
    }
}

impl SegmentationConfig {
    pub fn with_interval_count(interval_count: u32) -> Self {
        Self {
            interval_count,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.interval_count == 0 {
            return Err(TrackError::InvalidConfig(
                "interval_count must be at least 1".into(),
            ));
        }
        if SECONDS_PER_DAY % self.interval_count != 0 {
            return Err(TrackError::InvalidConfig(format!(
                "interval_count {} does not divide a day into whole seconds",
                self.interval_count
            )));
        }
        let day = i64::from(SECONDS_PER_DAY);
        if !(0..=day).contains(&self.min_sample_spacing_secs) {
            return Err(TrackError::InvalidConfig(format!(
                "min_sample_spacing_secs must be between 0 and {day}, got {}",
                self.min_sample_spacing_secs
            )));
        }
        if !(0..=day).contains(&self.spacing_tolerance_secs) {
            return Err(TrackError::InvalidConfig(format!(
                "spacing_tolerance_secs must be between 0 and {day}, got {}",
                self.spacing_tolerance_secs
            )));
        }
        if self.min_points_per_interval == 0 {
            return Err(TrackError::InvalidConfig(
                "min_points_per_interval must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn interval_length_secs(&self) -> u32 {
        SECONDS_PER_DAY / self.interval_count.max(1)
    }

    /// A same-interval sample is accepted only if strictly more than this
    /// many seconds passed since the last accepted one.
    pub fn spacing_threshold_secs(&self) -> i64 {
        self.min_sample_spacing_secs - self.spacing_tolerance_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_field_cadence() {
        let config = SegmentationConfig::default();
        assert_eq!(config.spacing_threshold_secs(), 25 * 60);
        assert_eq!(config.interval_length_secs(), 3600);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_uneven_interval_count() {
        assert!(SegmentationConfig::with_interval_count(7).validate().is_err());
        assert!(SegmentationConfig::with_interval_count(0).validate().is_err());
        assert!(SegmentationConfig::with_interval_count(48).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_negative_tolerance() {
        let config = SegmentationConfig {
            spacing_tolerance_secs: -1,
            ..SegmentationConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_bounds_spacing_to_one_day() {
        let config = SegmentationConfig {
            min_sample_spacing_secs: i64::MAX / 100,
            ..SegmentationConfig::default()
        };
        assert!(matches!(config.validate(), Err(TrackError::InvalidConfig(_))));

        let config = SegmentationConfig {
            spacing_tolerance_secs: 86_401,
            ..SegmentationConfig::default()
        };
        assert!(config.validate().is_err());

        let config = SegmentationConfig {
            min_sample_spacing_secs: 86_400,
            ..SegmentationConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_day_completeness_thresholds() {
        assert!(DayCompleteness::Strict.is_satisfied(24, 24));
        assert!(!DayCompleteness::Strict.is_satisfied(23, 24));
        assert!(DayCompleteness::Lenient.is_satisfied(23, 24));
        assert!(!DayCompleteness::Lenient.is_satisfied(22, 24));
        assert!(DayCompleteness::Off.is_satisfied(0, 24));
    }

    #[test]
    fn test_config_deserializes_partial_json() {
        let config: SegmentationConfig =
            serde_json::from_str(r#"{"intervalCount": 6, "dayCompleteness": "lenient"}"#).unwrap();
        assert_eq!(config.interval_count, 6);
        assert_eq!(config.day_completeness, DayCompleteness::Lenient);
        assert_eq!(config.min_points_per_interval, 2);
    }
}
