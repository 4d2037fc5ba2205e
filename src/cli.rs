//! Command-Line Interface

use clap::Parser;
use std::path::PathBuf;

use crate::error::{Result, TrackError};
use crate::segmentation::{BoundaryGap, DayCompleteness, SegmentationConfig};
use crate::track::paths::group_label_from_filename;

/// Per-interval movement distance for one horse's GPS/UTM log
#[derive(Parser, Debug)]
#[command(name = "paddock-trace")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Input CSV (HorseID, Date_Time, Hour, Minute, X_UTM, Y_UTM)
    pub input: PathBuf,

    /// Number of equal intervals per day
    #[arg(value_parser = clap::value_parser!(u32).range(1..=24))]
    pub intervals: u32,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Settings file (JSON) with segmentation defaults
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write the effective segmentation settings back to --config
    #[arg(long, requires = "config")]
    pub save_config: bool,

    /// Output CSV (default: input with /original -> /output and an _out suffix)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Decision trace file (default: <input>_logfile.txt)
    #[arg(long)]
    pub trace_log: Option<PathBuf>,

    /// Target minutes between accepted samples
    #[arg(long)]
    pub min_spacing_minutes: Option<i64>,

    /// Minutes of slack on the sample spacing
    #[arg(long)]
    pub spacing_tolerance_minutes: Option<i64>,

    /// Minimum points for an interval to be reported
    #[arg(long)]
    pub min_points: Option<usize>,

    /// Intervals a day needs before it is reported
    #[arg(long, value_enum)]
    pub day_policy: Option<DayCompleteness>,

    /// When to split the segment crossing an interval edge
    #[arg(long, value_enum)]
    pub boundary_gap: Option<BoundaryGap>,

    /// Also report convex hull area per interval
    #[arg(long)]
    pub area: bool,

    /// Also report maximum pairwise displacement per interval
    #[arg(long)]
    pub max_displacement: bool,

    /// Group label copied into every row
    #[arg(long, conflicts_with = "group_from_filename")]
    pub group: Option<String>,

    /// Use the leading token of the input file name as the group label
    #[arg(long)]
    pub group_from_filename: bool,
}

impl Cli {
    /// Overlay command-line values on top of file/default settings.
    pub fn apply_to(&self, config: &mut SegmentationConfig) -> Result<()> {
        config.interval_count = self.intervals;
        if let Some(minutes) = self.min_spacing_minutes {
            config.min_sample_spacing_secs = minutes_to_secs("--min-spacing-minutes", minutes)?;
        }
        if let Some(minutes) = self.spacing_tolerance_minutes {
            config.spacing_tolerance_secs =
                minutes_to_secs("--spacing-tolerance-minutes", minutes)?;
        }
        if let Some(points) = self.min_points {
            config.min_points_per_interval = points;
        }
        if let Some(policy) = self.day_policy {
            config.day_completeness = policy;
        }
        if let Some(gap) = self.boundary_gap {
            config.boundary_gap = gap;
        }
        config.compute_area |= self.area;
        config.compute_max_displacement |= self.max_displacement;
        Ok(())
    }

    pub fn group_label(&self) -> Option<String> {
        if let Some(group) = &self.group {
            return Some(group.clone());
        }
        if self.group_from_filename {
            return group_label_from_filename(&self.input);
        }
        None
    }
}

fn minutes_to_secs(flag: &str, minutes: i64) -> Result<i64> {
    minutes
        .checked_mul(60)
        .ok_or_else(|| TrackError::InvalidConfig(format!("{flag} {minutes} is out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_interval_count_is_bounded() {
        assert!(Cli::try_parse_from(["paddock-trace", "H1.csv", "0"]).is_err());
        assert!(Cli::try_parse_from(["paddock-trace", "H1.csv", "25"]).is_err());
        assert!(Cli::try_parse_from(["paddock-trace", "H1.csv", "24"]).is_ok());
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "paddock-trace",
            "data/original/spayed_H1.csv",
            "6",
            "--min-spacing-minutes",
            "15",
            "--spacing-tolerance-minutes",
            "2",
            "--day-policy",
            "lenient",
            "--boundary-gap",
            "within-interval-length",
            "--area",
            "--group-from-filename",
        ])
        .unwrap();

        let mut config = SegmentationConfig::default();
        cli.apply_to(&mut config).unwrap();
        assert_eq!(config.interval_count, 6);
        assert_eq!(config.spacing_threshold_secs(), 13 * 60);
        assert_eq!(config.day_completeness, DayCompleteness::Lenient);
        assert_eq!(config.boundary_gap, BoundaryGap::WithinIntervalLength);
        assert!(config.compute_area);
        assert!(!config.compute_max_displacement);
        assert_eq!(cli.group_label().as_deref(), Some("spayed"));
    }

    #[test]
    fn test_group_flags_conflict() {
        assert!(Cli::try_parse_from([
            "paddock-trace",
            "H1.csv",
            "4",
            "--group",
            "intact",
            "--group-from-filename"
        ])
        .is_err());
    }

    #[test]
    fn test_huge_spacing_minutes_are_rejected() {
        let cli = Cli::try_parse_from([
            "paddock-trace",
            "H1.csv",
            "4",
            "--min-spacing-minutes",
            "9223372036854775807",
        ])
        .unwrap();

        let mut config = SegmentationConfig::default();
        assert!(matches!(
            cli.apply_to(&mut config),
            Err(TrackError::InvalidConfig(_))
        ));

        let cli = Cli::try_parse_from([
            "paddock-trace",
            "H1.csv",
            "4",
            "--min-spacing-minutes",
            "100000",
        ])
        .unwrap();
        cli.apply_to(&mut config).unwrap();
        assert!(config.validate().is_err());
    }
}
