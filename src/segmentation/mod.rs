pub mod algorithm;
pub mod config;
pub mod day_buffer;
pub mod interpolate;
pub mod metrics;

pub use algorithm::{segment_track, IntervalSegmenter, SampleDecision, SegmentExt, Segmented};
pub use config::{BoundaryGap, DayCompleteness, SegmentationConfig};
