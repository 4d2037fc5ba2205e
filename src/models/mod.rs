pub mod sample;
pub mod summary;

pub use sample::{Position, Sample, TrackPoint};
pub use summary::{IntervalKey, IntervalSummary};
