use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::{Result, TrackError};
use crate::models::IntervalSummary;
use crate::segmentation::SegmentationConfig;

/// Optional columns appended after the fixed ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputColumns {
    pub area: bool,
    pub max_displacement: bool,
    pub spay_group: bool,
}

impl OutputColumns {
    pub fn for_config(config: &SegmentationConfig, has_spay_group: bool) -> Self {
        Self {
            area: config.compute_area,
            max_displacement: config.compute_max_displacement,
            spay_group: has_spay_group,
        }
    }

    pub fn header(&self) -> Vec<&'static str> {
        let mut header = vec!["HorseID", "Date", "Interval", "StartTime", "EndTime", "Distance"];
        if self.area {
            header.push("Area");
        }
        if self.max_displacement {
            header.push("MaxDisplacement");
        }
        if self.spay_group {
            header.push("SpayGroup");
        }
        header
    }
}

/// CSV sink for interval summaries. The header is written on construction.
pub struct SummaryWriter<W: Write> {
    writer: csv::Writer<W>,
    columns: OutputColumns,
}

impl SummaryWriter<File> {
    pub fn from_path(path: &Path, columns: OutputColumns) -> Result<Self> {
        Self::new(File::create(path)?, columns)
    }
}

impl<W: Write> SummaryWriter<W> {
    pub fn new(writer: W, columns: OutputColumns) -> Result<Self> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(columns.header())?;
        Ok(Self { writer, columns })
    }

    pub fn write(&mut self, summary: &IntervalSummary) -> Result<()> {
        let mut row = vec![
            summary.horse_id.clone(),
            summary.date.to_string(),
            summary.interval.to_string(),
            summary.start_time.format("%H:%M").to_string(),
            summary.end_time.format("%H:%M").to_string(),
            summary.distance.to_string(),
        ];
        if self.columns.area {
            row.push(summary.area.map(|v| v.to_string()).unwrap_or_default());
        }
        if self.columns.max_displacement {
            row.push(
                summary
                    .max_displacement
                    .map(|v| v.to_string())
                    .unwrap_or_default(),
            );
        }
        if self.columns.spay_group {
            row.push(summary.spay_group.clone().unwrap_or_default());
        }
        self.writer.write_record(&row)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|err| TrackError::Io(err.into_error()))
    }
}
