use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::segmentation::SegmentationConfig;

/// Defaults for a run, persisted as JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalysisSettings {
    pub segmentation: SegmentationConfig,
    /// Fixed group label for every output row, unless the command line sets one.
    pub spay_group: Option<String>,
}

pub struct SettingsStore {
    path: Option<PathBuf>,
    data: AnalysisSettings,
}

impl SettingsStore {
    /// Load from `path`. A missing file yields defaults; unparseable JSON
    /// yields defaults with a warning.
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!(
                    "Ignoring unreadable settings in {}: {err}",
                    path.display()
                );
                AnalysisSettings::default()
            })
        } else {
            AnalysisSettings::default()
        };

        Ok(Self {
            path: Some(path),
            data,
        })
    }

    /// Defaults only, nothing to persist to.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            data: AnalysisSettings::default(),
        }
    }

    pub fn settings(&self) -> &AnalysisSettings {
        &self.data
    }

    pub fn update_segmentation(&mut self, config: SegmentationConfig) -> Result<()> {
        self.data.segmentation = config;
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let serialized = serde_json::to_string_pretty(&self.data)?;
        fs::write(path, serialized)
            .with_context(|| format!("Failed to write settings to {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segmentation::DayCompleteness;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json")).unwrap();
        assert_eq!(store.settings(), &AnalysisSettings::default());
    }

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut store = SettingsStore::new(path.clone()).unwrap();
        let config = SegmentationConfig {
            interval_count: 6,
            day_completeness: DayCompleteness::Lenient,
            compute_area: true,
            ..SegmentationConfig::default()
        };
        store.update_segmentation(config.clone()).unwrap();

        let reloaded = SettingsStore::new(path).unwrap();
        assert_eq!(reloaded.settings().segmentation, config);
    }

    #[test]
    fn test_garbage_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();

        let store = SettingsStore::new(path).unwrap();
        assert_eq!(store.settings().segmentation.interval_count, 24);
    }
}
