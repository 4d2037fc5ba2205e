use chrono::NaiveDateTime;

/// Result type alias for track processing.
pub type Result<T> = std::result::Result<T, TrackError>;

/// Errors raised while reading, segmenting or writing one subject's track.
#[derive(Debug, thiserror::Error)]
pub enum TrackError {
    #[error("Mixed subjects in one stream: expected {expected}, found {found} at {timestamp}")]
    SubjectMismatch {
        expected: String,
        found: String,
        timestamp: NaiveDateTime,
    },

    #[error("Timestamps out of order: {current} does not follow {previous}")]
    OutOfOrder {
        previous: NaiveDateTime,
        current: NaiveDateTime,
    },

    #[error("Malformed record at line {line}: {reason}")]
    MalformedRecord { line: u64, reason: String },

    #[error("Stream already aborted by an earlier contract violation")]
    Aborted,

    #[error("Configuration error: {0}")]
    InvalidConfig(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TrackError {
    /// True for violations of the single-subject / strictly-ordered input
    /// contract and for malformed rows. These abort the current stream.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            TrackError::SubjectMismatch { .. }
                | TrackError::OutOfOrder { .. }
                | TrackError::MalformedRecord { .. }
                | TrackError::Aborted
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_contract_violation_classification() {
        let ts = NaiveDate::from_ymd_opt(2019, 5, 1)
            .unwrap()
            .and_hms_opt(6, 0, 0)
            .unwrap();

        let mismatch = TrackError::SubjectMismatch {
            expected: "H1".into(),
            found: "H2".into(),
            timestamp: ts,
        };
        assert!(mismatch.is_contract_violation());
        assert!(mismatch.to_string().contains("expected H1, found H2"));

        let config = TrackError::InvalidConfig("interval_count must be >= 1".into());
        assert!(!config.is_contract_violation());
    }
}
