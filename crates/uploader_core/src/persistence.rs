use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use shared::{
    error::{ErrorCode, ErrorReport},
    protocol::{PhotoSubmission, SubmissionReceipt},
};
use thiserror::Error;
use tracing::info;

use crate::attachment::FileHandle;

pub const DEFAULT_SAVE_DELAY: Duration = Duration::from_millis(1500);

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("photo rejected for athlete {athlete_id}: {reason}")]
    Rejected { athlete_id: String, reason: String },
    #[error("persistence unavailable: {0}")]
    Unavailable(String),
}

impl From<&PersistenceError> for ErrorReport {
    fn from(value: &PersistenceError) -> Self {
        let code = match value {
            PersistenceError::Rejected { .. } => ErrorCode::Validation,
            PersistenceError::Unavailable(_) => ErrorCode::Unavailable,
        };
        ErrorReport::new(code, value.to_string())
    }
}

/// Stores a photo against an athlete record. Latency and failure modes belong
/// to the implementation.
#[async_trait]
pub trait PhotoPersistence: Send + Sync {
    async fn submit(
        &self,
        submission: &PhotoSubmission,
        file: &FileHandle,
    ) -> Result<SubmissionReceipt, PersistenceError>;
}

/// Accepts every submission after a fixed delay without storing anything.
pub struct SimulatedPersistence {
    delay: Duration,
}

impl SimulatedPersistence {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for SimulatedPersistence {
    fn default() -> Self {
        Self::new(DEFAULT_SAVE_DELAY)
    }
}

#[async_trait]
impl PhotoPersistence for SimulatedPersistence {
    async fn submit(
        &self,
        submission: &PhotoSubmission,
        file: &FileHandle,
    ) -> Result<SubmissionReceipt, PersistenceError> {
        tokio::time::sleep(self.delay).await;
        info!(
            athlete_id = %submission.athlete_id,
            race_id = submission.race_id.as_ref().map(|id| id.as_str()),
            file = file.name(),
            size_bytes = file.size_bytes(),
            "simulated photo save complete"
        );
        Ok(SubmissionReceipt {
            athlete_id: submission.athlete_id.clone(),
            race_id: submission.race_id.clone(),
            saved_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::domain::{AthleteId, RaceId};

    #[tokio::test]
    async fn simulated_persistence_echoes_submission_ids() {
        let persistence = SimulatedPersistence::new(Duration::from_millis(5));
        let submission = PhotoSubmission {
            athlete_id: AthleteId::from("ATH-1042"),
            race_id: Some(RaceId::from("RACE-CITY-HALF")),
            filename: "p.png".to_string(),
            mime_type: "image/png".to_string(),
            size_bytes: 3,
        };
        let file = FileHandle::from_bytes("p.png", "image/png", vec![1, 2, 3]);

        let started = std::time::Instant::now();
        let receipt = persistence.submit(&submission, &file).await.expect("saved");

        assert!(started.elapsed() >= Duration::from_millis(5));
        assert_eq!(receipt.athlete_id, submission.athlete_id);
        assert_eq!(receipt.race_id, submission.race_id);
    }

    #[test]
    fn persistence_errors_map_to_report_codes() {
        let rejected = PersistenceError::Rejected {
            athlete_id: "ATH-1".to_string(),
            reason: "too large".to_string(),
        };
        let report = ErrorReport::from(&rejected);
        assert_eq!(report.code, ErrorCode::Validation);
        assert!(report.message.contains("too large"));

        let report = ErrorReport::from(&PersistenceError::Unavailable("offline".to_string()));
        assert_eq!(report.code, ErrorCode::Unavailable);
    }
}
