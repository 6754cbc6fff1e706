use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    domain::{AthleteId, RaceId},
    error::ErrorReport,
};

/// What the persistence collaborator receives for one save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoSubmission {
    pub athlete_id: AthleteId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub race_id: Option<RaceId>,
    pub filename: String,
    pub mime_type: String,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub athlete_id: AthleteId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub race_id: Option<RaceId>,
    pub saved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum SubmissionOutcome {
    Saved(SubmissionReceipt),
    Failed(ErrorReport),
}

impl SubmissionOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved(_))
    }
}
