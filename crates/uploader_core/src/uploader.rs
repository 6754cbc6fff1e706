//! Widget state: selection, attachment, status and save orchestration.
//!
//! Every operation is a synchronous transition on [`PhotoUploader`] except the
//! save itself. [`PhotoUploader::begin_save`] hands out a [`SaveRequest`]
//! stamped with the current generation; whoever runs it reports back through
//! [`PhotoUploader::complete_save`], which discards completions whose
//! generation no longer matches. The generation moves on every athlete
//! selection, race change, attachment and clear.
//!
//! Staleness and the busy flag are separate: a superseded save still counts as
//! in flight until its completion arrives, so two submits never overlap. Only
//! [`PhotoUploader::clear_all`] and [`PhotoUploader::dispose`] drop the busy
//! flag early.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shared::{
    domain::{Athlete, Race, UploadStatus},
    error::ErrorReport,
    protocol::{PhotoSubmission, SubmissionOutcome},
};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::{
    attachment::{AttachOutcome, AttachSource, AttachmentManager, FileHandle, LocatorFactory},
    persistence::PhotoPersistence,
    selection::SelectionStore,
    status::{StatusEvent, StatusMachine},
    view::UploaderView,
};

/// Fixed per deployment; chosen when the uploader is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploaderConfig {
    pub require_race_selection: bool,
}

/// Why a save would not start right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveGate {
    Ready,
    NoAthlete,
    NoRace,
    NoAttachment,
    InFlight,
    AlreadySaved,
}

#[derive(Debug, Clone)]
pub struct SaveRequest {
    pub generation: u64,
    pub submission: PhotoSubmission,
    pub file: FileHandle,
}

#[derive(Debug, Clone)]
pub struct SaveCompletion {
    pub generation: u64,
    pub outcome: SubmissionOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionDisposition {
    Applied(UploadStatus),
    Stale,
}

/// Runs one save request against the persistence collaborator.
pub async fn run_save(persistence: &dyn PhotoPersistence, request: SaveRequest) -> SaveCompletion {
    let outcome = match persistence.submit(&request.submission, &request.file).await {
        Ok(receipt) => SubmissionOutcome::Saved(receipt),
        Err(err) => {
            warn!(
                athlete_id = %request.submission.athlete_id,
                generation = request.generation,
                "photo save failed: {err}"
            );
            SubmissionOutcome::Failed(ErrorReport::from(&err))
        }
    };
    SaveCompletion {
        generation: request.generation,
        outcome,
    }
}

pub struct PhotoUploader {
    config: UploaderConfig,
    selection: SelectionStore,
    attachments: AttachmentManager,
    status: StatusMachine,
    generation: u64,
    in_flight: Option<u64>,
}

impl PhotoUploader {
    pub fn new(config: UploaderConfig, locators: Arc<dyn LocatorFactory>) -> Self {
        Self {
            config,
            selection: SelectionStore::new(),
            attachments: AttachmentManager::new(locators),
            status: StatusMachine::new(),
            generation: 0,
            in_flight: None,
        }
    }

    pub fn config(&self) -> UploaderConfig {
        self.config
    }

    pub fn select_athlete(&mut self, athlete: Athlete) {
        info!(athlete_id = %athlete.id, "athlete selected");
        self.invalidate();
        self.attachments
            .show_existing(athlete.existing_photo.as_deref());
        self.selection.select_athlete(athlete);
        self.status.apply(StatusEvent::AthleteSelected);
    }

    /// Returns whether the race changed. The attachment is kept.
    pub fn select_race(&mut self, race: Race) -> bool {
        let race_id = race.id.clone();
        if !self.selection.select_race(race) {
            debug!(race_id = %race_id, "race selection unchanged");
            return false;
        }
        info!(race_id = %race_id, "race selected");
        self.invalidate();
        self.status.apply(StatusEvent::RaceChanged);
        true
    }

    /// Refused with [`AttachOutcome::Disabled`] until [`Self::attach_enabled`].
    pub fn attach(&mut self, file: FileHandle, source: AttachSource) -> AttachOutcome {
        if !self.attach_enabled() {
            debug!(source = source.as_str(), "attach ignored, selection incomplete");
            return AttachOutcome::Disabled;
        }

        let name = file.name().to_string();
        let outcome = self.attachments.attach(file);
        match &outcome {
            AttachOutcome::Attached => {
                info!(source = source.as_str(), file = %name, "photo attached");
                self.invalidate();
                self.status.apply(StatusEvent::FileAttached);
            }
            AttachOutcome::Rejected { mime_type } => {
                // Dropped without surfacing anything to the operator.
                debug!(source = source.as_str(), file = %name, mime = %mime_type, "photo rejected");
            }
            AttachOutcome::Disabled => {}
        }
        outcome
    }

    pub fn clear_all(&mut self) {
        info!("uploader cleared");
        self.invalidate();
        self.cancel_save();
        self.attachments.clear();
        self.selection.clear();
        self.status.apply(StatusEvent::Cleared);
    }

    pub fn save_gate(&self) -> SaveGate {
        if self.selection.athlete().is_none() {
            SaveGate::NoAthlete
        } else if self.config.require_race_selection && self.selection.race().is_none() {
            SaveGate::NoRace
        } else if !self.attachments.has_attachment() {
            SaveGate::NoAttachment
        } else if self.in_flight.is_some() {
            SaveGate::InFlight
        } else if self.status.status() == UploadStatus::Success {
            SaveGate::AlreadySaved
        } else {
            SaveGate::Ready
        }
    }

    /// Marks a save in flight and returns what to submit, or `None` when the
    /// gate is closed.
    pub fn begin_save(&mut self) -> Option<SaveRequest> {
        let gate = self.save_gate();
        if gate != SaveGate::Ready {
            debug!(?gate, "save declined");
            return None;
        }
        let athlete = self.selection.athlete()?;
        let file = self.attachments.file()?.clone();

        let submission = PhotoSubmission {
            athlete_id: athlete.id.clone(),
            race_id: self.selection.race().map(|race| race.id.clone()),
            filename: file.name().to_string(),
            mime_type: file.mime_type().to_string(),
            size_bytes: file.size_bytes(),
        };
        self.in_flight = Some(self.generation);
        info!(
            athlete_id = %submission.athlete_id,
            generation = self.generation,
            "photo save started"
        );
        Some(SaveRequest {
            generation: self.generation,
            submission,
            file,
        })
    }

    /// Settles the outstanding save. The busy flag is released for the save
    /// that was in flight even when its result is discarded as stale.
    pub fn complete_save(&mut self, completion: SaveCompletion) -> CompletionDisposition {
        if self.in_flight != Some(completion.generation) {
            debug!(
                generation = completion.generation,
                "discarding completion of a cancelled save"
            );
            return CompletionDisposition::Stale;
        }
        self.in_flight = None;

        if completion.generation != self.generation {
            debug!(
                generation = completion.generation,
                current = self.generation,
                "discarding stale save completion"
            );
            return CompletionDisposition::Stale;
        }

        let event = if completion.outcome.is_saved() {
            StatusEvent::SaveSucceeded
        } else {
            StatusEvent::SaveFailed
        };
        let status = self.status.apply(event);
        info!(generation = completion.generation, %status, "photo save finished");
        CompletionDisposition::Applied(status)
    }

    /// Starts the save on the current tokio runtime. The returned task yields
    /// the completion to hand back to [`Self::complete_save`].
    pub fn spawn_save(
        &mut self,
        persistence: Arc<dyn PhotoPersistence>,
    ) -> Option<JoinHandle<SaveCompletion>> {
        let request = self.begin_save()?;
        Some(tokio::spawn(async move {
            run_save(persistence.as_ref(), request).await
        }))
    }

    /// Releases the derived preview, if any. Also runs when dropped.
    pub fn dispose(&mut self) {
        self.invalidate();
        self.cancel_save();
        self.attachments.dispose();
    }

    pub fn status(&self) -> UploadStatus {
        self.status.status()
    }

    pub fn selection(&self) -> &SelectionStore {
        &self.selection
    }

    pub fn attachments(&self) -> &AttachmentManager {
        &self.attachments
    }

    pub fn is_saving(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether attach controls should be offered to the operator.
    pub fn attach_enabled(&self) -> bool {
        self.selection.athlete().is_some()
            && (!self.config.require_race_selection || self.selection.race().is_some())
    }

    pub fn save_enabled(&self) -> bool {
        self.save_gate() == SaveGate::Ready
    }

    pub fn view(&self) -> UploaderView {
        UploaderView::capture(self)
    }

    fn invalidate(&mut self) {
        self.generation += 1;
        if let Some(generation) = self.in_flight {
            debug!(generation, "in-flight save superseded");
        }
    }

    fn cancel_save(&mut self) {
        if let Some(generation) = self.in_flight.take() {
            debug!(generation, "in-flight save cancelled");
        }
    }
}
