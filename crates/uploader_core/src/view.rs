//! Render-ready snapshot of the uploader for presentation collaborators.

use serde::Serialize;
use shared::domain::{AthleteId, RaceId, UploadStatus};

use crate::uploader::PhotoUploader;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploaderView {
    pub athlete_id: Option<AthleteId>,
    pub athlete_name: Option<String>,
    pub race_id: Option<RaceId>,
    pub race_name: Option<String>,
    pub preview: Option<String>,
    /// Hosted photo on show, nothing attached yet.
    pub is_existing_photo: bool,
    pub attachment_name: Option<String>,
    pub status: UploadStatus,
    pub status_visible: bool,
    pub status_message: Option<&'static str>,
    pub saving: bool,
    pub attach_enabled: bool,
    pub save_enabled: bool,
    pub show_clear: bool,
}

impl UploaderView {
    pub fn capture(uploader: &PhotoUploader) -> Self {
        let athlete = uploader.selection().athlete();
        let race = uploader.selection().race();
        let attachments = uploader.attachments();
        let file = attachments.file();
        let status = uploader.status();

        Self {
            athlete_id: athlete.map(|a| a.id.clone()),
            athlete_name: athlete.map(|a| a.name.clone()),
            race_id: race.map(|r| r.id.clone()),
            race_name: race.map(|r| r.name.clone()),
            preview: attachments.preview().map(|p| p.as_str().to_string()),
            is_existing_photo: athlete.is_some_and(|a| a.existing_photo.is_some())
                && file.is_none(),
            attachment_name: file.map(|f| f.name().to_string()),
            status,
            status_visible: status != UploadStatus::Idle,
            status_message: status.message(),
            saving: uploader.is_saving(),
            attach_enabled: uploader.attach_enabled(),
            save_enabled: uploader.save_enabled(),
            show_clear: athlete.is_some() || file.is_some(),
        }
    }

    /// Caption under the preview image.
    pub fn preview_caption(&self) -> Option<&'static str> {
        self.preview.as_ref()?;
        Some(if self.is_existing_photo {
            "Current photo"
        } else {
            "New photo selected"
        })
    }
}
