//! Upload status transitions.

use shared::domain::UploadStatus;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusEvent {
    AthleteSelected,
    RaceChanged,
    FileAttached,
    SaveSucceeded,
    SaveFailed,
    Cleared,
}

/// Next status for `event`. Events that do not apply leave the status as is.
pub fn transition(current: UploadStatus, event: StatusEvent) -> UploadStatus {
    use UploadStatus::*;

    match (current, event) {
        (_, StatusEvent::Cleared) => Idle,
        (_, StatusEvent::AthleteSelected) => NoPhoto,
        (Idle, StatusEvent::FileAttached) => Idle,
        (_, StatusEvent::FileAttached) => Pending,
        (Pending | Error, StatusEvent::SaveSucceeded) => Success,
        (Pending | Error, StatusEvent::SaveFailed) => Error,
        (Success, StatusEvent::RaceChanged) => Pending,
        (current, _) => current,
    }
}

#[derive(Debug, Default)]
pub struct StatusMachine {
    status: UploadStatus,
}

impl StatusMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> UploadStatus {
        self.status
    }

    pub fn apply(&mut self, event: StatusEvent) -> UploadStatus {
        let next = transition(self.status, event);
        if next != self.status {
            debug!(from = %self.status, to = %next, ?event, "upload status changed");
        }
        self.status = next;
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use UploadStatus::*;

    #[test]
    fn follows_happy_path() {
        let mut machine = StatusMachine::new();
        assert_eq!(machine.status(), Idle);
        assert_eq!(machine.apply(StatusEvent::AthleteSelected), NoPhoto);
        assert_eq!(machine.apply(StatusEvent::FileAttached), Pending);
        assert_eq!(machine.apply(StatusEvent::FileAttached), Pending);
        assert_eq!(machine.apply(StatusEvent::SaveSucceeded), Success);
        assert_eq!(machine.apply(StatusEvent::AthleteSelected), NoPhoto);
    }

    #[test]
    fn error_recovers_through_reattach() {
        assert_eq!(transition(Pending, StatusEvent::SaveFailed), Error);
        assert_eq!(transition(Error, StatusEvent::FileAttached), Pending);
        assert_eq!(transition(Error, StatusEvent::SaveSucceeded), Success);
    }

    #[test]
    fn clear_resets_from_every_state() {
        for status in [Idle, NoPhoto, Pending, Success, Error] {
            assert_eq!(transition(status, StatusEvent::Cleared), Idle);
        }
    }

    #[test]
    fn save_results_only_apply_to_outstanding_attachment() {
        assert_eq!(transition(Idle, StatusEvent::SaveSucceeded), Idle);
        assert_eq!(transition(NoPhoto, StatusEvent::SaveSucceeded), NoPhoto);
        assert_eq!(transition(NoPhoto, StatusEvent::SaveFailed), NoPhoto);
        assert_eq!(transition(Success, StatusEvent::SaveFailed), Success);
    }

    #[test]
    fn race_change_reopens_saved_photo_only() {
        assert_eq!(transition(Success, StatusEvent::RaceChanged), Pending);
        assert_eq!(transition(NoPhoto, StatusEvent::RaceChanged), NoPhoto);
        assert_eq!(transition(Pending, StatusEvent::RaceChanged), Pending);
        assert_eq!(transition(Idle, StatusEvent::FileAttached), Idle);
    }
}
