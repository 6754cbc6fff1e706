use super::*;
use std::{
    path::PathBuf,
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use crossbeam_channel::{bounded, Receiver};
use shared::{domain::UploadStatus, protocol::SubmissionReceipt};
use uploader_core::{AttachSource, CatalogError, ObjectUrlRegistry, SaveRequest, UploaderConfig};

const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n";

fn receipt(request: &SaveRequest) -> SubmissionOutcome {
    SubmissionOutcome::Saved(SubmissionReceipt {
        athlete_id: request.submission.athlete_id.clone(),
        race_id: request.submission.race_id.clone(),
        saved_at: "2026-01-01T00:00:00Z".parse().expect("timestamp"),
    })
}

struct Fixture {
    session: Session,
    cmd_rx: Receiver<BackendCommand>,
    registry: Arc<ObjectUrlRegistry>,
    dir: PathBuf,
}

impl Fixture {
    fn new(require_race_selection: bool) -> Self {
        let registry = Arc::new(ObjectUrlRegistry::new());
        let uploader = PhotoUploader::new(
            UploaderConfig {
                require_race_selection,
            },
            registry.clone(),
        );
        let (cmd_tx, cmd_rx) = bounded(8);
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("uploader_session_test_{suffix}"));
        std::fs::create_dir_all(&dir).expect("temp dir");

        Self {
            session: Session::new(uploader, Catalog::demo(), cmd_tx, OutputFormat::Text),
            cmd_rx,
            registry,
            dir,
        }
    }

    fn write_file(&self, name: &str, bytes: &[u8]) -> PathBuf {
        let path = self.dir.join(name);
        std::fs::write(&path, bytes).expect("write photo");
        path
    }

    fn run(&mut self, command: OperatorCommand) -> String {
        assert_eq!(self.session.handle_command(command), Flow::Continue);
        self.session.take_output()
    }

    fn select(&mut self, id: &str) -> String {
        self.run(OperatorCommand::SelectAthlete { id: id.to_string() })
    }

    fn attach(&mut self, path: PathBuf, source: AttachSource) -> String {
        self.run(OperatorCommand::Attach { path, source })
    }

    fn submitted(&self) -> SaveRequest {
        match self.cmd_rx.try_recv().expect("queued command") {
            BackendCommand::SubmitPhoto(request) => request,
            BackendCommand::LoadCatalog => panic!("unexpected catalog load"),
        }
    }
}

impl Drop for Fixture {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}

#[test]
fn select_attach_save_round_trip() {
    let mut fx = Fixture::new(false);

    let out = fx.select("ATH-1042");
    assert!(out.contains("Marcus Johnson (ATH-1042)"));
    assert!(out.contains("Current photo <https://images.unsplash.com/"));
    assert!(out.contains("No photo uploaded"));

    let photo = fx.write_file("new.png", PNG_BYTES);
    let out = fx.attach(photo, AttachSource::DragAndDrop);
    assert!(out.contains("New photo selected <blob:athlete-photo/"));
    assert!(out.contains("file    : new.png"));
    assert!(out.contains("save [on]"));

    let out = fx.run(OperatorCommand::Save);
    assert!(out.contains("Saving..."));
    assert!(out.contains("save [off]"));

    let request = fx.submitted();
    assert_eq!(request.submission.athlete_id.as_str(), "ATH-1042");
    assert_eq!(request.submission.mime_type, "image/png");

    let outcome = receipt(&request);
    let flow = fx.session.handle_event(UiEvent::SaveFinished(SaveCompletion {
        generation: request.generation,
        outcome,
    }));
    assert_eq!(flow, Flow::Continue);
    assert!(fx.session.take_output().contains("Photo successfully saved"));
    assert_eq!(fx.session.view().status, UploadStatus::Success);

    let out = fx.select("ATH-1087");
    assert!(out.contains("photo   : none"));
    assert_eq!(fx.registry.live_count(), 0);
}

#[test]
fn completion_after_clear_is_ignored() {
    let mut fx = Fixture::new(false);
    fx.select("ATH-1087");
    let photo = fx.write_file("p.jpg", &[0xFF, 0xD8, 0xFF, 0xE0]);
    fx.attach(photo, AttachSource::FilePicker);
    fx.run(OperatorCommand::Save);
    let request = fx.submitted();

    fx.run(OperatorCommand::Clear);
    let outcome = receipt(&request);
    fx.session.handle_event(UiEvent::SaveFinished(SaveCompletion {
        generation: request.generation,
        outcome,
    }));

    assert!(fx.session.take_output().is_empty());
    let view = fx.session.view();
    assert_eq!(view.status, UploadStatus::Idle);
    assert!(view.athlete_id.is_none());
}

#[test]
fn reattach_during_save_waits_for_outstanding_submit() {
    let mut fx = Fixture::new(false);
    fx.select("ATH-1087");
    let first = fx.write_file("first.png", PNG_BYTES);
    fx.attach(first, AttachSource::DragAndDrop);
    fx.run(OperatorCommand::Save);
    let request = fx.submitted();

    let second = fx.write_file("second.png", PNG_BYTES);
    let out = fx.attach(second, AttachSource::DragAndDrop);
    assert!(out.contains("Saving..."));
    fx.run(OperatorCommand::Save);
    assert!(fx.cmd_rx.try_recv().is_err());

    let outcome = receipt(&request);
    fx.session.handle_event(UiEvent::SaveFinished(SaveCompletion {
        generation: request.generation,
        outcome,
    }));
    assert!(!fx.session.is_saving());
    assert_eq!(fx.session.view().status, UploadStatus::Pending);

    fx.run(OperatorCommand::Save);
    assert_eq!(fx.submitted().submission.filename, "second.png");
}

#[test]
fn unsupported_file_is_dropped_silently() {
    let mut fx = Fixture::new(false);
    fx.select("ATH-1087");
    let before = fx.session.view();

    let gif = fx.write_file("anim.gif", b"GIF89a");
    let out = fx.attach(gif, AttachSource::DragAndDrop);

    assert!(!out.contains("error"));
    assert_eq!(fx.session.view(), before);
    assert_eq!(fx.registry.derived_count(), 0);
}

#[test]
fn attach_without_athlete_asks_for_selection() {
    let mut fx = Fixture::new(false);
    let photo = fx.write_file("p.png", PNG_BYTES);
    let out = fx.attach(photo, AttachSource::FilePicker);
    assert!(out.contains("Select an athlete before attaching a photo"));
    assert_eq!(fx.session.view().status, UploadStatus::Idle);
}

#[test]
fn unknown_ids_and_missing_files_are_reported() {
    let mut fx = Fixture::new(true);

    let out = fx.select("ATH-0000");
    assert!(out.starts_with("not found:"), "unexpected output: {out}");

    fx.select("ATH-1087");
    let out = fx.run(OperatorCommand::SelectRace {
        id: "RACE-NOPE".to_string(),
    });
    assert!(out.contains("unknown race 'RACE-NOPE'"));

    let missing = fx.dir.join("missing.png");
    let out = fx.attach(missing, AttachSource::FilePicker);
    assert!(out.starts_with("not found: failed to read"), "unexpected output: {out}");
}

#[test]
fn race_gating_refuses_attach_until_race_chosen() {
    let mut fx = Fixture::new(true);
    fx.select("ATH-2091");
    let photo = fx.write_file("p.png", PNG_BYTES);
    let out = fx.attach(photo.clone(), AttachSource::FilePicker);
    assert!(out.contains("Select an athlete and a race before attaching a photo"));
    assert!(out.contains("attach [off] save [off]"));
    assert!(fx.session.view().attachment_name.is_none());
    assert_eq!(fx.registry.derived_count(), 0);

    fx.run(OperatorCommand::Save);
    assert!(fx.cmd_rx.try_recv().is_err());

    let out = fx.run(OperatorCommand::SelectRace {
        id: "RACE-CITY-HALF".to_string(),
    });
    assert!(out.contains("race    : City Half Marathon"));
    assert!(out.contains("attach [on] save [off]"));

    let out = fx.attach(photo, AttachSource::FilePicker);
    assert!(out.contains("attach [on] save [on]"));

    fx.run(OperatorCommand::Save);
    let request = fx.submitted();
    assert_eq!(
        request.submission.race_id.as_ref().map(|id| id.as_str()),
        Some("RACE-CITY-HALF")
    );
}

#[test]
fn listing_marks_current_selection() {
    let mut fx = Fixture::new(false);
    fx.select("ATH-3045");
    let out = fx.run(OperatorCommand::ListAthletes {
        filter: "james".to_string(),
    });
    assert_eq!(out.lines().count(), 1);
    assert!(out.starts_with("* ATH-3045"));

    let out = fx.run(OperatorCommand::ListRaces);
    assert_eq!(out.lines().count(), Catalog::demo().races().len());
}

#[test]
fn failed_dispatch_marks_save_as_failed() {
    let mut fx = Fixture::new(false);
    fx.select("ATH-1087");
    let photo = fx.write_file("p.png", PNG_BYTES);
    fx.attach(photo, AttachSource::DragAndDrop);

    let (cmd_tx, cmd_rx) = bounded(1);
    drop(cmd_rx);
    fx.session.cmd_tx = cmd_tx;

    let out = fx.run(OperatorCommand::Save);
    assert!(out.contains("Backend worker disconnected"));
    assert!(out.contains("Upload failed. Please try again."));
    assert!(!fx.session.is_saving());
}

#[test]
fn fatal_backend_errors_end_the_session() {
    let mut fx = Fixture::new(false);
    let parse = serde_json::from_str::<serde_json::Value>("").expect_err("must fail");
    let flow = fx
        .session
        .handle_event(UiEvent::Error(UiError::from_catalog_error(
            &CatalogError::Malformed(parse),
        )));
    assert_eq!(flow, Flow::Quit);
    assert!(fx.session.take_output().starts_with("invalid:"));

    assert_eq!(fx.session.handle_command(OperatorCommand::Quit), Flow::Quit);
}

#[test]
fn json_output_serializes_view() {
    let mut fx = Fixture::new(false);
    fx.session.format = OutputFormat::Json;
    let out = fx.select("ATH-1087");
    let value: serde_json::Value = serde_json::from_str(out.trim()).expect("json view");
    assert_eq!(value["status"], "no-photo");
    assert_eq!(value["athlete_id"], "ATH-1087");
    assert_eq!(value["save_enabled"], false);
}
