//! Applies operator commands and backend events to the uploader state.

use crossbeam_channel::Sender;
use shared::{
    error::{ErrorCode, ErrorReport, UploaderError},
    protocol::SubmissionOutcome,
};
use uploader_core::{
    AttachOutcome, Catalog, CompletionDisposition, FileHandle, PhotoUploader, SaveCompletion,
};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::{
    events::{UiError, UiErrorCategory, UiErrorContext, UiEvent},
    input::{OperatorCommand, HELP},
    orchestration::dispatch_backend_command,
};
use crate::ui::render::{render_athletes, render_races, render_view};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

pub struct Session {
    uploader: PhotoUploader,
    catalog: Catalog,
    cmd_tx: Sender<BackendCommand>,
    format: OutputFormat,
    output: String,
}

impl Session {
    pub fn new(
        uploader: PhotoUploader,
        catalog: Catalog,
        cmd_tx: Sender<BackendCommand>,
        format: OutputFormat,
    ) -> Self {
        Self {
            uploader,
            catalog,
            cmd_tx,
            format,
            output: String::new(),
        }
    }

    pub fn handle_command(&mut self, command: OperatorCommand) -> Flow {
        match command {
            OperatorCommand::ListAthletes { filter } => {
                let matches = self.catalog.search(&filter);
                let selected = self.uploader.selection().athlete().map(|a| &a.id);
                self.output.push_str(&render_athletes(&matches, selected));
                return Flow::Continue;
            }
            OperatorCommand::ListRaces => {
                let selected = self.uploader.selection().race().map(|r| &r.id);
                self.output
                    .push_str(&render_races(self.catalog.races(), selected));
                return Flow::Continue;
            }
            OperatorCommand::SelectAthlete { id } => match self.catalog.athlete(&id) {
                Some(athlete) => self.uploader.select_athlete(athlete.clone()),
                None => {
                    let err = UploaderError::not_found(format!("unknown athlete '{id}'"));
                    self.push_error(&UiError::from_uploader_error(UiErrorContext::Selection, &err));
                    return Flow::Continue;
                }
            },
            OperatorCommand::SelectRace { id } => match self.catalog.race(&id) {
                Some(race) => {
                    self.uploader.select_race(race.clone());
                }
                None => {
                    let err = UploaderError::not_found(format!("unknown race '{id}'"));
                    self.push_error(&UiError::from_uploader_error(UiErrorContext::Selection, &err));
                    return Flow::Continue;
                }
            },
            OperatorCommand::Attach { path, source } => {
                let file = match FileHandle::from_path(&path) {
                    Ok(file) => file,
                    Err(err) => {
                        let message = format!("failed to read '{}': {err}", path.display());
                        self.push_error(&UiError::from_io(UiErrorContext::ReadPhoto, &err, message));
                        return Flow::Continue;
                    }
                };
                if self.uploader.attach(file, source) == AttachOutcome::Disabled {
                    if self.uploader.config().require_race_selection {
                        self.notice("Select an athlete and a race before attaching a photo");
                    } else {
                        self.notice("Select an athlete before attaching a photo");
                    }
                }
            }
            OperatorCommand::Save => {
                if let Some(request) = self.uploader.begin_save() {
                    let generation = request.generation;
                    let mut status = String::new();
                    if !dispatch_backend_command(
                        &self.cmd_tx,
                        BackendCommand::SubmitPhoto(request),
                        &mut status,
                    ) {
                        // Nothing will answer this save; fail it so a retry can start.
                        self.uploader.complete_save(SaveCompletion {
                            generation,
                            outcome: SubmissionOutcome::Failed(ErrorReport::new(
                                ErrorCode::Unavailable,
                                status.clone(),
                            )),
                        });
                        self.notice(&status);
                    }
                }
            }
            OperatorCommand::Clear => self.uploader.clear_all(),
            OperatorCommand::Status => {}
            OperatorCommand::Help => {
                self.output.push_str(HELP);
                self.output.push('\n');
                return Flow::Continue;
            }
            OperatorCommand::Quit => return Flow::Quit,
        }
        self.push_view();
        Flow::Continue
    }

    pub fn handle_event(&mut self, event: UiEvent) -> Flow {
        match event {
            UiEvent::CatalogLoaded(catalog) => {
                tracing::info!(athletes = catalog.athletes().len(), "catalog replaced");
                self.catalog = catalog;
                Flow::Continue
            }
            UiEvent::SaveFinished(completion) => {
                if let CompletionDisposition::Applied(_) = self.uploader.complete_save(completion) {
                    self.push_view();
                }
                Flow::Continue
            }
            UiEvent::Error(err) => {
                let fatal = err.is_fatal();
                self.push_error(&err);
                if fatal {
                    Flow::Quit
                } else {
                    Flow::Continue
                }
            }
        }
    }

    pub fn notice(&mut self, message: &str) {
        self.output.push_str(message);
        self.output.push('\n');
    }

    pub fn is_saving(&self) -> bool {
        self.uploader.is_saving()
    }

    #[cfg(test)]
    pub fn view(&self) -> uploader_core::UploaderView {
        self.uploader.view()
    }

    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }

    /// Teardown: releases whatever preview the uploader still holds.
    pub fn shutdown(&mut self) {
        self.uploader.dispose();
    }

    fn push_error(&mut self, err: &UiError) {
        tracing::warn!(context = ?err.context(), category = ?err.category(), "{}", err.message());
        let prefix = match err.category() {
            UiErrorCategory::NotFound => "not found",
            UiErrorCategory::Io => "io error",
            UiErrorCategory::Validation => "invalid",
            UiErrorCategory::Unknown => "error",
        };
        self.notice(&format!("{prefix}: {}", err.message()));
    }

    fn push_view(&mut self) {
        let view = self.uploader.view();
        match self.format {
            OutputFormat::Text => self.output.push_str(&render_view(&view)),
            OutputFormat::Json => match serde_json::to_string(&view) {
                Ok(raw) => {
                    self.output.push_str(&raw);
                    self.output.push('\n');
                }
                Err(err) => tracing::error!("failed to serialize view: {err}"),
            },
        }
    }
}

#[cfg(test)]
#[path = "../tests/reducer_tests.rs"]
mod tests;
