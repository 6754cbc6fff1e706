//! Runtime bridge between the command queue and the event intake.

use std::{sync::Arc, thread};

use crossbeam_channel::{Receiver, Sender};
use uploader_core::{run_save, CatalogSource, PhotoPersistence};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

pub struct Collaborators {
    pub catalog: Arc<dyn CatalogSource>,
    pub persistence: Arc<dyn PhotoPersistence>,
}

pub fn launch(
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
    collaborators: Collaborators,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                tracing::error!("failed to build backend runtime: {err}");
                let _ = ui_tx.send(UiEvent::Error(UiError::from_io(
                    UiErrorContext::BackendStartup,
                    &err,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                return;
            }
        };
        tracing::debug!("backend worker ready");

        runtime.block_on(async move {
            // Blocking recv is fine here: every command spawns its own task.
            while let Ok(cmd) = cmd_rx.recv() {
                tracing::debug!(command = cmd.name(), "backend command received");
                match cmd {
                    BackendCommand::LoadCatalog => {
                        let catalog = collaborators.catalog.clone();
                        let ui_tx = ui_tx.clone();
                        tokio::spawn(async move {
                            let event = match catalog.load().await {
                                Ok(catalog) => UiEvent::CatalogLoaded(catalog),
                                Err(err) => UiEvent::Error(UiError::from_catalog_error(&err)),
                            };
                            let _ = ui_tx.send(event);
                        });
                    }
                    BackendCommand::SubmitPhoto(request) => {
                        let persistence = collaborators.persistence.clone();
                        let ui_tx = ui_tx.clone();
                        tokio::spawn(async move {
                            let completion = run_save(persistence.as_ref(), request).await;
                            if ui_tx.send(UiEvent::SaveFinished(completion)).is_err() {
                                tracing::debug!("event loop gone before save completion");
                            }
                        });
                    }
                }
            }
        });
        tracing::debug!("backend worker stopped");
    })
}
