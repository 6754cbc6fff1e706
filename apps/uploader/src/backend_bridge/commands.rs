//! Backend commands queued from the event loop to the backend worker.

use uploader_core::SaveRequest;

pub enum BackendCommand {
    LoadCatalog,
    SubmitPhoto(SaveRequest),
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::LoadCatalog => "load_catalog",
            Self::SubmitPhoto(_) => "submit_photo",
        }
    }
}
