//! Selection, attachment and save state for the athlete photo uploader.

pub mod attachment;
pub mod catalog;
pub mod persistence;
pub mod selection;
pub mod status;
pub mod uploader;
pub mod view;

pub use attachment::{
    AttachOutcome, AttachSource, AttachmentManager, FileHandle, LocatorFactory, ObjectUrlRegistry,
    PreviewLocator,
};
pub use catalog::{Catalog, CatalogError, CatalogSource, DemoCatalog, JsonFileCatalog};
pub use persistence::{PersistenceError, PhotoPersistence, SimulatedPersistence};
pub use uploader::{
    run_save, CompletionDisposition, PhotoUploader, SaveCompletion, SaveGate, SaveRequest,
    UploaderConfig,
};
pub use view::UploaderView;

#[cfg(test)]
#[path = "tests/uploader_tests.rs"]
mod tests;
