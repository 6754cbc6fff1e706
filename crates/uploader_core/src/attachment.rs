//! Attached photo ownership and preview locator lifecycle.
//!
//! A preview is either the athlete's externally hosted photo, which is shown
//! as-is, or a locator derived from the attached file. Derived locators are
//! owned by [`AttachmentManager`] alone and go back to the [`LocatorFactory`]
//! exactly once: [`LocalLocator`] is neither `Clone` nor constructible outside
//! this module, and releasing it consumes it.

use std::{
    collections::HashMap,
    fmt, fs, io,
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
};

use tracing::{debug, warn};
use uuid::Uuid;

pub const ACCEPTED_MIME_TYPES: [&str; 2] = ["image/jpeg", "image/png"];

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";
const JPEG_SIGNATURE: &[u8] = &[0xFF, 0xD8, 0xFF];
const LOCATOR_SCHEME: &str = "blob:athlete-photo/";

pub fn is_accepted_mime(mime_type: &str) -> bool {
    let essence = mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    ACCEPTED_MIME_TYPES.contains(&essence.as_str())
}

/// MIME type from leading magic bytes, for files whose name says nothing.
pub fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(PNG_SIGNATURE) {
        Some("image/png")
    } else if bytes.starts_with(JPEG_SIGNATURE) {
        Some("image/jpeg")
    } else {
        None
    }
}

/// Raw file supplied by the operator. Cloning shares the underlying bytes.
#[derive(Clone)]
pub struct FileHandle {
    name: String,
    mime_type: String,
    data: Arc<[u8]>,
}

impl FileHandle {
    pub fn from_bytes(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        data: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// Reads the file and reports its type from the extension, falling back to
    /// content sniffing and then `application/octet-stream`.
    pub fn from_path(path: &Path) -> io::Result<Self> {
        let data = fs::read(path)?;
        let mime_type = mime_guess::from_path(path)
            .first_raw()
            .or_else(|| sniff_mime(&data))
            .unwrap_or("application/octet-stream")
            .to_string();
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("photo")
            .to_string();
        Ok(Self::from_bytes(name, mime_type, data))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn size_bytes(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }
}

impl fmt::Debug for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileHandle")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("size_bytes", &self.data.len())
            .finish()
    }
}

/// Locator derived from an in-memory file. Must be released to its factory.
#[derive(Debug, PartialEq, Eq)]
pub struct LocalLocator(String);

impl LocalLocator {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum PreviewLocator {
    External(String),
    Local(LocalLocator),
}

impl PreviewLocator {
    pub fn as_str(&self) -> &str {
        match self {
            Self::External(url) => url,
            Self::Local(locator) => locator.as_str(),
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local(_))
    }
}

/// Derives revocable preview locators from files.
pub trait LocatorFactory: Send + Sync {
    fn derive(&self, file: &FileHandle) -> LocalLocator;
    fn release(&self, locator: LocalLocator);
}

#[derive(Default)]
struct RegistryState {
    live: HashMap<String, String>,
    derived: u64,
    released: u64,
}

/// In-process locator registry handing out `blob:` style locators.
#[derive(Default)]
pub struct ObjectUrlRegistry {
    state: Mutex<RegistryState>,
}

impl ObjectUrlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, RegistryState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn is_live(&self, locator: &str) -> bool {
        self.state().live.contains_key(locator)
    }

    pub fn live_count(&self) -> usize {
        self.state().live.len()
    }

    pub fn derived_count(&self) -> u64 {
        self.state().derived
    }

    pub fn released_count(&self) -> u64 {
        self.state().released
    }
}

impl LocatorFactory for ObjectUrlRegistry {
    fn derive(&self, file: &FileHandle) -> LocalLocator {
        let locator = format!("{LOCATOR_SCHEME}{}", Uuid::new_v4());
        let mut state = self.state();
        state.live.insert(locator.clone(), file.name().to_string());
        state.derived += 1;
        debug!(%locator, file = file.name(), "derived preview locator");
        LocalLocator(locator)
    }

    fn release(&self, locator: LocalLocator) {
        let mut state = self.state();
        if state.live.remove(&locator.0).is_some() {
            state.released += 1;
            debug!(locator = %locator.0, "released preview locator");
        } else {
            warn!(locator = %locator.0, "release of unknown preview locator");
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachSource {
    DragAndDrop,
    FilePicker,
}

impl AttachSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DragAndDrop => "drag_and_drop",
            Self::FilePicker => "file_picker",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachOutcome {
    Attached,
    /// Not an accepted image type; nothing changed.
    Rejected { mime_type: String },
    /// Attaching is not enabled for the current selection; nothing changed.
    Disabled,
}

pub struct AttachmentManager {
    locators: Arc<dyn LocatorFactory>,
    file: Option<FileHandle>,
    preview: Option<PreviewLocator>,
}

impl AttachmentManager {
    pub fn new(locators: Arc<dyn LocatorFactory>) -> Self {
        Self {
            locators,
            file: None,
            preview: None,
        }
    }

    /// Drops any attachment and previews the athlete's hosted photo, if any.
    pub fn show_existing(&mut self, existing_photo: Option<&str>) {
        self.clear();
        self.preview = existing_photo.map(|url| PreviewLocator::External(url.to_string()));
    }

    pub fn attach(&mut self, file: FileHandle) -> AttachOutcome {
        if !is_accepted_mime(file.mime_type()) {
            return AttachOutcome::Rejected {
                mime_type: file.mime_type().to_string(),
            };
        }

        let locator = self.locators.derive(&file);
        self.release_preview();
        self.preview = Some(PreviewLocator::Local(locator));
        self.file = Some(file);
        AttachOutcome::Attached
    }

    pub fn clear(&mut self) {
        self.release_preview();
        self.file = None;
    }

    /// Releases any outstanding derived locator. Safe to call repeatedly.
    pub fn dispose(&mut self) {
        self.clear();
    }

    pub fn file(&self) -> Option<&FileHandle> {
        self.file.as_ref()
    }

    pub fn preview(&self) -> Option<&PreviewLocator> {
        self.preview.as_ref()
    }

    pub fn has_attachment(&self) -> bool {
        self.file.is_some()
    }

    fn release_preview(&mut self) {
        if let Some(PreviewLocator::Local(locator)) = self.preview.take() {
            self.locators.release(locator);
        }
    }
}

impl Drop for AttachmentManager {
    fn drop(&mut self) {
        self.dispose();
    }
}
