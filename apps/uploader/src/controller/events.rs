//! Backend events and error modeling for the uploader controller.

use std::io;

use shared::error::{ErrorCode, UploaderError};
use uploader_core::{Catalog, CatalogError, SaveCompletion};

pub enum UiEvent {
    CatalogLoaded(Catalog),
    SaveFinished(SaveCompletion),
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    NotFound,
    Io,
    Validation,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    CatalogLoad,
    ReadPhoto,
    Selection,
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl From<ErrorCode> for UiErrorCategory {
    fn from(code: ErrorCode) -> Self {
        match code {
            ErrorCode::NotFound => Self::NotFound,
            ErrorCode::Validation => Self::Validation,
            ErrorCode::Unavailable => Self::Unknown,
        }
    }
}

impl From<io::ErrorKind> for UiErrorCategory {
    fn from(kind: io::ErrorKind) -> Self {
        match kind {
            io::ErrorKind::NotFound => Self::NotFound,
            io::ErrorKind::InvalidData | io::ErrorKind::InvalidInput => Self::Validation,
            _ => Self::Io,
        }
    }
}

impl UiError {
    pub fn new(
        category: UiErrorCategory,
        context: UiErrorContext,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            context,
            message: message.into(),
        }
    }

    pub fn from_uploader_error(context: UiErrorContext, err: &UploaderError) -> Self {
        Self::new(err.code.into(), context, err.message.clone())
    }

    pub fn from_io(context: UiErrorContext, err: &io::Error, message: impl Into<String>) -> Self {
        Self::new(err.kind().into(), context, message)
    }

    pub fn from_catalog_error(err: &CatalogError) -> Self {
        let category = match err {
            CatalogError::Read { source, .. } => source.kind().into(),
            CatalogError::Malformed(_) => UiErrorCategory::Validation,
        };
        Self::new(category, UiErrorContext::CatalogLoad, err.to_string())
    }

    /// Startup and catalog failures leave nothing to operate on.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.context,
            UiErrorContext::BackendStartup | UiErrorContext::CatalogLoad
        )
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_follow_typed_error_codes() {
        let err = UiError::from_uploader_error(
            UiErrorContext::Selection,
            &UploaderError::not_found("unknown athlete 'ATH-0000'"),
        );
        assert_eq!(err.category(), UiErrorCategory::NotFound);
        assert_eq!(err.message(), "unknown athlete 'ATH-0000'");
        assert!(!err.is_fatal());

        let err = UiError::from_uploader_error(
            UiErrorContext::Selection,
            &UploaderError::new(ErrorCode::Unavailable, "not found in cache"),
        );
        assert_eq!(err.category(), UiErrorCategory::Unknown);
    }

    #[test]
    fn io_failures_map_by_kind() {
        let denied = io::Error::from(io::ErrorKind::PermissionDenied);
        let err = UiError::from_io(UiErrorContext::ReadPhoto, &denied, "failed to read 'p.png'");
        assert_eq!(err.category(), UiErrorCategory::Io);
        assert_eq!(err.context(), UiErrorContext::ReadPhoto);

        let missing = io::Error::from(io::ErrorKind::NotFound);
        let err = UiError::from_io(UiErrorContext::ReadPhoto, &missing, "failed to read 'p.png'");
        assert_eq!(err.category(), UiErrorCategory::NotFound);
    }

    #[test]
    fn catalog_failures_are_fatal() {
        let parse = serde_json::from_str::<serde_json::Value>("{").expect_err("must fail");
        let err = UiError::from_catalog_error(&CatalogError::Malformed(parse));
        assert_eq!(err.category(), UiErrorCategory::Validation);
        assert!(err.message().starts_with("malformed catalog data"));
        assert!(err.is_fatal());

        let err = UiError::from_catalog_error(&CatalogError::Read {
            path: "athletes.json".into(),
            source: io::Error::from(io::ErrorKind::NotFound),
        });
        assert_eq!(err.category(), UiErrorCategory::NotFound);
        assert_eq!(err.context(), UiErrorContext::CatalogLoad);
    }
}
