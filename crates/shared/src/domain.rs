use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

id_newtype!(AthleteId);
id_newtype!(RaceId);

/// Catalog entry for an athlete. `existing_photo` is an externally hosted URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Athlete {
    pub id: AthleteId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub existing_photo: Option<String>,
}

impl Athlete {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: AthleteId::new(id),
            name: name.into(),
            existing_photo: None,
        }
    }

    pub fn with_existing_photo(mut self, url: impl Into<String>) -> Self {
        self.existing_photo = Some(url.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Race {
    pub id: RaceId,
    pub name: String,
}

impl Race {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: RaceId::new(id),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UploadStatus {
    #[default]
    Idle,
    NoPhoto,
    Pending,
    Success,
    Error,
}

impl UploadStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::NoPhoto => "no-photo",
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Error => "error",
        }
    }

    /// Operator-facing line for the status indicator; `None` while idle.
    pub fn message(self) -> Option<&'static str> {
        match self {
            Self::Idle => None,
            Self::NoPhoto => Some("No photo uploaded"),
            Self::Pending => Some("Photo uploaded, not saved"),
            Self::Success => Some("Photo successfully saved"),
            Self::Error => Some("Upload failed. Please try again."),
        }
    }
}

impl fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
