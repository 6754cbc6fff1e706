//! Read-only athlete and race reference data.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::domain::{Athlete, Race};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed catalog data: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Athletes and races available for one uploader session.
///
/// Entries are trusted as supplied: duplicate ids are kept and lookups return
/// the first match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    athletes: Vec<Athlete>,
    #[serde(default)]
    races: Vec<Race>,
}

impl Catalog {
    pub fn new(athletes: Vec<Athlete>, races: Vec<Race>) -> Self {
        Self { athletes, races }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Built-in roster used when no catalog file is configured.
    pub fn demo() -> Self {
        let athletes = vec![
            Athlete::new("ATH-1042", "Marcus Johnson").with_existing_photo(
                "https://images.unsplash.com/photo-1500648767791-00dcc994a43e?ixlib=rb-1.2.1&auto=format&fit=facearea&facepad=2&w=256&h=256&q=80",
            ),
            Athlete::new("ATH-1087", "Serena Williams"),
            Athlete::new("ATH-2091", "David Chen").with_existing_photo(
                "https://images.unsplash.com/photo-1472099645785-5658abf4ff4e?ixlib=rb-1.2.1&auto=format&fit=facearea&facepad=2&w=256&h=256&q=80",
            ),
            Athlete::new("ATH-3012", "Sarah Miller"),
            Athlete::new("ATH-3045", "James Wilson"),
            Athlete::new("ATH-4102", "Emily Davis").with_existing_photo(
                "https://images.unsplash.com/photo-1494790108377-be9c29b29330?ixlib=rb-1.2.1&auto=format&fit=facearea&facepad=2&w=256&h=256&q=80",
            ),
            Athlete::new("ATH-5021", "Michael Brown"),
            Athlete::new("ATH-6098", "Jessica Taylor"),
            Athlete::new("ATH-7123", "Robert Anderson"),
            Athlete::new("ATH-8234", "Lisa Thomas"),
        ];
        let races = vec![
            Race::new("RACE-SPRING-10K", "Spring Classic 10K"),
            Race::new("RACE-CITY-HALF", "City Half Marathon"),
            Race::new("RACE-TRAIL-25K", "Ridgeline Trail 25K"),
            Race::new("RACE-FALL-MARATHON", "Fall Harbor Marathon"),
        ];
        Self::new(athletes, races)
    }

    pub fn athletes(&self) -> &[Athlete] {
        &self.athletes
    }

    pub fn races(&self) -> &[Race] {
        &self.races
    }

    pub fn athlete(&self, id: &str) -> Option<&Athlete> {
        self.athletes.iter().find(|athlete| athlete.id.as_str() == id)
    }

    pub fn race(&self, id: &str) -> Option<&Race> {
        self.races.iter().find(|race| race.id.as_str() == id)
    }

    /// Case-insensitive substring match against athlete name or id.
    pub fn search(&self, term: &str) -> Vec<&Athlete> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return self.athletes.iter().collect();
        }
        self.athletes
            .iter()
            .filter(|athlete| {
                athlete.name.to_lowercase().contains(&needle)
                    || athlete.id.as_str().to_lowercase().contains(&needle)
            })
            .collect()
    }
}

/// Supplies the catalog once per session.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn load(&self) -> Result<Catalog, CatalogError>;
}

pub struct DemoCatalog;

#[async_trait]
impl CatalogSource for DemoCatalog {
    async fn load(&self) -> Result<Catalog, CatalogError> {
        Ok(Catalog::demo())
    }
}

/// JSON file shaped as `{ "athletes": [...], "races": [...] }`.
pub struct JsonFileCatalog {
    path: PathBuf,
}

impl JsonFileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogSource for JsonFileCatalog {
    async fn load(&self) -> Result<Catalog, CatalogError> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| CatalogError::Read {
                path: self.path.clone(),
                source,
            })?;
        let catalog = Catalog::from_json_str(&raw)?;
        info!(
            path = %self.path.display(),
            athletes = catalog.athletes.len(),
            races = catalog.races.len(),
            "loaded catalog file"
        );
        Ok(catalog)
    }
}
