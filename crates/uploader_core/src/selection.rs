use shared::domain::{Athlete, Race};

/// Current athlete and race choice. Catalog entries are trusted as given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionStore {
    athlete: Option<Athlete>,
    race: Option<Race>,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the athlete unconditionally and forgets any race.
    pub fn select_athlete(&mut self, athlete: Athlete) {
        self.athlete = Some(athlete);
        self.race = None;
    }

    /// Returns whether the race selection changed. Ignored without an athlete.
    pub fn select_race(&mut self, race: Race) -> bool {
        if self.athlete.is_none() {
            return false;
        }
        if self.race.as_ref().map(|current| &current.id) == Some(&race.id) {
            return false;
        }
        self.race = Some(race);
        true
    }

    pub fn clear(&mut self) {
        self.athlete = None;
        self.race = None;
    }

    pub fn athlete(&self) -> Option<&Athlete> {
        self.athlete.as_ref()
    }

    pub fn race(&self) -> Option<&Race> {
        self.race.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.athlete.is_none()
    }
}
