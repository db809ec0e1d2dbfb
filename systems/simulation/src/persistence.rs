//! Profile persistence collaborator.

use std::sync::{Arc, Mutex, PoisonError};

use arena_siege_core::PlayerProfile;
use thiserror::Error;

/// Failures raised by persistence backends.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Storage could not be read or written.
    #[error("profile storage unavailable")]
    Io(#[from] std::io::Error),
    /// Stored data could not be encoded or decoded.
    #[error("profile data is malformed: {0}")]
    Format(String),
}

/// Stores the player profile between runs.
pub trait Persistence: Send {
    /// Persists `profile`, replacing any previous save.
    fn save(&mut self, profile: &PlayerProfile) -> Result<(), PersistenceError>;

    /// Loads the saved profile, or `None` when nothing was saved yet.
    fn load(&mut self) -> Result<Option<PlayerProfile>, PersistenceError>;
}

/// Process-local store. Clones share the same slot.
#[derive(Clone, Debug, Default)]
pub struct InMemoryStore {
    slot: Arc<Mutex<Option<PlayerProfile>>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `profile`.
    #[must_use]
    pub fn with_profile(profile: PlayerProfile) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(profile))),
        }
    }

    /// Copy of the stored profile.
    #[must_use]
    pub fn saved(&self) -> Option<PlayerProfile> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Persistence for InMemoryStore {
    fn save(&mut self, profile: &PlayerProfile) -> Result<(), PersistenceError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(profile.clone());
        Ok(())
    }

    fn load(&mut self) -> Result<Option<PlayerProfile>, PersistenceError> {
        Ok(self.saved())
    }
}

#[cfg(test)]
mod tests {
    use super::{InMemoryStore, Persistence};
    use arena_siege_core::PlayerProfile;

    #[test]
    fn clones_share_the_saved_profile() {
        let store = InMemoryStore::new();
        let mut writer = store.clone();
        let profile = PlayerProfile {
            currency: 42,
            ..PlayerProfile::default()
        };
        writer.save(&profile).expect("in-memory save");
        assert_eq!(store.saved(), Some(profile));
    }
}
