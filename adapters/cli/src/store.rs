use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use arena_siege_core::PlayerProfile;
use arena_siege_system_simulation::{Persistence, PersistenceError};

/// Saves the player profile as pretty-printed JSON.
#[derive(Clone, Debug)]
pub(crate) struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

impl Persistence for JsonFileStore {
    fn save(&mut self, profile: &PlayerProfile) -> Result<(), PersistenceError> {
        let json = serde_json::to_string_pretty(profile)
            .map_err(|error| PersistenceError::Format(error.to_string()))?;
        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, json)?;
        log::debug!("saved profile to {}", self.path.display());
        Ok(())
    }

    fn load(&mut self) -> Result<Option<PlayerProfile>, PersistenceError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(error.into()),
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|error| PersistenceError::Format(error.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::JsonFileStore;
    use arena_siege_core::{PlayerProfile, Upgrade};
    use arena_siege_system_simulation::{Persistence, PersistenceError};
    use std::{fs, process};

    fn scratch(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("arena-siege-{}-{name}", process::id()))
    }

    #[test]
    fn missing_file_loads_nothing() {
        let mut store = JsonFileStore::new(scratch("missing.json"));
        assert!(store.load().expect("missing file is not an error").is_none());
    }

    #[test]
    fn saved_profile_loads_back() {
        let path = scratch("roundtrip/profile.json");
        let mut store = JsonFileStore::new(&path);
        let mut profile = PlayerProfile {
            currency: 12,
            highest_level: 3,
            ..PlayerProfile::default()
        };
        profile.upgrades.apply(Upgrade::Slow);

        store.save(&profile).expect("save succeeds");
        assert_eq!(store.load().expect("load succeeds"), Some(profile));
        let _ = fs::remove_dir_all(path.parent().expect("parent directory"));
    }

    #[test]
    fn corrupt_file_is_a_format_error() {
        let path = scratch("corrupt.json");
        fs::write(&path, "{ not json").expect("write scratch file");
        let mut store = JsonFileStore::new(&path);
        assert!(matches!(store.load(), Err(PersistenceError::Format(_))));
        let _ = fs::remove_file(store.path());
    }
}
