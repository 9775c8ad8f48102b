//! Persistence of per-sound volume and playing state.
//!
//! Values are stored as strings under `<key>Volume` and `<key>IsPlaying`
//! (`"true"` / `"false"`), matching the key-value stores this state is
//! usually kept in.

use std::collections::BTreeMap;

/// Key-value persistence consumed by the registry.
///
/// Calls are synchronous and infallible from the registry's point of view;
/// implementations log their own failures.
pub trait Store {
    fn get_volume(&self, key: &str, default: f32) -> f32;
    fn set_volume(&mut self, key: &str, volume: f32);
    fn get_is_playing(&self, key: &str) -> bool;
    fn set_is_playing(&mut self, key: &str, playing: bool);
}

pub fn volume_key(key: &str) -> String {
    format!("{key}Volume")
}

pub fn playing_key(key: &str) -> String {
    format!("{key}IsPlaying")
}

/// In-memory store, also the backing map of `FileStore`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored string, as written.
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.values
    }
}

impl Store for MemoryStore {
    fn get_volume(&self, key: &str, default: f32) -> f32 {
        self.raw(&volume_key(key))
            .and_then(|raw| raw.parse::<f32>().ok())
            .filter(|volume| volume.is_finite())
            .unwrap_or(default)
    }

    fn set_volume(&mut self, key: &str, volume: f32) {
        self.insert(volume_key(key), volume.to_string());
    }

    fn get_is_playing(&self, key: &str) -> bool {
        self.raw(&playing_key(key)) == Some("true")
    }

    fn set_is_playing(&mut self, key: &str, playing: bool) {
        self.insert(playing_key(key), playing.to_string());
    }
}

#[cfg(feature = "serde")]
pub use self::file::FileStore;

#[cfg(feature = "serde")]
mod file {
    use std::{
        collections::BTreeMap,
        fs, io,
        path::{Path, PathBuf},
    };

    use tracing::warn;

    use super::{MemoryStore, Store};

    /// JSON file of string values, rewritten on every mutation.
    #[derive(Debug)]
    pub struct FileStore {
        path: PathBuf,
        memory: MemoryStore,
    }

    impl FileStore {
        /// Load `path`, starting empty if it does not exist yet.
        pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
            let path = path.into();
            let mut memory = MemoryStore::new();

            match fs::read_to_string(&path) {
                Ok(text) => {
                    let values: BTreeMap<String, String> = serde_json::from_str(&text)
                        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
                    for (key, value) in values {
                        memory.insert(key, value);
                    }
                }
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => return Err(err),
            }

            Ok(Self { path, memory })
        }

        pub fn path(&self) -> &Path {
            &self.path
        }

        pub fn memory(&self) -> &MemoryStore {
            &self.memory
        }

        fn save(&self) {
            let result = serde_json::to_string_pretty(self.memory.entries())
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
                .and_then(|json| fs::write(&self.path, json));
            if let Err(err) = result {
                warn!(path = %self.path.display(), error = %err, "failed to persist sound state");
            }
        }
    }

    impl Store for FileStore {
        fn get_volume(&self, key: &str, default: f32) -> f32 {
            self.memory.get_volume(key, default)
        }

        fn set_volume(&mut self, key: &str, volume: f32) {
            self.memory.set_volume(key, volume);
            self.save();
        }

        fn get_is_playing(&self, key: &str) -> bool {
            self.memory.get_is_playing(key)
        }

        fn set_is_playing(&mut self, key: &str, playing: bool) {
            self.memory.set_is_playing(key, playing);
            self.save();
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn values_survive_reopen() {
            let path = std::env::temp_dir().join(format!(
                "ambience-store-{}-{}.json",
                std::process::id(),
                fastrand::u64(..)
            ));

            {
                let mut store = FileStore::open(&path).unwrap();
                store.set_volume("rain", 0.25);
                store.set_is_playing("rain", true);
            }

            let store = FileStore::open(&path).unwrap();
            assert_eq!(store.get_volume("rain", 0.5), 0.25);
            assert!(store.get_is_playing("rain"));
            assert_eq!(store.memory().raw("rainIsPlaying"), Some("true"));

            let _ = fs::remove_file(&path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_values_fall_back() {
        let store = MemoryStore::new();
        assert_eq!(store.get_volume("rain", 0.5), 0.5);
        assert!(!store.get_is_playing("rain"));
    }

    #[test]
    fn garbage_volume_falls_back() {
        let mut store = MemoryStore::new();
        store.insert("rainVolume", "loud");
        assert_eq!(store.get_volume("rain", 0.5), 0.5);
        store.insert("rainVolume", "NaN");
        assert_eq!(store.get_volume("rain", 0.5), 0.5);
    }

    #[test]
    fn writes_use_suffixed_keys() {
        let mut store = MemoryStore::new();
        store.set_volume("oceanWaves", 0.75);
        store.set_is_playing("oceanWaves", false);

        assert_eq!(store.raw("oceanWavesVolume"), Some("0.75"));
        assert_eq!(store.raw("oceanWavesIsPlaying"), Some("false"));
    }
}
