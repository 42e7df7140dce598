use std::{
    env, fmt, fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use dashmap::DashMap;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{info, warn};
use uuid::Uuid;

/// Environment variable overriding the durable client data directory.
pub const CLIENT_DIR_ENV: &str = "CINEMATCH_CLIENT_DIR";

const DEFAULT_CLIENT_DIR: &str = "data/client";
const PROBE_FILE: &str = ".cinematch-probe";

/// Candidate storage tier, probed in ranked order during [`TieredStorage::open`].
#[derive(Debug, Clone)]
pub enum TierCandidate {
    /// One file per key under a directory; durable as long as the directory is.
    Directory(PathBuf),
    /// Volatile in-process map; always passes its probe.
    Memory,
}

/// Storage tier selected at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tier {
    /// Directory-backed tier rooted at the given path.
    Directory(PathBuf),
    /// Volatile in-memory tier.
    Memory,
    /// Every candidate failed its probe; reads are absent and writes dropped.
    Unavailable,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Directory(root) => write!(f, "directory {}", root.display()),
            Tier::Memory => write!(f, "memory"),
            Tier::Unavailable => write!(f, "unavailable"),
        }
    }
}

enum Backend {
    Directory(PathBuf),
    Memory(DashMap<String, String>),
    Unavailable,
}

/// String-keyed string-valued storage over the first candidate tier whose
/// write/read probe succeeds.
///
/// Selection happens once; a tier that degrades later is not re-probed.
/// Reads of missing or unreadable values are absent, failed writes are
/// logged and swallowed, keeping the in-process state authoritative even
/// when persistence silently degrades.
pub struct TieredStorage {
    backend: Backend,
}

impl TieredStorage {
    /// Probe `candidates` in order and keep the first that passes.
    pub fn open(candidates: Vec<TierCandidate>) -> Self {
        for candidate in candidates {
            match candidate {
                TierCandidate::Directory(root) => match probe_directory(&root) {
                    Ok(()) => {
                        let storage = Self {
                            backend: Backend::Directory(root),
                        };
                        info!(tier = %storage.tier(), "selected storage tier");
                        return storage;
                    }
                    Err(err) => {
                        warn!(root = %root.display(), error = %err, "storage tier failed probe");
                    }
                },
                TierCandidate::Memory => {
                    let storage = Self {
                        backend: Backend::Memory(DashMap::new()),
                    };
                    info!(tier = %storage.tier(), "selected storage tier");
                    return storage;
                }
            }
        }

        warn!("all storage tiers failed their probes; persistence disabled");
        Self {
            backend: Backend::Unavailable,
        }
    }

    /// Open over the default ranked candidates: durable data directory
    /// (overridable via `CINEMATCH_CLIENT_DIR`), OS temp directory, memory.
    pub fn open_default() -> Self {
        Self::open(Self::default_candidates())
    }

    /// Default ranked candidate list ending in the infallible memory tier.
    pub fn default_candidates() -> Vec<TierCandidate> {
        let data_dir = env::var(CLIENT_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CLIENT_DIR));

        vec![
            TierCandidate::Directory(data_dir),
            TierCandidate::Directory(env::temp_dir().join("cinematch")),
            TierCandidate::Memory,
        ]
    }

    /// The tier selected at construction.
    pub fn tier(&self) -> Tier {
        match &self.backend {
            Backend::Directory(root) => Tier::Directory(root.clone()),
            Backend::Memory(_) => Tier::Memory,
            Backend::Unavailable => Tier::Unavailable,
        }
    }

    /// Whether a tier accepted its probe at construction.
    pub fn available(&self) -> bool {
        !matches!(self.backend, Backend::Unavailable)
    }

    /// Read the raw value under `key`, absent on any failure.
    pub fn get(&self, key: &str) -> Option<String> {
        match &self.backend {
            Backend::Directory(root) => {
                let path = file_for_key(root, key);
                match fs::read_to_string(&path) {
                    Ok(value) => Some(value),
                    Err(err) if err.kind() == ErrorKind::NotFound => None,
                    Err(err) => {
                        warn!(key, error = %err, "failed to read stored value; treating as absent");
                        None
                    }
                }
            }
            Backend::Memory(map) => map.get(key).map(|entry| entry.value().clone()),
            Backend::Unavailable => None,
        }
    }

    /// Write `value` under `key`; failures are logged and swallowed.
    pub fn set(&self, key: &str, value: &str) {
        match &self.backend {
            Backend::Directory(root) => {
                let path = file_for_key(root, key);
                if let Err(err) = fs::write(&path, value) {
                    warn!(key, error = %err, "failed to persist value; keeping in-process state only");
                }
            }
            Backend::Memory(map) => {
                map.insert(key.to_owned(), value.to_owned());
            }
            Backend::Unavailable => {
                warn!(key, "storage unavailable; dropping write");
            }
        }
    }

    /// Remove the value under `key`; failures are logged and swallowed.
    pub fn remove(&self, key: &str) {
        match &self.backend {
            Backend::Directory(root) => {
                let path = file_for_key(root, key);
                match fs::remove_file(&path) {
                    Ok(()) => {}
                    Err(err) if err.kind() == ErrorKind::NotFound => {}
                    Err(err) => warn!(key, error = %err, "failed to remove stored value"),
                }
            }
            Backend::Memory(map) => {
                map.remove(key);
            }
            Backend::Unavailable => {
                warn!(key, "storage unavailable; dropping removal");
            }
        }
    }

    /// Read and decode the JSON value under `key`.
    ///
    /// Malformed stored data reads as absent, never as an error.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(key, error = %err, "malformed stored value; treating as absent");
                None
            }
        }
    }

    /// Encode `value` as JSON and write it under `key`.
    pub fn set_json<T: Serialize>(&self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(raw) => self.set(key, &raw),
            Err(err) => warn!(key, error = %err, "failed to encode value; dropping write"),
        }
    }
}

fn probe_directory(root: &Path) -> std::io::Result<()> {
    fs::create_dir_all(root)?;

    let probe = root.join(PROBE_FILE);
    let token = Uuid::new_v4().to_string();
    fs::write(&probe, &token)?;
    let read_back = fs::read_to_string(&probe)?;
    fs::remove_file(&probe)?;

    if read_back == token {
        Ok(())
    } else {
        Err(std::io::Error::other("probe value did not round-trip"))
    }
}

fn file_for_key(root: &Path, key: &str) -> PathBuf {
    root.join(format!("{}.json", key.replace(':', "_")))
}
