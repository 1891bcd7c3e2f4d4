use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sled::IVec;

use super::errors::HostError;

const TREE_GAMES: &str = "games";
const KEY_PREFIX: &str = "games:";

pub const SAVE_SCHEMA_VERSION: u8 = 1;

/// One saved game: the JSON snapshot document plus bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveRecord {
    pub schema_version: u8,
    pub id: String,
    pub saved_at: DateTime<Utc>,
    pub document: String,
}

/// Sled-backed persistence for game snapshots, keyed by game id.
pub struct SaveStore {
    _db: sled::Db,
    games: sled::Tree,
}

impl SaveStore {
    /// Open (or create) the store rooted at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, HostError> {
        let path_ref = path.as_ref();
        std::fs::create_dir_all(path_ref)?;
        let db = sled::open(path_ref)?;
        let games = db.open_tree(TREE_GAMES)?;
        Ok(Self { _db: db, games })
    }

    fn key(id: &str) -> Vec<u8> {
        format!("{}{}", KEY_PREFIX, id).into_bytes()
    }

    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, HostError> {
        Ok(bincode::serialize(value)?)
    }

    fn deserialize<T: serde::de::DeserializeOwned>(bytes: IVec) -> Result<T, HostError> {
        Ok(bincode::deserialize::<T>(&bytes)?)
    }

    /// Insert or replace the snapshot of a game.
    pub fn put(&self, id: &str, document: String) -> Result<SaveRecord, HostError> {
        let record = SaveRecord {
            schema_version: SAVE_SCHEMA_VERSION,
            id: id.to_string(),
            saved_at: Utc::now(),
            document,
        };
        let bytes = Self::serialize(&record)?;
        self.games.insert(Self::key(id), bytes)?;
        self.games.flush()?;
        Ok(record)
    }

    pub fn get(&self, id: &str) -> Result<SaveRecord, HostError> {
        let Some(bytes) = self.games.get(Self::key(id))? else {
            return Err(HostError::NotFound(id.to_string()));
        };
        let record: SaveRecord = Self::deserialize(bytes)?;
        if record.schema_version != SAVE_SCHEMA_VERSION {
            return Err(HostError::SchemaMismatch {
                id: id.to_string(),
                expected: SAVE_SCHEMA_VERSION,
                found: record.schema_version,
            });
        }
        Ok(record)
    }

    pub fn contains(&self, id: &str) -> Result<bool, HostError> {
        Ok(self.games.contains_key(Self::key(id))?)
    }

    /// All stored game ids, in key order.
    pub fn list_ids(&self) -> Result<Vec<String>, HostError> {
        let mut ids = Vec::new();
        for entry in self.games.scan_prefix(KEY_PREFIX.as_bytes()) {
            let (key, _) = entry?;
            let text = String::from_utf8_lossy(&key);
            if let Some(id) = text.strip_prefix(KEY_PREFIX) {
                ids.push(id.to_string());
            }
        }
        Ok(ids)
    }

    /// Remove a game. Returns whether it existed.
    pub fn delete(&self, id: &str) -> Result<bool, HostError> {
        let old = self.games.remove(Self::key(id))?;
        self.games.flush()?;
        Ok(old.is_some())
    }
}
