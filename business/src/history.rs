//! Generation history: the bounded, newest-first record list and its durable mirror.

use std::hash::{DefaultHasher, Hash, Hasher};

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;
use crate::request::GenerationRequest;
use crate::storage::KeyValueStore;

/// Records kept; pushing a sixth evicts the oldest for good.
pub const MAX_HISTORY: usize = 5;

/// Name of the durable slot holding the history.
pub const HISTORY_KEY: &str = "qrHistory";

/// One past successful generation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HistoryRecord {
    #[serde(flatten)]
    pub request: GenerationRequest,
    #[serde(with = "iso_millis")]
    pub timestamp: DateTime<Utc>,
}

impl HistoryRecord {
    /// Millisecond precision, so the record survives a trip through storage unchanged.
    pub fn new(request: GenerationRequest, timestamp: DateTime<Utc>) -> Self {
        Self {
            request,
            timestamp: timestamp.trunc_subsecs(3),
        }
    }

    pub fn now(request: GenerationRequest) -> Self {
        Self::new(request, Utc::now())
    }

    /// Stable identity for caching per-record artefacts such as thumbnails.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

/// Newest-first list of at most [`MAX_HISTORY`] records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryList {
    records: Vec<HistoryRecord>,
}

impl HistoryList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps the first [`MAX_HISTORY`] records of an already newest-first sequence.
    pub fn from_records(records: impl IntoIterator<Item = HistoryRecord>) -> Self {
        Self {
            records: records.into_iter().take(MAX_HISTORY).collect(),
        }
    }

    /// Prepends `record`, then drops whatever falls past the cap.
    pub fn push(&mut self, record: HistoryRecord) {
        self.records.insert(0, record);
        self.records.truncate(MAX_HISTORY);
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&HistoryRecord> {
        self.records.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HistoryRecord> {
        self.records.iter()
    }

    pub fn as_slice(&self) -> &[HistoryRecord] {
        &self.records
    }
}

impl<'a> IntoIterator for &'a HistoryList {
    type Item = &'a HistoryRecord;
    type IntoIter = std::slice::Iter<'a, HistoryRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Durable mirror of the [`HistoryList`] in one named slot.
#[derive(Debug)]
pub struct HistoryStore<S> {
    backend: S,
    key: String,
}

impl<S: KeyValueStore> HistoryStore<S> {
    pub fn new(backend: S) -> Self {
        Self::with_key(backend, HISTORY_KEY)
    }

    pub fn with_key(backend: S, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut S {
        &mut self.backend
    }

    /// Like [`load`](Self::load) but reports why nothing usable was stored.
    pub fn try_load(&self) -> Result<HistoryList, PersistenceError> {
        match self.backend.get(&self.key)? {
            None => Ok(HistoryList::new()),
            Some(raw) => {
                let records: Vec<HistoryRecord> = serde_json::from_str(&raw)?;
                Ok(HistoryList::from_records(records))
            }
        }
    }

    /// Never fails: a missing slot, unreadable storage or corrupt content all
    /// yield an empty list.
    pub fn load(&self) -> HistoryList {
        match self.try_load() {
            Ok(list) => {
                log::debug!("loaded {} history records from {}", list.len(), self.key);
                list
            }
            Err(err @ PersistenceError::Corrupt(_)) => {
                log::error!("discarding stored history: {err}");
                HistoryList::new()
            }
            Err(err) => {
                log::warn!("history unavailable, starting empty: {err}");
                HistoryList::new()
            }
        }
    }

    /// Overwrites the slot with the full list.
    pub fn save(&mut self, list: &HistoryList) -> Result<(), PersistenceError> {
        let raw = serde_json::to_string(list)?;
        self.backend.set(&self.key, &raw)
    }
}

/// Human-readable timestamp used by the history list, in local time.
pub fn display_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp
        .with_timezone(&chrono::Local)
        .format("%b %-d, %Y, %-I:%M:%S %p")
        .to_string()
}

/// ISO-8601 form written to storage.
pub fn iso_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}
