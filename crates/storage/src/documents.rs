//! Typed JSON documents stored in a [`DocumentStore`].
//!
//! Layout (field names are part of the persisted format):
//!
//! ```text
//! attendance: { buddy, snacks, streak, lastCheck, history }
//! vocab:      [ { id, word, meaning, streak }, ... ]
//! ```
//!
//! A document that is missing, unparseable, or violates a domain invariant
//! loads as `None`; callers substitute their default.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use practice_core::model::{AttendanceState, Buddy, VocabDeck, VocabEntry, VocabId};

use crate::repository::{DocumentStore, Namespace, StorageError};

/// Why a stored document could not be decoded.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DecodeError {
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid document: {0}")]
    Domain(#[from] practice_core::Error),
}

//
// ─── RECORDS ───────────────────────────────────────────────────────────────────
//

/// Persisted shape of the attendance document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttendanceRecord {
    pub buddy: Option<Buddy>,
    pub snacks: u32,
    pub streak: u32,
    #[serde(rename = "lastCheck")]
    pub last_check: Option<NaiveDate>,
    pub history: Vec<NaiveDate>,
}

impl AttendanceRecord {
    #[must_use]
    pub fn from_state(state: &AttendanceState) -> Self {
        Self {
            buddy: state.buddy(),
            snacks: state.snacks(),
            streak: state.streak(),
            last_check: state.last_check_in(),
            history: state.history().to_vec(),
        }
    }

    /// Convert the record back into domain state.
    ///
    /// # Errors
    ///
    /// Returns `practice_core::Error` if the record breaks an attendance invariant.
    pub fn into_state(self) -> Result<AttendanceState, practice_core::Error> {
        Ok(AttendanceState::from_persisted(
            self.buddy,
            self.snacks,
            self.streak,
            self.last_check,
            self.history,
        )?)
    }
}

/// Persisted shape of one vocabulary entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabRecord {
    pub id: VocabId,
    pub word: String,
    pub meaning: String,
    pub streak: u32,
}

impl VocabRecord {
    #[must_use]
    pub fn from_entry(entry: &VocabEntry) -> Self {
        Self {
            id: entry.id().clone(),
            word: entry.word().to_owned(),
            meaning: entry.meaning().to_owned(),
            streak: entry.correct_streak(),
        }
    }

    /// Convert the record back into a domain entry.
    ///
    /// # Errors
    ///
    /// Returns `practice_core::Error` if the entry is blank or already mastered.
    pub fn into_entry(self) -> Result<VocabEntry, practice_core::Error> {
        Ok(VocabEntry::from_persisted(
            self.id,
            self.word,
            self.meaning,
            self.streak,
        )?)
    }
}

//
// ─── CODEC ─────────────────────────────────────────────────────────────────────
//

/// Decode an attendance document body.
///
/// # Errors
///
/// Returns `DecodeError` if the body is not valid JSON of the expected shape
/// or breaks an attendance invariant.
pub fn decode_attendance(body: &str) -> Result<AttendanceState, DecodeError> {
    let record: AttendanceRecord = serde_json::from_str(body)?;
    Ok(record.into_state()?)
}

/// Encode attendance state as a document body.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if encoding fails.
pub fn encode_attendance(state: &AttendanceState) -> Result<String, StorageError> {
    serde_json::to_string(&AttendanceRecord::from_state(state))
        .map_err(|err| StorageError::Serialization(err.to_string()))
}

/// Decode a vocabulary deck document body.
///
/// # Errors
///
/// Returns `DecodeError` if the body is not a JSON array of entries, or an
/// entry (or the id set) is invalid.
pub fn decode_deck(body: &str) -> Result<VocabDeck, DecodeError> {
    let records: Vec<VocabRecord> = serde_json::from_str(body)?;
    let entries = records
        .into_iter()
        .map(VocabRecord::into_entry)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(VocabDeck::from_persisted(entries).map_err(practice_core::Error::from)?)
}

/// Encode a deck as a document body, preserving display order.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if encoding fails.
pub fn encode_deck(deck: &VocabDeck) -> Result<String, StorageError> {
    let records: Vec<VocabRecord> = deck.entries().iter().map(VocabRecord::from_entry).collect();
    serde_json::to_string(&records).map_err(|err| StorageError::Serialization(err.to_string()))
}

//
// ─── STORE ACCESS ──────────────────────────────────────────────────────────────
//

async fn load_decoded<T>(
    store: &dyn DocumentStore,
    namespace: Namespace,
    decode: fn(&str) -> Result<T, DecodeError>,
) -> Result<Option<T>, StorageError> {
    let Some(body) = store.load_document(namespace).await? else {
        return Ok(None);
    };
    match decode(&body) {
        Ok(value) => Ok(Some(value)),
        Err(err) => {
            tracing::warn!(%namespace, error = %err, "discarding corrupt document");
            Ok(None)
        }
    }
}

/// Load attendance state; `None` when missing or corrupt.
///
/// # Errors
///
/// Returns `StorageError` only if the backend itself fails.
pub async fn load_attendance(
    store: &dyn DocumentStore,
) -> Result<Option<AttendanceState>, StorageError> {
    load_decoded(store, Namespace::Attendance, decode_attendance).await
}

/// Persist the full attendance state.
///
/// # Errors
///
/// Returns `StorageError` if encoding or the write fails.
pub async fn save_attendance(
    store: &dyn DocumentStore,
    state: &AttendanceState,
) -> Result<(), StorageError> {
    let body = encode_attendance(state)?;
    store.save_document(Namespace::Attendance, &body).await
}

/// Load the vocabulary deck; `None` when missing or corrupt.
///
/// # Errors
///
/// Returns `StorageError` only if the backend itself fails.
pub async fn load_deck(store: &dyn DocumentStore) -> Result<Option<VocabDeck>, StorageError> {
    load_decoded(store, Namespace::Vocab, decode_deck).await
}

/// Persist the full deck.
///
/// # Errors
///
/// Returns `StorageError` if encoding or the write fails.
pub async fn save_deck(store: &dyn DocumentStore, deck: &VocabDeck) -> Result<(), StorageError> {
    let body = encode_deck(deck)?;
    store.save_document(Namespace::Vocab, &body).await
}
