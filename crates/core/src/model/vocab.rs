use std::collections::HashSet;

use thiserror::Error;

use crate::model::ids::VocabId;

/// Consecutive correct answers that graduate (remove) an entry.
pub const MASTERY_THRESHOLD: u32 = 2;

/// Sample words offered to a learner whose deck could not be read.
pub const STARTER_WORDS: [(&str, &str); 3] = [
    ("meticulous", "showing great attention to detail"),
    ("alleviate", "make (suffering) less severe"),
    ("inevitable", "certain to happen; unavoidable"),
];

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum VocabError {
    #[error("entry {id} has an empty word")]
    EmptyWord { id: VocabId },

    #[error("entry {id} has an empty meaning")]
    EmptyMeaning { id: VocabId },

    #[error("entry {id} has streak {streak}, at or past the mastery threshold")]
    StreakOutOfRange { id: VocabId, streak: u32 },

    #[error("entry id {id} appears more than once")]
    DuplicateId { id: VocabId },
}

//
// ─── ENTRY ─────────────────────────────────────────────────────────────────────
//

/// One word/meaning pair with its current run of correct answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabEntry {
    id: VocabId,
    word: String,
    meaning: String,
    correct_streak: u32,
}

impl VocabEntry {
    /// Rebuild an entry from persisted fields.
    ///
    /// # Errors
    ///
    /// Returns `VocabError` if the word or meaning is blank, or if the streak
    /// has already reached the mastery threshold.
    pub fn from_persisted(
        id: VocabId,
        word: String,
        meaning: String,
        correct_streak: u32,
    ) -> Result<Self, VocabError> {
        if word.trim().is_empty() {
            return Err(VocabError::EmptyWord { id });
        }
        if meaning.trim().is_empty() {
            return Err(VocabError::EmptyMeaning { id });
        }
        if correct_streak >= MASTERY_THRESHOLD {
            return Err(VocabError::StreakOutOfRange {
                id,
                streak: correct_streak,
            });
        }
        Ok(Self {
            id,
            word,
            meaning,
            correct_streak,
        })
    }

    fn fresh(id: VocabId, word: String, meaning: String) -> Self {
        Self {
            id,
            word,
            meaning,
            correct_streak: 0,
        }
    }

    #[must_use]
    pub fn id(&self) -> &VocabId {
        &self.id
    }

    #[must_use]
    pub fn word(&self) -> &str {
        &self.word
    }

    #[must_use]
    pub fn meaning(&self) -> &str {
        &self.meaning
    }

    #[must_use]
    pub fn correct_streak(&self) -> u32 {
        self.correct_streak
    }
}

//
// ─── IMPORT PARSING ────────────────────────────────────────────────────────────
//

/// Parse one `word - meaning` line.
///
/// Splits on the first `-` only, so a hyphenated word spills into the meaning.
/// Returns `None` for lines without a dash or with either side blank.
#[must_use]
pub fn parse_import_line(line: &str) -> Option<(String, String)> {
    let (word, meaning) = line.split_once('-')?;
    let word = word.trim();
    let meaning = meaning.trim();
    if word.is_empty() || meaning.is_empty() {
        return None;
    }
    Some((word.to_owned(), meaning.to_owned()))
}

/// Parse a bulk import block, silently dropping blank and malformed lines.
#[must_use]
pub fn parse_import(text: &str) -> Vec<(String, String)> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(parse_import_line)
        .collect()
}

//
// ─── DECK ──────────────────────────────────────────────────────────────────────
//

/// Result of recording an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// No entry with that id.
    Missing,
    /// Correct answer, entry kept with its new streak.
    Progressed { streak: u32 },
    /// Wrong answer, streak back to zero.
    Reset,
    /// Mastery threshold reached; entry removed for good.
    Graduated,
}

impl AnswerOutcome {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        !matches!(self, Self::Missing)
    }
}

/// Ordered vocabulary deck. Order is display order; newest imports first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VocabDeck {
    entries: Vec<VocabEntry>,
}

impl VocabDeck {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Deck holding the [`STARTER_WORDS`] with fresh ids.
    #[must_use]
    pub fn starter() -> Self {
        let entries = STARTER_WORDS
            .iter()
            .map(|(word, meaning)| {
                VocabEntry::fresh(VocabId::generate(), (*word).to_owned(), (*meaning).to_owned())
            })
            .collect();
        Self { entries }
    }

    /// Rebuild a deck from persisted entries, keeping their order.
    ///
    /// # Errors
    ///
    /// Returns `VocabError::DuplicateId` if two entries share an id.
    pub fn from_persisted(entries: Vec<VocabEntry>) -> Result<Self, VocabError> {
        let mut seen = HashSet::with_capacity(entries.len());
        for entry in &entries {
            if !seen.insert(entry.id()) {
                return Err(VocabError::DuplicateId {
                    id: entry.id().clone(),
                });
            }
        }
        Ok(Self { entries })
    }

    #[must_use]
    pub fn entries(&self) -> &[VocabEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: &VocabId) -> Option<&VocabEntry> {
        self.entries.iter().find(|entry| entry.id() == id)
    }

    /// Import `word - meaning` lines with freshly generated ids.
    ///
    /// Returns the number of accepted lines.
    pub fn import_bulk(&mut self, text: &str) -> usize {
        self.import_bulk_with(text, VocabId::generate)
    }

    /// Same as [`import_bulk`](Self::import_bulk) with a caller-supplied id source.
    ///
    /// Accepted entries are prepended as one block in source order.
    pub fn import_bulk_with(
        &mut self,
        text: &str,
        mut next_id: impl FnMut() -> VocabId,
    ) -> usize {
        let added: Vec<VocabEntry> = parse_import(text)
            .into_iter()
            .map(|(word, meaning)| VocabEntry::fresh(next_id(), word, meaning))
            .collect();
        let count = added.len();
        if count > 0 {
            self.entries.splice(0..0, added);
        }
        count
    }

    /// Delete the entry with `id`. Returns whether anything was removed.
    pub fn remove_entry(&mut self, id: &VocabId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id() != id);
        self.entries.len() != before
    }

    /// Record a quiz answer, graduating the entry once it reaches
    /// [`MASTERY_THRESHOLD`] consecutive correct answers.
    pub fn record_answer(&mut self, id: &VocabId, correct: bool) -> AnswerOutcome {
        let Some(index) = self.entries.iter().position(|entry| entry.id() == id) else {
            return AnswerOutcome::Missing;
        };

        if !correct {
            self.entries[index].correct_streak = 0;
            return AnswerOutcome::Reset;
        }

        let streak = self.entries[index].correct_streak.saturating_add(1);
        if streak >= MASTERY_THRESHOLD {
            self.entries.remove(index);
            return AnswerOutcome::Graduated;
        }
        self.entries[index].correct_streak = streak;
        AnswerOutcome::Progressed { streak }
    }
}
