//! The card model: a named 5×5 grid of phrases.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The number of cells on a card.
pub const CARD_SIZE: usize = 25;

/// Errors reported when building or checking a card, before anything is
/// written to disk.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The card name is empty or contains characters we won't put in a
    /// file name or URL.
    #[error("invalid card name {name:?}")]
    InvalidName {
        /// The rejected name.
        name: String,
    },

    /// The submission did not contain exactly 25 phrases.
    #[error("expected 25 phrases, got {count}")]
    WrongPhraseCount {
        /// The number of phrases actually present.
        count: usize,
    },

    /// The phrase tags are not the integers 0–24, each exactly once.
    #[error("phrase ids are not 0-24 exactly once")]
    BadPhraseIds,
}

/// One cell's text, plus a tag recording where the cell sat when the card
/// was created. The tag survives shuffling; the position does not.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Phrase {
    /// Position index (0–24) assigned at creation time.
    pub id: u8,

    /// The cell text. May be empty, which displays as a blank cell.
    pub text: String,
}

/// A named, persisted collection of exactly 25 phrases plus a display
/// title.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Card {
    /// Unique identifier, used as the storage key and URL segment.
    pub name: String,

    /// Display label shown above the grid.
    pub title: String,

    /// The 25 phrases, in canonical (creation) order.
    pub phrases: Vec<Phrase>,
}

lazy_static! {
    static ref VALID_NAME: Regex =
        Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_-]*$").unwrap();
}

/// Is `name` safe to use as a storage key and URL segment?
pub fn name_is_valid(name: &str) -> bool {
    name.len() <= 64 && VALID_NAME.is_match(name)
}

impl Card {
    /// Build a card from a form submission: a name, a title, and the 25
    /// cell texts in submission order. Each phrase is tagged with its
    /// positional index. Empty strings are permitted and represent blank
    /// cells.
    pub fn from_submission(
        name: &str,
        title: &str,
        texts: Vec<String>,
    ) -> Result<Card, ValidationError> {
        if !name_is_valid(name) {
            return Err(ValidationError::InvalidName {
                name: name.to_owned(),
            });
        }
        if texts.len() != CARD_SIZE {
            return Err(ValidationError::WrongPhraseCount {
                count: texts.len(),
            });
        }
        let phrases = texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| Phrase { id: i as u8, text })
            .collect();
        Ok(Card {
            name: name.to_owned(),
            title: title.to_owned(),
            phrases,
        })
    }

    /// Check the structural invariants: a valid name, exactly 25 phrases,
    /// and phrase tags covering 0–24 exactly once. The store runs this
    /// before writing a record and again after reading one back.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !name_is_valid(&self.name) {
            return Err(ValidationError::InvalidName {
                name: self.name.clone(),
            });
        }
        if self.phrases.len() != CARD_SIZE {
            return Err(ValidationError::WrongPhraseCount {
                count: self.phrases.len(),
            });
        }
        let mut seen = [false; CARD_SIZE];
        for phrase in &self.phrases {
            let id = usize::from(phrase.id);
            if id >= CARD_SIZE || seen[id] {
                return Err(ValidationError::BadPhraseIds);
            }
            seen[id] = true;
        }
        Ok(())
    }
}
