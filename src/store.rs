//! Durable, name-keyed persistence for cards.
//!
//! Each card is stored as one self-describing JSON record at
//! `<dir>/<name>.json`. Writes go through a temporary file in the same
//! directory followed by an atomic rename, so a concurrent reader never
//! observes a half-written record. The card name is the storage key:
//! loading is a pure function of the URL path segment.

use std::{
    ffi::OsStr,
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use log::debug;
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::card::{name_is_valid, Card, ValidationError};

/// Errors returned by the card store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record exists for the requested name. Recoverable: callers
    /// typically redirect to the creation flow.
    #[error("no card named {name:?}")]
    NotFound {
        /// The requested card name.
        name: String,
    },

    /// A record exists but cannot be read back as a valid 25-phrase card.
    #[error("stored card {name:?} is corrupt")]
    Corrupt {
        /// The card whose record is damaged.
        name: String,

        /// The underlying error.
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// The underlying medium failed while writing. The save did not
    /// happen; the prior record, if any, remains authoritative.
    #[error("could not write card {name:?}")]
    WriteFailed {
        /// The card we were trying to save.
        name: String,

        /// The underlying error.
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// The submitted card failed validation. Nothing was written.
    #[error("card failed validation")]
    Invalid {
        /// What was wrong with the card.
        #[from]
        source: ValidationError,
    },

    /// The card directory itself could not be created or read.
    #[error("could not access card directory {dir:?}")]
    Dir {
        /// The directory we were trying to use.
        dir: PathBuf,

        /// The underlying error.
        source: io::Error,
    },
}

/// A directory full of card records, addressed by card name.
#[derive(Debug)]
pub struct CardStore {
    dir: PathBuf,
}

impl CardStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: &Path) -> Result<CardStore, StoreError> {
        fs::create_dir_all(dir).map_err(|source| StoreError::Dir {
            dir: dir.to_owned(),
            source,
        })?;
        Ok(CardStore {
            dir: dir.to_owned(),
        })
    }

    /// The record path for `name`. Injective for all valid names.
    fn record_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", name))
    }

    /// Persist `card`, replacing any existing record with the same name.
    /// The card is validated first, so nothing invalid ever reaches disk.
    pub fn save(&self, card: &Card) -> Result<(), StoreError> {
        card.validate()?;

        let write_failed = |source: Box<dyn std::error::Error + Send + Sync>| {
            StoreError::WriteFailed {
                name: card.name.clone(),
                source,
            }
        };
        let json = serde_json::to_vec_pretty(card)
            .map_err(|err| write_failed(Box::new(err)))?;
        let mut tmp = NamedTempFile::new_in(&self.dir)
            .map_err(|err| write_failed(Box::new(err)))?;
        tmp.write_all(&json)
            .map_err(|err| write_failed(Box::new(err)))?;
        tmp.as_file()
            .sync_all()
            .map_err(|err| write_failed(Box::new(err)))?;
        tmp.persist(self.record_path(&card.name))
            .map_err(|err| write_failed(Box::new(err)))?;

        debug!("saved card {:?}", card.name);
        Ok(())
    }

    /// Load the card stored under `name`, exactly as last saved, including
    /// phrase order and tags.
    pub fn load(&self, name: &str) -> Result<Card, StoreError> {
        // An invalid name can never have been saved, so it's simply absent.
        if !name_is_valid(name) {
            return Err(StoreError::NotFound {
                name: name.to_owned(),
            });
        }

        let corrupt = |source: Box<dyn std::error::Error + Send + Sync>| {
            StoreError::Corrupt {
                name: name.to_owned(),
                source,
            }
        };
        let data = match fs::read(self.record_path(name)) {
            Ok(data) => data,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound {
                    name: name.to_owned(),
                });
            }
            Err(err) => return Err(corrupt(Box::new(err))),
        };

        let card: Card =
            serde_json::from_slice(&data).map_err(|err| corrupt(Box::new(err)))?;
        card.validate().map_err(|err| corrupt(Box::new(err)))?;
        if card.name != name {
            return Err(corrupt(
                format!(
                    "record name {:?} does not match storage key {:?}",
                    card.name, name
                )
                .into(),
            ));
        }

        debug!("loaded card {:?}", name);
        Ok(card)
    }

    /// The names of all stored cards, sorted. Consumers must not rely on
    /// any particular order, but sorted keeps the index page stable.
    pub fn list_names(&self) -> Result<Vec<String>, StoreError> {
        let read_failed = |source: io::Error| StoreError::Dir {
            dir: self.dir.clone(),
            source,
        };
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir).map_err(read_failed)? {
            let path = entry.map_err(read_failed)?.path();
            if path.extension() != Some(OsStr::new("json")) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(OsStr::to_str) {
                if name_is_valid(stem) {
                    names.push(stem.to_owned());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::CARD_SIZE;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn demo_card(name: &str) -> Card {
        let texts = (0..CARD_SIZE).map(|i| format!("p{}", i)).collect();
        Card::from_submission(name, "Demo Title", texts).unwrap()
    }

    #[test]
    fn save_then_load_round_trips() {
        init_logging();
        let tmp_dir = tempfile::tempdir().unwrap();
        let store = CardStore::open(tmp_dir.path()).unwrap();

        let card = demo_card("demo");
        store.save(&card).unwrap();
        let loaded = store.load("demo").unwrap();
        assert_eq!(loaded, card);
    }

    #[test]
    fn load_missing_card_is_not_found() {
        init_logging();
        let tmp_dir = tempfile::tempdir().unwrap();
        let store = CardStore::open(tmp_dir.path()).unwrap();

        match store.load("nonexistent") {
            Err(StoreError::NotFound { name }) => assert_eq!(name, "nonexistent"),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn save_overwrites_previous_record() {
        init_logging();
        let tmp_dir = tempfile::tempdir().unwrap();
        let store = CardStore::open(tmp_dir.path()).unwrap();

        store.save(&demo_card("demo")).unwrap();
        let mut replacement = demo_card("demo");
        replacement.title = "Replacement".to_owned();
        store.save(&replacement).unwrap();

        assert_eq!(store.load("demo").unwrap().title, "Replacement");
    }

    #[test]
    fn truncated_record_is_corrupt() {
        init_logging();
        let tmp_dir = tempfile::tempdir().unwrap();
        let store = CardStore::open(tmp_dir.path()).unwrap();

        store.save(&demo_card("demo")).unwrap();
        let path = tmp_dir.path().join("demo.json");
        let data = fs::read(&path).unwrap();
        fs::write(&path, &data[..data.len() / 2]).unwrap();

        assert!(matches!(
            store.load("demo"),
            Err(StoreError::Corrupt { .. })
        ));
    }

    #[test]
    fn wrong_phrase_count_is_corrupt() {
        init_logging();
        let tmp_dir = tempfile::tempdir().unwrap();
        let store = CardStore::open(tmp_dir.path()).unwrap();

        store.save(&demo_card("demo")).unwrap();
        let path = tmp_dir.path().join("demo.json");
        let mut value: serde_json::Value =
            serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        value["phrases"].as_array_mut().unwrap().pop();
        fs::write(&path, serde_json::to_vec(&value).unwrap()).unwrap();

        assert!(matches!(
            store.load("demo"),
            Err(StoreError::Corrupt { .. })
        ));
    }

    #[test]
    fn renamed_record_is_corrupt() {
        init_logging();
        let tmp_dir = tempfile::tempdir().unwrap();
        let store = CardStore::open(tmp_dir.path()).unwrap();

        store.save(&demo_card("demo")).unwrap();
        fs::copy(
            tmp_dir.path().join("demo.json"),
            tmp_dir.path().join("alias.json"),
        )
        .unwrap();

        assert!(matches!(
            store.load("alias"),
            Err(StoreError::Corrupt { .. })
        ));
    }

    #[test]
    fn invalid_card_is_rejected_before_any_write() {
        init_logging();
        let tmp_dir = tempfile::tempdir().unwrap();
        let store = CardStore::open(tmp_dir.path()).unwrap();

        let mut card = demo_card("demo");
        card.phrases.pop();
        assert!(matches!(
            store.save(&card),
            Err(StoreError::Invalid { .. })
        ));
        assert!(!tmp_dir.path().join("demo.json").exists());
    }

    #[test]
    fn list_names_is_sorted_and_skips_foreign_files() {
        init_logging();
        let tmp_dir = tempfile::tempdir().unwrap();
        let store = CardStore::open(tmp_dir.path()).unwrap();

        store.save(&demo_card("zebra")).unwrap();
        store.save(&demo_card("apple")).unwrap();
        fs::write(tmp_dir.path().join("notes.txt"), b"not a card").unwrap();

        assert_eq!(store.list_names().unwrap(), vec!["apple", "zebra"]);
    }
}
