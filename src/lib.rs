//! Generate, store, and serve randomized phrase-bingo cards.
//!
//! A *card* is a named collection of exactly 25 phrases plus a display
//! title. Cards are built from submitted form text ([`Card::from_submission`]),
//! persisted as one JSON record per card ([`CardStore`]), and re-shuffled
//! into a fresh random order every time they are played ([`shuffled`]). The
//! shuffle only ever touches an in-memory copy, so the stored canonical
//! order survives any number of plays.
//!
//! The [`server`] module is a thin HTTP wrapper around these pieces; all
//! card behavior lives in [`card`], [`store`], and [`shuffle`].

#![warn(missing_docs)]

pub mod card;
pub mod server;
pub mod shuffle;
pub mod store;

pub use card::{Card, Phrase, ValidationError, CARD_SIZE};
pub use shuffle::{shuffled, shuffled_with};
pub use store::{CardStore, StoreError};
