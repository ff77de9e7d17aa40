//! Freshly randomized play views of a card.
//!
//! Shuffling is view-only: it clones the card and permutes the clone, so
//! the canonical order held by the store is never disturbed and repeated
//! loads stay reproducible.

use rand::{seq::SliceRandom, Rng};

use crate::card::Card;

/// Return a copy of `card` with its phrases in a fresh random order.
///
/// `name`, `title`, and each phrase's tag and text are preserved; only
/// positions change. The permutation is uniform: `rand`'s Fisher–Yates
/// draws each swap index from `[0, i]` inclusive, so all 25! orderings are
/// equally likely.
pub fn shuffled(card: &Card) -> Card {
    shuffled_with(card, &mut rand::rng())
}

/// Like [`shuffled`], but with a caller-supplied RNG, so tests can pin the
/// permutation sequence with a seeded generator.
pub fn shuffled_with<R: Rng>(card: &Card, rng: &mut R) -> Card {
    let mut played = card.clone();
    played.phrases.shuffle(rng);
    played
}
