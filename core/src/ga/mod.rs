//! Genetic-algorithm key search (spec §4.5).
//!
//! A trial evolves a population of candidate decryption keys for
//! `max_generations` rounds of rank-biased crossover and low-probability
//! mutation, tracking the best key seen by any trial behind one mutex.
//! Several trials run concurrently, one per worker thread, each seeded
//! deterministically from `(base_seed, trial index)` so a run is
//! reproducible independent of how trials happen to interleave.

mod crossover;
mod population;
mod solver;

pub use crossover::crossover;
pub use population::{evaluate, Individual, Population};
pub use solver::{solve, SharedBest};

/// Cipher-position letters seeded by [`solver::init_key`], vowels first.
const GEN_VOWELS: &[u8] = b"aeiouyt";
/// Full seed alphabet: vowels followed by consonants, in assignment order.
const GEN_KEY: &[u8] = b"aeiouytbcdfghjklmnpqrsvwxz";
/// Upper bound (exclusive) on the randomized swap rounds `genInit` applies.
const MAX_INIT_SWAPS: u32 = 100;
