//! Error kinds for `cryptogram-core`, per spec §7 (Error Handling Design).
//!
//! IO failures, malformed probability lines and out-of-range arguments are
//! fatal at the tool boundary. A non-bijective key or a conflicting trie
//! child is an internal invariant violation — it should never happen in
//! correct operation, and is surfaced the same way rather than panicking so
//! a caller can decide how to report it.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("cannot open '{path}' for reading: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error reading '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error writing '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed probability line in '{path}' at line {line}: {text:?}")]
    MalformedProbabilityLine {
        path: PathBuf,
        line: usize,
        text: String,
    },

    #[error("{name} out of range: {value} (expected {expected})")]
    ArgOutOfRange {
        name: &'static str,
        value: i64,
        expected: &'static str,
    },

    #[error("key is not a permutation of a..z")]
    NotBijection,

    #[error("trie node already has a child at slot {slot}")]
    TrieChildConflict { slot: usize },

    #[error("ciphertext length {len} is not greater than n-gram length {n}")]
    TextTooShort { len: usize, n: usize },
}

pub type Result<T> = std::result::Result<T, CoreError>;
