//! Candidate plaintext scorer (spec §4.3).
//!
//! Loads the n-gram and (n-1)-gram probability tables the model builder
//! emits and scores a candidate plaintext as the log-probability of its
//! (n-1)-gram prefix plus the sum, over every overlapping n-gram window, of
//! that window's conditional log-probability. An n-gram absent from the
//! table falls back to `score_zero`, the log of the probability mass left
//! over for everything the corpus never saw.

use std::io::BufRead;
use std::path::{Path, PathBuf};

use ahash::AHashMap;

use crate::alphabet::NUM_SYMBOLS;
use crate::error::{CoreError, Result};

pub struct Scorer {
    ngram_len: usize,
    prior: AHashMap<Box<str>, f64>,
    cond: AHashMap<Box<str>, f64>,
    score_zero: f64,
}

impl Scorer {
    /// Load `{base}.{n-1}` and `{base}.{n}` probability tables.
    pub fn load(base: &Path, ngram_len: usize) -> Result<Scorer> {
        let prior_path = suffixed(base, ngram_len - 1);
        let prior_raw = read_table(&prior_path, ngram_len - 1)?;

        let mut prior = AHashMap::with_capacity(prior_raw.len());
        for (ngram, value) in &prior_raw {
            prior.insert(ngram.clone().into_boxed_str(), value.ln());
        }

        let cond_path = suffixed(base, ngram_len);
        let cond_raw = read_table(&cond_path, ngram_len)?;

        let mut cond = AHashMap::with_capacity(cond_raw.len());
        let mut score_zero = 1.0f64;
        let mut count_zero = (NUM_SYMBOLS as f64).powi(ngram_len as i32);

        for (ngram, value) in &cond_raw {
            let prefix = &ngram[..ngram_len - 1];
            let prior_log = *prior.get(prefix).ok_or_else(|| CoreError::MalformedProbabilityLine {
                path: cond_path.clone(),
                line: 0,
                text: format!("no (n-1)-gram prior found for prefix '{prefix}'"),
            })?;
            cond.insert(ngram.clone().into_boxed_str(), value.ln() - prior_log);

            score_zero -= value;
            count_zero -= 1.0;
        }

        let score_zero = (score_zero / count_zero).ln();

        Ok(Scorer {
            ngram_len,
            prior,
            cond,
            score_zero,
        })
    }

    pub fn ngram_len(&self) -> usize {
        self.ngram_len
    }

    pub fn score_zero(&self) -> f64 {
        self.score_zero
    }

    /// Log-probability of `text` under the loaded model: the (n-1)-gram
    /// prefix's prior, plus one conditional (or `score_zero`) term per
    /// overlapping n-gram window.
    pub fn score(&self, text: &[u8]) -> Result<f64> {
        let n = self.ngram_len;
        if text.len() <= n {
            return Err(CoreError::TextTooShort { len: text.len(), n });
        }

        let mut total = 0.0;

        if let Ok(prefix) = std::str::from_utf8(&text[..n - 1]) {
            if let Some(&v) = self.prior.get(prefix) {
                total += v;
            }
        }

        for start in 0..=text.len() - n {
            let window = &text[start..start + n];
            let hit = std::str::from_utf8(window)
                .ok()
                .and_then(|s| self.cond.get(s));
            total += hit.copied().unwrap_or(self.score_zero);
        }

        Ok(total)
    }
}

fn suffixed(base: &Path, n: usize) -> PathBuf {
    let mut s = base.as_os_str().to_owned();
    s.push(format!(".{n}"));
    PathBuf::from(s)
}

/// Parse a `letters<TAB>probability` table into `(ngram, probability)` pairs.
fn read_table(path: &Path, ngram_len: usize) -> Result<Vec<(String, f64)>> {
    let file = std::fs::File::open(path).map_err(|e| CoreError::Open {
        path: path.to_owned(),
        source: e,
    })?;
    let reader = std::io::BufReader::new(file);

    let mut out = Vec::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| CoreError::Read {
            path: path.to_owned(),
            source: e,
        })?;
        if line.is_empty() {
            continue;
        }

        let mut parts = line.splitn(2, '\t');
        let ngram = parts.next().unwrap_or("");
        let value_str = parts.next().unwrap_or("");

        let malformed = || CoreError::MalformedProbabilityLine {
            path: path.to_owned(),
            line: lineno + 1,
            text: line.clone(),
        };

        if ngram.len() != ngram_len || !ngram.bytes().all(|b| b.is_ascii_lowercase()) {
            return Err(malformed());
        }
        let value: f64 = value_str.trim().parse().map_err(|_| malformed())?;

        out.push((ngram.to_owned(), value));
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_table(dir: &Path, name: &str, rows: &[(&str, f64)]) -> PathBuf {
        let path = dir.join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        for (ngram, p) in rows {
            writeln!(f, "{}\t{:e}", ngram, p).unwrap();
        }
        path
    }

    #[test]
    fn load_and_score_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        write_table(dir.path(), "base.2", &[("th", 0.02), ("he", 0.01)]);
        write_table(
            dir.path(),
            "base.3",
            &[("the", 0.015), ("her", 0.001)],
        );

        let scorer = Scorer::load(&dir.path().join("base"), 3).unwrap();
        let score = scorer.score(b"there").unwrap();
        assert!(score.is_finite());
    }

    #[test]
    fn unseen_ngram_falls_back_to_score_zero() {
        let dir = tempfile::tempdir().unwrap();
        write_table(dir.path(), "base.2", &[("th", 0.5)]);
        write_table(dir.path(), "base.3", &[("the", 0.3)]);

        let scorer = Scorer::load(&dir.path().join("base"), 3).unwrap();
        let score_seen = scorer.score(b"thexxx").unwrap();
        assert!(score_seen.is_finite());
        assert!(scorer.score_zero().is_finite());
    }

    #[test]
    fn text_shorter_than_ngram_length_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write_table(dir.path(), "base.2", &[("th", 0.5)]);
        write_table(dir.path(), "base.3", &[("the", 0.3)]);

        let scorer = Scorer::load(&dir.path().join("base"), 3).unwrap();
        assert!(scorer.score(b"th").is_err());
    }
}
