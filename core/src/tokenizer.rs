//! Corpus tokenizer (spec §6): splits whitespace-delimited words out of a
//! text corpus, strips punctuation, and discards anything that isn't purely
//! alphabetic once cleaned.
//!
//! Cleaned tokens are concatenated into one continuous lowercase letter
//! stream with no separators — that stream is what the model builder slides
//! its n-gram window over. `LetterBlocks` exposes that stream a fixed-size
//! block at a time and carries the trailing `n-1` letters of each block into
//! the next, so a window that straddles a block boundary is never dropped.

use std::io::BufRead;

/// Punctuation removed when embedded inside a token. Edge stripping uses
/// the broader `is_ascii_punctuation` set instead — `hello!`, `"quote"`
/// and `(paren)` must still lose their edges even though `!`, `"` and
/// `()` aren't in this narrower set.
const PUNCT: &[u8] = b",.:;-+/\\'&@_";

fn is_punct(b: u8) -> bool {
    PUNCT.contains(&b)
}

/// Clean one whitespace-delimited token, following the same strip order as
/// the reference tokenizer: opening punctuation, closing punctuation, then
/// embedded punctuation, each repeated until no further stripping applies.
/// Returns `None` if the cleaned token is empty or still contains a
/// non-letter byte.
pub fn clean_token(raw: &str) -> Option<Vec<u8>> {
    let mut buf: Vec<u8> = raw.as_bytes().to_ascii_lowercase();

    loop {
        if buf.is_empty() {
            return None;
        }
        if buf[0].is_ascii_punctuation() {
            buf.remove(0);
            continue;
        }
        if buf.last().unwrap().is_ascii_punctuation() {
            buf.pop();
            continue;
        }
        if let Some(pos) = buf.iter().position(|&b| is_punct(b)) {
            buf.remove(pos);
            continue;
        }
        break;
    }

    if buf.is_empty() || !buf.iter().all(|&b| b.is_ascii_lowercase()) {
        return None;
    }

    Some(buf)
}

/// Iterator over cleaned tokens read from a line-buffered corpus source.
pub struct Tokens<R> {
    reader: R,
    line: String,
    words: std::vec::IntoIter<String>,
}

impl<R: BufRead> Tokens<R> {
    pub fn new(reader: R) -> Self {
        Tokens {
            reader,
            line: String::new(),
            words: Vec::new().into_iter(),
        }
    }
}

impl<R: BufRead> Iterator for Tokens<R> {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Vec<u8>> {
        loop {
            if let Some(word) = self.words.next() {
                if let Some(tok) = clean_token(&word) {
                    return Some(tok);
                }
                continue;
            }

            self.line.clear();
            match self.reader.read_line(&mut self.line) {
                Ok(0) => return None,
                Ok(_) => {
                    let words: Vec<String> =
                        self.line.split_whitespace().map(str::to_owned).collect();
                    self.words = words.into_iter();
                }
                Err(_) => return None,
            }
        }
    }
}

/// Flattens a token stream into fixed-size letter blocks, carrying the
/// trailing `ngram_len - 1` letters of one block into the next so a sliding
/// n-gram window never loses a position at a block boundary.
pub struct LetterBlocks<R> {
    tokens: Tokens<R>,
    carryover: Vec<u8>,
    ngram_len: usize,
}

impl<R: BufRead> LetterBlocks<R> {
    pub fn new(reader: R, ngram_len: usize) -> Self {
        LetterBlocks {
            tokens: Tokens::new(reader),
            carryover: Vec::new(),
            ngram_len,
        }
    }

    /// Fill `buf` with the next block of letters, prefixed by the
    /// carryover from the previous block. Returns the number of bytes
    /// written, or 0 at end of input.
    pub fn next_block(&mut self, buf: &mut Vec<u8>) -> usize {
        buf.clear();
        buf.extend_from_slice(&self.carryover);
        self.carryover.clear();

        for tok in self.tokens.by_ref() {
            buf.extend_from_slice(&tok);
            if buf.len() >= self.ngram_len {
                break;
            }
        }

        if buf.len() >= self.ngram_len {
            let tail_start = buf.len() - (self.ngram_len - 1);
            self.carryover.extend_from_slice(&buf[tail_start..]);
        }

        buf.len()
    }
}
