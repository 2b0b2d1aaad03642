//! Ciphertext loading and decrypted-text formatting (spec §3, §6).

use std::io::Read;
use std::path::Path;

use crate::alphabet::{letter_to_index, NUM_SYMBOLS};
use crate::error::{CoreError, Result};

/// A loaded cryptogram: its letters (lowercased, punctuation and
/// whitespace dropped) and the frequency of each cipher letter.
#[derive(Debug, Clone)]
pub struct Ciphertext {
    pub letters: Vec<u8>,
    pub freq: [u32; NUM_SYMBOLS],
}

impl Ciphertext {
    pub fn load(path: &Path) -> Result<Ciphertext> {
        let mut raw = String::new();
        std::fs::File::open(path)
            .and_then(|mut f| f.read_to_string(&mut raw))
            .map_err(|e| CoreError::Open {
                path: path.to_owned(),
                source: e,
            })?;

        let mut letters = Vec::with_capacity(raw.len());
        let mut freq = [0u32; NUM_SYMBOLS];

        for c in raw.chars() {
            if c.is_ascii_alphabetic() {
                let lower = c.to_ascii_lowercase() as u8;
                freq[letter_to_index(lower)] += 1;
                letters.push(lower);
            }
        }

        Ok(Ciphertext { letters, freq })
    }

    pub fn len(&self) -> usize {
        self.letters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }
}

/// Load a known-solution plaintext for scoring accuracy, warning (not
/// failing) if its length doesn't match the ciphertext it's paired with.
pub fn load_solution(path: &Path, expected_len: usize) -> Result<Vec<u8>> {
    let mut raw = String::new();
    std::fs::File::open(path)
        .and_then(|mut f| f.read_to_string(&mut raw))
        .map_err(|e| CoreError::Open {
            path: path.to_owned(),
            source: e,
        })?;

    let letters: Vec<u8> = raw
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_lowercase() as u8)
        .collect();

    if letters.len() != expected_len {
        tracing::warn!(
            solution_len = letters.len(),
            expected_len,
            "length of solution file does not match the ciphertext"
        );
    }

    Ok(letters)
}

/// Format ciphertext (uppercase) over its decryption (lowercase) in
/// 50-character lines, letters grouped in blocks of 5.
pub fn format_decryption(cipher: &[u8], plain: &[u8]) -> String {
    let mut out = String::new();
    let nlines = cipher.len() / 50 + 1;

    for line in 0..nlines {
        let start = line * 50;
        let end = ((line + 1) * 50).min(cipher.len());
        if start >= end {
            break;
        }

        for (j, &c) in cipher[start..end].iter().enumerate() {
            out.push(c.to_ascii_uppercase() as char);
            if (start + j) % 5 == 4 {
                out.push(' ');
            }
        }
        out.push('\n');

        for (j, &c) in plain[start..end].iter().enumerate() {
            out.push(c as char);
            if (start + j) % 5 == 4 {
                out.push(' ');
            }
        }
        out.push_str("\n\n");
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn load_strips_non_letters_and_lowercases() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cipher.txt");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"Abc, 123 Def!")
            .unwrap();

        let cipher = Ciphertext::load(&path).unwrap();
        assert_eq!(cipher.letters, b"abcdef");
        assert_eq!(cipher.freq[letter_to_index(b'a')], 1);
    }

    #[test]
    fn format_decryption_groups_in_fives() {
        let cipher = b"ABCDEFGHIJ".to_ascii_lowercase();
        let plain = b"abcdefghij".to_vec();
        let text = format_decryption(&cipher, &plain);
        assert!(text.contains(' '));
        assert!(text.to_uppercase().contains("ABCDE"));
    }
}
