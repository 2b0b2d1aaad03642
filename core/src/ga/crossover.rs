//! Greedy hill-climbing crossover.
//!
//! The child starts as a copy of parent A. For each cipher position where A
//! and B disagree, the letter B assigns there is pulled into the child by
//! swapping it in from wherever A's copy currently holds it, and the swap
//! is kept only if it strictly improves fitness over the child's fitness
//! before that swap — not over parent A's original fitness, since earlier
//! accepted swaps in this same pass already changed the baseline.

use crate::alphabet::{Key, NUM_SYMBOLS};
use crate::cipher::Ciphertext;
use crate::scorer::Scorer;

use super::population::evaluate;

/// Produce a child key from `parent_a` and `parent_b`, accepting only
/// gene transfers from `parent_b` that strictly improve on the running
/// fitness.
pub fn crossover(parent_a: &Key, parent_b: &Key, cipher: &Ciphertext, scorer: &Scorer) -> Key {
    let mut test = *parent_a;
    let mut test_fitness = evaluate(&test, cipher, scorer);

    for i in 0..NUM_SYMBOLS {
        if parent_a.at(i) == parent_b.at(i) {
            continue;
        }

        let wanted = parent_b.at(i);
        let j = (0..NUM_SYMBOLS)
            .find(|&j| parent_a.at(j) == wanted)
            .expect("parent_a is a bijection over the alphabet");

        test.swap(i, j);
        let candidate_fitness = evaluate(&test, cipher, scorer);
        if candidate_fitness > test_fitness {
            test_fitness = candidate_fitness;
        } else {
            test.swap(i, j);
        }
    }

    test
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_cipher() -> Ciphertext {
        Ciphertext {
            letters: b"ababcbabc".to_vec(),
            freq: {
                let mut f = [0u32; NUM_SYMBOLS];
                f[0] = 4;
                f[1] = 4;
                f[2] = 1;
                f
            },
        }
    }

    #[test]
    fn identical_parents_produce_identical_child() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("base.2"), "ab\t0.5\nbc\t0.25\n").unwrap();
        std::fs::write(dir.path().join("base.3"), "abc\t0.3\nbab\t0.2\n").unwrap();
        let scorer = Scorer::load(&dir.path().join("base"), 3).unwrap();

        let cipher = toy_cipher();
        let key = Key::identity();
        let child = crossover(&key, &key, &cipher, &scorer);
        assert_eq!(child, key);
    }
}
