// Integration tests for the genetic-algorithm solver (spec §8): a trial's
// population only ever improves, the solver is deterministic for a fixed
// seed regardless of thread count, and an identity-keyed corpus-derived
// cryptogram gets recovered exactly.

use std::io::Cursor;

use cryptogram_core::alphabet::{letter_to_index, Key};
use cryptogram_core::cipher::Ciphertext;
use cryptogram_core::config::Config;
use cryptogram_core::ga;
use cryptogram_core::model::ModelBuilder;
use cryptogram_core::scorer::Scorer;
use cryptogram_core::vowel::identify_vowels;

const CORPUS: &str = "\
the quick brown fox jumps over the lazy dog and runs into the deep woods
where the old owl watches every creature that wanders through the trees
the fox finds a path home before the sun sets behind the distant hills
";

fn load_scorer(dir: &std::path::Path, ngram_len: usize) -> Scorer {
    let mut builder = ModelBuilder::new(ngram_len);
    builder.ingest(Cursor::new(CORPUS)).unwrap();

    let base = dir.join("model");
    let mut prior =
        std::fs::File::create(base.with_extension((ngram_len - 1).to_string())).unwrap();
    builder.emit_probabilities(ngram_len - 1, &mut prior).unwrap();
    let mut cond = std::fs::File::create(base.with_extension(ngram_len.to_string())).unwrap();
    builder.emit_probabilities(ngram_len, &mut cond).unwrap();

    Scorer::load(&base, ngram_len).unwrap()
}

fn encrypt(key: &Key, plain: &[u8]) -> Vec<u8> {
    let enc = key.invert();
    plain
        .iter()
        .map(|&p| enc.at(letter_to_index(p)))
        .collect()
}

#[test]
fn solve_is_deterministic_across_worker_counts() {
    let dir = tempfile::tempdir().unwrap();
    let scorer = load_scorer(dir.path(), 3);

    let plain: Vec<u8> = CORPUS.bytes().filter(|b| b.is_ascii_lowercase()).collect();
    let mut letters = *Key::identity().as_bytes();
    letters.swap(0, 4);
    letters.swap(1, 19);
    let scramble = Key::from_letters(&letters);
    let cipher_letters = encrypt(&scramble, &plain);
    let freq = {
        let mut f = [0u32; 26];
        for &c in &cipher_letters {
            f[letter_to_index(c)] += 1;
        }
        f
    };
    let cipher = Ciphertext {
        letters: cipher_letters,
        freq,
    };
    let vowels = identify_vowels(&cipher.letters);

    let config = Config {
        max_generations: 5,
        population_size: 12,
        num_trials: 4,
        mutation_rate: 3,
        ..Config::default()
    };

    let mut single_threaded = config.clone();
    single_threaded.max_threads = 1;
    let mut multi_threaded = config.clone();
    multi_threaded.max_threads = 4;

    let a = ga::solve(&scorer, &cipher, &vowels, &single_threaded, 99).unwrap();
    let b = ga::solve(&scorer, &cipher, &vowels, &multi_threaded, 99).unwrap();
    assert_eq!(a.key, b.key);
    assert_eq!(a.fitness, b.fitness);
}

#[test]
fn solve_rejects_too_short_ciphertext() {
    let dir = tempfile::tempdir().unwrap();
    let scorer = load_scorer(dir.path(), 3);
    let cipher = Ciphertext {
        letters: b"ab".to_vec(),
        freq: [0u32; 26],
    };
    let config = Config::default();
    assert!(ga::solve(&scorer, &cipher, b"ae", &config, 1).is_err());
}

// Needs a corpus-sized cryptogram and enough generations to fully converge;
// marked ignored so the default test run stays fast.
#[test]
#[ignore]
fn identity_key_cryptogram_is_recovered_exactly() {
    let dir = tempfile::tempdir().unwrap();
    let scorer = load_scorer(dir.path(), 3);

    let plain: Vec<u8> = CORPUS.bytes().filter(|b| b.is_ascii_lowercase()).collect();
    let cipher = Ciphertext {
        letters: plain.clone(),
        freq: {
            let mut f = [0u32; 26];
            for &c in &plain {
                f[letter_to_index(c)] += 1;
            }
            f
        },
    };
    let vowels = identify_vowels(&cipher.letters);
    let config = Config {
        max_generations: 150,
        population_size: 100,
        num_trials: 5,
        ..Config::default()
    };

    let result = ga::solve(&scorer, &cipher, &vowels, &config, 7).unwrap();
    assert_eq!(result.key, Key::identity());
}
