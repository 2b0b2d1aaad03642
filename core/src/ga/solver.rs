//! Per-trial evolution loop and the multi-threaded trial pool.

use std::collections::VecDeque;
use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::alphabet::{letter_to_index, Key, NUM_SYMBOLS};
use crate::cipher::Ciphertext;
use crate::config::Config;
use crate::error::{CoreError, Result};
use crate::scorer::Scorer;

use super::crossover::crossover;
use super::population::{evaluate, Individual, Population};
use super::{GEN_KEY, GEN_VOWELS, MAX_INIT_SWAPS};

/// The best key found by any trial so far, and how much work remains.
/// One mutex guards the whole record: trials update it only when they
/// beat the recorded fitness with a genuinely different key.
#[derive(Debug, Clone)]
pub struct SharedBest {
    pub key: Key,
    pub fitness: f64,
    pub trial: usize,
    pub generation: u32,
    pub trials_remaining: usize,
}

impl SharedBest {
    fn new(num_trials: usize) -> Self {
        SharedBest {
            key: Key::identity(),
            fitness: f64::NEG_INFINITY,
            trial: 0,
            generation: 0,
            trials_remaining: num_trials,
        }
    }
}

/// Run `config.num_trials` independent GA trials over `config.max_threads`
/// worker threads and return the best key any trial found.
pub fn solve(
    scorer: &Scorer,
    cipher: &Ciphertext,
    vowels: &[u8],
    config: &Config,
    base_seed: u64,
) -> Result<SharedBest> {
    if cipher.len() <= scorer.ngram_len() {
        return Err(CoreError::TextTooShort {
            len: cipher.len(),
            n: scorer.ngram_len(),
        });
    }

    let shared = Mutex::new(SharedBest::new(config.num_trials));
    let queue = Mutex::new((1..=config.num_trials).collect::<VecDeque<usize>>());

    std::thread::scope(|scope| {
        for _ in 0..config.max_threads.max(1) {
            scope.spawn(|| worker_loop(&queue, &shared, scorer, cipher, vowels, config, base_seed));
        }
    });

    Ok(shared.into_inner().expect("shared-best mutex poisoned"))
}

fn worker_loop(
    queue: &Mutex<VecDeque<usize>>,
    shared: &Mutex<SharedBest>,
    scorer: &Scorer,
    cipher: &Ciphertext,
    vowels: &[u8],
    config: &Config,
    base_seed: u64,
) {
    loop {
        let trial = {
            let mut q = queue.lock().expect("trial queue mutex poisoned");
            match q.pop_front() {
                Some(t) => t,
                None => return,
            }
        };
        run_trial(trial, shared, scorer, cipher, vowels, config, base_seed);
    }
}

/// Deterministic per-trial seed: reproducible independent of thread
/// scheduling, since it depends only on the trial index and a caller-given
/// base seed, never on arrival order at the shared queue.
fn trial_seed(base_seed: u64, trial: usize) -> u64 {
    base_seed.wrapping_add((trial as u64).wrapping_mul(0x9E3779B97F4A7C15))
}

fn run_trial(
    trial: usize,
    shared: &Mutex<SharedBest>,
    scorer: &Scorer,
    cipher: &Ciphertext,
    vowels: &[u8],
    config: &Config,
    base_seed: u64,
) {
    let mut rng = StdRng::seed_from_u64(trial_seed(base_seed, trial));

    let mut pop = init_population(config.population_size, vowels, cipher, scorer, &mut rng);
    pop.sort_descending();

    for generation in 1..=config.max_generations {
        mate(&mut pop, cipher, scorer, &mut rng);
        pop.sort_descending();
        record_if_better(shared, pop.best(), trial, generation);

        mutate(&mut pop, cipher, scorer, config.mutation_rate, &mut rng);
        pop.sort_descending();
    }
    record_if_better(shared, pop.best(), trial, config.max_generations);

    shared
        .lock()
        .expect("shared-best mutex poisoned")
        .trials_remaining -= 1;
}

fn record_if_better(shared: &Mutex<SharedBest>, candidate: &Individual, trial: usize, generation: u32) {
    let mut best = shared.lock().expect("shared-best mutex poisoned");
    if candidate.fitness > best.fitness && candidate.key != best.key {
        best.key = candidate.key;
        best.fitness = candidate.fitness;
        best.trial = trial;
        best.generation = generation;
    }
}

fn init_population(
    size: usize,
    vowels: &[u8],
    cipher: &Ciphertext,
    scorer: &Scorer,
    rng: &mut impl Rng,
) -> Population {
    let individuals = (0..size)
        .map(|_| {
            let key = init_key(vowels, rng);
            let fitness = evaluate(&key, cipher, scorer);
            Individual { key, fitness }
        })
        .collect();
    Population(individuals)
}

/// Seed a key with the vowel seeder's output in the fixed vowel positions
/// and the remaining consonants in a fixed order, then randomize it with
/// up to `MAX_INIT_SWAPS` rounds of one consonant swap and one vowel swap.
fn init_key(vowels: &[u8], rng: &mut impl Rng) -> Key {
    let mut letters = [0u8; NUM_SYMBOLS];
    let vowel_positions: Vec<usize> = vowels.iter().map(|&c| letter_to_index(c)).collect();

    for (slot, &pos) in vowel_positions.iter().enumerate() {
        letters[pos] = GEN_VOWELS[slot];
    }

    let mut next = vowel_positions.len();
    for (pos, slot) in letters.iter_mut().enumerate() {
        if vowel_positions.contains(&pos) {
            continue;
        }
        *slot = GEN_KEY[next];
        next += 1;
    }

    let mut key = Key::from_letters(&letters);
    let is_vowel_pos = |i: usize| vowel_positions.contains(&i);

    let num_swaps = rng.gen_range(0..MAX_INIT_SWAPS);
    for _ in 0..num_swaps {
        let x = loop {
            let x = rng.gen_range(0..NUM_SYMBOLS);
            if !is_vowel_pos(x) {
                break x;
            }
        };
        let y = loop {
            let y = rng.gen_range(0..NUM_SYMBOLS);
            if !is_vowel_pos(y) && y != x {
                break y;
            }
        };
        key.swap(x, y);

        if vowel_positions.len() > 1 {
            let vx = rng.gen_range(0..vowel_positions.len());
            let vy = loop {
                let vy = rng.gen_range(0..vowel_positions.len());
                if vy != vx {
                    break vy;
                }
            };
            key.swap(vowel_positions[vx], vowel_positions[vy]);
        }
    }

    key
}

/// Replace the population with children built by rank-biased mate
/// selection and greedy crossover.
fn mate(pop: &mut Population, cipher: &Ciphertext, scorer: &Scorer, rng: &mut impl Rng) {
    let size = pop.len();
    let children: Vec<Individual> = (0..size)
        .map(|x| {
            let y = loop {
                let y = select_mate(size, rng);
                if y != x {
                    break y;
                }
            };
            let key = crossover(&pop.0[x].key, &pop.0[y].key, cipher, scorer);
            let fitness = evaluate(&key, cipher, scorer);
            Individual { key, fitness }
        })
        .collect();
    pop.0 = children;
}

/// Rank-biased mate index: rank 0 (fittest) is `size` times as likely to
/// be picked as the least fit individual.
fn select_mate(size: usize, rng: &mut impl Rng) -> usize {
    let k = rng.gen_range(0..size * (size + 1) / 2);
    let mut cumulative = 0usize;
    for i in 0..size {
        cumulative += size - i;
        if k < cumulative {
            return i;
        }
    }
    unreachable!("k is bounded by the same sum cumulative converges to")
}

/// With probability `mutation_rate` percent, swap two distinct cipher
/// positions that both occur in the ciphertext, and rescore.
fn mutate(
    pop: &mut Population,
    cipher: &Ciphertext,
    scorer: &Scorer,
    mutation_rate: u32,
    rng: &mut impl Rng,
) {
    for individual in pop.0.iter_mut() {
        if rng.gen_range(0..100) >= mutation_rate {
            continue;
        }
        let x = loop {
            let x = rng.gen_range(0..NUM_SYMBOLS);
            if cipher.freq[x] != 0 {
                break x;
            }
        };
        let y = loop {
            let y = rng.gen_range(0..NUM_SYMBOLS);
            if y != x && cipher.freq[y] != 0 {
                break y;
            }
        };
        individual.key.swap(x, y);
        individual.fitness = evaluate(&individual.key, cipher, scorer);
    }
}
