//! Parallel genetic-algorithm solver for monoalphabetic substitution
//! cryptograms.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rand::RngCore;
use serde::Serialize;

use cryptogram_core::alphabet::Key;
use cryptogram_core::cipher::{self, Ciphertext};
use cryptogram_core::config::Config;
use cryptogram_core::ga;
use cryptogram_core::scorer::Scorer;
use cryptogram_core::vowel::identify_vowels;

/// Break a monoalphabetic substitution cryptogram with a genetic-algorithm
/// key search scored against a character n-gram language model.
#[derive(Parser)]
#[command(name = "cryptogram-solve", version)]
struct Args {
    /// Cryptogram to solve.
    cipher: PathBuf,

    /// Known plaintext to score the result against, if available.
    solution: Option<PathBuf>,

    /// Maximum generations per trial.
    #[arg(short = 'g', long = "max-generations")]
    max_generations: Option<u32>,

    /// Mutation rate, percent (0..=100).
    #[arg(short = 'm', long = "mutation-rate")]
    mutation_rate: Option<u32>,

    /// N-gram length (1..=8), must match the loaded model.
    #[arg(short = 'n', long = "ngram-len")]
    ngram_len: Option<usize>,

    /// Worker threads (>=1).
    #[arg(short = 'p', long = "max-threads")]
    max_threads: Option<usize>,

    /// Individuals per GA population.
    #[arg(short = 's', long = "population-size")]
    population_size: Option<usize>,

    /// Independent GA trials (>=1).
    #[arg(short = 't', long = "num-trials")]
    num_trials: Option<usize>,

    /// Base path of the probability tables to load (`<path>.<n-1>`,
    /// `<path>.<n>`).
    #[arg(short = 'b', long = "model-base", default_value = "ngramscores")]
    model_base: PathBuf,

    /// Load tunables from a TOML file before applying the flags above.
    #[arg(long = "config")]
    config: Option<PathBuf>,

    /// RNG seed, for a reproducible run. Random if omitted.
    #[arg(long = "seed")]
    seed: Option<u64>,

    /// Additionally print the result as one line of JSON.
    #[arg(long = "json")]
    json: bool,
}

#[derive(Serialize)]
struct SolveResult {
    key: String,
    fitness: f64,
    trial: usize,
    generation: u32,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        tracing::error!("{e:#}");
        std::process::exit(1);
    }
    Ok(())
}

fn run(args: Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => Config::load_toml(path).map_err(|e| anyhow::anyhow!("{e}"))?,
        None => Config::default(),
    };
    if let Some(v) = args.max_generations {
        config.max_generations = v;
    }
    if let Some(v) = args.mutation_rate {
        config.mutation_rate = v;
    }
    if let Some(v) = args.ngram_len {
        config.ngram_len = v;
    }
    if let Some(v) = args.max_threads {
        config.max_threads = v;
    }
    if let Some(v) = args.population_size {
        config.population_size = v;
    }
    if let Some(v) = args.num_trials {
        config.num_trials = v;
    }
    validate(&config)?;

    let cipher = Ciphertext::load(&args.cipher)
        .with_context(|| format!("loading cryptogram '{}'", args.cipher.display()))?;
    let solution = args
        .solution
        .as_ref()
        .map(|path| cipher::load_solution(path, cipher.len()))
        .transpose()
        .with_context(|| "loading known-solution file")?;

    let scorer = Scorer::load(&args.model_base, config.ngram_len)
        .with_context(|| format!("loading probability tables at '{}'", args.model_base.display()))?;
    let vowels = identify_vowels(&cipher.letters);

    let seed = args.seed.unwrap_or_else(|| rand::thread_rng().next_u64());
    let result = ga::solve(&scorer, &cipher, &vowels, &config, seed)?;

    let plain = result.key.decrypt(&cipher.letters);
    println!("{}", cipher::format_decryption(&cipher.letters, &plain));
    println!(
        "best fitness {:.4} (trial {}, generation {})",
        result.fitness, result.trial, result.generation
    );

    if let Some(solution) = &solution {
        report_accuracy(&result.key, &cipher, solution);
    }

    if args.json {
        let out = SolveResult {
            key: result.key.to_string_lossy(),
            fitness: result.fitness,
            trial: result.trial,
            generation: result.generation,
        };
        println!("{}", serde_json::to_string(&out)?);
    }

    Ok(())
}

fn validate(config: &Config) -> Result<()> {
    if !(1..=8).contains(&config.ngram_len) {
        anyhow::bail!("n-gram length {} out of range (expected 1..=8)", config.ngram_len);
    }
    if config.mutation_rate > 100 {
        anyhow::bail!("mutation rate {} out of range (expected 0..=100)", config.mutation_rate);
    }
    if config.max_threads < 1 {
        anyhow::bail!("max threads must be at least 1");
    }
    if config.num_trials < 1 {
        anyhow::bail!("num trials must be at least 1");
    }
    Ok(())
}

fn report_accuracy(key: &Key, cipher: &Ciphertext, solution: &[u8]) {
    let plain = key.decrypt(&cipher.letters);
    let matching = plain
        .iter()
        .zip(solution.iter())
        .filter(|(&a, &b)| a == b)
        .count();
    let total = plain.len().min(solution.len()).max(1);
    println!(
        "matches known solution on {}/{} letters ({:.1}%)",
        matching,
        total,
        100.0 * matching as f64 / total as f64
    );
}
