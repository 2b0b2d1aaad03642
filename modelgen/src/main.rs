//! Builds character n-gram probability tables from a text corpus.

use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use cryptogram_core::config::Config;
use cryptogram_core::model::ModelBuilder;

/// Build character n-gram probability tables from one or more text files.
#[derive(Parser)]
#[command(name = "cryptogram-modelgen", version)]
struct Args {
    /// Corpus text file(s) to ingest.
    #[arg(required = true)]
    corpus: Vec<PathBuf>,

    /// N-gram length (1..=8).
    #[arg(short = 'n', long = "ngram-len")]
    ngram_len: Option<usize>,

    /// Output base path; writes `<path>.<n-1>` and `<path>.<n>`. Defaults
    /// to stdout.
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Print only the corpus summary, skipping probability table output.
    #[arg(short = 's', long = "summary")]
    summary_only: bool,

    /// Load tunables from a TOML file before applying the flags above.
    #[arg(long = "config")]
    config: Option<PathBuf>,
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
    if let Some(n) = args.ngram_len {
        config.ngram_len = n;
    }
    if !(1..=8).contains(&config.ngram_len) {
        anyhow::bail!("n-gram length {} out of range (expected 1..=8)", config.ngram_len);
    }

    let mut builder = ModelBuilder::new(config.ngram_len);
    for path in &args.corpus {
        let file = std::fs::File::open(path)
            .with_context(|| format!("opening corpus file '{}'", path.display()))?;
        builder
            .ingest(BufReader::new(file))
            .with_context(|| format!("ingesting corpus file '{}'", path.display()))?;
    }

    if args.summary_only {
        println!("{}", builder.summary());
        return Ok(());
    }

    match &args.output {
        Some(base) => {
            let prior_path = suffixed(base, config.ngram_len - 1);
            let mut prior_file = std::fs::File::create(&prior_path)
                .with_context(|| format!("creating '{}'", prior_path.display()))?;
            builder.emit_probabilities(config.ngram_len - 1, &mut prior_file)?;

            let cond_path = suffixed(base, config.ngram_len);
            let mut cond_file = std::fs::File::create(&cond_path)
                .with_context(|| format!("creating '{}'", cond_path.display()))?;
            builder.emit_probabilities(config.ngram_len, &mut cond_file)?;

            tracing::info!(prior = %prior_path.display(), cond = %cond_path.display(), "wrote probability tables");
        }
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            builder.emit_probabilities(config.ngram_len - 1, &mut lock)?;
            builder.emit_probabilities(config.ngram_len, &mut lock)?;
        }
    }

    Ok(())
}

fn suffixed(base: &std::path::Path, n: usize) -> PathBuf {
    let mut s = base.as_os_str().to_owned();
    s.push(format!(".{n}"));
    PathBuf::from(s)
}
