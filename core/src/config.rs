//! Solver and model-builder tuning parameters (spec §6), loadable from TOML.

use serde::{Deserialize, Serialize};

/// Tunables shared by `cryptogram-modelgen` and `cryptogram-solve`. CLI
/// flags override whatever a `--config` file sets; the flag defaults equal
/// [`Config::default`].
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// n-gram length used by both the model builder and the scorer.
    pub ngram_len: usize,
    /// Maximum generations a GA trial runs before giving up.
    pub max_generations: u32,
    /// Mutations attempted per generation per individual.
    pub mutation_rate: u32,
    /// Worker threads in the solver's trial pool.
    pub max_threads: usize,
    /// Individuals per GA population.
    pub population_size: usize,
    /// Independent GA trials to run.
    pub num_trials: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            ngram_len: 3,
            max_generations: 150,
            mutation_rate: 3,
            max_threads: 2,
            population_size: 100,
            num_trials: 5,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(
        path: P,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
