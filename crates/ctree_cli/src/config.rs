use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;

use ctree_engine::EvalOptions;
use ctree_math::PolyBudget;

pub const CONFIG_FILE: &str = "ctree_config.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CtConfig {
    pub max_terms: usize,
    pub max_total_degree: u32,
    pub track_condition: bool,
    /// Smallest and largest k for the `martingale` sweep over N = 2^k.
    pub min_k: u32,
    pub max_k: u32,
    /// Default log filter when neither -v nor RUST_LOG is given.
    pub log_level: String,
}

impl Default for CtConfig {
    fn default() -> Self {
        let budget = PolyBudget::default();
        Self {
            max_terms: budget.max_terms,
            max_total_degree: budget.max_total_degree,
            track_condition: true,
            min_k: 2,
            max_k: 7,
            log_level: "warn".to_string(),
        }
    }
}

impl CtConfig {
    pub fn load() -> Self {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    pub fn load_from(path: &Path) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => eprintln!("Error parsing config file: {}. Using defaults.", e),
                },
                Err(e) => eprintln!("Error reading config file: {}. Using defaults.", e),
            }
        }
        Self::default()
    }

    pub fn save(&self) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        let mut file = fs::File::create(CONFIG_FILE)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }

    /// Overwrite the config file with defaults.
    pub fn restore() -> std::io::Result<Self> {
        let config = Self::default();
        config.save()?;
        Ok(config)
    }

    pub fn eval_options(&self) -> EvalOptions {
        EvalOptions {
            track_condition: self.track_condition,
            budget: PolyBudget {
                max_terms: self.max_terms,
                max_total_degree: self.max_total_degree,
            },
        }
    }

    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }
}
