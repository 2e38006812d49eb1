use anyhow::{Context, Result};

use crate::config::{CtConfig, CONFIG_FILE};

pub fn run(reset: bool, config: &CtConfig) -> Result<String> {
    if reset {
        let config =
            CtConfig::restore().with_context(|| format!("cannot write {}", CONFIG_FILE))?;
        return Ok(format!(
            "Configuration reset to defaults ({}).\n{}",
            CONFIG_FILE,
            config.to_toml()
        ));
    }
    Ok(config.to_toml())
}
