use anyhow::Result;

use artist_catalog::config::Config;

/// Print the effective configuration as TOML
pub fn show(config: &Config) -> Result<()> {
    print!("{}", config.to_toml()?);
    Ok(())
}
