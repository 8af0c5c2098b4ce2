use anyhow::{bail, Result};

use folio_core::SiteConfig;

/// Print the effective configuration, or write the defaults with `init`
pub async fn run(config: &SiteConfig, init: bool) -> Result<()> {
    if init {
        let path = SiteConfig::config_path();
        if path.exists() {
            bail!("{} already exists", path.display());
        }
        SiteConfig::default().save()?;
        println!("Wrote default configuration to {}", path.display());
        return Ok(());
    }

    print!("{}", config.to_toml()?);
    Ok(())
}
