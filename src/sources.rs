use anyhow::Result;

use crate::config::Config;

/// Print the configured feed sources as a fixed-width table.
pub fn list_sources(config: &Config) -> Result<()> {
    println!("{:<16} {:<10} {}", "SOURCE", "KINGDOM", "BASE URL");
    for source in &config.sources {
        println!(
            "{:<16} {:<10} {}",
            source.id, source.default_kingdom, source.base_url
        );
    }
    Ok(())
}
