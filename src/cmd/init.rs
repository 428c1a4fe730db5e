//! `trackforge init`.

use anyhow::{Context, Result};
use std::path::Path;

use trackforge::config::{CONFIG_DIR, CONFIG_FILE, TrackforgeToml};

pub fn cmd_init(project_dir: &Path) -> Result<()> {
    let config_dir = project_dir.join(CONFIG_DIR);
    let config_path = config_dir.join(CONFIG_FILE);

    if config_path.exists() {
        println!("Already initialized: {}", config_path.display());
        return Ok(());
    }

    std::fs::create_dir_all(config_dir.join("data"))
        .with_context(|| format!("Failed to create {}", config_dir.display()))?;
    TrackforgeToml::default().save(&config_path)?;

    println!(
        "{} {}",
        console::style("Initialized").green().bold(),
        config_dir.display()
    );
    println!();
    println!("Next steps:");
    println!("  trackforge board            show the demo board (guest session)");
    println!("  trackforge project add ...  add a project");
    println!("  trackforge config show      inspect configuration");
    Ok(())
}
