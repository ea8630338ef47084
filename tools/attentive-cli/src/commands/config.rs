//! Show or save the effective configuration.

use attentive_common::config::{config_file_path, AppConfig};

pub fn run(config: AppConfig, save: bool) -> anyhow::Result<()> {
    config.detector.validate()?;

    println!("{}", serde_json::to_string_pretty(&config)?);

    if save {
        let path = config.save()?;
        println!();
        println!("Configuration saved to: {}", path.display());
    } else {
        println!();
        println!("Config file: {}", config_file_path().display());
    }
    Ok(())
}
