pub mod analyze;
pub mod config;
pub mod info;
pub mod monitor;
pub mod simulate;

use std::path::PathBuf;

use attentive_common::config::{AppConfig, DetectorConfig, WeightingPreset};
use attentive_model::SessionReport;

/// Load the config file (explicit path or standard location) and apply a preset.
pub fn resolve_config(path: Option<PathBuf>, preset: Option<String>) -> anyhow::Result<AppConfig> {
    let mut config = match path {
        Some(path) => AppConfig::load_from(&path)
            .map_err(|e| anyhow::anyhow!("Failed to load config {}: {e}", path.display()))?,
        None => AppConfig::load(),
    };

    if let Some(preset) = preset {
        let preset: WeightingPreset = preset.parse()?;
        config.detector = DetectorConfig::preset(preset);
    }
    Ok(config)
}

pub fn print_report(report: &SessionReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!("Session report ({} frames analyzed)", report.frames_analyzed);
        print!("{}", report.render_text());
    }
    Ok(())
}
