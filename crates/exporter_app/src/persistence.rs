use std::fs;
use std::path::Path;

use exporter_engine::write_atomic;
use exporter_logging::{exporter_error, exporter_info, exporter_warn};
use serde::{Deserialize, Serialize};

const CONFIG_FILENAME: &str = ".chesscom_exporter.ron";

/// Settings remembered between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedConfig {
    pub player: Option<String>,
    pub last_export_utc: Option<String>,
}

pub fn load(dir: &Path) -> PersistedConfig {
    let path = dir.join(CONFIG_FILENAME);
    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return PersistedConfig::default();
        }
        Err(err) => {
            exporter_warn!("failed to read config from {:?}: {}", path, err);
            return PersistedConfig::default();
        }
    };

    match ron::from_str(&content) {
        Ok(config) => {
            exporter_info!("loaded config from {:?}", path);
            config
        }
        Err(err) => {
            exporter_warn!("failed to parse config from {:?}: {}", path, err);
            PersistedConfig::default()
        }
    }
}

pub fn save(dir: &Path, config: &PersistedConfig) {
    let pretty = ron::ser::PrettyConfig::new();
    let content = match ron::ser::to_string_pretty(config, pretty) {
        Ok(text) => text,
        Err(err) => {
            exporter_error!("failed to serialize config: {}", err);
            return;
        }
    };

    let path = dir.join(CONFIG_FILENAME);
    if let Err(err) = write_atomic(&path, &content) {
        exporter_error!("failed to write config to {:?}: {}", path, err);
    }
}
