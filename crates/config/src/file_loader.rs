use std::{env, fs, path::Path};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

/// Configuration loaded from `clipwall-config.toml` (or `clipwall.config.toml`)
/// in the working directory. All fields are optional; present values populate
/// environment variables that are not already set.
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub api: ApiSection,
}

#[derive(Debug, Default, Deserialize)]
pub struct AppSection {
    pub video_root: Option<String>,
    pub public_dir: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiSection {
    pub addr: Option<String>,
    pub port: Option<u16>,
}

const CANDIDATES: &[&str] = &[
    "clipwall-config.toml",
    "clipwall.config.toml",
    "config/clipwall-config.toml",
];

pub fn load_file_config_into_env() -> Result<()> {
    if let Some(cfg) = read_first_config()? {
        apply_to_env(cfg);
    }
    Ok(())
}

pub fn parse_file_config(contents: &str) -> Result<FileConfig> {
    toml::from_str(contents).context("invalid clipwall config file")
}

fn apply_to_env(cfg: FileConfig) {
    set_if_missing("VIDEO_ROOT", cfg.app.video_root);
    set_if_missing("CLIPWALL_PUBLIC_DIR", cfg.app.public_dir);
    // An address or port already in the environment shadows both file keys.
    if !is_set("CLIPWALL_ADDR") && !is_set("PORT") {
        set_if_missing("CLIPWALL_ADDR", cfg.api.addr);
        set_if_missing("PORT", cfg.api.port.map(|v| v.to_string()));
    }
}

fn is_set(key: &str) -> bool {
    env::var(key).map(|v| !v.trim().is_empty()).unwrap_or(false)
}

fn read_first_config() -> Result<Option<FileConfig>> {
    for candidate in CANDIDATES {
        let path = Path::new(candidate);
        if path.exists() {
            debug!(path = candidate, "reading config file");
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read {candidate}"))?;
            return parse_file_config(&contents).map(Some);
        }
    }
    Ok(None)
}

fn set_if_missing(key: &str, val: Option<String>) {
    if let Some(val) = val {
        let trimmed = val.trim();
        if trimmed.is_empty() {
            return;
        }
        if env::var(key).is_err() {
            env::set_var(key, trimmed);
        }
    }
}
