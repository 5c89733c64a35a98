//! Application-wide configuration helpers.
//!
//! Reads environment variables (with optional `.env` and TOML file) and
//! provides the strongly typed [`AppConfig`] consumed by the backend.

pub mod file_loader;

use std::env;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub use file_loader::load_file_config_into_env;

pub const DEFAULT_PORT: u16 = 5173;
pub const DEFAULT_PUBLIC_DIR: &str = "public";

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Initial video root, always absolute.
    pub video_root: PathBuf,
    pub addr: SocketAddr,
    /// Directory of static browser assets.
    pub public_dir: PathBuf,
}

impl AppConfig {
    /// Process environment wins over `.env`, which wins over the config file.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        load_file_config_into_env()?;

        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let video_root = match non_empty(lookup("VIDEO_ROOT")) {
            Some(raw) => PathBuf::from(raw),
            None => default_video_root(dirs::home_dir()),
        };
        let video_root = std::path::absolute(&video_root)
            .with_context(|| format!("Failed to resolve video root {}", video_root.display()))?;

        let addr = match non_empty(lookup("CLIPWALL_ADDR")) {
            Some(raw) => raw
                .parse::<SocketAddr>()
                .with_context(|| format!("Failed to parse CLIPWALL_ADDR {raw:?}"))?,
            None => {
                let port = read_u16(&lookup, "PORT", DEFAULT_PORT)?;
                SocketAddr::from(([127, 0, 0, 1], port))
            }
        };

        let public_dir = non_empty(lookup("CLIPWALL_PUBLIC_DIR"))
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PUBLIC_DIR));

        Ok(Self {
            video_root,
            addr,
            public_dir,
        })
    }
}

/// `<home>/Videos`, or `Videos` under the working directory without a home.
pub fn default_video_root(home: Option<PathBuf>) -> PathBuf {
    home.as_deref()
        .map(|home| home.join("Videos"))
        .unwrap_or_else(|| Path::new("Videos").to_path_buf())
}

fn read_u16(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u16) -> Result<u16> {
    match non_empty(lookup(key)) {
        Some(val) => val
            .parse::<u16>()
            .with_context(|| format!("Failed to parse {key} as u16")),
        None => Ok(default),
    }
}

fn non_empty(val: Option<String>) -> Option<String> {
    val.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_without_variables() {
        let cfg = AppConfig::from_lookup(lookup(&[])).unwrap();

        assert_eq!(cfg.addr, SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)));
        assert_eq!(cfg.public_dir, PathBuf::from(DEFAULT_PUBLIC_DIR));
        assert!(cfg.video_root.is_absolute());
        assert!(cfg.video_root.ends_with("Videos"));
    }

    #[test]
    fn video_root_override_is_made_absolute() {
        let cfg = AppConfig::from_lookup(lookup(&[("VIDEO_ROOT", "clips")])).unwrap();
        assert!(cfg.video_root.is_absolute());
        assert!(cfg.video_root.ends_with("clips"));

        let cfg = AppConfig::from_lookup(lookup(&[("VIDEO_ROOT", "/srv/videos")])).unwrap();
        assert_eq!(cfg.video_root, PathBuf::from("/srv/videos"));
    }

    #[test]
    fn port_and_addr() {
        let cfg = AppConfig::from_lookup(lookup(&[("PORT", "9000")])).unwrap();
        assert_eq!(cfg.addr.port(), 9000);

        let cfg = AppConfig::from_lookup(lookup(&[("PORT", "9000"), ("CLIPWALL_ADDR", "0.0.0.0:7000")]))
            .unwrap();
        assert_eq!(cfg.addr, "0.0.0.0:7000".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn invalid_port_is_an_error() {
        assert!(AppConfig::from_lookup(lookup(&[("PORT", "not-a-port")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("CLIPWALL_ADDR", "localhost")])).is_err());
    }

    #[test]
    fn home_fallback() {
        assert_eq!(
            default_video_root(Some(PathBuf::from("/home/ana"))),
            PathBuf::from("/home/ana/Videos")
        );
        assert_eq!(default_video_root(None), PathBuf::from("Videos"));
    }
}
