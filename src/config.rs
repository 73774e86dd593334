use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// On-disk preferences, stored as JSON under the user config directory.
/// Absence of the file or of a field is a valid state; defaults apply.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Preferences {
    pub theme: Option<String>,
}

impl Preferences {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let prefs: Preferences = serde_json::from_str(&content)?;
        Ok(prefs)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

pub fn default_prefs_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| anyhow!("Could not determine config directory"))?;

    Ok(config_dir.join("neura").join("config.json"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Prod,
}

impl Environment {
    /// Read the target environment from `NEURA_ENV`; anything other than
    /// "prod" means development.
    pub fn from_env() -> Self {
        match std::env::var("NEURA_ENV").as_deref() {
            Ok("prod") => Environment::Prod,
            _ => Environment::Dev,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Host,
    IosSimulator,
    AndroidEmulator,
}

impl Platform {
    /// The Android emulator reaches the host machine via 10.0.2.2 rather
    /// than the loopback address.
    fn loopback_host(self) -> &'static str {
        match self {
            Platform::Host | Platform::IosSimulator => "127.0.0.1",
            Platform::AndroidEmulator => "10.0.2.2",
        }
    }
}

const PROD_BASE_URL: &str = "https://api.neura.app";
const DEV_PORT: u16 = 5000;

/// Resolve the service base URL. `NEURA_API_URL` overrides everything;
/// otherwise dev builds target the platform loopback and prod builds the
/// deployment URL.
pub fn resolve_base_url(env: Environment, platform: Platform) -> String {
    if let Ok(url) = std::env::var("NEURA_API_URL") {
        return url;
    }

    match env {
        Environment::Prod => PROD_BASE_URL.to_string(),
        Environment::Dev => format!("http://{}:{}", platform.loopback_host(), DEV_PORT),
    }
}
