//! Persistent CLI configuration (`~/.config/extkit/config.json`).

use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

/// Settings shared by all commands.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Directory holding one subdirectory per extension project.
    pub root: PathBuf,
    /// Directory holding `<identity>.akey` and `<identity>.akyx` files.
    pub key_dir: PathBuf,
    /// Base URL of a remote public key directory.
    pub key_server: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        let base = config_dir().join("extkit");
        Self {
            root: base.join("projects"),
            key_dir: base.join("keys"),
            key_server: None,
        }
    }
}

impl Config {
    /// Default path for the config file.
    pub fn default_path() -> PathBuf {
        config_dir().join("extkit").join("config.json")
    }

    /// Load the config from a JSON file. Returns defaults if the file doesn't exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)?;
        serde_json::from_str(&data).map_err(|e| anyhow::anyhow!("invalid config file {}: {e}", path.display()))
    }

    /// Save the config as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// `extkit config show`
pub fn show(path: &Path, config: &Config) -> anyhow::Result<()> {
    println!("Config file: {}", path.display());
    println!("  root:       {}", config.root.display());
    println!("  key_dir:    {}", config.key_dir.display());
    println!("  key_server: {}", config.key_server.as_deref().unwrap_or("(none)"));
    Ok(())
}

/// Apply `change` and write the config back.
pub fn update(path: &Path, mut config: Config, change: impl FnOnce(&mut Config)) -> anyhow::Result<()> {
    change(&mut config);
    config.save(path)?;
    println!("✓ Updated {}", path.display());
    show(path, &config)
}

/// Move the projects root to `new_root` and save the new location.
///
/// A root that does not exist yet is simply re-pointed.
pub fn move_root(path: &Path, config: Config, new_root: PathBuf) -> anyhow::Result<()> {
    if new_root.exists() {
        anyhow::bail!("{} already exists. Choose an empty location.", new_root.display());
    }
    if config.root.exists() {
        if let Some(parent) = new_root.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::rename(&config.root, &new_root).map_err(|e| {
            anyhow::anyhow!("could not move {} to {}: {e}", config.root.display(), new_root.display())
        })?;
        println!("✓ Moved {} to {}", config.root.display(), new_root.display());
    }
    update(path, config, |c| c.root = new_root)
}

fn config_dir() -> PathBuf {
    dirs::config_dir().unwrap_or_else(|| PathBuf::from("/tmp"))
}
