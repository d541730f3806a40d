//! Picks the key source for a command from flags and config.

use extkit_signing::keys::DirectoryKeySource;
use extkit_signing::KeySource;

use crate::config::Config;

/// The configured key directory, or the remote key server when `fetch` is set.
pub fn from_config(config: &Config, fetch: bool) -> anyhow::Result<Box<dyn KeySource>> {
    if !fetch {
        return Ok(Box::new(DirectoryKeySource::new(&config.key_dir)));
    }
    let Some(url) = config.key_server.as_deref() else {
        anyhow::bail!("no key server configured. Set one with `extkit config set-key-server <url>`.");
    };
    remote(url)
}

#[cfg(feature = "fetch")]
fn remote(url: &str) -> anyhow::Result<Box<dyn KeySource>> {
    Ok(Box::new(crate::fetch::HttpKeySource::new(url)?))
}

#[cfg(not(feature = "fetch"))]
fn remote(url: &str) -> anyhow::Result<Box<dyn KeySource>> {
    anyhow::bail!("cannot fetch keys from {url}: extkit was built without the `fetch` feature")
}
