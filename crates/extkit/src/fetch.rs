//! Public keys served by a remote key directory as `<base>/<identity>.akey`,
//! with an index of published identities at `<base>/keys.txt`.

use std::path::Path;

use extkit_signing::error::Result;
use extkit_signing::files;
use extkit_signing::keys;
use extkit_signing::keys::DirectoryKeySource;
use extkit_signing::ExtensionError;
use extkit_signing::KeyKind;
use extkit_signing::KeyMaterial;
use extkit_signing::KeySource;
use url::Url;

use crate::config::Config;

/// Index of published identities, one per line.
pub const KEY_INDEX: &str = "keys.txt";

/// One blocking GET per lookup. Only public keys are served.
pub struct HttpKeySource {
    base_url: Url,
}

impl HttpKeySource {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| anyhow::anyhow!("invalid key server URL '{base_url}': {e}"))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("key server URL '{base_url}' cannot hold a path");
        }
        Ok(Self { base_url })
    }

    fn url_for(&self, identity: &str) -> Result<Url> {
        // Same naming rules as the local key directory.
        files::derived_path(Path::new(""), identity, keys::PUBLIC_KEY_EXTENSION)?;
        self.join(&format!("{identity}.{}", keys::PUBLIC_KEY_EXTENSION))
    }

    /// Append one percent-encoded path segment to the base URL.
    fn join(&self, segment: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ExtensionError::InvalidFileName(self.base_url.to_string()))?
            .pop_if_empty()
            .push(segment);
        Ok(url)
    }

    fn get(url: &Url) -> Result<String> {
        tracing::debug!(%url, "fetching");
        let body = ureq::get(url.as_str())
            .call()
            .map_err(|e| ExtensionError::Io(std::io::Error::other(format!("GET {url}: {e}"))))?
            .into_string()?;
        Ok(body)
    }

    /// Every public key listed in the directory's index.
    pub fn fetch_all(&self) -> Result<Vec<KeyMaterial>> {
        let index = Self::get(&self.join(KEY_INDEX)?)?;
        index_entries(&index).map(|identity| self.load_public_key(identity)).collect()
    }
}

/// Non-blank lines of a key index.
fn index_entries(text: &str) -> impl Iterator<Item = &str> {
    text.lines().map(str::trim).filter(|line| !line.is_empty())
}

impl KeySource for HttpKeySource {
    fn load_public_key(&self, identity: &str) -> Result<KeyMaterial> {
        let body = Self::get(&self.url_for(identity)?)?;
        keys::decode_key(&body, KeyKind::Public)
    }

    fn load_private_key(&self, _identity: &str) -> Result<KeyMaterial> {
        Err(ExtensionError::KindMismatch {
            expected: KeyKind::Private,
            actual: KeyKind::Public,
        })
    }
}

/// `extkit fetch-keys`: download one identity's public key, or every listed
/// key, into the configured key directory.
pub fn run(config: &Config, identity: Option<&str>) -> anyhow::Result<()> {
    let Some(url) = config.key_server.as_deref() else {
        anyhow::bail!("no key server configured. Set one with `extkit config set-key-server <url>`.");
    };
    let source = HttpKeySource::new(url)?;
    let fetched = match identity {
        Some(identity) => vec![source.load_public_key(identity)?],
        None => source.fetch_all()?,
    };

    let store = DirectoryKeySource::new(&config.key_dir);
    save_public_keys(&store, &fetched)?;

    println!("✓ Fetched {} public key(s) into {}", fetched.len(), store.dir().display());
    for key in &fetched {
        println!("  {}", key.author);
    }
    Ok(())
}

/// Store each key under its own author's name.
fn save_public_keys(store: &DirectoryKeySource, fetched: &[KeyMaterial]) -> Result<()> {
    for key in fetched {
        keys::save_key_file(&store.key_path(&key.author, KeyKind::Public)?, key, KeyKind::Public)?;
    }
    Ok(())
}
