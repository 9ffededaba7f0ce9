use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crypto_handler::KeyMaterial;
use tracing::{debug, instrument};

use crate::error::KeychainError;

const PUBLIC_EXTENSION: &str = "pub";
const PRIVATE_EXTENSION: &str = "priv";

/// Key store rooted at one directory: `<dir>/<name>.pub` and `<dir>/<name>.priv`.
#[derive(Debug, Clone)]
pub struct Keychain {
    dir: PathBuf,
}

impl Keychain {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn store_public_key(&self, name: &str, key: &dyn KeyMaterial) -> Result<PathBuf, KeychainError> {
        self.store(name, PUBLIC_EXTENSION, key)
    }

    pub fn store_private_key(&self, name: &str, key: &dyn KeyMaterial) -> Result<PathBuf, KeychainError> {
        self.store(name, PRIVATE_EXTENSION, key)
    }

    /// Raw key bytes, ready for a handler's `unmarshal_public`.
    pub fn load_public_key(&self, name: &str) -> Result<Vec<u8>, KeychainError> {
        self.load(name, PUBLIC_EXTENSION)
    }

    pub fn load_private_key(&self, name: &str) -> Result<Vec<u8>, KeychainError> {
        self.load(name, PRIVATE_EXTENSION)
    }

    #[instrument(level = "debug", skip(self, key), fields(dir = %self.dir.display()))]
    fn store(&self, name: &str, extension: &str, key: &dyn KeyMaterial) -> Result<PathBuf, KeychainError> {
        let path = self.path(name, extension)?;
        let encoded = hex::encode(key.marshal_binary()?);
        fs::create_dir_all(&self.dir)?;
        fs::write(&path, encoded)?;
        debug!(path = %path.display(), "Key stored");
        Ok(path)
    }

    fn load(&self, name: &str, extension: &str) -> Result<Vec<u8>, KeychainError> {
        let path = self.path(name, extension)?;
        let encoded = match fs::read_to_string(&path) {
            Ok(encoded) => encoded,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(KeychainError::NotFound {
                    name: name.to_string(),
                    path,
                });
            }
            Err(e) => return Err(e.into()),
        };
        hex::decode(encoded.trim()).map_err(|source| KeychainError::Decode { path, source })
    }

    fn path(&self, name: &str, extension: &str) -> Result<PathBuf, KeychainError> {
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(KeychainError::InvalidKeyName(name.to_string()));
        }
        Ok(self.dir.join(format!("{name}.{extension}")))
    }
}

/// File-safe key name for a generated key set, e.g. `TBLS256_5_3`.
pub fn key_name(scheme: &str, n: usize, t: usize) -> String {
    let scheme: String = scheme
        .chars()
        .map(|c| if c == '/' || c == '\\' { '-' } else { c })
        .collect();
    format!("{scheme}_{n}_{t}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_name_replaces_separators() {
        assert_eq!(key_name("TBLS256", 5, 3), "TBLS256_5_3");
        assert_eq!(key_name("TBLS256/Pessimistic", 10, 6), "TBLS256-Pessimistic_10_6");
    }

    #[test]
    fn rejects_path_like_names() {
        let keychain = Keychain::new("unused");
        for name in ["", ".", "..", "a/b", "a\\b"] {
            assert!(matches!(
                keychain.load_public_key(name),
                Err(KeychainError::InvalidKeyName(_))
            ));
        }
    }
}
