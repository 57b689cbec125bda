//! Obfuscated local key-value storage.
//!
//! Values are XOR-ciphered against a fixed key and base64-encoded before
//! hitting disk, under namespaced `secure_` keys in a single JSON file.
//! This is reversible obfuscation, not encryption: it keeps values out of
//! casual sight and nothing more. Do not store real secrets here.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use gate_core::{Error, Result};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{error, warn};

const SECRET_KEY: &[u8] = b"codegate-app-secret-key";
const KEY_PREFIX: &str = "secure_";

/// File-backed key-value store with reversible value obfuscation.
pub struct Keystore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl Keystore {
    /// Opens (or creates) the store at the given path.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents)
                .map_err(|e| Error::storage(format!("corrupt keystore file: {e}")))?,
            Err(e) if e.kind() == ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(Error::storage(e.to_string())),
        };

        warn!(
            "Keystore values are obfuscated, not encrypted; do not store real secrets here"
        );

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Stores a value under the namespaced key.
    pub fn set_item(&self, key: &str, value: &impl Serialize) -> Result<()> {
        let plaintext = serde_json::to_string(value)?;
        let encoded = encrypt(&plaintext);

        let mut entries = self.entries.lock();
        entries.insert(namespaced(key), encoded);
        self.flush(&entries)
    }

    /// Retrieves a value, or None when the key is missing or the stored
    /// value fails to decode.
    pub fn get_item(&self, key: &str) -> Option<serde_json::Value> {
        let entries = self.entries.lock();
        let encoded = entries.get(&namespaced(key))?;
        decrypt(encoded)
    }

    /// Removes a key. Returns whether it was present.
    pub fn remove_item(&self, key: &str) -> bool {
        let mut entries = self.entries.lock();
        let removed = entries.remove(&namespaced(key)).is_some();
        if removed {
            if let Err(e) = self.flush(&entries) {
                error!(error = %e, "Failed to flush keystore");
            }
        }
        removed
    }

    /// Removes every namespaced entry, leaving foreign keys untouched.
    pub fn clear(&self) {
        let mut entries = self.entries.lock();
        entries.retain(|key, _| !key.starts_with(KEY_PREFIX));
        if let Err(e) = self.flush(&entries) {
            error!(error = %e, "Failed to flush keystore");
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, entries: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| Error::storage(e.to_string()))?;
            }
        }
        let contents = serde_json::to_string(entries)?;
        std::fs::write(&self.path, contents).map_err(|e| Error::storage(e.to_string()))
    }
}

fn namespaced(key: &str) -> String {
    format!("{KEY_PREFIX}{key}")
}

fn xor_cipher(data: &[u8]) -> Vec<u8> {
    data.iter()
        .enumerate()
        .map(|(i, byte)| byte ^ SECRET_KEY[i % SECRET_KEY.len()])
        .collect()
}

fn encrypt(plaintext: &str) -> String {
    STANDARD.encode(xor_cipher(plaintext.as_bytes()))
}

/// Returns None rather than an error for values that fail to decode.
fn decrypt(encoded: &str) -> Option<serde_json::Value> {
    let bytes = STANDARD.decode(encoded).ok()?;
    let plaintext = String::from_utf8(xor_cipher(&bytes)).ok()?;
    match serde_json::from_str(&plaintext) {
        Ok(value) => Some(value),
        // Not JSON; hand back the raw string.
        Err(_) => Some(serde_json::Value::String(plaintext)),
    }
}
