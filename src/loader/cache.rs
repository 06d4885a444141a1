//! Card cache backed by a JSON file
//!
//! Provides lookup of card records by name. The cache is loaded once at
//! startup and written back when the caller asks for it.

use crate::core::Card;
use crate::Result;
use deunicode::deunicode;
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Read-only access to card records by name
pub trait CardSource: Sync {
    fn card(&self, name: &str) -> Option<&Card>;
}

/// Lookup key for a card name: ASCII-folded, lowercase, trimmed
///
/// "Lim-Dûl's Vault" and "lim-dul's vault" share a key.
pub fn card_key(name: &str) -> String {
    deunicode(name.trim()).to_lowercase()
}

/// Card records keyed by name, optionally persisted as JSON
#[derive(Debug, Default)]
pub struct CardCache {
    /// key -> (name as requested, record)
    cards: FxHashMap<String, (String, Card)>,
    path: Option<PathBuf>,
}

impl CardCache {
    /// Create an in-memory cache that is never saved
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the cache at `path`, loading it if the file exists
    pub fn open(path: &Path) -> Result<Self> {
        let mut cache = CardCache {
            cards: FxHashMap::default(),
            path: Some(path.to_path_buf()),
        };

        if path.exists() {
            let content = fs::read_to_string(path)?;
            let stored: BTreeMap<String, Card> = serde_json::from_str(&content)?;
            for (name, card) in stored {
                cache.insert(&name, card);
            }
            tracing::info!(path = %path.display(), cards = cache.len(), "loaded card cache");
        } else {
            tracing::info!(path = %path.display(), "no card cache yet, starting empty");
        }

        Ok(cache)
    }

    /// Write the cache back to its file (no-op for in-memory caches)
    ///
    /// Writes to a sibling temp file first so a crash never leaves a
    /// truncated cache behind.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let stored: BTreeMap<&str, &Card> = self
            .cards
            .values()
            .map(|(name, card)| (name.as_str(), card))
            .collect();
        let json = serde_json::to_string_pretty(&stored)?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, path)?;

        tracing::info!(path = %path.display(), cards = self.len(), "saved card cache");
        Ok(())
    }

    /// Store a record under the name it was requested by
    pub fn insert(&mut self, name: &str, card: Card) {
        self.cards
            .insert(card_key(name), (name.trim().to_string(), card));
    }

    pub fn get(&self, name: &str) -> Option<&Card> {
        self.cards.get(&card_key(name)).map(|(_, card)| card)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.cards.contains_key(&card_key(name))
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl CardSource for CardCache {
    fn card(&self, name: &str) -> Option<&Card> {
        self.get(name)
    }
}
