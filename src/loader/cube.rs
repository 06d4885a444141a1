//! Cube list loader (CSV export, one card per row)

use crate::{CubeError, Result};
use std::collections::BTreeMap;
use std::path::Path;

/// Cube loader for CSV card lists
pub struct CubeLoader;

impl CubeLoader {
    /// Load a cube from a CSV file
    pub fn load_from_file(path: &Path) -> Result<CardCollection> {
        let reader = csv_reader().from_path(path)?;
        Self::read(reader)
    }

    /// Parse a cube from CSV text
    pub fn parse(content: &str) -> Result<CardCollection> {
        let reader = csv_reader().from_reader(content.as_bytes());
        Self::read(reader)
    }

    fn read<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<CardCollection> {
        let mut cube = CardCollection::new();

        // Format: card name in the first column, anything after it is ignored
        for record in reader.records() {
            let record = record?;
            if let Some(name) = record.get(0).map(str::trim).filter(|n| !n.is_empty()) {
                cube.add(name);
            }
        }

        if cube.is_empty() {
            return Err(CubeError::InvalidCubeFormat("Empty cube".to_string()));
        }

        tracing::info!(
            distinct = cube.distinct(),
            total = cube.total_cards(),
            "loaded cube list"
        );
        Ok(cube)
    }
}

fn csv_reader() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.has_headers(false).flexible(true).escape(Some(b'\\'));
    builder
}

/// Multiset of card names (a cube or deck)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardCollection {
    counts: BTreeMap<String, u32>,
}

impl CardCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one copy of a card
    pub fn add(&mut self, name: &str) {
        self.add_copies(name, 1);
    }

    pub fn add_copies(&mut self, name: &str, copies: u32) {
        *self.counts.entry(name.to_string()).or_insert(0) += copies;
    }

    /// Copies of a card (0 if absent)
    pub fn count(&self, name: &str) -> u32 {
        self.counts.get(name).copied().unwrap_or(0)
    }

    /// Distinct card names
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    /// Total cards, duplicates included
    pub fn total_cards(&self) -> u32 {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// (name, copies) pairs in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> + '_ {
        self.counts.iter().map(|(name, &count)| (name.as_str(), count))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.counts.keys().map(String::as_str)
    }
}

impl<'a> FromIterator<&'a str> for CardCollection {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut collection = CardCollection::new();
        for name in iter {
            collection.add(name);
        }
        collection
    }
}
