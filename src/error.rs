//! Error types for Cubealyzer

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CubeError {
    #[error("Unknown faction: {0}")]
    UnknownFaction(String),

    #[error("Unknown faction tier: {0}")]
    UnknownTier(String),

    #[error("Inconsistent faction taxonomy: {0}")]
    InconsistentTaxonomy(String),

    #[error("Invalid cube format: {0}")]
    InvalidCubeFormat(String),

    #[error("Card not found in catalog: {0}")]
    CardNotFound(String),

    #[error("Catalog error: {0}")]
    CatalogError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, CubeError>;
