//! Cubealyzer - mana curve analysis for Magic: The Gathering cubes
//!
//! Works out which color factions (colors, guilds, shards, wedges and
//! nephilim) can pay each card's mana cost, and folds that into per-cost
//! histograms for a cube list.

pub mod analysis;
pub mod config;
pub mod core;
pub mod error;
pub mod loader;
pub mod report;

pub use error::{CubeError, Result};
