//! Core types: factions, mana costs, castability and cards

pub mod card;
pub mod castability;
pub mod cost;
pub mod faction;

pub use card::{normalize_type, Card, Cmc, NONLAND_PERMANENT_TYPES};
pub use castability::{Castability, FixtureCase};
pub use cost::{parse_cost, parse_symbols, ManaSymbol};
pub use faction::{Color, ColorSet, Faction, FactionDef, FactionId, FactionSet, Taxonomy, Tier};
