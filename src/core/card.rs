//! Card records as stored in the card cache

use serde::{Deserialize, Deserializer, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Types that make a card a nonland permanent
pub const NONLAND_PERMANENT_TYPES: [&str; 4] =
    ["creature", "enchantment", "artifact", "planeswalker"];

/// Converted mana cost
///
/// Usually a whole number, but half-cost cards have fractional values.
/// Ordered and hashed by value so it can key a curve.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Cmc(f64);

impl Cmc {
    /// Negative, negative-zero and NaN values clamp to zero
    pub fn new(value: f64) -> Self {
        if value.is_nan() || value <= 0.0 {
            Cmc(0.0)
        } else {
            Cmc(value)
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl From<u32> for Cmc {
    fn from(value: u32) -> Self {
        Cmc(value as f64)
    }
}

impl From<f64> for Cmc {
    fn from(value: f64) -> Self {
        Cmc::new(value)
    }
}

impl From<Cmc> for f64 {
    fn from(cmc: Cmc) -> Self {
        cmc.0
    }
}

impl PartialEq for Cmc {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0) == Ordering::Equal
    }
}

impl Eq for Cmc {}

impl PartialOrd for Cmc {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cmc {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Hash for Cmc {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl fmt::Display for Cmc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.fract() == 0.0 {
            write!(f, "{:.0}", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// A card as returned by the catalog
///
/// Only the fields the analysis needs are kept; the rest of the catalog
/// record is dropped on load. Missing or null fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub name: String,

    /// Raw mana cost, e.g. "{2}{U}{U}" (empty for lands)
    #[serde(default, deserialize_with = "null_as_default")]
    pub cost: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub cmc: Cmc,

    /// Primary types, lowercase ("creature", "land", ...)
    #[serde(default, deserialize_with = "null_as_default")]
    pub types: Vec<String>,

    /// Subtypes, lowercase ("human", "cleric", ...)
    #[serde(default, deserialize_with = "null_as_default")]
    pub subtypes: Vec<String>,
}

impl Card {
    pub fn new(name: impl Into<String>, cost: impl Into<String>, cmc: u32) -> Self {
        Card {
            name: name.into(),
            cost: cost.into(),
            cmc: Cmc::from(cmc),
            types: Vec::new(),
            subtypes: Vec::new(),
        }
    }

    pub fn with_cmc(mut self, cmc: Cmc) -> Self {
        self.cmc = cmc;
        self
    }

    pub fn with_types(mut self, types: &[&str]) -> Self {
        self.types = types.iter().map(|t| t.to_lowercase()).collect();
        self
    }

    pub fn with_subtypes(mut self, subtypes: &[&str]) -> Self {
        self.subtypes = subtypes.iter().map(|t| t.to_lowercase()).collect();
        self
    }

    pub fn has_type(&self, card_type: &str) -> bool {
        let wanted = normalize_type(card_type);
        self.types.iter().any(|t| normalize_type(t) == wanted)
    }

    pub fn has_subtype(&self, subtype: &str) -> bool {
        self.subtypes.iter().any(|t| t.eq_ignore_ascii_case(subtype))
    }

    pub fn is_nonland_permanent(&self) -> bool {
        NONLAND_PERMANENT_TYPES.iter().any(|t| self.has_type(t))
    }
}

/// Standardize a type name from a cube export
pub fn normalize_type(name: &str) -> String {
    let name = name.trim().to_lowercase();
    if name == "artifact_creature" {
        "creature".to_string()
    } else {
        name
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_catalog_record() {
        let json = r#"{
            "name": "Goldnight Commander",
            "id": "goldnight-commander",
            "cost": "{3}{W}",
            "cmc": 4,
            "types": ["creature"],
            "subtypes": ["human", "cleric", "soldier"],
            "colors": ["white"],
            "text": "Whenever another creature enters..."
        }"#;

        let card: Card = serde_json::from_str(json).unwrap();
        assert_eq!(card.name, "Goldnight Commander");
        assert_eq!(card.cost, "{3}{W}");
        assert_eq!(card.cmc, Cmc::new(4.0));
        assert!(card.has_type("creature"));
        assert!(card.has_subtype("Cleric"));
    }

    #[test]
    fn test_deserialize_missing_and_null_fields() {
        let json = r#"{"name": "Forest", "types": ["land"], "subtypes": null}"#;
        let card: Card = serde_json::from_str(json).unwrap();
        assert_eq!(card.cost, "");
        assert_eq!(card.cmc, Cmc::default());
        assert!(card.subtypes.is_empty());
        assert!(!card.is_nonland_permanent());
    }

    #[test]
    fn test_nonland_permanent() {
        let arbor = Card::new("Dryad Arbor", "", 0).with_types(&["Land", "Creature"]);
        assert!(arbor.is_nonland_permanent());

        let bolt = Card::new("Lightning Bolt", "{R}", 1).with_types(&["instant"]);
        assert!(!bolt.is_nonland_permanent());
    }

    #[test]
    fn test_normalize_type() {
        assert_eq!(normalize_type("Artifact_Creature"), "creature");
        assert_eq!(normalize_type(" Enchantment "), "enchantment");

        let golem = Card::new("Golem", "{4}", 4).with_types(&["artifact_creature"]);
        assert!(golem.has_type("creature"));
    }

    #[test]
    fn test_cmc_ordering_and_display() {
        let half = Cmc::new(0.5);
        assert!(Cmc::new(0.0) < half);
        assert!(half < Cmc::new(1.0));
        assert_eq!(Cmc::new(-3.0), Cmc::new(0.0));
        assert_eq!(Cmc::new(3.0).to_string(), "3");
        assert_eq!(half.to_string(), "0.5");
    }
}
