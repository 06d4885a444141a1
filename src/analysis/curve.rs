//! Mana curves: card counts per converted mana cost
//!
//! A curve is built by running every card of a cube through a list of
//! predicates and counting the copies that pass, bucketed by cmc.

use crate::analysis::predicate::{
    all_match, HasSubtype, HasType, NonlandPermanent, PlayableBy, Predicate,
};
use crate::core::{Castability, Cmc, FactionId, Tier};
use crate::loader::{CardCollection, CardSource};
use crate::Result;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fmt;

/// Copies of matching cards per cmc
pub type Curve = BTreeMap<Cmc, u32>;

/// One curve per faction of a tier, keyed by faction name
pub type FactionTable = BTreeMap<&'static str, Curve>;

/// Card type filter for faction curves
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeFilter {
    /// Creatures, enchantments, artifacts and planeswalkers
    NonlandPermanent,
    /// A single primary type
    Type(String),
}

impl TypeFilter {
    /// Parse a command-line type; "permanent" means any nonland permanent
    pub fn parse(card_type: &str) -> Self {
        match card_type.trim().to_lowercase().as_str() {
            "permanent" | "nonland" | "any" => TypeFilter::NonlandPermanent,
            other => TypeFilter::Type(other.to_string()),
        }
    }

    fn predicate(&self) -> Predicate<'static> {
        match self {
            TypeFilter::NonlandPermanent => Box::new(NonlandPermanent),
            TypeFilter::Type(t) => Box::new(HasType::new(t)),
        }
    }
}

impl fmt::Display for TypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeFilter::NonlandPermanent => write!(f, "nonland permanent"),
            TypeFilter::Type(t) => write!(f, "{t}"),
        }
    }
}

impl From<Option<&str>> for TypeFilter {
    fn from(card_type: Option<&str>) -> Self {
        card_type.map_or(TypeFilter::NonlandPermanent, TypeFilter::parse)
    }
}

/// Builds curves for one cube against one card source
pub struct CurveBuilder<'a> {
    cube: &'a CardCollection,
    cards: &'a dyn CardSource,
    castability: &'a Castability,
}

impl<'a> CurveBuilder<'a> {
    pub fn new(
        cube: &'a CardCollection,
        cards: &'a dyn CardSource,
        castability: &'a Castability,
    ) -> Self {
        CurveBuilder {
            cube,
            cards,
            castability,
        }
    }

    /// Cube entries with no card record; these never count toward any curve
    pub fn missing_cards(&self) -> Vec<&'a str> {
        self.cube
            .names()
            .filter(|name| self.cards.card(name).is_none())
            .collect()
    }

    /// Count copies of every card that passes all predicates, by cmc
    pub fn build_curve(&self, predicates: &[Predicate<'_>]) -> Curve {
        let mut curve = Curve::new();

        for (name, copies) in self.cube.iter() {
            let Some(card) = self.cards.card(name) else {
                tracing::debug!(card = name, "no card record, skipping");
                continue;
            };
            if all_match(predicates, card) {
                *curve.entry(card.cmc).or_insert(0) += copies;
            }
        }

        curve
    }

    /// The cards that pass all predicates, with their copy counts
    pub fn cards_matching(&self, predicates: &[Predicate<'_>]) -> CardCollection {
        let mut matching = CardCollection::new();

        for (name, copies) in self.cube.iter() {
            match self.cards.card(name) {
                Some(card) if all_match(predicates, card) => matching.add_copies(name, copies),
                Some(_) => {}
                None => tracing::debug!(card = name, "no card record, skipping"),
            }
        }

        matching
    }

    /// Predicates for "playable by `faction`, of this type, with this subtype"
    pub fn faction_predicates(
        &self,
        faction: FactionId,
        card_type: &TypeFilter,
        sub_type: Option<&str>,
    ) -> Vec<Predicate<'a>> {
        let mut predicates: Vec<Predicate<'a>> = vec![
            Box::new(PlayableBy::new(self.castability, faction)),
            card_type.predicate(),
        ];
        if let Some(sub_type) = sub_type {
            predicates.push(Box::new(HasSubtype::new(sub_type)));
        }
        predicates
    }

    /// Curve of one faction; `card_type` None means any nonland permanent
    pub fn faction_curve(
        &self,
        faction: &str,
        card_type: Option<&str>,
        sub_type: Option<&str>,
    ) -> Result<Curve> {
        let id = self.castability.taxonomy().id_of(faction)?;
        Ok(self.curve_for(id, &TypeFilter::from(card_type), sub_type))
    }

    fn curve_for(
        &self,
        faction: FactionId,
        card_type: &TypeFilter,
        sub_type: Option<&str>,
    ) -> Curve {
        self.build_curve(&self.faction_predicates(faction, card_type, sub_type))
    }

    /// Curves for every faction of a tier
    ///
    /// Factions are evaluated in parallel; they share the castability cache.
    pub fn faction_table(
        &self,
        tier: Tier,
        card_type: &TypeFilter,
        sub_type: Option<&str>,
    ) -> FactionTable {
        let taxonomy = self.castability.taxonomy();
        let factions: Vec<FactionId> = taxonomy.ids_in_tier(tier).collect();

        factions
            .par_iter()
            .map(|&id| (taxonomy.name(id), self.curve_for(id, card_type, sub_type)))
            .collect()
    }

    /// Copies in the cube the faction can play, of any type
    pub fn card_count(&self, faction: &str) -> Result<u32> {
        let id = self.castability.taxonomy().id_of(faction)?;
        let playable: [Predicate<'_>; 1] = [Box::new(PlayableBy::new(self.castability, id))];
        Ok(self.cards_matching(&playable).total_cards())
    }

    /// Copies of one card type the faction can play
    pub fn type_count(&self, faction: &str, card_type: &TypeFilter) -> Result<u32> {
        let id = self.castability.taxonomy().id_of(faction)?;
        let predicates: [Predicate<'_>; 2] = [
            card_type.predicate(),
            Box::new(PlayableBy::new(self.castability, id)),
        ];
        Ok(self.build_curve(&predicates).values().sum())
    }
}
