//! Card predicates used to filter a cube before building curves

use crate::core::{normalize_type, Card, Castability, FactionId};

/// A yes/no question about a card
pub trait CardPredicate: Send + Sync {
    fn matches(&self, card: &Card) -> bool;
}

impl<F> CardPredicate for F
where
    F: Fn(&Card) -> bool + Send + Sync,
{
    fn matches(&self, card: &Card) -> bool {
        self(card)
    }
}

pub type Predicate<'a> = Box<dyn CardPredicate + 'a>;

/// True when every predicate holds; stops at the first one that fails
pub fn all_match(predicates: &[Predicate<'_>], card: &Card) -> bool {
    predicates.iter().all(|p| p.matches(card))
}

/// The faction can pay the card's mana cost
pub struct PlayableBy<'a> {
    castability: &'a Castability,
    faction: FactionId,
}

impl<'a> PlayableBy<'a> {
    pub fn new(castability: &'a Castability, faction: FactionId) -> Self {
        PlayableBy {
            castability,
            faction,
        }
    }
}

impl CardPredicate for PlayableBy<'_> {
    fn matches(&self, card: &Card) -> bool {
        self.castability.can_play(self.faction, &card.cost)
    }
}

/// The card has a given primary type
pub struct HasType(String);

impl HasType {
    pub fn new(card_type: &str) -> Self {
        HasType(normalize_type(card_type))
    }
}

impl CardPredicate for HasType {
    fn matches(&self, card: &Card) -> bool {
        card.has_type(&self.0)
    }
}

/// The card is a creature, enchantment, artifact or planeswalker
pub struct NonlandPermanent;

impl CardPredicate for NonlandPermanent {
    fn matches(&self, card: &Card) -> bool {
        card.is_nonland_permanent()
    }
}

/// The card has a given subtype
pub struct HasSubtype(String);

impl HasSubtype {
    pub fn new(subtype: &str) -> Self {
        HasSubtype(subtype.trim().to_lowercase())
    }
}

impl CardPredicate for HasSubtype {
    fn matches(&self, card: &Card) -> bool {
        card.has_subtype(&self.0)
    }
}
