//! Who can play a given mana cost
//!
//! Every faction starts out able to pay a cost; each colored symbol narrows
//! that down to the factions it is a member of. Results depend only on the
//! cost string and are memoized.

use crate::core::cost::{parse_cost, ManaSymbol};
use crate::core::faction::{FactionId, FactionSet, Taxonomy};
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

/// Castability engine with a memo cache keyed by the exact cost string
///
/// The cache is only ever filled with deterministic values, so concurrent
/// callers racing on the same key write identical results.
#[derive(Debug)]
pub struct Castability {
    taxonomy: Taxonomy,
    cache: RwLock<FxHashMap<String, FactionSet>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl Castability {
    pub fn new(taxonomy: Taxonomy) -> Self {
        Castability {
            taxonomy,
            cache: RwLock::new(FxHashMap::default()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    /// Set of factions able to pay `cost`
    pub fn who_can_play(&self, cost: &str) -> FactionSet {
        let cached = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(cost)
            .copied();
        if let Some(set) = cached {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return set;
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let set = self.compute(cost);
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(cost.to_string(), set);
        set
    }

    /// Whether one faction can pay `cost`
    pub fn can_play(&self, faction: FactionId, cost: &str) -> bool {
        self.who_can_play(cost).contains(faction)
    }

    /// Names of the factions able to pay `cost`, sorted alphabetically
    pub fn who_can_play_names(&self, cost: &str) -> Vec<&'static str> {
        self.taxonomy.names(self.who_can_play(cost))
    }

    /// Number of distinct cost strings cached so far
    pub fn cache_len(&self) -> usize {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn cache_hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn cache_misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    fn compute(&self, cost: &str) -> FactionSet {
        let mut can_play = self.taxonomy.all();

        for symbol in parse_cost(cost) {
            match self.payers(&symbol) {
                Payers::Anyone => {}
                Payers::Only(set) => can_play = can_play.intersection(&set),
                // Nothing pays colorless-specific mana; the rest of the cost is moot.
                Payers::NoOne => return FactionSet::empty(),
            }
        }

        can_play
    }

    fn payers(&self, symbol: &ManaSymbol<'_>) -> Payers {
        match symbol {
            ManaSymbol::Half(inner) => self.payers(inner),
            ManaSymbol::Colorless => Payers::NoOne,
            ManaSymbol::Generic(_)
            | ManaSymbol::Variable
            | ManaSymbol::Phyrexian
            | ManaSymbol::GenericHybrid => Payers::Anyone,
            ManaSymbol::Colored(token) => match self.taxonomy.resolve(token) {
                Some(id) => Payers::Only(self.taxonomy.membership(id)),
                None => {
                    tracing::debug!(token = %token, "unrecognized mana symbol, no constraint");
                    Payers::Anyone
                }
            },
            ManaSymbol::Hybrid(tokens) => {
                let mut payers = FactionSet::empty();
                for token in tokens {
                    match self.taxonomy.resolve(token) {
                        Some(id) => payers = payers.union(&self.taxonomy.membership(id)),
                        None => {
                            tracing::debug!(
                                token = %token,
                                "unrecognized hybrid half, no constraint"
                            );
                            return Payers::Anyone;
                        }
                    }
                }
                Payers::Only(payers)
            }
        }
    }

    /// One regression assertion per faction, plus the colorless and
    /// colorless-hybrid edge cases
    pub fn regression_fixture(&self) -> Vec<FixtureCase> {
        let mut costs: Vec<String> = self
            .taxonomy
            .all()
            .iter()
            .map(|id| self.taxonomy.name(id).to_string())
            .collect();
        costs.push("{8}{C}{C}".to_string());
        costs.push("{1}{P/C}".to_string());

        costs
            .into_iter()
            .map(|cost| {
                let expected = self.who_can_play_names(&cost);
                FixtureCase { cost, expected }
            })
            .collect()
    }

    /// The regression fixture as Rust test source
    pub fn render_regression_fixture(&self) -> String {
        let mut out = String::from(
            "use cubealyzer::core::{Castability, Taxonomy};\n\n\
             #[test]\n\
             fn test_who_can_play_regression() {\n    \
             let castability = Castability::new(Taxonomy::standard().unwrap());\n",
        );
        for case in self.regression_fixture() {
            out.push_str(&format!("    {case}\n"));
        }
        out.push_str("}\n");
        out
    }
}

enum Payers {
    Anyone,
    NoOne,
    Only(FactionSet),
}

/// A single `who_can_play(cost) == expected` assertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureCase {
    pub cost: String,
    pub expected: Vec<&'static str>,
}

impl fmt::Display for FixtureCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.expected.is_empty() {
            write!(
                f,
                "assert_eq!(castability.who_can_play_names({:?}), Vec::<&str>::new());",
                self.cost
            )
        } else {
            write!(
                f,
                "assert_eq!(castability.who_can_play_names({:?}), vec!{:?});",
                self.cost, self.expected
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::faction::Tier;

    fn engine() -> Castability {
        Castability::new(Taxonomy::standard().unwrap())
    }

    #[test]
    fn test_empty_cost_is_free_for_everyone() {
        let engine = engine();
        assert_eq!(engine.who_can_play(""), engine.taxonomy().all());
        assert_eq!(engine.who_can_play("{0}"), engine.taxonomy().all());
    }

    #[test]
    fn test_colorless_cost_is_unpayable() {
        let engine = engine();
        assert!(engine.who_can_play("{8}{C}{C}").is_empty());
        assert!(engine.who_can_play("{C}{W}").is_empty());
        assert!(engine.who_can_play("{HC}").is_empty());
    }

    #[test]
    fn test_generic_hybrids_are_unconstrained() {
        let engine = engine();
        let all = engine.taxonomy().all();
        assert_eq!(engine.who_can_play("{1}{P/C}"), all);
        assert_eq!(engine.who_can_play("{2/W}{2/W}{2/W}"), all);
        assert_eq!(engine.who_can_play("{W/P}"), all);
        assert_eq!(engine.who_can_play("{X}{X}"), all);
    }

    #[test]
    fn test_single_colors() {
        let engine = engine();
        let tax = engine.taxonomy();
        assert_eq!(engine.who_can_play("{R}"), tax.member_of("red").unwrap());
        assert_eq!(engine.who_can_play("{2}{r}"), tax.member_of("red").unwrap());
        assert_eq!(engine.who_can_play("{HW}"), tax.member_of("white").unwrap());
    }

    #[test]
    fn test_half_marker_ignores_case() {
        let engine = engine();
        let white = engine.who_can_play("{W}");
        assert_eq!(white.len(), 15);
        assert_eq!(engine.who_can_play("{hw}"), white);
        assert_eq!(engine.who_can_play("{hW}"), white);
        assert_eq!(engine.who_can_play("{Hw}"), white);
        assert!(engine.who_can_play("{hc}").is_empty());
        assert_eq!(engine.who_can_play("{h2}"), engine.taxonomy().all());
    }

    #[test]
    fn test_two_colors_narrow_to_guild_and_up() {
        let engine = engine();
        assert_eq!(
            engine.who_can_play_names("{1}{U}{B}"),
            vec!["artifice", "chaos", "dimir", "esper", "grixis", "growth", "sultai"]
        );
        assert_eq!(
            engine.who_can_play_names("{W}{U}{G}"),
            vec!["altruism", "bant", "growth"]
        );
    }

    #[test]
    fn test_hybrid_is_union_of_its_colors() {
        let engine = engine();
        let tax = engine.taxonomy();
        let expected = tax
            .member_of("red")
            .unwrap()
            .union(&tax.member_of("green").unwrap());
        assert_eq!(engine.who_can_play("{R/G}"), expected);
        assert_eq!(engine.who_can_play("{R/G}{R/G}"), expected);

        // Hybrid plus a hard color requirement
        let with_white = expected.intersection(&tax.member_of("white").unwrap());
        assert_eq!(engine.who_can_play("{R/G}{W}"), with_white);
        assert!(with_white.contains(tax.id_of("boros").unwrap()));
        assert!(with_white.contains(tax.id_of("selesnya").unwrap()));
        assert!(!with_white.contains(tax.id_of("azorius").unwrap()));
    }

    #[test]
    fn test_unknown_symbols_do_not_constrain() {
        let engine = engine();
        let all = engine.taxonomy().all();
        assert_eq!(engine.who_can_play("{S}"), all);
        assert_eq!(engine.who_can_play("{Q/W}"), all);
        assert_eq!(engine.who_can_play("{S}{B}"), engine.who_can_play("{B}"));
    }

    #[test]
    fn test_faction_name_as_cost_includes_itself() {
        let engine = engine();
        let tax = engine.taxonomy();
        for tier in Tier::ALL {
            for id in tax.ids_in_tier(tier) {
                let name = tax.name(id);
                assert!(engine.can_play(id, name), "{name} cannot play itself");
            }
        }
        for id in tax.ids_in_tier(Tier::Nephilim) {
            assert_eq!(engine.who_can_play_names(tax.name(id)), vec![tax.name(id)]);
        }
    }

    #[test]
    fn test_guild_name_cost_matches_its_colors() {
        let engine = engine();
        let tax = engine.taxonomy();
        for id in tax.ids_in_tier(Tier::Guild) {
            let colors = tax.faction(id).colors();
            let cost: String = colors.iter().map(|c| format!("{{{c}}}")).collect();
            assert_eq!(engine.who_can_play(&cost), engine.who_can_play(tax.name(id)));
        }
    }

    #[test]
    fn test_results_are_cached() {
        let engine = engine();
        let first = engine.who_can_play("{2}{G}{G}");
        assert_eq!(engine.cache_misses(), 1);
        assert_eq!(engine.cache_hits(), 0);

        let second = engine.who_can_play("{2}{G}{G}");
        assert_eq!(first, second);
        assert_eq!(engine.cache_misses(), 1);
        assert_eq!(engine.cache_hits(), 1);
        assert_eq!(engine.cache_len(), 1);
    }

    #[test]
    fn test_concurrent_lookups_agree() {
        let engine = engine();
        let costs = ["{W}", "{1}{U/B}", "{G}{G}", "{8}{C}{C}", ""];
        let expected: Vec<_> = costs
            .iter()
            .map(|c| Castability::new(Taxonomy::standard().unwrap()).who_can_play(c))
            .collect();

        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for (cost, want) in costs.iter().zip(&expected) {
                        assert_eq!(engine.who_can_play(cost), *want);
                    }
                });
            }
        });
        assert_eq!(engine.cache_len(), costs.len());
    }

    #[test]
    fn test_regression_fixture() {
        let engine = engine();
        let fixture = engine.regression_fixture();
        assert_eq!(fixture.len(), engine.taxonomy().len() + 2);

        let bant = fixture.iter().find(|c| c.cost == "bant").unwrap();
        assert_eq!(bant.expected, vec!["altruism", "bant", "growth"]);
        assert_eq!(
            bant.to_string(),
            r#"assert_eq!(castability.who_can_play_names("bant"), vec!["altruism", "bant", "growth"]);"#
        );

        let eldrazi = fixture.iter().find(|c| c.cost == "{8}{C}{C}").unwrap();
        assert!(eldrazi.expected.is_empty());
        assert!(eldrazi.to_string().ends_with("Vec::<&str>::new());"));

        let source = engine.render_regression_fixture();
        assert!(source.contains("fn test_who_can_play_regression()"));
        assert_eq!(source.matches("assert_eq!").count(), fixture.len());
    }
}
