//! Plain-text reports of counts and curves

use crate::analysis::{CurveBuilder, FactionTable, TypeFilter};
use crate::core::Tier;
use crate::Result;
use std::fmt::Write;

/// Width of the faction name column
const NAME_WIDTH: usize = 12;

/// Total cards each of `factions` can play
pub fn card_counts(builder: &CurveBuilder<'_>, factions: &[&str]) -> Result<String> {
    let mut out = String::from("Total cards playable in:\n");
    for name in sorted(factions) {
        let count = builder.card_count(name)?;
        let _ = writeln!(out, "{name:NAME_WIDTH$}{count}");
    }
    Ok(out)
}

/// Cards of one type each of `factions` can play
pub fn type_counts(
    builder: &CurveBuilder<'_>,
    tier: Tier,
    factions: &[&str],
    card_type: &TypeFilter,
) -> Result<String> {
    let mut out = format!("Cards of type {card_type} playable per {tier} in:\n");
    for name in sorted(factions) {
        let count = builder.type_count(name, card_type)?;
        let _ = writeln!(out, "{name:NAME_WIDTH$}{count}");
    }
    Ok(out)
}

/// One line per faction: `name  cmc:count cmc:count ...`
pub fn curve_table(table: &FactionTable, card_type: &TypeFilter) -> String {
    let mut out = format!("Cards of type {card_type} at each cost in:\n");
    for (faction, curve) in table {
        let _ = write!(out, "{faction:NAME_WIDTH$}");
        for (cmc, count) in curve {
            let _ = write!(out, "{cmc}:{count:2} ");
        }
        out.push('\n');
    }
    out
}

fn sorted<'a>(names: &[&'a str]) -> Vec<&'a str> {
    let mut names = names.to_vec();
    names.sort_unstable();
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Curve;
    use crate::core::{Card, Castability, Cmc, Taxonomy};
    use crate::loader::{CardCache, CardCollection};

    #[test]
    fn test_curve_table_layout() {
        let mut table = FactionTable::new();
        let mut red = Curve::new();
        red.insert(Cmc::from(1u32), 3);
        red.insert(Cmc::from(2u32), 12);
        table.insert("red", red);
        table.insert("blue", Curve::new());

        let text = curve_table(&table, &TypeFilter::parse("creature"));
        assert_eq!(
            text,
            "Cards of type creature at each cost in:\n\
             blue        \n\
             red         1: 3 2:12 \n"
        );
    }

    #[test]
    fn test_counts_are_sorted_by_faction() {
        let castability = Castability::new(Taxonomy::standard().unwrap());
        let mut cards = CardCache::new();
        cards.insert("Shock", Card::new("Shock", "{R}", 1).with_types(&["instant"]));
        cards.insert("Opt", Card::new("Opt", "{U}", 1).with_types(&["instant"]));
        let cube: CardCollection = ["Shock", "Shock", "Opt"].into_iter().collect();
        let builder = CurveBuilder::new(&cube, &cards, &castability);
        let colors = castability.taxonomy().factions(Tier::Color);

        let text = card_counts(&builder, &colors).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Total cards playable in:");
        assert_eq!(lines[1], "black       0");
        assert_eq!(lines[2], "blue        1");
        assert_eq!(lines[4], "red         2");

        let instants = TypeFilter::parse("instant");
        let text = type_counts(&builder, Tier::Color, &colors, &instants).unwrap();
        assert!(text.starts_with("Cards of type instant playable per colors in:\n"));
        assert!(text.contains("red         2\n"));
    }
}
