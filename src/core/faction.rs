//! Faction taxonomy and membership resolution
//!
//! The taxonomy is a fixed table of 30 factions across five tiers: the five
//! colors, the ten two-color guilds, the five shards (a color and its two
//! allies), the five wedges (a color and its two enemies) and the five
//! four-color nephilim. Every multi-color faction declares the factions it is
//! built from; those declarations are checked against plain color-subset
//! inclusion when the taxonomy is constructed.

use crate::{CubeError, Result};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The five colors of Magic, in color-wheel order (WUBRG)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Color {
    White,
    Blue,
    Black,
    Red,
    Green,
}

impl Color {
    /// All colors in wheel order. Adjacent entries (wrapping) are allies.
    pub const ALL: [Color; 5] = [
        Color::White,
        Color::Blue,
        Color::Black,
        Color::Red,
        Color::Green,
    ];

    /// Position on the color wheel
    pub fn wheel_index(self) -> usize {
        self as usize
    }

    /// Faction name of this color ("white", "blue", ...)
    pub fn name(self) -> &'static str {
        match self {
            Color::White => "white",
            Color::Blue => "blue",
            Color::Black => "black",
            Color::Red => "red",
            Color::Green => "green",
        }
    }

    /// Parse the single-letter shorthand used in mana costs (case-insensitive)
    pub fn from_shorthand(c: char) -> Option<Color> {
        match c.to_ascii_lowercase() {
            'w' => Some(Color::White),
            'u' => Some(Color::Blue),
            'b' => Some(Color::Black),
            'r' => Some(Color::Red),
            'g' => Some(Color::Green),
            _ => None,
        }
    }

    fn bit(self) -> u8 {
        1 << self.wheel_index()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "W"),
            Color::Blue => write!(f, "U"),
            Color::Black => write!(f, "B"),
            Color::Red => write!(f, "R"),
            Color::Green => write!(f, "G"),
        }
    }
}

/// A set of colors, stored as a bitmask in wheel order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ColorSet(u8);

impl ColorSet {
    pub fn empty() -> Self {
        ColorSet(0)
    }

    pub fn from_colors(colors: &[Color]) -> Self {
        ColorSet(colors.iter().fold(0, |bits, c| bits | c.bit()))
    }

    pub fn insert(&mut self, color: Color) {
        self.0 |= color.bit();
    }

    pub fn contains(&self, color: Color) -> bool {
        self.0 & color.bit() != 0
    }

    pub fn is_subset(&self, other: &ColorSet) -> bool {
        self.0 & !other.0 == 0
    }

    pub fn union(&self, other: &ColorSet) -> ColorSet {
        ColorSet(self.0 | other.0)
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Colors in wheel order
    pub fn iter(&self) -> impl Iterator<Item = Color> + '_ {
        Color::ALL.into_iter().filter(move |c| self.contains(*c))
    }
}

impl fmt::Display for ColorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for color in self.iter() {
            write!(f, "{color}")?;
        }
        Ok(())
    }
}

/// Cardinality class of a faction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    Color,
    Guild,
    Shard,
    Wedge,
    Nephilim,
}

impl Tier {
    pub const ALL: [Tier; 5] = [
        Tier::Color,
        Tier::Guild,
        Tier::Shard,
        Tier::Wedge,
        Tier::Nephilim,
    ];

    /// Single-letter tag used on the command line
    pub fn code(self) -> char {
        match self {
            Tier::Color => 'c',
            Tier::Guild => 'g',
            Tier::Shard => 's',
            Tier::Wedge => 'w',
            Tier::Nephilim => 'n',
        }
    }

    /// Plural display name ("colors", "guilds", ...)
    pub fn display_name(self) -> &'static str {
        match self {
            Tier::Color => "colors",
            Tier::Guild => "guilds",
            Tier::Shard => "shards",
            Tier::Wedge => "wedges",
            Tier::Nephilim => "nephilim",
        }
    }

    /// Number of colors every faction of this tier has
    pub fn color_count(self) -> usize {
        match self {
            Tier::Color => 1,
            Tier::Guild => 2,
            Tier::Shard | Tier::Wedge => 3,
            Tier::Nephilim => 4,
        }
    }

    /// Number of factions the standard taxonomy has in this tier
    pub fn faction_count(self) -> usize {
        match self {
            Tier::Guild => 10,
            _ => 5,
        }
    }

    /// Tiers a faction of this tier must declare as components
    fn component_tiers(self) -> &'static [Tier] {
        match self {
            Tier::Color => &[],
            Tier::Guild => &[Tier::Color],
            Tier::Shard | Tier::Wedge => &[Tier::Guild],
            Tier::Nephilim => &[Tier::Color, Tier::Guild, Tier::Shard, Tier::Wedge],
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for Tier {
    type Err = CubeError;

    fn from_str(s: &str) -> Result<Self> {
        let lowered = s.trim().to_lowercase();
        Tier::ALL
            .into_iter()
            .find(|tier| {
                lowered.len() == 1 && lowered.starts_with(tier.code())
                    || lowered == tier.display_name()
                    || lowered == format!("{tier:?}").to_lowercase()
            })
            .ok_or_else(|| CubeError::UnknownTier(s.to_string()))
    }
}

/// Index of a faction within its taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FactionId(u8);

impl FactionId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// A set of factions, stored as a bitmask over faction ids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FactionSet(u32);

impl FactionSet {
    pub fn empty() -> Self {
        FactionSet(0)
    }

    pub fn insert(&mut self, id: FactionId) {
        self.0 |= 1 << id.0;
    }

    pub fn contains(&self, id: FactionId) -> bool {
        self.0 & (1 << id.0) != 0
    }

    pub fn intersection(&self, other: &FactionSet) -> FactionSet {
        FactionSet(self.0 & other.0)
    }

    pub fn union(&self, other: &FactionSet) -> FactionSet {
        FactionSet(self.0 | other.0)
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = FactionId> + '_ {
        (0..u32::BITS as u8)
            .map(FactionId)
            .filter(move |id| self.contains(*id))
    }
}

impl FromIterator<FactionId> for FactionSet {
    fn from_iter<I: IntoIterator<Item = FactionId>>(iter: I) -> Self {
        let mut set = FactionSet::empty();
        for id in iter {
            set.insert(id);
        }
        set
    }
}

/// One row of a literal faction table
#[derive(Debug, Clone, Copy)]
pub struct FactionDef {
    pub name: &'static str,
    pub tier: Tier,
    pub colors: &'static [Color],
    /// Lower-tier factions this faction is built from
    pub components: &'static [&'static str],
}

use Color::{Black as B, Blue as U, Green as G, Red as R, White as W};

const fn color(name: &'static str, c: &'static [Color]) -> FactionDef {
    FactionDef {
        name,
        tier: Tier::Color,
        colors: c,
        components: &[],
    }
}

const fn guild(
    name: &'static str,
    colors: &'static [Color],
    components: &'static [&'static str],
) -> FactionDef {
    FactionDef {
        name,
        tier: Tier::Guild,
        colors,
        components,
    }
}

/// The standard faction table
pub static STANDARD_FACTIONS: &[FactionDef] = &[
    color("white", &[W]),
    color("blue", &[U]),
    color("black", &[B]),
    color("red", &[R]),
    color("green", &[G]),
    guild("azorius", &[W, U], &["white", "blue"]),
    guild("boros", &[W, R], &["white", "red"]),
    guild("dimir", &[U, B], &["blue", "black"]),
    guild("golgari", &[B, G], &["black", "green"]),
    guild("gruul", &[R, G], &["red", "green"]),
    guild("izzet", &[U, R], &["blue", "red"]),
    guild("orzhov", &[W, B], &["white", "black"]),
    guild("rakdos", &[B, R], &["black", "red"]),
    guild("selesnya", &[W, G], &["white", "green"]),
    guild("simic", &[U, G], &["blue", "green"]),
    FactionDef {
        name: "bant",
        tier: Tier::Shard,
        colors: &[W, U, G],
        components: &["azorius", "selesnya", "simic"],
    },
    FactionDef {
        name: "naya",
        tier: Tier::Shard,
        colors: &[W, R, G],
        components: &["boros", "selesnya", "gruul"],
    },
    FactionDef {
        name: "grixis",
        tier: Tier::Shard,
        colors: &[U, B, R],
        components: &["dimir", "izzet", "rakdos"],
    },
    FactionDef {
        name: "esper",
        tier: Tier::Shard,
        colors: &[W, U, B],
        components: &["azorius", "dimir", "orzhov"],
    },
    FactionDef {
        name: "jund",
        tier: Tier::Shard,
        colors: &[B, R, G],
        components: &["golgari", "gruul", "rakdos"],
    },
    FactionDef {
        name: "abzan",
        tier: Tier::Wedge,
        colors: &[W, B, G],
        components: &["golgari", "orzhov", "selesnya"],
    },
    FactionDef {
        name: "jeskai",
        tier: Tier::Wedge,
        colors: &[W, U, R],
        components: &["azorius", "boros", "izzet"],
    },
    FactionDef {
        name: "mardu",
        tier: Tier::Wedge,
        colors: &[W, B, R],
        components: &["boros", "orzhov", "rakdos"],
    },
    FactionDef {
        name: "sultai",
        tier: Tier::Wedge,
        colors: &[U, B, G],
        components: &["dimir", "golgari", "simic"],
    },
    FactionDef {
        name: "temur",
        tier: Tier::Wedge,
        colors: &[U, R, G],
        components: &["gruul", "izzet", "simic"],
    },
    FactionDef {
        name: "aggression",
        tier: Tier::Nephilim,
        colors: &[W, B, R, G],
        components: &[
            "white", "black", "red", "green",
            "boros", "golgari", "gruul", "orzhov", "rakdos", "selesnya",
            "naya", "jund",
            "abzan", "mardu",
        ],
    },
    FactionDef {
        name: "altruism",
        tier: Tier::Nephilim,
        colors: &[W, U, R, G],
        components: &[
            "white", "blue", "red", "green",
            "azorius", "boros", "gruul", "izzet", "selesnya", "simic",
            "bant", "naya",
            "jeskai", "temur",
        ],
    },
    FactionDef {
        name: "artifice",
        tier: Tier::Nephilim,
        colors: &[W, U, B, R],
        components: &[
            "white", "blue", "black", "red",
            "azorius", "boros", "dimir", "izzet", "orzhov", "rakdos",
            "grixis", "esper",
            "jeskai", "mardu",
        ],
    },
    FactionDef {
        name: "chaos",
        tier: Tier::Nephilim,
        colors: &[U, B, R, G],
        components: &[
            "blue", "black", "red", "green",
            "dimir", "golgari", "gruul", "izzet", "rakdos", "simic",
            "grixis", "jund",
            "sultai", "temur",
        ],
    },
    FactionDef {
        name: "growth",
        tier: Tier::Nephilim,
        colors: &[W, U, B, G],
        components: &[
            "white", "blue", "black", "green",
            "azorius", "dimir", "golgari", "orzhov", "selesnya", "simic",
            "bant", "esper",
            "abzan", "sultai",
        ],
    },
];

/// A faction of a built taxonomy
#[derive(Debug, Clone)]
pub struct Faction {
    name: &'static str,
    tier: Tier,
    colors: ColorSet,
    components: FactionSet,
}

impl Faction {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn colors(&self) -> ColorSet {
        self.colors
    }

    /// Declared (direct) components
    pub fn components(&self) -> FactionSet {
        self.components
    }
}

/// Immutable faction taxonomy with precomputed memberships
///
/// Built once at startup; all access goes through read-only accessors.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    factions: Vec<Faction>,
    by_name: FxHashMap<&'static str, FactionId>,
    /// memberships[i] = every faction that transitively contains faction i (including i)
    memberships: Vec<FactionSet>,
    all: FactionSet,
}

impl Taxonomy {
    /// Build the standard 30-faction taxonomy
    pub fn standard() -> Result<Self> {
        Self::from_table(STANDARD_FACTIONS)
    }

    /// Build and validate a taxonomy from a literal table
    pub fn from_table(table: &[FactionDef]) -> Result<Self> {
        if table.len() > u32::BITS as usize {
            return Err(inconsistent(format!(
                "{} factions do not fit in a faction set",
                table.len()
            )));
        }

        let mut factions = Vec::with_capacity(table.len());
        let mut by_name = FxHashMap::default();

        for (index, def) in table.iter().enumerate() {
            if def.name.is_empty() || def.name != def.name.to_lowercase() {
                return Err(inconsistent(format!(
                    "faction name '{}' must be non-empty lowercase",
                    def.name
                )));
            }
            if by_name.insert(def.name, FactionId(index as u8)).is_some() {
                return Err(inconsistent(format!("duplicate faction '{}'", def.name)));
            }

            let colors = ColorSet::from_colors(def.colors);
            if colors.len() != def.colors.len() || colors.len() != def.tier.color_count() {
                return Err(inconsistent(format!(
                    "{} '{}' must have {} distinct colors, found {:?}",
                    def.tier,
                    def.name,
                    def.tier.color_count(),
                    def.colors
                )));
            }

            factions.push(Faction {
                name: def.name,
                tier: def.tier,
                colors,
                components: FactionSet::empty(),
            });
        }

        for tier in Tier::ALL {
            let count = factions.iter().filter(|f| f.tier == tier).count();
            if count != tier.faction_count() {
                return Err(inconsistent(format!(
                    "expected {} {}, found {}",
                    tier.faction_count(),
                    tier,
                    count
                )));
            }
        }

        for (i, a) in factions.iter().enumerate() {
            if let Some(b) = factions[i + 1..].iter().find(|b| b.colors == a.colors) {
                return Err(inconsistent(format!(
                    "'{}' and '{}' share the color set {}",
                    a.name, b.name, a.colors
                )));
            }
            check_wheel_rule(a)?;
        }

        for (index, def) in table.iter().enumerate() {
            factions[index].components = resolve_components(def, &factions, &by_name)?;
        }

        let memberships = compute_memberships(&factions);

        // The declared component graph must agree with color-subset inclusion.
        for (index, faction) in factions.iter().enumerate() {
            let by_colors: FactionSet = factions
                .iter()
                .enumerate()
                .filter(|(_, other)| faction.colors.is_subset(&other.colors))
                .map(|(j, _)| FactionId(j as u8))
                .collect();
            if by_colors != memberships[index] {
                return Err(inconsistent(format!(
                    "membership of '{}' through declared components differs from color inclusion",
                    faction.name
                )));
            }
        }

        let all = (0..factions.len()).map(|i| FactionId(i as u8)).collect();

        Ok(Taxonomy {
            factions,
            by_name,
            memberships,
            all,
        })
    }

    /// Number of factions
    pub fn len(&self) -> usize {
        self.factions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factions.is_empty()
    }

    /// Every faction in the taxonomy
    pub fn all(&self) -> FactionSet {
        self.all
    }

    pub fn faction(&self, id: FactionId) -> &Faction {
        &self.factions[id.index()]
    }

    pub fn name(&self, id: FactionId) -> &'static str {
        self.factions[id.index()].name
    }

    /// Resolve a faction name, color shorthand letter or `mono_` color name
    ///
    /// Returns None for anything that is not in the table.
    pub fn resolve(&self, token: &str) -> Option<FactionId> {
        let lowered = token.trim().to_lowercase();
        let name = lowered.strip_prefix("mono_").unwrap_or(&lowered);

        let mut chars = name.chars();
        let name = match (chars.next(), chars.next()) {
            (Some(c), None) => Color::from_shorthand(c)?.name(),
            _ => name,
        };

        self.by_name.get(name).copied()
    }

    /// Look up a faction, failing on unknown names
    pub fn id_of(&self, name: &str) -> Result<FactionId> {
        self.resolve(name)
            .ok_or_else(|| CubeError::UnknownFaction(name.to_string()))
    }

    /// Faction ids of one tier, in table order
    pub fn ids_in_tier(&self, tier: Tier) -> impl Iterator<Item = FactionId> + '_ {
        self.factions
            .iter()
            .enumerate()
            .filter(move |(_, f)| f.tier == tier)
            .map(|(i, _)| FactionId(i as u8))
    }

    /// Faction names of one tier, in table order
    pub fn factions(&self, tier: Tier) -> Vec<&'static str> {
        self.ids_in_tier(tier).map(|id| self.name(id)).collect()
    }

    /// Colors a faction represents
    pub fn colors_of(&self, name: &str) -> Result<ColorSet> {
        Ok(self.faction(self.id_of(name)?).colors)
    }

    /// Factions of `target` tier that the named faction contains
    ///
    /// Empty when `target` is not below the faction's own tier.
    pub fn components_of(&self, name: &str, target: Tier) -> Result<Vec<&'static str>> {
        let id = self.id_of(name)?;
        Ok(self
            .ids_in_tier(target)
            .filter(|&other| other != id && self.memberships[other.index()].contains(id))
            .map(|other| self.name(other))
            .collect())
    }

    /// Every faction that transitively contains the named faction, itself included
    pub fn member_of(&self, name: &str) -> Result<FactionSet> {
        Ok(self.membership(self.id_of(name)?))
    }

    pub fn membership(&self, id: FactionId) -> FactionSet {
        self.memberships[id.index()]
    }

    /// Names in a set, sorted alphabetically
    pub fn names(&self, set: FactionSet) -> Vec<&'static str> {
        let mut names: Vec<_> = set.iter().map(|id| self.name(id)).collect();
        names.sort_unstable();
        names
    }
}

fn inconsistent(message: String) -> CubeError {
    CubeError::InconsistentTaxonomy(message)
}

/// Shards are a color with both allies, wedges a color with both enemies
fn check_wheel_rule(faction: &Faction) -> Result<()> {
    let offsets: [usize; 2] = match faction.tier {
        Tier::Shard => [1, 4],
        Tier::Wedge => [2, 3],
        _ => return Ok(()),
    };

    let matches = Color::ALL.into_iter().any(|center| {
        let i = center.wheel_index();
        let expected = ColorSet::from_colors(&[
            center,
            Color::ALL[(i + offsets[0]) % 5],
            Color::ALL[(i + offsets[1]) % 5],
        ]);
        expected == faction.colors
    });

    if matches {
        Ok(())
    } else {
        Err(inconsistent(format!(
            "{} '{}' ({}) breaks the color wheel rule for its tier",
            faction.tier, faction.name, faction.colors
        )))
    }
}

fn resolve_components(
    def: &FactionDef,
    factions: &[Faction],
    by_name: &FxHashMap<&'static str, FactionId>,
) -> Result<FactionSet> {
    let own_colors = ColorSet::from_colors(def.colors);
    let mut declared = FactionSet::empty();

    for &component in def.components {
        let id = *by_name.get(component).ok_or_else(|| {
            inconsistent(format!("'{}' lists unknown component '{}'", def.name, component))
        })?;
        if declared.contains(id) {
            return Err(inconsistent(format!(
                "'{}' lists component '{}' more than once",
                def.name, component
            )));
        }

        let found = &factions[id.index()];
        if !def.tier.component_tiers().contains(&found.tier) {
            return Err(inconsistent(format!(
                "{} '{}' cannot contain {} '{}'",
                def.tier, def.name, found.tier, found.name
            )));
        }
        if !found.colors.is_subset(&own_colors) {
            return Err(inconsistent(format!(
                "'{}' ({}) lists '{}' ({}) whose colors it does not have",
                def.name, own_colors, found.name, found.colors
            )));
        }
        declared.insert(id);
    }

    // Every lower-tier faction covered by our colors must be declared.
    for &tier in def.tier.component_tiers() {
        for (index, other) in factions.iter().enumerate() {
            let id = FactionId(index as u8);
            if other.tier == tier && other.colors.is_subset(&own_colors) && !declared.contains(id) {
                return Err(inconsistent(format!(
                    "'{}' is missing component '{}'",
                    def.name, other.name
                )));
            }
        }
    }

    Ok(declared)
}

/// Upward closure over the declared component graph
fn compute_memberships(factions: &[Faction]) -> Vec<FactionSet> {
    let mut parents = vec![FactionSet::empty(); factions.len()];
    for (index, faction) in factions.iter().enumerate() {
        for component in faction.components.iter() {
            parents[component.index()].insert(FactionId(index as u8));
        }
    }

    (0..factions.len())
        .map(|start| {
            let mut members = FactionSet::empty();
            let mut stack = vec![FactionId(start as u8)];
            while let Some(id) = stack.pop() {
                if members.contains(id) {
                    continue;
                }
                members.insert(id);
                stack.extend(parents[id.index()].iter());
            }
            members
        })
        .collect()
}
