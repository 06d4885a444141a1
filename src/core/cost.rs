//! Mana cost parsing
//!
//! A cost string is a sequence of `{symbol}` groups such as `{2}{W}{U/B}`.
//! Parsing only splits the string into raw symbols; [`ManaSymbol::classify`]
//! decides what each one means.

use nom::{
    bytes::complete::{is_a, is_not},
    combinator::opt,
    multi::many0,
    sequence::preceded,
    IResult,
};
use smallvec::SmallVec;

/// Marker for the half-cost variant of a symbol (e.g. `{HW}`, `{hw}`)
const HALF_MARKER: [char; 2] = ['H', 'h'];

/// One run of non-brace characters, skipping any braces in front of it
fn raw_symbol(input: &str) -> IResult<&str, &str> {
    preceded(opt(is_a("{}")), is_not("{}"))(input)
}

/// Split a cost string into its raw symbols, left to right
///
/// Costs without braces are treated as a single symbol, so a bare faction
/// name like `"dimir"` parses as one symbol. Blank runs are dropped and
/// input that yields nothing is simply an empty cost.
pub fn parse_symbols(cost: &str) -> Vec<&str> {
    match many0(raw_symbol)(cost) {
        Ok((_rest, symbols)) => symbols
            .into_iter()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect(),
        Err(_) => Vec::new(),
    }
}

/// A classified mana symbol
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManaSymbol<'a> {
    /// Numeric generic mana, `{3}`
    Generic(u32),
    /// Variable generic mana, `{X}`
    Variable,
    /// Phyrexian mana, payable with life
    Phyrexian,
    /// Colorless-specific mana, `{C}`
    Colorless,
    /// A single color token: a shorthand letter or a faction name
    Colored(&'a str),
    /// Two or more color tokens joined by `/`
    Hybrid(SmallVec<[&'a str; 2]>),
    /// A hybrid with a half anyone can pay (`{2/W}`, `{W/P}`, `{C/G}`)
    GenericHybrid,
    /// Half-cost variant of another symbol, `{HW}`
    Half(Box<ManaSymbol<'a>>),
}

impl<'a> ManaSymbol<'a> {
    /// Classify a raw symbol produced by [`parse_symbols`]
    pub fn classify(raw: &'a str) -> ManaSymbol<'a> {
        let raw = raw.trim();

        if let Some(rest) = raw.strip_prefix(HALF_MARKER) {
            if is_halvable(rest) {
                return ManaSymbol::Half(Box::new(ManaSymbol::classify(rest)));
            }
        }

        if raw.contains('/') {
            let parts: SmallVec<[&str; 2]> = raw
                .split('/')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .collect();
            if parts.iter().any(|p| is_payable_by_anyone(p)) {
                return ManaSymbol::GenericHybrid;
            }
            return match parts.len() {
                0 => ManaSymbol::Generic(0),
                1 => ManaSymbol::Colored(parts[0]),
                _ => ManaSymbol::Hybrid(parts),
            };
        }

        if let Ok(amount) = raw.parse::<u32>() {
            return ManaSymbol::Generic(amount);
        }

        match raw {
            "X" | "x" | "Y" | "y" | "Z" | "z" => ManaSymbol::Variable,
            "P" | "p" => ManaSymbol::Phyrexian,
            "C" | "c" => ManaSymbol::Colorless,
            _ => ManaSymbol::Colored(raw),
        }
    }
}

/// What may follow a half marker: one letter, a number or a hybrid.
/// Longer words are left alone so a name starting with "h" is not split.
fn is_halvable(rest: &str) -> bool {
    let mut chars = rest.chars();
    match (chars.next(), chars.next()) {
        (None, _) => false,
        (Some(_), None) => true,
        _ => rest.chars().all(|c| c.is_ascii_digit()) || rest.contains('/'),
    }
}

/// Hybrid halves that never constrain who can pay
fn is_payable_by_anyone(part: &str) -> bool {
    part.chars().all(|c| c.is_ascii_digit())
        || matches!(part, "X" | "x" | "P" | "p" | "C" | "c")
}

/// Parse and classify a whole cost string
pub fn parse_cost(cost: &str) -> Vec<ManaSymbol<'_>> {
    parse_symbols(cost)
        .into_iter()
        .map(ManaSymbol::classify)
        .collect()
}
