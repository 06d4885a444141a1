//! Curve analysis over a cube

pub mod curve;
pub mod predicate;

pub use curve::{Curve, CurveBuilder, FactionTable, TypeFilter};
pub use predicate::{
    all_match, CardPredicate, HasSubtype, HasType, NonlandPermanent, PlayableBy, Predicate,
};
