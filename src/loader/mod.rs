//! Card and cube loaders
//!
//! CSV cube lists, the JSON card cache and the remote catalog that fills it

pub mod cache;
pub mod catalog;
pub mod cube;

pub use cache::{CardCache, CardSource};
pub use catalog::{CatalogClient, FetchSummary};
pub use cube::{CardCollection, CubeLoader};
