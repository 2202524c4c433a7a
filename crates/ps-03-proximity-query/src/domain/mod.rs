//! Domain layer.

pub mod value_objects;

pub use value_objects::{NearbyQuery, NearbyResult, QueryTier};
