//! Domain layer.

pub mod decision;

pub use decision::RevealDecision;
