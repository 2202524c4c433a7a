//! Domain layer: lifecycle state machine, events and input validation.

pub mod description;
pub mod events;
pub mod state;

pub use description::normalize_description;
pub use events::LifecycleEvent;
pub use state::LifecycleState;
