//! # Collaborator Ports
//!
//! Driven ports for the device-side collaborators every subsystem reads
//! from: identity, position and local preferences, plus the in-process
//! implementations a client session wires in.

use crate::entities::{Coordinates, Identity};
use crate::preferences::LocalPreferences;
use parking_lot::RwLock;

/// Identity provider (authentication lives outside the engine).
pub trait IdentityProvider: Send + Sync {
    /// The signed-in identity, if any.
    fn current_identity(&self) -> Option<Identity>;
}

/// Position provider.
pub trait PositionProvider: Send + Sync {
    /// Latest fix, if the device has one.
    fn current_position(&self) -> Option<Coordinates>;
}

/// Local preference store (read-only input).
pub trait PreferenceStore: Send + Sync {
    /// Current preferences.
    fn preferences(&self) -> LocalPreferences;
}

/// In-process identity holder; sign-in and sign-out swap the value.
#[derive(Debug, Default)]
pub struct SessionIdentity {
    current: RwLock<Option<Identity>>,
}

impl SessionIdentity {
    #[must_use]
    pub fn signed_in(identity: Identity) -> Self {
        Self {
            current: RwLock::new(Some(identity)),
        }
    }

    pub fn sign_in(&self, identity: Identity) {
        *self.current.write() = Some(identity);
    }

    pub fn sign_out(&self) {
        *self.current.write() = None;
    }
}

impl IdentityProvider for SessionIdentity {
    fn current_identity(&self) -> Option<Identity> {
        self.current.read().clone()
    }
}

/// Latest position fix pushed by the platform's location stream.
#[derive(Debug, Default)]
pub struct LatestPosition {
    fix: RwLock<Option<Coordinates>>,
}

impl LatestPosition {
    #[must_use]
    pub fn at(fix: Coordinates) -> Self {
        Self {
            fix: RwLock::new(Some(fix)),
        }
    }

    pub fn update(&self, fix: Coordinates) {
        *self.fix.write() = Some(fix);
    }

    pub fn clear(&self) {
        *self.fix.write() = None;
    }
}

impl PositionProvider for LatestPosition {
    fn current_position(&self) -> Option<Coordinates> {
        *self.fix.read()
    }
}

/// Preferences held in memory.
#[derive(Debug, Default)]
pub struct InMemoryPreferences {
    prefs: RwLock<LocalPreferences>,
}

impl InMemoryPreferences {
    #[must_use]
    pub fn new(prefs: LocalPreferences) -> Self {
        Self {
            prefs: RwLock::new(prefs),
        }
    }

    pub fn replace(&self, prefs: LocalPreferences) {
        *self.prefs.write() = prefs;
    }
}

impl PreferenceStore for InMemoryPreferences {
    fn preferences(&self) -> LocalPreferences {
        self.prefs.read().clone()
    }
}
