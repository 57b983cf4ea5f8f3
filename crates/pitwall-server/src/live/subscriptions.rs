//! Per-connection interest set.

use std::collections::HashSet;

use parking_lot::RwLock;
use pitwall_core::SensorIdentity;

/// The identities one live connection wants delivered.
///
/// Owned by a single connection: the control reader mutates it, the
/// deliverer only queries it. The identity triple is its own lookup key,
/// so equal identities always hit the same entry.
#[derive(Debug, Default)]
pub struct Subscriptions {
    keys: RwLock<HashSet<SensorIdentity>>,
}

impl Subscriptions {
    /// Empty set; nothing is delivered until the client tracks a sensor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start delivering readings for `identity`. Idempotent.
    pub fn track(&self, identity: SensorIdentity) {
        let _ = self.keys.write().insert(identity);
    }

    /// Stop delivering readings for `identity`.
    ///
    /// Removing an untracked identity is a no-op.
    pub fn untrack(&self, identity: &SensorIdentity) {
        let _ = self.keys.write().remove(identity);
    }

    /// Exact-membership test used by the deliverer to filter broadcasts.
    pub fn matches(&self, identity: &SensorIdentity) -> bool {
        self.keys.read().contains(identity)
    }

    /// Number of tracked identities.
    pub fn len(&self) -> usize {
        self.keys.read().len()
    }

    /// True when nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.keys.read().is_empty()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
