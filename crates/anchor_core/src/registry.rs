//! Anchor registry: the set of active anchor locations.
//!
//! The registry is an owned value shared by handle (`Arc<AnchorRegistry>`)
//! between the event handlers and the distortion scheduler. Membership is
//! sharded through a [`DashSet`], so mutation from the event side and the
//! self-healing removal inside a cycle never observe a torn set.
//!
//! Cycles never iterate the live set. They take a [`snapshot_all`]
//! copy first, so removals during the cycle cannot skip or revisit entries.
//!
//! [`snapshot_all`]: AnchorRegistry::snapshot_all

use dashmap::DashSet;
use tracing::{debug, info};

use crate::location::Location;

/// The set of currently active anchors.
#[derive(Debug, Default)]
pub struct AnchorRegistry {
    anchors: DashSet<Location>,
}

impl AnchorRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            anchors: DashSet::new(),
        }
    }

    /// Mark `location` as an active anchor.
    ///
    /// Returns `true` if the location was not already active. Adding an
    /// active location again changes nothing.
    pub fn add(&self, location: Location) -> bool {
        let inserted = self.anchors.insert(location);
        if inserted {
            info!(
                world = %location.world,
                x = location.x(),
                y = location.y(),
                z = location.z(),
                "anchor activated"
            );
        } else {
            debug!(%location, "anchor already active");
        }
        inserted
    }

    /// Remove `location` from the active set.
    ///
    /// Returns `true` if it was active. Callers use the result to decide
    /// whether to report anything to the acting user.
    pub fn remove(&self, location: &Location) -> bool {
        let removed = self.anchors.remove(location).is_some();
        if removed {
            info!(
                world = %location.world,
                x = location.x(),
                y = location.y(),
                z = location.z(),
                "anchor deactivated"
            );
        }
        removed
    }

    /// Returns `true` if `location` is an active anchor.
    #[must_use]
    pub fn contains(&self, location: &Location) -> bool {
        self.anchors.contains(location)
    }

    /// Copy the current members out for one cycle.
    ///
    /// The returned vector is detached from the registry: later additions or
    /// removals do not affect it.
    #[must_use]
    pub fn snapshot_all(&self) -> Vec<Location> {
        self.anchors.iter().map(|entry| *entry.key()).collect()
    }

    /// Returns the number of active anchors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    /// Returns `true` if no anchor is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    /// Remove every anchor, returning how many were active.
    pub fn clear(&self) -> usize {
        let count = self.anchors.len();
        self.anchors.clear();
        count
    }
}
