//! Entity handles.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An opaque handle to an entity owned by the host world.
///
/// The core never inspects entities directly; it passes these handles back to
/// the [`WorldHost`](crate::WorldHost) for every query and mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    /// Allocate a fresh random entity handle.
    #[must_use]
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}
