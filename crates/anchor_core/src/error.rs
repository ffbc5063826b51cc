//! Core error types.

use crate::entity::EntityId;
use crate::location::WorldId;

/// Errors reported by a [`WorldHost`](crate::WorldHost) when a request
/// cannot be carried out.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HostError {
    /// The world is not loaded.
    #[error("world {0} is not loaded")]
    WorldNotLoaded(WorldId),

    /// The entity no longer exists.
    #[error("{0} no longer exists")]
    EntityGone(EntityId),

    /// The host refused the request.
    #[error("host rejected request: {0}")]
    Rejected(String),
}

/// A name that does not match any variant of a kind table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {category} name '{name}'")]
pub struct UnknownKind {
    /// The kind table that was searched (e.g. `"Material"`).
    pub category: &'static str,
    /// The name as it was supplied.
    pub name: String,
}
