//! Top-level error type.

use crate::HookError;

/// Errors surfaced by the public server handle.
///
/// Gameplay-path failures never reach this type — they are logged and
/// degraded inside the actor. What callers can actually observe is the
/// actor being gone, or a collaborator/data failure during an operation
/// that has a reply channel.
#[derive(Debug, thiserror::Error)]
pub enum LastlightError {
    /// The server task has stopped; the command was not delivered.
    #[error("raid server is no longer running")]
    ServerClosed,

    #[error(transparent)]
    Hook(#[from] HookError),

    #[error(transparent)]
    Protocol(#[from] lastlight_protocol::ProtocolError),

    #[error(transparent)]
    Inventory(#[from] lastlight_inventory::InventoryError),
}
