//! Error types for the session layer.

use lastlight_protocol::SessionId;

/// Why a deploy attempt was blocked.
///
/// Blocked transitions are surfaced to the player as a one-line notice
/// (the `Display` text), never as a propagated exception — the deploy
/// simply doesn't happen.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeployBlock {
    /// No session assignment exists for this player.
    #[error("no raid session selected")]
    NoAssignment,

    /// The assigned session's window has already ended.
    #[error("session {0} has expired")]
    SessionExpired(SessionId),

    /// No session slots are configured at all. A deployment-config
    /// problem, not a player action.
    #[error("no raid sessions available")]
    NoSessions,
}
