//! Shared types for Lastlight's gameplay core.
//!
//! This crate defines the vocabulary the rest of the workspace speaks:
//!
//! 1. **Identity** — [`PlayerId`], [`SessionId`], [`WorldId`] newtypes
//! 2. **Geometry** — [`Vec3`], just enough math for zone containment
//! 3. **UI pushes** — [`MenuPush`] / [`RaidPush`], the typed payloads sent
//!    one-way to the owning client over the host SDK's UI channel
//! 4. **Persistence shape** — [`PlayerDocument`], the JSON document stored
//!    per player identity (the backend that stores it is not ours)
//!
//! # How it fits in the stack
//!
//! ```text
//! lastlight (above)       ← player state machine, death/extraction paths
//!     ↕
//! session / raid / inventory crates  ← consume these types
//!     ↕
//! lastlight-protocol (this crate)    ← identity, payloads, doc shapes
//! ```

mod error;
mod persist;
mod types;
mod ui;

pub use error::ProtocolError;
pub use persist::{ContainerDoc, ItemRecord, PlayerDocument, StashDoc};
pub use types::{PlayerId, SessionId, Vec3, WorldId};
pub use ui::{MenuPush, RaidClock, RaidPush, SessionSummary};
