//! Raid-session management for Lastlight.
//!
//! This crate owns the rotating raid clock:
//!
//! 1. **Session slots** — a fixed set of [`RaidSession`]s, created once and
//!    rotated in place forever (a slot is never destroyed, its window just
//!    restarts)
//! 2. **Assignments** — which player is bound to which slot, independent of
//!    whether they are currently deployed
//! 3. **The sweep** — a 1 Hz pass that rotates expired slots, pushes timer
//!    updates, emits one-shot low-time warnings, and expires players whose
//!    raid window ended while they were deployed (MIA)
//!
//! # How it fits in the stack
//!
//! ```text
//! lastlight (above)   ← drives the sweep from its actor loop, applies events
//!     ↕
//! lastlight-session (this crate)  ← pure state + time arithmetic, no I/O
//!     ↕
//! lastlight-protocol (below)      ← PlayerId, SessionId, summaries, clock
//! ```
//!
//! Everything here is synchronous and takes `now_ms` explicitly; the caller
//! owns the clock. That keeps every timing property testable without
//! sleeping.

mod error;
mod manager;
mod session;

pub use error::DeployBlock;
pub use manager::{DeployGate, SessionManager, SweepEvent};
pub use session::{RaidSession, SessionConfig, SlotConfig, LOW_TIME_WARN_SECS, WARN_THRESHOLDS};
