//! Typed UI-push payloads.
//!
//! The host SDK exposes a fire-and-forget `sendData(payload)` channel to the
//! owning client. Historically that channel carried loosely-typed JSON with
//! a string `type` field switched on at both ends; here each UI surface gets
//! a closed enum instead, so adding a message is a compile-checked decision
//! and the serialized shape (`#[serde(tag = "type")]`) stays what the client
//! scripts already expect:
//!
//! ```text
//! { "type": "RaidTimer", "session": "alpha", "seconds_left": 871, ... }
//! ```
//!
//! Nothing here awaits a response — gameplay-affecting input arrives through
//! the host's inbound event channel, not this one.

use serde::{Deserialize, Serialize};

use crate::{SessionId, WorldId};

// ---------------------------------------------------------------------------
// Derived clock / session summary
// ---------------------------------------------------------------------------

/// The derived in-world time of day, wrapped at 24 h.
///
/// Computed from elapsed-time-since-session-start scaled by the session's
/// clock rate. Purely cosmetic — nothing gates on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaidClock {
    pub hour: u8,
    pub minute: u8,
}

/// A menu-facing projection of one session slot.
///
/// Produced fresh on every menu poll; never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: SessionId,
    pub label: String,
    pub world: WorldId,
    /// Whole seconds until this slot rotates. Always ≥ 0.
    pub seconds_left: u64,
    pub duration_secs: u64,
    pub clock: RaidClock,
}

// ---------------------------------------------------------------------------
// Menu surface
// ---------------------------------------------------------------------------

/// Payloads pushed while the player is looking at the menu UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MenuPush {
    /// Current state of every session slot, for the session-select screen.
    SessionList { sessions: Vec<SessionSummary> },

    /// A deploy attempt was blocked; short-lived toast, not a modal.
    DeployBlocked { reason: String },

    /// The assigned session has two minutes or less remaining.
    /// Non-blocking — deploying into a dying raid is allowed, just unwise.
    LowTimeWarning { seconds_left: u64 },

    /// Successful extraction banner, pushed shortly after the menu UI
    /// re-attaches so its listener is ready to receive it.
    ExtractionBanner { zone: String },

    /// Death banner naming the killer when one is known.
    DeathBanner { killer: Option<String> },

    /// The raid timer ran out while the player was deployed.
    MiaBanner,
}

// ---------------------------------------------------------------------------
// In-raid surface
// ---------------------------------------------------------------------------

/// Payloads pushed while the player is deployed (HUD + raid broadcasts).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RaidPush {
    /// Remaining raid time plus the in-world clock, refreshed each sweep.
    RaidTimer {
        session: SessionId,
        seconds_left: u64,
        clock: RaidClock,
    },

    /// One-shot raid-timer threshold warning (15 min, 10 min, … 10 s).
    TimeWarning { seconds_left: u64 },

    /// The player entered an extraction zone and a hold began.
    ExtractionHoldStarted { zone: String, hold_secs: u64 },

    /// Per-tick hold progress. `seconds_remaining` is rounded up.
    ExtractionProgress {
        zone: String,
        percent: u8,
        seconds_remaining: u64,
    },

    /// The hold was broken (zone exit, death, world loss).
    ExtractionCancelled { zone: String },

    /// World broadcast: somebody died.
    DeathMessage { victim: String },

    /// World broadcast: kill-feed entry (killer name, weapon icon id,
    /// victim name). Delivered best-effort to whoever can be enumerated.
    KillFeed {
        killer: String,
        weapon_icon: String,
        victim: String,
    },

    /// World broadcast: a player went MIA and their gear was lost.
    MiaMessage { player: String },

    /// Cosmetic fallback broadcast when an MIA player had nothing to drop.
    Debris,
}

// =========================================================================
// Tests
// =========================================================================
