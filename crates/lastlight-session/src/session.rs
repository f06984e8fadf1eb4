//! Session slots: the data structures behind the rotating raid clock.
//!
//! A session is an eternal, rotating slot — when its window ends the slot
//! restarts in place rather than being destroyed. Two slots exist by
//! default, staggered by half a duration so they are never in phase: at any
//! moment one of them has meaningfully more time left than the other.

use lastlight_protocol::{RaidClock, SessionId, SessionSummary, WorldId};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Raid-timer thresholds (seconds left) at which a one-shot warning is
/// pushed to every deployed player, most urgent last.
pub const WARN_THRESHOLDS: [u64; 7] = [900, 600, 300, 120, 60, 30, 10];

/// Deploying into a session with this much time or less triggers a
/// non-blocking low-time notice.
pub const LOW_TIME_WARN_SECS: u64 = 120;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Static definition of one session slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotConfig {
    pub id: SessionId,
    pub label: String,
    /// The world this slot's raids take place in.
    pub world: WorldId,
    /// Fixed window length. Rotation preserves it forever.
    pub duration_secs: u64,
    /// How far into its window this slot starts at initialization.
    /// Staggering the offsets keeps the slots out of phase.
    pub start_offset_secs: u64,
    /// In-game seconds that pass per real second (drives the cosmetic
    /// 24 h world clock).
    pub clock_scale: f64,
}

/// Configuration for the whole session layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub slots: Vec<SlotConfig>,
    /// How long a world transfer may stay in flight before the sweep
    /// expires it and the player is returned to the menu.
    pub transfer_timeout_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        let duration_secs = 2700; // 45-minute raids
        Self {
            slots: vec![
                SlotConfig {
                    id: SessionId::new("alpha"),
                    label: "Raid Alpha".into(),
                    world: WorldId::new("world-alpha"),
                    duration_secs,
                    start_offset_secs: 0,
                    clock_scale: 60.0,
                },
                SlotConfig {
                    id: SessionId::new("omega"),
                    label: "Raid Omega".into(),
                    world: WorldId::new("world-omega"),
                    duration_secs,
                    start_offset_secs: duration_secs / 2,
                    clock_scale: 60.0,
                },
            ],
            transfer_timeout_secs: 60,
        }
    }
}

// ---------------------------------------------------------------------------
// RaidSession
// ---------------------------------------------------------------------------

/// One live session slot.
///
/// Only `start_time_ms` (and the derived `rotations` counter) ever mutate,
/// and only from the sweep. Everything else is fixed at initialization.
#[derive(Debug, Clone)]
pub struct RaidSession {
    pub id: SessionId,
    pub label: String,
    pub world: WorldId,
    pub duration_secs: u64,
    /// Start of the current window. Reset on rotation, never rewound.
    pub start_time_ms: u64,
    pub clock_scale: f64,
    /// How many times this slot has rotated since initialization. Lets an
    /// assignment tell "my raid window ended" apart from "same window".
    pub rotations: u64,
}

impl RaidSession {
    pub fn from_config(config: &SlotConfig, now_ms: u64) -> Self {
        Self {
            id: config.id.clone(),
            label: config.label.clone(),
            world: config.world.clone(),
            duration_secs: config.duration_secs,
            // Backdate by the stagger offset so slots start out of phase.
            start_time_ms: now_ms.saturating_sub(config.start_offset_secs * 1000),
            clock_scale: config.clock_scale,
            rotations: 0,
        }
    }

    /// End of the current window.
    pub fn end_time_ms(&self) -> u64 {
        self.start_time_ms + self.duration_secs * 1000
    }

    /// Whole seconds until rotation, rounded up, floored at zero.
    pub fn seconds_left(&self, now_ms: u64) -> u64 {
        self.end_time_ms()
            .saturating_sub(now_ms)
            .div_ceil(1000)
    }

    /// Rotates the window forward until it contains `now_ms`.
    ///
    /// Stepping by whole durations (rather than snapping to `now`) keeps
    /// the slot's phase stable even if the process slept through several
    /// windows. Returns how many rotations were applied.
    pub fn rotate_if_expired(&mut self, now_ms: u64) -> u64 {
        let mut applied = 0;
        while now_ms >= self.end_time_ms() {
            self.start_time_ms += self.duration_secs * 1000;
            self.rotations += 1;
            applied += 1;
        }
        applied
    }

    /// The derived in-world time of day, wrapping at 24 h.
    pub fn world_clock(&self, now_ms: u64) -> RaidClock {
        let elapsed_secs = now_ms.saturating_sub(self.start_time_ms) as f64 / 1000.0;
        let game_secs = (elapsed_secs * self.clock_scale) as u64 % 86_400;
        RaidClock {
            hour: (game_secs / 3600) as u8,
            minute: (game_secs % 3600 / 60) as u8,
        }
    }

    /// Menu-facing projection. Pure — no side effects.
    pub fn summary(&self, now_ms: u64) -> SessionSummary {
        SessionSummary {
            id: self.id.clone(),
            label: self.label.clone(),
            world: self.world.clone(),
            seconds_left: self.seconds_left(now_ms),
            duration_secs: self.duration_secs,
            clock: self.world_clock(now_ms),
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
