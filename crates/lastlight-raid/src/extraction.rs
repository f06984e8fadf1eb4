//! The per-player extraction hold state machine.
//!
//! One `ExtractionSystem` per deployed player, stepped once per server
//! tick. Two states: idle, or holding exactly one zone since some start
//! time. Cancellation is polling-based — leaving the zone, dying, or
//! losing the world reference is noticed on the next step, never sooner.

use lastlight_protocol::Vec3;

use crate::ExtractionZone;

// ---------------------------------------------------------------------------
// Step input / events
// ---------------------------------------------------------------------------

/// Everything the hold tracker needs from one tick.
#[derive(Debug, Clone, Copy)]
pub struct StepInput {
    pub now_ms: u64,
    /// The avatar's sampled position, or `None` if the player has no live
    /// world entity this tick.
    pub position: Option<Vec3>,
    pub alive: bool,
}

/// What one step observed, in emission order.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionEvent {
    /// A new hold began (fresh zone entry, or a switch — switching zones
    /// never carries progress over).
    HoldStarted { zone: String, hold_secs: u64 },

    /// Hold progress for an unchanged zone. `seconds_remaining` rounds up.
    Progress {
        zone: String,
        percent: u8,
        seconds_remaining: u64,
    },

    /// The hold was broken before completing.
    Cancelled { zone: String },

    /// The hold reached its required duration. UI-facing; fires exactly
    /// once per successful hold.
    Succeeded { zone: String },

    /// Deferred completion signal, emitted at the top of the tick *after*
    /// [`ExtractionEvent::Succeeded`]. The caller runs the actual
    /// raid-completion path on this one, keeping entity mutation out of
    /// the tick callback that detected success.
    Completed { zone: String },
}

// ---------------------------------------------------------------------------
// ExtractionSystem
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Hold {
    zone_index: usize,
    started_ms: u64,
}

/// Zone-hold tracker for one player.
///
/// Zone overlap is resolved by declaration order: when a position falls
/// inside several zones, the earliest zone in the slice supplied to
/// [`ExtractionSystem::new`] wins. This is an explicit rule, not an
/// accident of iteration — reorder the slice to change priority.
#[derive(Debug, Clone)]
pub struct ExtractionSystem {
    zones: Vec<ExtractionZone>,
    hold: Option<Hold>,
    /// Zone whose completion was detected last tick and is owed a
    /// [`ExtractionEvent::Completed`] on the next step.
    pending_completion: Option<String>,
}

impl ExtractionSystem {
    pub fn new(zones: Vec<ExtractionZone>) -> Self {
        Self {
            zones,
            hold: None,
            pending_completion: None,
        }
    }

    /// Whether a hold is currently active.
    pub fn is_holding(&self) -> bool {
        self.hold.is_some()
    }

    /// Name of the currently held zone, if any.
    pub fn held_zone(&self) -> Option<&str> {
        self.hold
            .as_ref()
            .map(|h| self.zones[h.zone_index].name.as_str())
    }

    /// Drops any active hold and pending completion without emitting
    /// events. Used when the player despawns outside the tick path.
    pub fn reset(&mut self) {
        self.hold = None;
        self.pending_completion = None;
    }

    /// Advances the state machine by one tick.
    pub fn step(&mut self, input: StepInput) -> Vec<ExtractionEvent> {
        // A success detected last tick completes now, before anything else
        // — deliberately deferred so the completion path (despawn, UI
        // swap) never runs inside the tick that detected it.
        if let Some(zone) = self.pending_completion.take() {
            return vec![ExtractionEvent::Completed { zone }];
        }

        // Dead or worldless: break any hold and stop.
        let position = match (input.alive, input.position) {
            (true, Some(position)) => position,
            _ => return self.cancel_active(),
        };

        let containing = self
            .zones
            .iter()
            .position(|zone| zone.contains(&position));

        let Some(zone_index) = containing else {
            return self.cancel_active();
        };

        match &self.hold {
            // Unchanged zone: report progress, maybe complete.
            Some(hold) if hold.zone_index == zone_index => {
                let zone = &self.zones[zone_index];
                let required_ms = zone.hold_secs * 1000;
                let elapsed_ms = input.now_ms.saturating_sub(hold.started_ms);

                if elapsed_ms >= required_ms {
                    let name = zone.name.clone();
                    tracing::debug!(zone = %name, "extraction hold complete");
                    self.hold = None;
                    self.pending_completion = Some(name.clone());
                    return vec![ExtractionEvent::Succeeded { zone: name }];
                }

                let percent = (elapsed_ms * 100 / required_ms.max(1)).min(100) as u8;
                let seconds_remaining = (required_ms - elapsed_ms).div_ceil(1000);
                vec![ExtractionEvent::Progress {
                    zone: zone.name.clone(),
                    percent,
                    seconds_remaining,
                }]
            }

            // Different zone (or no hold): any old hold is cancelled
            // first, then a fresh hold starts from zero.
            _ => {
                let mut events = self.cancel_active();
                let zone = &self.zones[zone_index];
                tracing::debug!(zone = %zone.name, "extraction hold started");
                self.hold = Some(Hold {
                    zone_index,
                    started_ms: input.now_ms,
                });
                events.push(ExtractionEvent::HoldStarted {
                    zone: zone.name.clone(),
                    hold_secs: zone.hold_secs,
                });
                events
            }
        }
    }

    fn cancel_active(&mut self) -> Vec<ExtractionEvent> {
        match self.hold.take() {
            Some(hold) => vec![ExtractionEvent::Cancelled {
                zone: self.zones[hold.zone_index].name.clone(),
            }],
            None => Vec::new(),
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
