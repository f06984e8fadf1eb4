//! The session manager: rotating slots, assignments, and the MIA sweep.
//!
//! This is the central piece of the session layer. It's responsible for:
//! - Rotating the fixed session slots in place as their windows end
//! - Tracking which player is assigned to which slot
//! - Gating deploys (assignment present, window not expired, right world)
//! - Bookkeeping world transfers in flight, keyed by stable player id
//! - Expiring deployed players whose raid window ended (MIA)
//!
//! # Concurrency note
//!
//! `SessionManager` is NOT thread-safe by itself — plain `HashMap`s, no
//! locks. This is intentional: it is owned by a single task (the raid
//! server actor) and everything runs on one logical thread. The sweep and
//! the player-action methods interleave but never overlap.
//!
//! # Time
//!
//! Every method takes `now_ms` explicitly. The caller owns the clock; the
//! manager only does arithmetic on it. The sweep is expected on a fixed
//! 1-second cadence but tolerates arbitrary gaps (rotation catches up).

use std::collections::{HashMap, HashSet};

use lastlight_protocol::{PlayerId, RaidClock, SessionId, SessionSummary, WorldId};

use crate::{DeployBlock, RaidSession, SessionConfig, LOW_TIME_WARN_SECS, WARN_THRESHOLDS};

// ---------------------------------------------------------------------------
// Assignment
// ---------------------------------------------------------------------------

/// A player's binding to one session slot.
///
/// Persists across menu visits so re-deploy resumes the same slot; cleared
/// only on extraction success, MIA, or disconnect.
#[derive(Debug)]
struct SessionAssignment {
    session_id: SessionId,
    /// The slot's rotation counter when this player last (re)entered the
    /// window. A deployed player whose slot has rotated past this value
    /// outlived their raid and goes MIA.
    rotation_seen: u64,
    /// Warning thresholds already emitted for this window.
    warned: HashSet<u64>,
}

// ---------------------------------------------------------------------------
// Deploy gate
// ---------------------------------------------------------------------------

/// Outcome of the pre-deploy gate.
#[derive(Debug, Clone, PartialEq)]
pub enum DeployGate {
    /// Deploy may proceed immediately.
    Ready {
        session: SessionId,
        seconds_left: u64,
        /// `true` when ≤ [`LOW_TIME_WARN_SECS`] remain — worth a
        /// non-blocking notice, but not a reason to refuse.
        low_time: bool,
        clock: RaidClock,
    },
    /// The connection must move to the session's world first; a transfer
    /// has been (or already was) initiated. Deploy retries after the
    /// host signals the world join.
    Transfer { world: WorldId },
    /// Deploy is refused; the reason is shown to the player.
    Blocked(DeployBlock),
}

/// What the sweep observed. The caller applies these — pushing timer HUD
/// updates, warning toasts, and invoking the MIA path.
#[derive(Debug, Clone, PartialEq)]
pub enum SweepEvent {
    /// Fresh raid-timer reading for a deployed, assigned player.
    Timer {
        player: PlayerId,
        session: SessionId,
        seconds_left: u64,
        clock: RaidClock,
    },
    /// A warning threshold was crossed (emitted at most once per
    /// threshold per raid window).
    Warning { player: PlayerId, seconds_left: u64 },
    /// The player's raid window ended while they were deployed. Their
    /// assignment has already been removed — even if the caller's MIA
    /// handling fails, they cannot stay bound to an expired session.
    MiaExpired { player: PlayerId, session: SessionId },
    /// A world transfer stayed in flight past the configured timeout.
    /// The mark has been cleared; the caller should return the player
    /// to the menu so deploy can be retried.
    TransferTimedOut { player: PlayerId },
}

// ---------------------------------------------------------------------------
// SessionManager
// ---------------------------------------------------------------------------

/// Manages the session slots and every player's relationship to them.
pub struct SessionManager {
    slots: Vec<RaidSession>,
    assignments: HashMap<PlayerId, SessionAssignment>,
    /// Transfer-in-flight marks: player id → when the transfer started.
    /// Keyed by stable id because the connection object backing a player
    /// is replaced across a world transfer.
    transfers: HashMap<PlayerId, u64>,
    config: SessionConfig,
    initialized: bool,
}

impl SessionManager {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            slots: Vec::new(),
            assignments: HashMap::new(),
            transfers: HashMap::new(),
            config,
            initialized: false,
        }
    }

    /// Creates the session slots with their staggered start offsets.
    ///
    /// Idempotent — calling twice is a no-op, so a second bootstrap path
    /// can't reset every raid in flight.
    pub fn initialize(&mut self, now_ms: u64) {
        if self.initialized {
            return;
        }
        self.slots = self
            .config
            .slots
            .iter()
            .map(|slot| RaidSession::from_config(slot, now_ms))
            .collect();
        self.initialized = true;
        tracing::info!(slots = self.slots.len(), "session slots initialized");
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    // -- Projections ------------------------------------------------------

    /// Menu-facing snapshot of every slot. Pure; used by menu polling.
    pub fn menu_session_summaries(&self, now_ms: u64) -> Vec<SessionSummary> {
        self.slots.iter().map(|s| s.summary(now_ms)).collect()
    }

    /// The slot with the most time left; ties broken by slot order.
    pub fn best_session_for_new_deploy(&self, now_ms: u64) -> Option<SessionId> {
        self.slots
            .iter()
            // `max_by_key` keeps the *last* maximum on ties; scanning
            // manually keeps the first, which is the documented rule.
            .fold(None::<&RaidSession>, |best, slot| match best {
                Some(b) if slot.seconds_left(now_ms) > b.seconds_left(now_ms) => Some(slot),
                Some(b) => Some(b),
                None => Some(slot),
            })
            .map(|s| s.id.clone())
    }

    pub fn seconds_left_for_session(&self, id: &SessionId, now_ms: u64) -> Option<u64> {
        self.slot(id).map(|s| s.seconds_left(now_ms))
    }

    /// The session a player is currently bound to, if any.
    pub fn assignment_for(&self, player: &PlayerId) -> Option<&SessionId> {
        self.assignments.get(player).map(|a| &a.session_id)
    }

    // -- Assignment -------------------------------------------------------

    /// Binds `player` to a slot, replacing any existing binding.
    ///
    /// An unknown `session_id` falls back to the best slot for a new
    /// deploy rather than failing — the menu may race a rotation.
    /// Returns the id actually assigned (`None` only with no slots at all).
    pub fn assign_player_to_session(
        &mut self,
        player: &PlayerId,
        session_id: &SessionId,
        now_ms: u64,
    ) -> Option<SessionId> {
        let chosen = if self.slot(session_id).is_some() {
            session_id.clone()
        } else {
            let fallback = self.best_session_for_new_deploy(now_ms)?;
            tracing::debug!(
                %player,
                requested = %session_id,
                fallback = %fallback,
                "unknown session id, assigning best available"
            );
            fallback
        };

        let rotation_seen = self.slot(&chosen).map(|s| s.rotations).unwrap_or(0);
        self.assignments.insert(
            player.clone(),
            SessionAssignment {
                session_id: chosen.clone(),
                rotation_seen,
                warned: HashSet::new(),
            },
        );
        tracing::info!(%player, session = %chosen, "player assigned to session");
        Some(chosen)
    }

    // -- Deploy gate ------------------------------------------------------

    /// Gate called immediately before a deploy attempt.
    ///
    /// Checks, in order: an assignment exists, its window hasn't expired,
    /// and the connection is in the session's world. A world mismatch
    /// marks the player as transferring (idempotently) and reports the
    /// target world — the caller initiates the actual transfer and
    /// retries deploy once the host signals completion.
    pub fn before_deploy(
        &mut self,
        player: &PlayerId,
        current_world: Option<&WorldId>,
        now_ms: u64,
    ) -> DeployGate {
        if self.slots.is_empty() {
            return DeployGate::Blocked(DeployBlock::NoSessions);
        }
        let Some(assignment) = self.assignments.get(player) else {
            return DeployGate::Blocked(DeployBlock::NoAssignment);
        };
        let Some(slot) = self.slots.iter().find(|s| s.id == assignment.session_id) else {
            // Stale binding to a slot that no longer exists (config change).
            self.assignments.remove(player);
            return DeployGate::Blocked(DeployBlock::NoAssignment);
        };

        let seconds_left = slot.seconds_left(now_ms);
        if seconds_left == 0 {
            return DeployGate::Blocked(DeployBlock::SessionExpired(slot.id.clone()));
        }

        if current_world != Some(&slot.world) {
            let world = slot.world.clone();
            self.transfers.entry(player.clone()).or_insert(now_ms);
            tracing::info!(%player, target = %world, "deploy deferred for world transfer");
            return DeployGate::Transfer { world };
        }

        // Entering the window now: pin the rotation counter and reset the
        // warning ledger so this raid gets its own warnings.
        let session = slot.id.clone();
        let rotations = slot.rotations;
        let clock = slot.world_clock(now_ms);
        let assignment = self
            .assignments
            .get_mut(player)
            .expect("assignment checked above");
        assignment.rotation_seen = rotations;
        assignment.warned.clear();

        DeployGate::Ready {
            session,
            seconds_left,
            low_time: seconds_left <= LOW_TIME_WARN_SECS,
            clock,
        }
    }

    // -- Transfer bookkeeping --------------------------------------------

    pub fn is_transferring(&self, player: &PlayerId) -> bool {
        self.transfers.contains_key(player)
    }

    pub fn mark_transfer_start(&mut self, player: &PlayerId, now_ms: u64) {
        self.transfers.entry(player.clone()).or_insert(now_ms);
    }

    pub fn mark_transfer_end(&mut self, player: &PlayerId) {
        self.transfers.remove(player);
    }

    // -- Assignment teardown ---------------------------------------------

    /// Extraction succeeded: the binding is released so the player picks
    /// (or is given) a session fresh on their next deploy.
    pub fn on_extraction_success(&mut self, player: &PlayerId) {
        if self.assignments.remove(player).is_some() {
            tracing::info!(%player, "assignment cleared after extraction");
        }
    }

    /// Unconditional removal — MIA, disconnect, account-level cleanup.
    pub fn clear_player(&mut self, player: &PlayerId) {
        self.assignments.remove(player);
        self.transfers.remove(player);
    }

    // -- Sweep ------------------------------------------------------------

    /// One pass of the 1 Hz sweep.
    ///
    /// 1. Rotates every expired slot in place (repeatedly, so a long
    ///    process sleep still lands on a currently-valid window).
    /// 2. For every assigned player that `is_deployed` reports as having a
    ///    live raid entity: emits a timer update, at most one newly
    ///    crossed warning threshold, and — if their slot rotated since
    ///    they entered it — an MIA expiration. The MIA assignment is
    ///    removed *here*, before the caller sees the event, so failed MIA
    ///    handling can never leave a player bound to a dead window.
    /// 3. Players assigned but sitting in the menu are skipped entirely;
    ///    their binding persists into the (possibly rotated) slot.
    /// 4. Expires transfer marks older than the configured timeout.
    pub fn sweep(
        &mut self,
        now_ms: u64,
        is_deployed: impl Fn(&PlayerId) -> bool,
    ) -> Vec<SweepEvent> {
        let mut events = Vec::new();

        for slot in &mut self.slots {
            let applied = slot.rotate_if_expired(now_ms);
            if applied > 0 {
                tracing::info!(
                    session = %slot.id,
                    rotations = applied,
                    "session window rotated"
                );
            }
        }

        let players: Vec<PlayerId> = self.assignments.keys().cloned().collect();
        for player in players {
            if !is_deployed(&player) {
                continue;
            }
            let Some(assignment) = self.assignments.get_mut(&player) else {
                continue;
            };
            let Some(slot) = self.slots.iter().find(|s| s.id == assignment.session_id) else {
                continue;
            };

            let seconds_left = slot.seconds_left(now_ms);
            let expired = slot.rotations != assignment.rotation_seen || seconds_left == 0;
            if expired {
                let session = assignment.session_id.clone();
                self.assignments.remove(&player);
                self.transfers.remove(&player);
                tracing::info!(%player, %session, "raid window ended, player MIA");
                events.push(SweepEvent::MiaExpired { player, session });
                continue;
            }

            events.push(SweepEvent::Timer {
                player: player.clone(),
                session: slot.id.clone(),
                seconds_left,
                clock: slot.world_clock(now_ms),
            });

            // Report only the most urgent newly crossed threshold, but mark
            // every crossed one so a lag spike doesn't queue a warning storm.
            let mut newly_crossed = None;
            for threshold in WARN_THRESHOLDS {
                if seconds_left <= threshold && assignment.warned.insert(threshold) {
                    newly_crossed = Some(threshold);
                }
            }
            if newly_crossed.is_some() {
                events.push(SweepEvent::Warning {
                    player,
                    seconds_left,
                });
            }
        }

        let timeout_ms = self.config.transfer_timeout_secs * 1000;
        let timed_out: Vec<PlayerId> = self
            .transfers
            .iter()
            .filter(|(_, started)| now_ms.saturating_sub(**started) >= timeout_ms)
            .map(|(player, _)| player.clone())
            .collect();
        for player in timed_out {
            self.transfers.remove(&player);
            tracing::warn!(%player, "world transfer timed out");
            events.push(SweepEvent::TransferTimedOut { player });
        }

        events
    }

    fn slot(&self, id: &SessionId) -> Option<&RaidSession> {
        self.slots.iter().find(|s| s.id == *id)
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Unit tests for `SessionManager`.
    //!
    //! Naming convention: `test_{function}_{scenario}_{expected}`.
    //!
    //! All timing goes through explicit `now_ms` values — no sleeping, no
    //! wall clock. `T0` is an arbitrary epoch; durations are short so the
    //! arithmetic stays readable.

    use super::*;
    use crate::SlotConfig;

    const T0: u64 = 1_000_000;

    // -- Helpers ----------------------------------------------------------

    fn slot_config(id: &str, duration_secs: u64, offset_secs: u64) -> SlotConfig {
        SlotConfig {
            id: SessionId::new(id),
            label: format!("Raid {id}"),
            world: WorldId::new(format!("world-{id}")),
            duration_secs,
            start_offset_secs: offset_secs,
            clock_scale: 60.0,
        }
    }

    /// Two slots: "alpha" with a full 1000 s window, "omega" 600 s in
    /// (so 400 s left at `T0`).
    fn manager() -> SessionManager {
        let mut mgr = SessionManager::new(SessionConfig {
            slots: vec![slot_config("alpha", 1000, 0), slot_config("omega", 1000, 600)],
            transfer_timeout_secs: 60,
        });
        mgr.initialize(T0);
        mgr
    }

    fn pid(name: &str) -> PlayerId {
        PlayerId(name.into())
    }

    fn sid(name: &str) -> SessionId {
        SessionId::new(name)
    }

    fn world(name: &str) -> WorldId {
        WorldId::new(format!("world-{name}"))
    }

    /// Assigns and passes the deploy gate so the warning ledger/rotation
    /// counter are pinned, as a real deploy would.
    fn deploy(mgr: &mut SessionManager, player: &PlayerId, session: &str, now: u64) {
        mgr.assign_player_to_session(player, &sid(session), now);
        let gate = mgr.before_deploy(player, Some(&world(session)), now);
        assert!(matches!(gate, DeployGate::Ready { .. }), "gate = {gate:?}");
    }

    // =====================================================================
    // initialize()
    // =====================================================================

    #[test]
    fn test_initialize_twice_is_noop() {
        let mut mgr = manager();
        let before = mgr.menu_session_summaries(T0);
        mgr.initialize(T0 + 500_000); // would reset every window if applied
        assert_eq!(mgr.menu_session_summaries(T0), before);
    }

    // =====================================================================
    // best_session_for_new_deploy()
    // =====================================================================

    #[test]
    fn test_best_session_picks_greatest_seconds_left() {
        // alpha: 1000 s left, omega: 400 s left.
        let mgr = manager();
        assert_eq!(mgr.best_session_for_new_deploy(T0), Some(sid("alpha")));
    }

    #[test]
    fn test_best_session_follows_the_clock_across_rotation() {
        let mut mgr = manager();
        assert_eq!(mgr.best_session_for_new_deploy(T0), Some(sid("alpha")));

        // 500 s later omega rotates (it had 400 s); after the sweep omega
        // has a fresh window (~900 s) while alpha is down to 500 s.
        let now = T0 + 500_000;
        mgr.sweep(now, |_| false);
        assert_eq!(mgr.best_session_for_new_deploy(now), Some(sid("omega")));
    }

    #[test]
    fn test_best_session_tie_broken_by_slot_order() {
        let mut mgr = SessionManager::new(SessionConfig {
            slots: vec![slot_config("first", 1000, 0), slot_config("second", 1000, 0)],
            transfer_timeout_secs: 60,
        });
        mgr.initialize(T0);
        assert_eq!(mgr.best_session_for_new_deploy(T0), Some(sid("first")));
    }

    #[test]
    fn test_best_session_empty_config_returns_none() {
        let mgr = SessionManager::new(SessionConfig {
            slots: vec![],
            transfer_timeout_secs: 60,
        });
        assert_eq!(mgr.best_session_for_new_deploy(T0), None);
    }

    // =====================================================================
    // assign_player_to_session()
    // =====================================================================

    #[test]
    fn test_assign_unknown_session_falls_back_to_best() {
        let mut mgr = manager();
        let chosen = mgr.assign_player_to_session(&pid("rook"), &sid("nope"), T0);
        assert_eq!(chosen, Some(sid("alpha")));
        assert_eq!(mgr.assignment_for(&pid("rook")), Some(&sid("alpha")));
    }

    #[test]
    fn test_assign_replaces_existing_binding() {
        let mut mgr = manager();
        mgr.assign_player_to_session(&pid("rook"), &sid("alpha"), T0);
        mgr.assign_player_to_session(&pid("rook"), &sid("omega"), T0);
        assert_eq!(mgr.assignment_for(&pid("rook")), Some(&sid("omega")));
    }

    // =====================================================================
    // before_deploy()
    // =====================================================================

    #[test]
    fn test_before_deploy_without_assignment_blocks() {
        let mut mgr = manager();
        let gate = mgr.before_deploy(&pid("rook"), Some(&world("alpha")), T0);
        assert_eq!(gate, DeployGate::Blocked(DeployBlock::NoAssignment));
    }

    #[test]
    fn test_before_deploy_expired_session_blocks() {
        let mut mgr = manager();
        mgr.assign_player_to_session(&pid("rook"), &sid("omega"), T0);
        // omega's window ends 400 s after T0; no sweep has rotated it yet.
        let gate = mgr.before_deploy(&pid("rook"), Some(&world("omega")), T0 + 400_000);
        assert_eq!(
            gate,
            DeployGate::Blocked(DeployBlock::SessionExpired(sid("omega")))
        );
    }

    #[test]
    fn test_before_deploy_wrong_world_starts_transfer() {
        let mut mgr = manager();
        mgr.assign_player_to_session(&pid("rook"), &sid("alpha"), T0);
        let gate = mgr.before_deploy(&pid("rook"), Some(&world("omega")), T0);
        assert_eq!(gate, DeployGate::Transfer { world: world("alpha") });
        assert!(mgr.is_transferring(&pid("rook")));
    }

    #[test]
    fn test_before_deploy_right_world_is_ready() {
        let mut mgr = manager();
        mgr.assign_player_to_session(&pid("rook"), &sid("alpha"), T0);
        match mgr.before_deploy(&pid("rook"), Some(&world("alpha")), T0) {
            DeployGate::Ready { session, seconds_left, low_time, .. } => {
                assert_eq!(session, sid("alpha"));
                assert_eq!(seconds_left, 1000);
                assert!(!low_time);
            }
            other => panic!("expected Ready, got {other:?}"),
        }
    }

    #[test]
    fn test_before_deploy_low_time_flagged_but_not_blocked() {
        let mut mgr = manager();
        mgr.assign_player_to_session(&pid("rook"), &sid("alpha"), T0);
        // 100 s before alpha's window ends.
        let now = T0 + 900_000;
        match mgr.before_deploy(&pid("rook"), Some(&world("alpha")), now) {
            DeployGate::Ready { low_time, seconds_left, .. } => {
                assert!(low_time);
                assert_eq!(seconds_left, 100);
            }
            other => panic!("expected Ready, got {other:?}"),
        }
    }

    // =====================================================================
    // sweep(): rotation
    // =====================================================================

    #[test]
    fn test_sweep_rotation_never_stalls() {
        // For all elapsed gaps — including gaps much longer than one
        // duration — every slot reads a valid window after one sweep.
        let mut mgr = manager();
        for gap_ms in [1_000, 400_001, 999_999, 1_000_000, 3_650_000, 86_400_000] {
            let now = T0 + gap_ms;
            mgr.sweep(now, |_| false);
            for summary in mgr.menu_session_summaries(now) {
                assert!(
                    summary.seconds_left > 0 && summary.seconds_left <= 1000,
                    "slot {} reads {} s after a {gap_ms} ms gap",
                    summary.id,
                    summary.seconds_left
                );
            }
        }
    }

    #[test]
    fn test_sweep_skips_menu_players_entirely() {
        let mut mgr = manager();
        mgr.assign_player_to_session(&pid("rook"), &sid("omega"), T0);

        // omega rotates while rook sits in the menu: binding persists
        // untouched, no events for them.
        let events = mgr.sweep(T0 + 500_000, |_| false);
        assert!(events.iter().all(|e| !matches!(
            e,
            SweepEvent::Timer { .. } | SweepEvent::Warning { .. } | SweepEvent::MiaExpired { .. }
        )));
        assert_eq!(mgr.assignment_for(&pid("rook")), Some(&sid("omega")));
    }

    // =====================================================================
    // sweep(): timers and warnings
    // =====================================================================

    #[test]
    fn test_sweep_pushes_timer_for_deployed_player() {
        let mut mgr = manager();
        deploy(&mut mgr, &pid("rook"), "alpha", T0);

        let events = mgr.sweep(T0 + 50_000, |_| true);
        assert!(events.iter().any(|e| matches!(
            e,
            SweepEvent::Timer { player, seconds_left: 950, .. } if *player == pid("rook")
        )));
    }

    #[test]
    fn test_sweep_warning_fires_once_per_threshold() {
        let mut mgr = manager();
        deploy(&mut mgr, &pid("rook"), "alpha", T0);

        // Crosses the 900 s threshold: warn once…
        let events = mgr.sweep(T0 + 101_000, |_| true);
        assert_eq!(warning_count(&events), 1);
        // …and never again for the same threshold.
        let events = mgr.sweep(T0 + 102_000, |_| true);
        assert_eq!(warning_count(&events), 0);
        // The next threshold (600 s) is its own warning.
        let events = mgr.sweep(T0 + 401_000, |_| true);
        assert_eq!(warning_count(&events), 1);
    }

    #[test]
    fn test_sweep_lag_spike_emits_single_warning() {
        let mut mgr = manager();
        deploy(&mut mgr, &pid("rook"), "alpha", T0);

        // One sweep lands with 25 s left: 900/600/300/120/60/30 are all
        // newly crossed, but the player gets one toast, not six.
        let events = mgr.sweep(T0 + 975_000, |_| true);
        assert_eq!(warning_count(&events), 1);
    }

    fn warning_count(events: &[SweepEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, SweepEvent::Warning { .. }))
            .count()
    }

    // =====================================================================
    // sweep(): MIA
    // =====================================================================

    #[test]
    fn test_sweep_mia_clears_assignment_exactly_once() {
        let mut mgr = manager();
        deploy(&mut mgr, &pid("rook"), "alpha", T0);

        // Alpha's window ends 1000 s after T0.
        let events = mgr.sweep(T0 + 1_000_500, |_| true);
        let mias: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, SweepEvent::MiaExpired { .. }))
            .collect();
        assert_eq!(mias.len(), 1);
        assert_eq!(mgr.assignment_for(&pid("rook")), None);

        // Subsequent sweeps are quiet — the expiration fired exactly once.
        let events = mgr.sweep(T0 + 1_001_500, |_| true);
        assert!(events.iter().all(|e| !matches!(e, SweepEvent::MiaExpired { .. })));
    }

    #[test]
    fn test_sweep_mia_only_hits_players_in_the_ended_window() {
        let mut mgr = manager();
        deploy(&mut mgr, &pid("rook"), "alpha", T0);
        // Doe deploys into omega's *next* window after it rotates.
        mgr.sweep(T0 + 500_000, |_| false);
        deploy(&mut mgr, &pid("doe"), "omega", T0 + 500_000);

        // Alpha ends at T0+1000 s; omega's second window runs to T0+1400 s.
        let events = mgr.sweep(T0 + 1_000_500, |_| true);
        assert!(events.iter().any(|e| matches!(
            e,
            SweepEvent::MiaExpired { player, .. } if *player == pid("rook")
        )));
        assert_eq!(mgr.assignment_for(&pid("doe")), Some(&sid("omega")));
    }

    // =====================================================================
    // Transfers
    // =====================================================================

    #[test]
    fn test_transfer_marks_are_explicit_and_clearable() {
        let mut mgr = manager();
        assert!(!mgr.is_transferring(&pid("rook")));
        mgr.mark_transfer_start(&pid("rook"), T0);
        assert!(mgr.is_transferring(&pid("rook")));
        mgr.mark_transfer_end(&pid("rook"));
        assert!(!mgr.is_transferring(&pid("rook")));
    }

    #[test]
    fn test_sweep_expires_stuck_transfer() {
        let mut mgr = manager();
        mgr.mark_transfer_start(&pid("rook"), T0);

        // Within the 60 s budget: still in flight.
        let events = mgr.sweep(T0 + 30_000, |_| false);
        assert!(events.iter().all(|e| !matches!(e, SweepEvent::TransferTimedOut { .. })));
        assert!(mgr.is_transferring(&pid("rook")));

        // Past it: mark cleared, caller told to recover the player.
        let events = mgr.sweep(T0 + 61_000, |_| false);
        assert!(events.iter().any(|e| matches!(
            e,
            SweepEvent::TransferTimedOut { player } if *player == pid("rook")
        )));
        assert!(!mgr.is_transferring(&pid("rook")));
    }

    // =====================================================================
    // Assignment teardown
    // =====================================================================

    #[test]
    fn test_on_extraction_success_clears_assignment() {
        let mut mgr = manager();
        deploy(&mut mgr, &pid("rook"), "alpha", T0);
        mgr.on_extraction_success(&pid("rook"));
        assert_eq!(mgr.assignment_for(&pid("rook")), None);
    }

    #[test]
    fn test_clear_player_removes_assignment_and_transfer() {
        let mut mgr = manager();
        mgr.assign_player_to_session(&pid("rook"), &sid("alpha"), T0);
        mgr.mark_transfer_start(&pid("rook"), T0);
        mgr.clear_player(&pid("rook"));
        assert_eq!(mgr.assignment_for(&pid("rook")), None);
        assert!(!mgr.is_transferring(&pid("rook")));
    }

    // =====================================================================
    // Concrete scenario: two sessions, shifting clocks
    // =====================================================================

    #[test]
    fn test_best_session_concrete_alpha_omega_scenario() {
        // "alpha" with 900 s left, "omega" with 300 s left → alpha.
        let mut mgr = SessionManager::new(SessionConfig {
            slots: vec![slot_config("alpha", 1000, 100), slot_config("omega", 1000, 700)],
            transfer_timeout_secs: 60,
        });
        mgr.initialize(T0);
        assert_eq!(mgr.seconds_left_for_session(&sid("alpha"), T0), Some(900));
        assert_eq!(mgr.seconds_left_for_session(&sid("omega"), T0), Some(300));
        assert_eq!(mgr.best_session_for_new_deploy(T0), Some(sid("alpha")));

        // After the clocks shift so omega has 950 s and alpha 100 s
        // (omega rotated into a fresh window), the same call flips.
        let now = T0 + 350_000;
        mgr.sweep(now, |_| false);
        assert_eq!(mgr.seconds_left_for_session(&sid("omega"), now), Some(950));
        assert_eq!(mgr.seconds_left_for_session(&sid("alpha"), now), Some(550));
        let now = T0 + 800_000;
        mgr.sweep(now, |_| false);
        assert_eq!(mgr.seconds_left_for_session(&sid("alpha"), now), Some(100));
        assert!(mgr.seconds_left_for_session(&sid("omega"), now).unwrap() > 100);
        assert_eq!(mgr.best_session_for_new_deploy(now), Some(sid("omega")));
    }
}
