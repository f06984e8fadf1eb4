//! The per-player raid-state machine.
//!
//! One [`GamePlayer`] per connected player, owned by the server actor.
//! The phase diagram:
//!
//! ```text
//! InMenu ──deploy──▶ Deploying ──spawn ok──▶ Deployed
//!    ▲                  │  │                    │
//!    │     gate blocked ─┘  └─ world transfer   │
//!    │                         ▼                │
//!    │                    Transitioning         │
//!    │                         │ world joined   │
//!    │                         └──▶ Deploying   │
//!    └──────── death / MIA / extraction ────────┘
//! ```
//!
//! This type holds only state and the transitions' guards; orchestration
//! against the host (spawning, broadcasts, persistence) lives in the
//! server and death modules. Invalid transition attempts are silent
//! no-ops — they arise from normal UI races (double key-press), not bugs.

use lastlight_inventory::{
    default_backpack, default_hotbar, ItemInventory, Stash, BACKPACK_SIZE, HOTBAR_SIZE,
};
use lastlight_protocol::{PlayerDocument, PlayerId, Vec3, WorldId};
use lastlight_raid::{ExtractionSystem, ExtractionZone, PlayerStats, StepInput};

use crate::{AvatarHandle, Teardown, UiChannel, WeaponHandle};

/// Spawn health.
pub const MAX_HEALTH: u32 = 100;

/// Where a player is in the raid lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaidPhase {
    InMenu,
    /// A deploy is in flight; re-entry is refused until it resolves.
    Deploying,
    /// A world transfer is in flight; the deploy retries on completion.
    Transitioning,
    Deployed,
}

/// The weapon currently in the player's hands.
///
/// `ammo` is the live magazine count and drifts away from the stored
/// inventory item as shots are fired; it is written back on extraction
/// and death so the dropped or kept item carries the real count.
pub struct EquippedWeapon {
    pub item_id: String,
    pub ammo: u32,
    pub entity: Box<dyn WeaponHandle>,
}

/// One connected player's full gameplay state.
pub struct GamePlayer {
    pub id: PlayerId,
    pub username: String,
    phase: RaidPhase,
    pending_deploy: bool,
    /// The world the player's connection currently sits in. Updated by
    /// the host's world-joined signal; `None` briefly during transfers.
    pub connection_world: Option<WorldId>,
    pub hotbar: ItemInventory,
    pub backpack: ItemInventory,
    pub stash: Stash,
    pub currency: u64,
    pub stats: PlayerStats,
    pub health: u32,
    pub equipped: Option<EquippedWeapon>,
    pub avatar: Option<Box<dyn AvatarHandle>>,
    pub extraction: ExtractionSystem,
    pub ui: Box<dyn UiChannel>,
}

impl GamePlayer {
    /// Builds the player from their persisted document, falling back to
    /// the default starting loadout when the document is absent or its
    /// container data is corrupt. A broken save never blocks login.
    pub fn new(
        id: PlayerId,
        username: impl Into<String>,
        ui: Box<dyn UiChannel>,
        zones: Vec<ExtractionZone>,
        doc: Option<PlayerDocument>,
    ) -> Self {
        let (hotbar, backpack, currency) = match doc {
            Some(doc) => {
                let loaded = ItemInventory::load_from_serialized_data(HOTBAR_SIZE, &doc.hotbar)
                    .and_then(|hotbar| {
                        let backpack = ItemInventory::load_from_serialized_data(
                            BACKPACK_SIZE,
                            &doc.backpack,
                        )?;
                        Ok((hotbar, backpack))
                    });
                match loaded {
                    Ok((hotbar, backpack)) => (hotbar, backpack, doc.currency),
                    Err(err) => {
                        tracing::warn!(%id, %err, "corrupt container data, using default loadout");
                        (default_hotbar(), default_backpack(), doc.currency)
                    }
                }
            }
            None => (default_hotbar(), default_backpack(), 0),
        };

        Self {
            id,
            username: username.into(),
            phase: RaidPhase::InMenu,
            pending_deploy: false,
            connection_world: None,
            hotbar,
            backpack,
            stash: Stash::new(),
            currency,
            stats: PlayerStats::default(),
            health: MAX_HEALTH,
            equipped: None,
            avatar: None,
            extraction: ExtractionSystem::new(zones),
            ui,
        }
    }

    pub fn phase(&self) -> RaidPhase {
        self.phase
    }

    pub fn is_deployed(&self) -> bool {
        self.phase == RaidPhase::Deployed
    }

    pub fn is_in_menu(&self) -> bool {
        self.phase == RaidPhase::InMenu
    }

    // -- Deploy transitions ------------------------------------------------

    /// Enters `Deploying` if a deploy may start at all.
    ///
    /// Returns `false` — a silent no-op for the caller — when a deploy is
    /// already in flight, the player is already deployed, or the
    /// connection has no world yet. This is the re-entrancy guard that
    /// makes a rapid double deploy spawn exactly one avatar.
    pub fn begin_deploy(&mut self) -> bool {
        if self.phase != RaidPhase::InMenu || self.connection_world.is_none() {
            return false;
        }
        self.phase = RaidPhase::Deploying;
        true
    }

    /// The gate blocked or the spawn failed: back to the menu.
    pub fn abort_deploy(&mut self) {
        if self.phase == RaidPhase::Deploying {
            self.phase = RaidPhase::InMenu;
        }
    }

    /// A world transfer must finish first; park the deploy.
    pub fn defer_for_transfer(&mut self) {
        if self.phase == RaidPhase::Deploying {
            self.phase = RaidPhase::Transitioning;
            self.pending_deploy = true;
        }
    }

    /// The connection landed in a new world. Returns `true` when a
    /// parked deploy should be retried; the phase is reset so the retry
    /// passes [`GamePlayer::begin_deploy`].
    pub fn resume_deploy_after_transfer(&mut self) -> bool {
        if self.phase == RaidPhase::Transitioning {
            self.phase = RaidPhase::InMenu;
            return std::mem::take(&mut self.pending_deploy);
        }
        false
    }

    /// The spawn succeeded: the player is in the raid.
    pub fn finish_deploy(
        &mut self,
        avatar: Box<dyn AvatarHandle>,
        equipped: Option<EquippedWeapon>,
    ) {
        self.phase = RaidPhase::Deployed;
        self.pending_deploy = false;
        self.health = MAX_HEALTH;
        self.avatar = Some(avatar);
        self.equipped = equipped;
        self.extraction.reset();
    }

    /// Collapses back to the menu from any phase. Entity handles must
    /// already be torn down; this only resets the state machine.
    pub fn return_to_menu(&mut self) {
        self.phase = RaidPhase::InMenu;
        self.pending_deploy = false;
        self.extraction.reset();
    }

    // -- Damage ------------------------------------------------------------

    /// Whether a damage event can affect this player at all. False once
    /// the player is already transitioning out, which is what makes
    /// "dying" and "extracting" mutually exclusive within one tick.
    pub fn can_take_damage(&self) -> bool {
        self.phase == RaidPhase::Deployed && self.health > 0
    }

    /// Applies damage; returns `true` when this event was lethal.
    pub fn apply_damage(&mut self, amount: u32) -> bool {
        if !self.can_take_damage() {
            return false;
        }
        self.health = self.health.saturating_sub(amount);
        self.health == 0
    }

    // -- Equipment / persistence -------------------------------------------

    /// Writes the equipped weapon's live magazine count back into the
    /// matching inventory item — first match by item id, hotbar scanned
    /// before backpack.
    pub fn persist_equipped_ammo(&mut self) {
        let Some(equipped) = &self.equipped else {
            return;
        };
        let ammo = Some(equipped.ammo);
        if let Some(slot) = self.hotbar.find_first(&equipped.item_id) {
            if let Some(item) = self.hotbar.get_item_at_mut(slot) {
                item.ammo = ammo;
            }
        } else if let Some(slot) = self.backpack.find_first(&equipped.item_id) {
            if let Some(item) = self.backpack.get_item_at_mut(slot) {
                item.ammo = ammo;
            }
        }
    }

    /// The persisted form of everything this core owns for the player.
    pub fn document(&self) -> PlayerDocument {
        PlayerDocument {
            backpack: self.backpack.serialize(),
            hotbar: self.hotbar.serialize(),
            currency: self.currency,
        }
    }

    // -- Tick sampling -----------------------------------------------------

    /// The extraction tracker's view of this tick.
    pub fn extraction_input(&self, now_ms: u64) -> StepInput {
        StepInput {
            now_ms,
            position: self.sample_position(),
            alive: self.health > 0,
        }
    }

    /// The avatar's position, or `None` without a live world entity.
    pub fn sample_position(&self) -> Option<Vec3> {
        self.avatar.as_ref().map(|a| a.position())
    }

    // -- Resets ------------------------------------------------------------

    /// The menu "rejoin" reset: despawn any stale entity, drop the held
    /// weapon reference, and empty both carried containers. Distinct
    /// from extraction, which keeps everything. The caller redeploys
    /// afterwards.
    pub fn reset_for_rejoin(&mut self) {
        let mut teardown = Teardown::new("rejoin");
        if let Some(mut weapon) = self.equipped.take() {
            teardown.run("despawn weapon", || weapon.entity.despawn());
        }
        if let Some(mut avatar) = self.avatar.take() {
            teardown.run("despawn stale avatar", || avatar.despawn());
        }
        teardown.finish(&self.id);
        self.hotbar.take_all();
        self.backpack.take_all();
        self.return_to_menu();
    }
}

// =========================================================================
// Tests
// =========================================================================
