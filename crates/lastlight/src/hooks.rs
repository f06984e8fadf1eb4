//! Collaborator traits: the narrow seams to the host game engine.
//!
//! Everything the host SDK owns — entities, world transfers, the UI push
//! channel, the persistence backend — is reached through the traits in
//! this module and nothing else. Production wires real SDK adapters in;
//! tests substitute recording mocks. None of these traits is allowed to
//! block: the real implementations either complete immediately or
//! schedule work on the host side and return.

use lastlight_inventory::ItemStack;
use lastlight_protocol::{MenuPush, PlayerDocument, PlayerId, RaidPush, Vec3, WorldId};

/// A collaborator call failed.
///
/// Callers on the gameplay paths treat every variant as non-fatal: log,
/// degrade, keep going. Nothing downstream of a tick or sweep callback
/// propagates these further up.
#[derive(Debug, thiserror::Error)]
pub enum HookError {
    /// The host SDK rejected or failed the call.
    #[error("host call failed: {0}")]
    Host(String),

    /// The targeted entity no longer exists. Despawning an entity whose
    /// parent was already torn down is a normal race, not a bug.
    #[error("entity already gone")]
    EntityGone,

    /// The persistence backend failed a read or write.
    #[error("storage failure: {0}")]
    Storage(String),
}

/// A live player avatar entity in some world.
pub trait AvatarHandle: Send {
    /// Samples the avatar's current position.
    fn position(&self) -> Vec3;

    fn despawn(&mut self) -> Result<(), HookError>;
}

/// A live held-weapon entity attached to an avatar.
pub trait WeaponHandle: Send {
    fn despawn(&mut self) -> Result<(), HookError>;
}

/// World-side operations: spawning, transfers, raid-wide broadcasts.
pub trait RaidHost: Send {
    /// Spawns the player's avatar into `world` at its spawn point.
    fn spawn_avatar(
        &mut self,
        player: &PlayerId,
        world: &WorldId,
    ) -> Result<Box<dyn AvatarHandle>, HookError>;

    /// Spawns the held-weapon entity for an equipped weapon.
    fn spawn_held_weapon(
        &mut self,
        world: &WorldId,
        item_id: &str,
    ) -> Result<Box<dyn WeaponHandle>, HookError>;

    /// Starts an asynchronous world switch for the player's connection.
    /// Completion arrives later as a world-joined signal.
    fn begin_world_transfer(&mut self, player: &PlayerId, world: &WorldId)
        -> Result<(), HookError>;

    /// Drops an item into the world as a pickup entity.
    fn spawn_pickup(
        &mut self,
        world: &WorldId,
        item: ItemStack,
        position: Vec3,
    ) -> Result<(), HookError>;

    /// Best-effort broadcast to every connected player in `world`.
    /// Enumeration gaps are the host's problem; delivery is not
    /// guaranteed and no error is reported.
    fn broadcast(&mut self, world: &WorldId, push: &RaidPush);
}

/// The one-way UI push channel to a single owning client.
///
/// Fire-and-forget: nothing here awaits a response, and a send to a
/// client that is mid-transition is silently dropped by the host.
pub trait UiChannel: Send {
    fn send_menu(&mut self, push: &MenuPush);

    fn send_raid(&mut self, push: &RaidPush);

    /// Sends a menu payload after `delay_ms` — used for banners pushed
    /// right after a UI swap, so the new surface's listener is attached
    /// by the time the payload arrives.
    fn send_menu_delayed(&mut self, push: MenuPush, delay_ms: u64);
}

/// The per-player persisted document store.
pub trait PersistStore: Send {
    /// Loads and shape-validates the player's document. `Ok(None)` means
    /// a fresh account; a malformed document is an error so the caller
    /// can fall back to the default loadout.
    fn load(&mut self, player: &PlayerId) -> Result<Option<PlayerDocument>, HookError>;

    fn save(&mut self, player: &PlayerId, doc: &PlayerDocument) -> Result<(), HookError>;
}
