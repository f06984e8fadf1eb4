//! Death and MIA resolution.
//!
//! Single-shot paths invoked once per terminal event, never per tick.
//! Both end the same way: best-effort entity teardown, a queued save,
//! assignment cleared, player back in the menu with a banner. The
//! difference is what happens to carried gear — a death drops it where
//! the player fell, an MIA destroys it outright — and whether anyone is
//! owed rewards.

use lastlight_inventory::ItemStack;
use lastlight_protocol::{MenuPush, RaidPush, WorldId};
use lastlight_session::SessionManager;
use rand::Rng;

use crate::{DebouncedStore, GamePlayer, RaidHost, Teardown};

/// Delay before a post-transition banner, giving the freshly attached
/// menu UI listener time to come up before the payload arrives.
pub(crate) const BANNER_DELAY_MS: u64 = 750;

/// How far (in world units, per axis) dropped loot scatters from the
/// death position.
const SCATTER_RADIUS: f32 = 1.5;

/// Resolves kill and MIA terminations.
///
/// Stateless apart from configuration; constructed once by the server
/// and handed every collaborator it needs per call, so tests can run it
/// against fresh mocks.
pub struct DeathSystem {
    scatter_radius: f32,
}

impl Default for DeathSystem {
    fn default() -> Self {
        Self {
            scatter_radius: SCATTER_RADIUS,
        }
    }
}

impl DeathSystem {
    /// Resolves a lethal damage event.
    ///
    /// `killer` is `None` for environmental deaths and self-kills (the
    /// server never passes the victim as their own killer). Every
    /// cleanup step is best-effort; the victim ends in the menu no
    /// matter what fails along the way.
    pub fn handle_player_death(
        &mut self,
        victim: &mut GamePlayer,
        mut killer: Option<&mut GamePlayer>,
        host: &mut dyn RaidHost,
        sessions: &mut SessionManager,
        store: &mut DebouncedStore,
        now_ms: u64,
    ) {
        let world = victim.connection_world.clone();
        let killer_name = killer.as_ref().map(|k| k.username.clone());
        let killer_weapon = killer
            .as_ref()
            .and_then(|k| k.equipped.as_ref())
            .map(|w| w.item_id.clone());

        // The dropped weapon carries its real magazine count.
        victim.persist_equipped_ammo();

        if let Some(world) = &world {
            let dropped = self.drop_carried(victim, world, host);
            tracing::info!(player = %victim.id, dropped, "death loot dropped");

            host.broadcast(
                world,
                &RaidPush::DeathMessage {
                    victim: victim.username.clone(),
                },
            );
            if let Some(killer_name) = &killer_name {
                host.broadcast(
                    world,
                    &RaidPush::KillFeed {
                        killer: killer_name.clone(),
                        weapon_icon: killer_weapon
                            .as_deref()
                            .map(|id| format!("icon_{id}"))
                            .unwrap_or_else(|| "icon_unarmed".into()),
                        victim: victim.username.clone(),
                    },
                );
            }
        }

        if let Some(killer) = killer.as_deref_mut() {
            if killer.id != victim.id {
                killer.stats.record_kill(killer_weapon.as_deref());
            }
        }
        victim.stats.record_death();

        self.finish(victim, sessions, store, now_ms);
        victim
            .ui
            .send_menu_delayed(MenuPush::DeathBanner { killer: killer_name }, BANNER_DELAY_MS);
    }

    /// Resolves a raid-timer expiration (missing in action).
    ///
    /// Gear is destroyed, not dropped: the containers are cleared before
    /// the drop step, which then finds nothing and broadcasts a cosmetic
    /// debris message instead. No rewards are attributed — there is no
    /// killer and the MIA player earns nothing.
    pub fn handle_mia(
        &mut self,
        player: &mut GamePlayer,
        host: &mut dyn RaidHost,
        sessions: &mut SessionManager,
        store: &mut DebouncedStore,
        now_ms: u64,
    ) {
        player.hotbar.take_all();
        player.backpack.take_all();

        if let Some(world) = player.connection_world.clone() {
            let dropped = self.drop_carried(player, &world, host);
            if dropped == 0 {
                host.broadcast(&world, &RaidPush::Debris);
            }
            host.broadcast(
                &world,
                &RaidPush::MiaMessage {
                    player: player.username.clone(),
                },
            );
        }
        tracing::info!(player = %player.id, "player went MIA, gear lost");

        self.finish(player, sessions, store, now_ms);
        player.ui.send_menu_delayed(MenuPush::MiaBanner, BANNER_DELAY_MS);
    }

    /// Empties both carried containers into the world as scattered
    /// pickups; returns how many were actually spawned.
    fn drop_carried(
        &self,
        player: &mut GamePlayer,
        world: &WorldId,
        host: &mut dyn RaidHost,
    ) -> usize {
        let origin = player.sample_position().unwrap_or_default();
        let items: Vec<ItemStack> = player
            .hotbar
            .take_all()
            .into_iter()
            .chain(player.backpack.take_all())
            .collect();

        let mut rng = rand::rng();
        let mut spawned = 0;
        for item in items {
            let dx = rng.random_range(-self.scatter_radius..=self.scatter_radius);
            let dz = rng.random_range(-self.scatter_radius..=self.scatter_radius);
            match host.spawn_pickup(world, item, origin.offset_xz(dx, dz)) {
                Ok(()) => spawned += 1,
                Err(err) => tracing::warn!(player = %player.id, %err, "pickup spawn failed"),
            }
        }
        spawned
    }

    /// The shared tail: teardown, save, unassign, back to the menu.
    fn finish(
        &self,
        player: &mut GamePlayer,
        sessions: &mut SessionManager,
        store: &mut DebouncedStore,
        now_ms: u64,
    ) {
        let mut teardown = Teardown::new("raid end");
        if let Some(mut weapon) = player.equipped.take() {
            teardown.run("despawn weapon", || weapon.entity.despawn());
        }
        if let Some(mut avatar) = player.avatar.take() {
            teardown.run("despawn avatar", || avatar.despawn());
        }
        teardown.finish(&player.id);

        store.queue_save(&player.id, player.document(), now_ms);
        sessions.clear_player(&player.id);
        player.return_to_menu();
    }
}

// =========================================================================
// Tests
// =========================================================================
