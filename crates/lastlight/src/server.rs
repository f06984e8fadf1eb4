//! The raid server actor.
//!
//! One task owns every piece of mutable gameplay state — the player map,
//! the session manager, the death system, the debounced store — and
//! processes commands from a single `mpsc` channel interleaved with a
//! 1-second sweep tick. Nothing is shared, nothing is locked: outside
//! code talks to the actor through [`RaidServerHandle`] and gets answers
//! over `oneshot` replies.
//!
//! ```text
//! host adapters ──RaidCommand──▶ ┌────────────────────────────┐
//!                                │ RaidServer (one task)      │
//!        sweep (1 Hz) ─────────▶ │  players / sessions /      │
//!                                │  deaths / store            │
//!                                └────────────────────────────┘
//!                                      │ hooks: RaidHost, UiChannel,
//!                                      ▼        PersistStore
//! ```
//!
//! Time inside the actor is `tokio::time::Instant`-based, so the whole
//! thing runs under `start_paused` tests with virtual time.

use std::collections::{HashMap, HashSet};

use lastlight_protocol::{MenuPush, PlayerId, RaidPush, SessionId, SessionSummary, WorldId};
use lastlight_raid::{ExtractionEvent, ExtractionZone};
use lastlight_session::{DeployGate, SessionConfig, SessionManager, SweepEvent};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Duration, Instant, MissedTickBehavior};

use crate::death::BANNER_DELAY_MS;
use crate::player::EquippedWeapon;
use crate::{
    DeathSystem, DebouncedStore, GamePlayer, LastlightError, PersistStore, RaidHost, Teardown,
    UiChannel, SAVE_DEBOUNCE_MS,
};

const COMMAND_BUFFER: usize = 64;

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Everything the outside world can ask the actor to do.
pub enum RaidCommand {
    /// A connection came up; resolve its identity and load its state.
    Connect {
        platform_id: Option<String>,
        username: String,
        ui: Box<dyn UiChannel>,
        reply: oneshot::Sender<PlayerId>,
    },
    /// Menu session-select click.
    SelectSession { player: PlayerId, session: SessionId },
    /// Menu deploy click.
    Deploy { player: PlayerId },
    /// Menu rejoin click (post-death reset, then deploy).
    Rejoin { player: PlayerId },
    /// Per-tick input callback for a deployed player's entity.
    InputTick { player: PlayerId },
    /// A damage event from the host's combat layer.
    Damage {
        victim: PlayerId,
        attacker: Option<PlayerId>,
        amount: u32,
    },
    /// The host finished a world transfer for this connection.
    WorldJoined { player: PlayerId, world: WorldId },
    /// The connection dropped.
    Disconnect { player: PlayerId },
    /// Menu poll of the session list.
    MenuSessions {
        reply: oneshot::Sender<Vec<SessionSummary>>,
    },
    Shutdown,
}

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

/// Cloneable front door to the actor.
#[derive(Clone)]
pub struct RaidServerHandle {
    tx: mpsc::Sender<RaidCommand>,
}

impl RaidServerHandle {
    pub async fn connect(
        &self,
        platform_id: Option<String>,
        username: impl Into<String>,
        ui: Box<dyn UiChannel>,
    ) -> Result<PlayerId, LastlightError> {
        let (reply, rx) = oneshot::channel();
        self.send(RaidCommand::Connect {
            platform_id,
            username: username.into(),
            ui,
            reply,
        })
        .await?;
        rx.await.map_err(|_| LastlightError::ServerClosed)
    }

    pub async fn select_session(
        &self,
        player: PlayerId,
        session: SessionId,
    ) -> Result<(), LastlightError> {
        self.send(RaidCommand::SelectSession { player, session }).await
    }

    pub async fn deploy(&self, player: PlayerId) -> Result<(), LastlightError> {
        self.send(RaidCommand::Deploy { player }).await
    }

    pub async fn rejoin(&self, player: PlayerId) -> Result<(), LastlightError> {
        self.send(RaidCommand::Rejoin { player }).await
    }

    pub async fn input_tick(&self, player: PlayerId) -> Result<(), LastlightError> {
        self.send(RaidCommand::InputTick { player }).await
    }

    pub async fn damage(
        &self,
        victim: PlayerId,
        attacker: Option<PlayerId>,
        amount: u32,
    ) -> Result<(), LastlightError> {
        self.send(RaidCommand::Damage {
            victim,
            attacker,
            amount,
        })
        .await
    }

    pub async fn world_joined(
        &self,
        player: PlayerId,
        world: WorldId,
    ) -> Result<(), LastlightError> {
        self.send(RaidCommand::WorldJoined { player, world }).await
    }

    pub async fn disconnect(&self, player: PlayerId) -> Result<(), LastlightError> {
        self.send(RaidCommand::Disconnect { player }).await
    }

    pub async fn menu_sessions(&self) -> Result<Vec<SessionSummary>, LastlightError> {
        let (reply, rx) = oneshot::channel();
        self.send(RaidCommand::MenuSessions { reply }).await?;
        rx.await.map_err(|_| LastlightError::ServerClosed)
    }

    pub async fn shutdown(&self) -> Result<(), LastlightError> {
        self.send(RaidCommand::Shutdown).await
    }

    async fn send(&self, cmd: RaidCommand) -> Result<(), LastlightError> {
        self.tx
            .send(cmd)
            .await
            .map_err(|_| LastlightError::ServerClosed)
    }
}

// ---------------------------------------------------------------------------
// RaidServer
// ---------------------------------------------------------------------------

/// The actor. Owns all state; runs until `Shutdown` or every handle is
/// dropped, then flushes pending saves.
pub struct RaidServer {
    players: HashMap<PlayerId, GamePlayer>,
    sessions: SessionManager,
    deaths: DeathSystem,
    host: Box<dyn RaidHost>,
    store: DebouncedStore,
    zones: Vec<ExtractionZone>,
    rx: mpsc::Receiver<RaidCommand>,
    epoch: Instant,
}

impl RaidServer {
    /// Builds the actor without starting it. Exposed for tests that want
    /// to drive dispatch and sweeps by hand.
    pub fn new(
        host: Box<dyn RaidHost>,
        store: Box<dyn PersistStore>,
        sessions: SessionConfig,
        zones: Vec<ExtractionZone>,
    ) -> (Self, RaidServerHandle) {
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        let server = Self {
            players: HashMap::new(),
            sessions: SessionManager::new(sessions),
            deaths: DeathSystem::default(),
            host,
            store: DebouncedStore::new(store, SAVE_DEBOUNCE_MS),
            zones,
            rx,
            epoch: Instant::now(),
        };
        (server, RaidServerHandle { tx })
    }

    /// Builds the actor and spawns its run loop.
    pub fn spawn(
        host: Box<dyn RaidHost>,
        store: Box<dyn PersistStore>,
        sessions: SessionConfig,
        zones: Vec<ExtractionZone>,
    ) -> RaidServerHandle {
        let (server, handle) = Self::new(host, store, sessions, zones);
        tokio::spawn(server.run());
        handle
    }

    pub async fn run(mut self) {
        self.sessions.initialize(self.now_ms());
        let mut sweep = tokio::time::interval(Duration::from_secs(1));
        sweep.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = sweep.tick() => self.sweep(),
                cmd = self.rx.recv() => match cmd {
                    None | Some(RaidCommand::Shutdown) => break,
                    Some(cmd) => self.dispatch(cmd),
                },
            }
        }

        self.store.flush_all();
        tracing::info!("raid server stopped");
    }

    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    // -- Dispatch ----------------------------------------------------------

    fn dispatch(&mut self, cmd: RaidCommand) {
        match cmd {
            RaidCommand::Connect {
                platform_id,
                username,
                ui,
                reply,
            } => {
                let id = self.connect(platform_id.as_deref(), username, ui);
                let _ = reply.send(id);
            }
            RaidCommand::SelectSession { player, session } => {
                let now = self.now_ms();
                if self.players.contains_key(&player) {
                    self.sessions.assign_player_to_session(&player, &session, now);
                }
            }
            RaidCommand::Deploy { player } => self.try_deploy(&player),
            RaidCommand::Rejoin { player } => self.rejoin(&player),
            RaidCommand::InputTick { player } => self.input_tick(&player),
            RaidCommand::Damage {
                victim,
                attacker,
                amount,
            } => self.apply_damage(&victim, attacker, amount),
            RaidCommand::WorldJoined { player, world } => self.world_joined(&player, world),
            RaidCommand::Disconnect { player } => self.disconnect(&player),
            RaidCommand::MenuSessions { reply } => {
                let _ = reply.send(self.sessions.menu_session_summaries(self.now_ms()));
            }
            // Handled by the run loop.
            RaidCommand::Shutdown => {}
        }
    }

    fn connect(
        &mut self,
        platform_id: Option<&str>,
        username: String,
        ui: Box<dyn UiChannel>,
    ) -> PlayerId {
        let now = self.now_ms();
        let id = PlayerId::resolve(platform_id, &username);
        let doc = match self.store.load(&id) {
            Ok(doc) => doc,
            Err(err) => {
                tracing::warn!(player = %id, %err, "document load failed, using defaults");
                None
            }
        };
        let mut player = GamePlayer::new(id.clone(), username, ui, self.zones.clone(), doc);
        player.ui.send_menu(&MenuPush::SessionList {
            sessions: self.sessions.menu_session_summaries(now),
        });
        tracing::info!(player = %id, "player connected");
        self.players.insert(id.clone(), player);
        id
    }

    fn try_deploy(&mut self, id: &PlayerId) {
        let now = self.now_ms();
        let Some(player) = self.players.get_mut(id) else {
            return;
        };
        if !player.begin_deploy() {
            // Double-click or already deployed: silent no-op.
            return;
        }

        if self.sessions.assignment_for(id).is_none() {
            if let Some(best) = self.sessions.best_session_for_new_deploy(now) {
                self.sessions.assign_player_to_session(id, &best, now);
            }
        }

        match self
            .sessions
            .before_deploy(id, player.connection_world.as_ref(), now)
        {
            DeployGate::Blocked(reason) => {
                player.ui.send_menu(&MenuPush::DeployBlocked {
                    reason: reason.to_string(),
                });
                player.abort_deploy();
            }
            DeployGate::Transfer { world } => {
                player.defer_for_transfer();
                if let Err(err) = self.host.begin_world_transfer(id, &world) {
                    tracing::warn!(player = %id, %err, "world transfer failed to start");
                    self.sessions.mark_transfer_end(id);
                    player.return_to_menu();
                    player.ui.send_menu(&MenuPush::DeployBlocked {
                        reason: "world transfer failed".into(),
                    });
                }
            }
            DeployGate::Ready {
                session,
                seconds_left,
                low_time,
                clock,
            } => {
                if low_time {
                    player
                        .ui
                        .send_menu(&MenuPush::LowTimeWarning { seconds_left });
                }
                let Some(world) = player.connection_world.clone() else {
                    player.abort_deploy();
                    return;
                };
                match self.host.spawn_avatar(id, &world) {
                    Ok(avatar) => {
                        let equipped =
                            Self::equip_from_hotbar(player, self.host.as_mut(), &world);
                        player.finish_deploy(avatar, equipped);
                        player.ui.send_raid(&RaidPush::RaidTimer {
                            session: session.clone(),
                            seconds_left,
                            clock,
                        });
                        tracing::info!(player = %id, %session, seconds_left, "player deployed");
                    }
                    Err(err) => {
                        tracing::warn!(player = %id, %err, "avatar spawn failed");
                        player.ui.send_menu(&MenuPush::DeployBlocked {
                            reason: "deploy failed, try again".into(),
                        });
                        player.abort_deploy();
                    }
                }
            }
        }
    }

    /// Spawns the held-weapon entity for the first weapon in the hotbar.
    /// A spawn failure just means deploying unarmed.
    fn equip_from_hotbar(
        player: &mut GamePlayer,
        host: &mut dyn RaidHost,
        world: &WorldId,
    ) -> Option<EquippedWeapon> {
        let weapon = player
            .hotbar
            .iter()
            .find(|(_, item)| item.ammo.is_some())
            .map(|(_, item)| item.clone())?;
        match host.spawn_held_weapon(world, &weapon.item_id) {
            Ok(entity) => Some(EquippedWeapon {
                item_id: weapon.item_id,
                ammo: weapon.ammo.unwrap_or(0),
                entity,
            }),
            Err(err) => {
                tracing::warn!(player = %player.id, %err, "held weapon spawn failed");
                None
            }
        }
    }

    fn rejoin(&mut self, id: &PlayerId) {
        match self.players.get_mut(id) {
            Some(player) if player.is_in_menu() => player.reset_for_rejoin(),
            _ => return,
        }
        self.try_deploy(id);
    }

    fn world_joined(&mut self, id: &PlayerId, world: WorldId) {
        let Some(player) = self.players.get_mut(id) else {
            return;
        };
        player.connection_world = Some(world);
        self.sessions.mark_transfer_end(id);
        if player.resume_deploy_after_transfer() {
            self.try_deploy(id);
        }
    }

    fn input_tick(&mut self, id: &PlayerId) {
        let now = self.now_ms();
        let mut completed = None;
        if let Some(player) = self.players.get_mut(id) {
            if !player.is_deployed() {
                return;
            }
            let input = player.extraction_input(now);
            for event in player.extraction.step(input) {
                match event {
                    ExtractionEvent::HoldStarted { zone, hold_secs } => player
                        .ui
                        .send_raid(&RaidPush::ExtractionHoldStarted { zone, hold_secs }),
                    ExtractionEvent::Progress {
                        zone,
                        percent,
                        seconds_remaining,
                    } => player.ui.send_raid(&RaidPush::ExtractionProgress {
                        zone,
                        percent,
                        seconds_remaining,
                    }),
                    ExtractionEvent::Cancelled { zone } => player
                        .ui
                        .send_raid(&RaidPush::ExtractionCancelled { zone }),
                    ExtractionEvent::Succeeded { zone } => {
                        player.ui.send_raid(&RaidPush::ExtractionProgress {
                            zone,
                            percent: 100,
                            seconds_remaining: 0,
                        })
                    }
                    ExtractionEvent::Completed { zone } => completed = Some(zone),
                }
            }
        }
        if let Some(zone) = completed {
            self.complete_extraction(id, zone, now);
        }
    }

    /// The success path. Containers are deliberately untouched —
    /// extracted loot is kept.
    fn complete_extraction(&mut self, id: &PlayerId, zone: String, now: u64) {
        let Some(player) = self.players.get_mut(id) else {
            return;
        };
        if !player.is_deployed() {
            return;
        }
        player.persist_equipped_ammo();

        let mut teardown = Teardown::new("extraction");
        if let Some(mut weapon) = player.equipped.take() {
            teardown.run("despawn weapon", || weapon.entity.despawn());
        }
        if let Some(mut avatar) = player.avatar.take() {
            teardown.run("despawn avatar", || avatar.despawn());
        }
        teardown.finish(id);

        self.store.queue_save(id, player.document(), now);
        self.sessions.on_extraction_success(id);
        player.return_to_menu();
        player.ui.send_menu(&MenuPush::SessionList {
            sessions: self.sessions.menu_session_summaries(now),
        });
        player
            .ui
            .send_menu_delayed(MenuPush::ExtractionBanner { zone }, BANNER_DELAY_MS);
        tracing::info!(player = %id, "extraction complete");
    }

    fn apply_damage(&mut self, victim_id: &PlayerId, attacker: Option<PlayerId>, amount: u32) {
        let now = self.now_ms();
        let lethal = match self.players.get_mut(victim_id) {
            Some(victim) => victim.apply_damage(amount),
            None => return,
        };
        if !lethal {
            return;
        }

        // Two players need `&mut` at once; the victim leaves the map for
        // the duration of the resolution.
        let Some(mut victim) = self.players.remove(victim_id) else {
            return;
        };
        let killer = attacker.and_then(|a| self.players.get_mut(&a));
        self.deaths.handle_player_death(
            &mut victim,
            killer,
            self.host.as_mut(),
            &mut self.sessions,
            &mut self.store,
            now,
        );
        self.players.insert(victim.id.clone(), victim);
    }

    fn disconnect(&mut self, id: &PlayerId) {
        let now = self.now_ms();
        let Some(mut player) = self.players.remove(id) else {
            return;
        };
        let mut teardown = Teardown::new("disconnect");
        if let Some(mut weapon) = player.equipped.take() {
            teardown.run("despawn weapon", || weapon.entity.despawn());
        }
        if let Some(mut avatar) = player.avatar.take() {
            teardown.run("despawn avatar", || avatar.despawn());
        }
        teardown.finish(id);
        self.store.queue_save(id, player.document(), now);
        self.sessions.clear_player(id);
        tracing::info!(player = %id, "player disconnected");
    }

    // -- Sweep -------------------------------------------------------------

    fn sweep(&mut self) {
        let now = self.now_ms();
        self.sessions.initialize(now);

        let deployed: HashSet<PlayerId> = self
            .players
            .iter()
            .filter(|(_, p)| p.is_deployed())
            .map(|(id, _)| id.clone())
            .collect();

        for event in self.sessions.sweep(now, |id| deployed.contains(id)) {
            match event {
                SweepEvent::Timer {
                    player,
                    session,
                    seconds_left,
                    clock,
                } => {
                    if let Some(p) = self.players.get_mut(&player) {
                        p.ui.send_raid(&RaidPush::RaidTimer {
                            session,
                            seconds_left,
                            clock,
                        });
                    }
                }
                SweepEvent::Warning {
                    player,
                    seconds_left,
                } => {
                    if let Some(p) = self.players.get_mut(&player) {
                        p.ui.send_raid(&RaidPush::TimeWarning { seconds_left });
                    }
                }
                SweepEvent::MiaExpired { player, session } => {
                    tracing::info!(%player, %session, "raid window expired, resolving MIA");
                    if let Some(p) = self.players.get_mut(&player) {
                        if p.is_deployed() {
                            self.deaths.handle_mia(
                                p,
                                self.host.as_mut(),
                                &mut self.sessions,
                                &mut self.store,
                                now,
                            );
                        }
                    }
                }
                SweepEvent::TransferTimedOut { player } => {
                    if let Some(p) = self.players.get_mut(&player) {
                        p.return_to_menu();
                        p.ui.send_menu(&MenuPush::DeployBlocked {
                            reason: "world transfer timed out".into(),
                        });
                    }
                }
            }
        }

        self.store.tick(now);
    }
}

// =========================================================================
// Tests
// =========================================================================
