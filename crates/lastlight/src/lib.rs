//! Lastlight: session lifecycle and raid-state core.
//!
//! Server-side gameplay rules for a multiplayer extraction shooter. The
//! host game engine owns entities, physics, rendering, and transport;
//! this crate owns the rules layered on top — who is in which raid, when
//! raids end, what happens to a player's gear when they extract, die, or
//! go missing in action.
//!
//! # How it fits in the stack
//!
//! ```text
//! host SDK adapters        ← implement RaidHost / UiChannel / PersistStore
//!     ↕
//! lastlight (this crate)   ← GamePlayer state machine, DeathSystem,
//!     ↕                      RaidServer actor, debounced persistence
//! session / raid / inventory crates  ← pure state + math
//!     ↕
//! lastlight-protocol       ← identity, UI payloads, document shapes
//! ```
//!
//! # Concurrency model
//!
//! One actor task ([`RaidServer`]) owns every piece of mutable state.
//! Host adapters send [`RaidCommand`]s through a [`RaidServerHandle`];
//! a 1-second sweep interleaves with command dispatch on the same task.
//! The state machines underneath are synchronous and take `now_ms`
//! explicitly, so all timing behavior is testable under virtual time.

mod death;
mod error;
mod hooks;
mod player;
mod server;
mod store;
mod teardown;

pub use death::DeathSystem;
pub use error::LastlightError;
pub use hooks::{AvatarHandle, HookError, PersistStore, RaidHost, UiChannel, WeaponHandle};
pub use player::{EquippedWeapon, GamePlayer, RaidPhase, MAX_HEALTH};
pub use server::{RaidCommand, RaidServer, RaidServerHandle};
pub use store::{DebouncedStore, InMemoryStore, SAVE_DEBOUNCE_MS};

pub(crate) use teardown::Teardown;

// Re-exported so embedders can configure a server without naming the
// sub-crates directly.
pub use lastlight_raid::ExtractionZone;
pub use lastlight_session::{SessionConfig, SlotConfig};

/// Installs the global tracing subscriber, honoring `RUST_LOG` and
/// defaulting to `info`.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}
