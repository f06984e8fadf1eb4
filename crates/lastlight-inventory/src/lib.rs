//! Item containers for Lastlight.
//!
//! Three containers make up a player's gear:
//!
//! - **Hotbar** — small, fixed-capacity, carried into raids
//! - **Backpack** — larger, also carried into raids
//! - **Stash** — out-of-raid storage, a flat quantity map
//!
//! The hotbar and backpack are [`ItemInventory`] instances: fixed slot
//! arrays with stacking/merge rules. The death and extraction paths are the
//! only code that moves items out of them besides normal UI-driven moves —
//! death forfeits everything, extraction keeps everything.

mod container;
mod error;
mod item;
mod loadout;
mod stash;

pub use container::ItemInventory;
pub use error::InventoryError;
pub use item::{ItemStack, MAX_STACK};
pub use loadout::{default_backpack, default_hotbar, BACKPACK_SIZE, HOTBAR_SIZE};
pub use stash::Stash;
