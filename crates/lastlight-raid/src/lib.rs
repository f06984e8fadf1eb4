//! Raid-resolution building blocks for Lastlight.
//!
//! Two independent pieces live here:
//!
//! 1. **Extraction** — [`ExtractionSystem`], the per-deployed-player
//!    zone-hold state machine. Stepped once per server tick from the
//!    entity's input-tick callback; polling-based, so every disqualifying
//!    condition (zone exit, death, world loss) is observed with at most
//!    one tick of latency.
//! 2. **Rewards** — [`PlayerStats`] and the XP attribution applied when a
//!    raid ends in a kill. The numbers are opaque tuning data.
//!
//! The death/MIA resolution itself lives in the top-level crate, next to
//! the collaborator traits it needs; this crate stays pure state + math.

mod extraction;
mod rewards;
mod zone;

pub use extraction::{ExtractionEvent, ExtractionSystem, StepInput};
pub use rewards::{PlayerStats, DEATH_CONSOLATION_XP, KILL_XP};
pub use zone::ExtractionZone;
