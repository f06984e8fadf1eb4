//! Kill/death reward attribution.
//!
//! The actual numbers are tuning data and will move with balance passes;
//! the attribution *rules* are what this module owns: a killer earns kill
//! XP and a per-weapon kill counter bump, a victim earns a small
//! consolation amount, and the kill/death counters always move together
//! with the XP.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// XP awarded to the killer.
pub const KILL_XP: u64 = 150;

/// XP awarded to the victim for showing up.
pub const DEATH_CONSOLATION_XP: u64 = 25;

/// Lifetime raid statistics for one player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub kills: u64,
    pub deaths: u64,
    pub xp: u64,
    /// Kill count per weapon id, for weapon mastery tracking.
    #[serde(default)]
    pub weapon_kills: HashMap<String, u64>,
}

impl PlayerStats {
    /// Credits a kill made with `weapon_id` (`None` for kills without an
    /// attributable weapon, e.g. environmental).
    pub fn record_kill(&mut self, weapon_id: Option<&str>) {
        self.kills += 1;
        self.xp += KILL_XP;
        if let Some(weapon) = weapon_id {
            *self.weapon_kills.entry(weapon.to_owned()).or_insert(0) += 1;
        }
    }

    /// Credits a death.
    pub fn record_death(&mut self) {
        self.deaths += 1;
        self.xp += DEATH_CONSOLATION_XP;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_kill_updates_xp_and_weapon_counter() {
        let mut stats = PlayerStats::default();
        stats.record_kill(Some("smg_9"));
        stats.record_kill(Some("smg_9"));
        stats.record_kill(None);
        assert_eq!(stats.kills, 3);
        assert_eq!(stats.xp, 3 * KILL_XP);
        assert_eq!(stats.weapon_kills.get("smg_9"), Some(&2));
    }

    #[test]
    fn test_record_death_grants_consolation() {
        let mut stats = PlayerStats::default();
        stats.record_death();
        assert_eq!(stats.deaths, 1);
        assert_eq!(stats.xp, DEATH_CONSOLATION_XP);
        assert!(stats.weapon_kills.is_empty());
    }
}
