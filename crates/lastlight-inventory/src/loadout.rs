//! Default starting loadout.
//!
//! Used for fresh accounts and as the fallback when a persisted document
//! fails to load or validate — a broken save must never block login.

use crate::{ItemInventory, ItemStack};

/// Hotbar slot count. Matches the client's hotbar row.
pub const HOTBAR_SIZE: usize = 6;

/// Backpack slot count.
pub const BACKPACK_SIZE: usize = 24;

/// Starter hotbar: a sidearm and a bandage.
pub fn default_hotbar() -> ItemInventory {
    let mut hotbar = ItemInventory::new(HOTBAR_SIZE);
    let _ = hotbar.add_item(ItemStack::weapon("pistol_9", 12), Some(0));
    let _ = hotbar.add_item(ItemStack::stackable("bandage", 2), Some(1));
    hotbar
}

/// Starter backpack: a box of pistol ammo.
pub fn default_backpack() -> ItemInventory {
    let mut backpack = ItemInventory::new(BACKPACK_SIZE);
    let _ = backpack.add_item(ItemStack::stackable("ammo_9mm", 24), Some(0));
    backpack
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_hotbar_has_weapon_in_slot_zero() {
        let hotbar = default_hotbar();
        let weapon = hotbar.get_item_at(0).expect("starter weapon");
        assert_eq!(weapon.item_id, "pistol_9");
        assert!(weapon.ammo.is_some());
    }

    #[test]
    fn test_default_containers_have_expected_sizes() {
        assert_eq!(default_hotbar().size(), HOTBAR_SIZE);
        assert_eq!(default_backpack().size(), BACKPACK_SIZE);
    }
}
