//! Item stacks: the unit of storage inside a container slot.

use lastlight_protocol::ItemRecord;
use serde::{Deserialize, Serialize};

/// Maximum quantity a single stackable slot can hold.
pub const MAX_STACK: u32 = 100;

/// One occupied container slot.
///
/// Item *definitions* (names, icons, stats) are opaque data owned by the
/// item tables; the core only needs the id, the count, and — for weapons —
/// the ammo currently loaded in the magazine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item_id: String,
    pub quantity: u32,
    /// Loaded ammo. `Some` marks this stack as a weapon; weapons never
    /// stack (quantity is always 1).
    pub ammo: Option<u32>,
}

impl ItemStack {
    /// A stackable item (consumables, ammo boxes, scrap).
    pub fn stackable(item_id: impl Into<String>, quantity: u32) -> Self {
        Self {
            item_id: item_id.into(),
            quantity,
            ammo: None,
        }
    }

    /// A weapon carrying `ammo` rounds in its magazine.
    pub fn weapon(item_id: impl Into<String>, ammo: u32) -> Self {
        Self {
            item_id: item_id.into(),
            quantity: 1,
            ammo: Some(ammo),
        }
    }

    /// Whether this stack can merge with others of the same id.
    pub fn is_stackable(&self) -> bool {
        self.ammo.is_none()
    }

    /// How many more units fit in this stack.
    pub fn headroom(&self) -> u32 {
        if self.is_stackable() {
            MAX_STACK.saturating_sub(self.quantity)
        } else {
            0
        }
    }

    /// The stored form, pinned to a slot index.
    pub fn to_record(&self, position: usize) -> ItemRecord {
        ItemRecord {
            position,
            item_id: self.item_id.clone(),
            // A quantity of 1 is the implicit default in the stored shape.
            quantity: (self.quantity != 1).then_some(self.quantity),
            ammo: self.ammo,
        }
    }

    pub fn from_record(record: &ItemRecord) -> Self {
        Self {
            item_id: record.item_id.clone(),
            quantity: record.quantity.unwrap_or(1),
            ammo: record.ammo,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weapon_never_stackable() {
        let w = ItemStack::weapon("smg_9", 30);
        assert!(!w.is_stackable());
        assert_eq!(w.headroom(), 0);
        assert_eq!(w.quantity, 1);
    }

    #[test]
    fn test_headroom_caps_at_max_stack() {
        assert_eq!(ItemStack::stackable("scrap", 40).headroom(), MAX_STACK - 40);
        assert_eq!(ItemStack::stackable("scrap", MAX_STACK).headroom(), 0);
    }

    #[test]
    fn test_record_round_trip_preserves_quantity_and_ammo() {
        let ammo_box = ItemStack::stackable("ammo_9mm", 37);
        let rec = ammo_box.to_record(4);
        assert_eq!(rec.position, 4);
        assert_eq!(rec.quantity, Some(37));
        assert_eq!(ItemStack::from_record(&rec), ammo_box);

        let weapon = ItemStack::weapon("smg_9", 12);
        let rec = weapon.to_record(0);
        assert_eq!(rec.quantity, None); // implicit 1
        assert_eq!(rec.ammo, Some(12));
        assert_eq!(ItemStack::from_record(&rec), weapon);
    }
}
