//! Fixed-capacity slot containers with stacking/merge rules.

use lastlight_protocol::ContainerDoc;

use crate::{InventoryError, ItemStack};

/// A fixed-size array of item slots (hotbar, backpack).
///
/// Adding a stackable item tops up existing stacks of the same id before
/// taking a fresh slot; weapons always occupy their own slot. Slots are
/// addressed by index and stay where they were put — the UI relies on
/// positions being stable across saves.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemInventory {
    slots: Vec<Option<ItemStack>>,
}

impl ItemInventory {
    pub fn new(size: usize) -> Self {
        Self {
            slots: vec![None; size],
        }
    }

    /// Number of slots (occupied or not).
    pub fn size(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots.
    pub fn count_items(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|s| s.is_none())
    }

    pub fn get_item_at(&self, slot: usize) -> Option<&ItemStack> {
        self.slots.get(slot).and_then(|s| s.as_ref())
    }

    pub fn get_item_at_mut(&mut self, slot: usize) -> Option<&mut ItemStack> {
        self.slots.get_mut(slot).and_then(|s| s.as_mut())
    }

    /// Removes and returns the stack at `slot`, if any.
    pub fn remove_item(&mut self, slot: usize) -> Option<ItemStack> {
        self.slots.get_mut(slot).and_then(|s| s.take())
    }

    /// First slot holding an item with this id, scanning in slot order.
    pub fn find_first(&self, item_id: &str) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| s.as_ref().is_some_and(|i| i.item_id == item_id))
    }

    /// Adds a stack, merging into existing stacks of the same id first.
    ///
    /// Returns the slot index that received the item (for merges that span
    /// stacks, the last slot written). With `preferred` set, that slot is
    /// tried before the merge/first-empty scan — used by UI-driven moves.
    ///
    /// # Errors
    /// [`InventoryError::ContainerFull`] when quantity is left over after
    /// every stack is topped up and no empty slot remains. The error
    /// carries the unplaced remainder so the caller can drop it to the
    /// world rather than lose it.
    pub fn add_item(
        &mut self,
        item: ItemStack,
        preferred: Option<usize>,
    ) -> Result<usize, InventoryError> {
        if let Some(slot) = preferred {
            if slot >= self.slots.len() {
                return Err(InventoryError::SlotOutOfRange {
                    slot,
                    size: self.slots.len(),
                });
            }
            if self.slots[slot].is_none() {
                self.slots[slot] = Some(item);
                return Ok(slot);
            }
        }

        if !item.is_stackable() {
            return match self.first_empty() {
                Some(slot) => {
                    self.slots[slot] = Some(item);
                    Ok(slot)
                }
                None => Err(InventoryError::ContainerFull { leftover: item.quantity }),
            };
        }

        // Top up existing stacks of the same id, in slot order.
        let mut remaining = item.quantity;
        let mut last_touched = None;
        for (idx, slot) in self.slots.iter_mut().enumerate() {
            if remaining == 0 {
                break;
            }
            if let Some(existing) = slot {
                if existing.item_id == item.item_id {
                    let take = existing.headroom().min(remaining);
                    if take > 0 {
                        existing.quantity += take;
                        remaining -= take;
                        last_touched = Some(idx);
                    }
                }
            }
        }

        if remaining > 0 {
            match self.first_empty() {
                Some(slot) => {
                    self.slots[slot] = Some(ItemStack {
                        quantity: remaining,
                        ..item
                    });
                    last_touched = Some(slot);
                }
                None => return Err(InventoryError::ContainerFull { leftover: remaining }),
            }
        }

        // `last_touched` is always set here: either something merged or the
        // remainder landed in an empty slot above.
        Ok(last_touched.expect("add placed at least one unit"))
    }

    /// Empties the container, returning every stack. Used by the death
    /// path (drop everything) and the rejoin reset.
    pub fn take_all(&mut self) -> Vec<ItemStack> {
        self.slots.iter_mut().filter_map(|s| s.take()).collect()
    }

    /// Occupied slots, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &ItemStack)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|item| (i, item)))
    }

    // -- Persistence ------------------------------------------------------

    /// The stored form: a sparse list of occupied slots.
    pub fn serialize(&self) -> ContainerDoc {
        ContainerDoc {
            items: self.iter().map(|(i, item)| item.to_record(i)).collect(),
        }
    }

    /// Rebuilds a container of `size` slots from its stored form.
    ///
    /// # Errors
    /// [`InventoryError::SlotOutOfRange`] when a record points past the
    /// container — the document-level shape check can't know container
    /// sizes, so this is caught here and treated as corruption upstream.
    pub fn load_from_serialized_data(
        size: usize,
        doc: &ContainerDoc,
    ) -> Result<Self, InventoryError> {
        let mut inventory = Self::new(size);
        for record in &doc.items {
            if record.position >= size {
                return Err(InventoryError::SlotOutOfRange {
                    slot: record.position,
                    size,
                });
            }
            inventory.slots[record.position] = Some(ItemStack::from_record(record));
        }
        Ok(inventory)
    }

    fn first_empty(&self) -> Option<usize> {
        self.slots.iter().position(|s| s.is_none())
    }
}

// =========================================================================
// Tests
// =========================================================================
