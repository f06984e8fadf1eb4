//! The stash: out-of-raid storage.
//!
//! Unlike the hotbar/backpack, the stash has no slot positions — it's a
//! flat `item_id → quantity` map, loaded and saved through its own
//! collaborator path. Weapons lose their magazine state when stashed
//! (the loaded ammo concept only exists on carried gear).

use lastlight_protocol::StashDoc;

/// Unbounded quantity-map storage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stash {
    items: StashDoc,
}

impl Stash {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deposit(&mut self, item_id: &str, quantity: u32) {
        if quantity == 0 {
            return;
        }
        *self.items.entry(item_id.to_owned()).or_insert(0) += quantity;
    }

    /// Withdraws up to `quantity` units, returning how many were available.
    pub fn withdraw(&mut self, item_id: &str, quantity: u32) -> u32 {
        let Some(held) = self.items.get_mut(item_id) else {
            return 0;
        };
        let taken = (*held).min(quantity);
        *held -= taken;
        if *held == 0 {
            self.items.remove(item_id);
        }
        taken
    }

    pub fn quantity_of(&self, item_id: &str) -> u32 {
        self.items.get(item_id).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn to_doc(&self) -> StashDoc {
        self.items.clone()
    }

    pub fn from_doc(doc: StashDoc) -> Self {
        let mut items = doc;
        items.retain(|_, qty| *qty > 0);
        Self { items }
    }
}
