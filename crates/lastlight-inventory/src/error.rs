//! Error types for the inventory layer.

/// Errors from container operations.
#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    /// The slot index points past the end of the container.
    #[error("slot {slot} out of range (container has {size} slots)")]
    SlotOutOfRange { slot: usize, size: usize },

    /// No room left. `leftover` is the quantity that could not be placed
    /// after merging — the caller decides whether to drop it to the world.
    #[error("container full ({leftover} unplaced)")]
    ContainerFull { leftover: u32 },
}
