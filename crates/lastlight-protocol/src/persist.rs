//! The shape of the per-player persisted document.
//!
//! The storage backend is an opaque key/value store owned by the platform;
//! only the document *shape* belongs to us. Loading goes through
//! [`PlayerDocument::from_json`], which shape-validates before use — a
//! malformed document is reported as an error so the caller can fall back
//! to the default starting loadout instead of crashing mid-login.

use serde::{Deserialize, Serialize};

use std::collections::BTreeMap;

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Item / container records
// ---------------------------------------------------------------------------

/// One stored item slot.
///
/// `quantity` is present for stackables, `ammo` for weapons; both are
/// optional in the stored form and default sensibly on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    /// Slot index within the container.
    pub position: usize,
    pub item_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ammo: Option<u32>,
}

/// A stored container: a sparse list of occupied slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ContainerDoc {
    #[serde(default)]
    pub items: Vec<ItemRecord>,
}

/// The stash uses a simpler flat map — `item_id → quantity`. It is loaded
/// and saved through a different collaborator path than the raid gear.
pub type StashDoc = BTreeMap<String, u32>;

// ---------------------------------------------------------------------------
// PlayerDocument
// ---------------------------------------------------------------------------

/// Everything persisted per player identity that this core cares about.
/// Other subsystems (cosmetics, settings) keep their own fields; unknown
/// fields are ignored on load and never round-tripped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PlayerDocument {
    #[serde(default)]
    pub backpack: ContainerDoc,
    #[serde(default)]
    pub hotbar: ContainerDoc,
    #[serde(default)]
    pub currency: u64,
}

impl PlayerDocument {
    /// Parses and shape-validates a stored document.
    ///
    /// # Errors
    /// [`ProtocolError::MalformedDocument`] when the bytes aren't valid
    /// JSON, don't match the document shape, or contain out-of-range slot
    /// data. Callers treat this as "use the default loadout", not a crash.
    pub fn from_json(data: &[u8]) -> Result<Self, ProtocolError> {
        let doc: PlayerDocument = serde_json::from_slice(data)?;
        doc.validate()?;
        Ok(doc)
    }

    /// Serializes for storage.
    pub fn to_json(&self) -> Result<Vec<u8>, ProtocolError> {
        Ok(serde_json::to_vec(self)?)
    }

    fn validate(&self) -> Result<(), ProtocolError> {
        for (name, container) in [("hotbar", &self.hotbar), ("backpack", &self.backpack)] {
            let mut seen = std::collections::HashSet::new();
            for record in &container.items {
                if record.item_id.is_empty() {
                    return Err(ProtocolError::MalformedDocument(format!(
                        "{name}: empty item_id at position {}",
                        record.position
                    )));
                }
                if record.quantity == Some(0) {
                    return Err(ProtocolError::MalformedDocument(format!(
                        "{name}: zero quantity for {}",
                        record.item_id
                    )));
                }
                if !seen.insert(record.position) {
                    return Err(ProtocolError::MalformedDocument(format!(
                        "{name}: duplicate position {}",
                        record.position
                    )));
                }
            }
        }
        Ok(())
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn weapon(position: usize, ammo: u32) -> ItemRecord {
        ItemRecord {
            position,
            item_id: "smg_9".into(),
            quantity: None,
            ammo: Some(ammo),
        }
    }

    #[test]
    fn test_from_json_round_trips_full_document() {
        let doc = PlayerDocument {
            hotbar: ContainerDoc { items: vec![weapon(0, 12)] },
            backpack: ContainerDoc {
                items: vec![ItemRecord {
                    position: 3,
                    item_id: "ammo_9mm".into(),
                    quantity: Some(37),
                    ammo: None,
                }],
            },
            currency: 420,
        };

        let bytes = doc.to_json().unwrap();
        let back = PlayerDocument::from_json(&bytes).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_from_json_missing_fields_default() {
        // Fresh accounts may have a document written by another subsystem
        // that never touched the raid fields.
        let doc = PlayerDocument::from_json(br#"{ "currency": 5 }"#).unwrap();
        assert_eq!(doc.currency, 5);
        assert!(doc.hotbar.items.is_empty());
        assert!(doc.backpack.items.is_empty());
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(PlayerDocument::from_json(b"not json").is_err());
    }

    #[test]
    fn test_from_json_rejects_empty_item_id() {
        let json = br#"{ "hotbar": { "items": [ { "position": 0, "item_id": "" } ] } }"#;
        assert!(PlayerDocument::from_json(json).is_err());
    }

    #[test]
    fn test_from_json_rejects_duplicate_positions() {
        let json = br#"{ "hotbar": { "items": [
            { "position": 1, "item_id": "bandage", "quantity": 2 },
            { "position": 1, "item_id": "smg_9", "ammo": 3 }
        ] } }"#;
        assert!(PlayerDocument::from_json(json).is_err());
    }

    #[test]
    fn test_from_json_rejects_zero_quantity() {
        let json = br#"{ "backpack": { "items": [
            { "position": 0, "item_id": "bandage", "quantity": 0 }
        ] } }"#;
        assert!(PlayerDocument::from_json(json).is_err());
    }

    #[test]
    fn test_quantity_and_ammo_omitted_when_absent() {
        let doc = PlayerDocument {
            hotbar: ContainerDoc {
                items: vec![ItemRecord {
                    position: 0,
                    item_id: "bandage".into(),
                    quantity: Some(3),
                    ammo: None,
                }],
            },
            ..Default::default()
        };
        let json: serde_json::Value =
            serde_json::from_slice(&doc.to_json().unwrap()).unwrap();
        let item = &json["hotbar"]["items"][0];
        assert_eq!(item["quantity"], 3);
        assert!(item.get("ammo").is_none());
    }
}
