//! Extraction zone geometry.

use lastlight_protocol::Vec3;
use serde::{Deserialize, Serialize};

/// A spherical extraction zone.
///
/// Static configuration — the zone set is supplied at construction and
/// never mutated at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionZone {
    pub name: String,
    pub center: Vec3,
    pub radius: f32,
    /// Continuous occupancy required to extract.
    pub hold_secs: u64,
}

impl ExtractionZone {
    pub fn new(name: impl Into<String>, center: Vec3, radius: f32, hold_secs: u64) -> Self {
        Self {
            name: name.into(),
            center,
            radius,
            hold_secs,
        }
    }

    /// Exact sphere containment: `distance² ≤ radius²`. Boundary counts
    /// as inside.
    pub fn contains(&self, position: &Vec3) -> bool {
        position.distance_squared(&self.center) <= self.radius * self.radius
    }
}
