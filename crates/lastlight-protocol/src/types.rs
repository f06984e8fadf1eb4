//! Identity newtypes and the small amount of geometry the core needs.

use serde::{Deserialize, Serialize};

use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A stable identifier for a player.
///
/// The host SDK hands us connection objects whose `id` field is optional and
/// whose backing object is *replaced* across a world transfer. Everything in
/// this workspace therefore keys on one canonical `PlayerId`, resolved once
/// per connection via [`PlayerId::resolve`] (platform id, falling back to
/// username) and threaded explicitly — never recomputed ad hoc.
///
/// `#[serde(transparent)]` keeps the JSON representation a plain string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    /// Resolves the canonical identity for a connection.
    ///
    /// Prefers the platform-assigned id; falls back to the username when the
    /// host didn't supply one (some launch contexts omit it).
    pub fn resolve(platform_id: Option<&str>, username: &str) -> Self {
        match platform_id {
            Some(id) if !id.is_empty() => Self(id.to_owned()),
            _ => Self(username.to_owned()),
        }
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stable identifier for a raid-session slot (e.g. `"alpha"`).
///
/// Sessions are eternal rotating slots, not one-shot objects, so the id
/// names the *slot*, never a particular raid window.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A world (map instance) owned by the host SDK.
///
/// Each session slot is pinned to one world; deploying into a session whose
/// world differs from the connection's current world triggers a transfer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorldId(pub String);

impl WorldId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for WorldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// A position in world space.
///
/// The physics engine owns real vector math; the core only ever needs
/// squared distances (zone containment) and small offsets (loot scatter).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Squared distance to `other`. Zone checks compare against `radius²`
    /// so no square root is ever taken.
    pub fn distance_squared(&self, other: &Vec3) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    /// Returns this position shifted in the XZ plane (Y untouched).
    /// Used to scatter loot drops around a death position.
    pub fn offset_xz(&self, dx: f32, dz: f32) -> Vec3 {
        Vec3::new(self.x + dx, self.y, self.z + dz)
    }
}

// =========================================================================
// Tests
// =========================================================================
