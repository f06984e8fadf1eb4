//! Best-effort teardown: run every step, collect every failure.
//!
//! Death, MIA, and extraction all end with the same shape of cleanup —
//! despawn the weapon, despawn the avatar, save, clear the assignment —
//! and a failure in any one step must never stop the ones after it.
//! Returning the player to a safe menu state is the highest-priority
//! guarantee of the resolution paths. Instead of scattering swallowed
//! errors through the call sites, each path builds a [`Teardown`], runs
//! its steps through it, and finishes with one log line per failure.

use lastlight_protocol::PlayerId;

use crate::HookError;

/// An ordered sequence of independent cleanup steps.
pub(crate) struct Teardown {
    label: &'static str,
    failures: Vec<(&'static str, HookError)>,
}

impl Teardown {
    pub(crate) fn new(label: &'static str) -> Self {
        Self {
            label,
            failures: Vec::new(),
        }
    }

    /// Runs one step; a failure is recorded, never propagated.
    pub(crate) fn run(&mut self, step: &'static str, f: impl FnOnce() -> Result<(), HookError>) {
        if let Err(err) = f() {
            self.failures.push((step, err));
        }
    }

    /// Logs every recorded failure and reports how many there were.
    pub(crate) fn finish(self, player: &PlayerId) -> usize {
        for (step, err) in &self.failures {
            tracing::warn!(
                %player,
                path = self.label,
                step,
                %err,
                "teardown step failed, continuing"
            );
        }
        self.failures.len()
    }
}
