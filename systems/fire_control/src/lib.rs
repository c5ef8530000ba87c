#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-shooter fire-rate throttling measured in simulated time.

use std::{collections::BTreeMap, time::Duration};

use tank_combat_core::Combatant;

/// Delay enforced between two shots of the same tank unless configured otherwise.
pub const DEFAULT_FIRE_COOLDOWN: Duration = Duration::from_secs(1);

/// Ledger recording when each shooter may fire again.
#[derive(Clone, Debug)]
pub struct FireControl {
    cooldown: Duration,
    ready_at: BTreeMap<Combatant, Duration>,
}

impl FireControl {
    /// Creates a ledger enforcing `cooldown` between shots.
    #[must_use]
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            ready_at: BTreeMap::new(),
        }
    }

    /// Delay enforced after every accepted shot.
    #[must_use]
    pub const fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Replaces the cooldown; shots already on record keep their ready time.
    pub fn set_cooldown(&mut self, cooldown: Duration) {
        self.cooldown = cooldown;
    }

    /// Earliest simulated time at which `shooter` may fire.
    #[must_use]
    pub fn ready_at(&self, shooter: Combatant) -> Duration {
        self.ready_at
            .get(&shooter)
            .copied()
            .unwrap_or(Duration::ZERO)
    }

    /// Attempts a shot at simulated time `now`.
    ///
    /// Returns `true` and starts the cooldown when the shooter is ready,
    /// `false` otherwise.
    pub fn try_fire(&mut self, shooter: Combatant, now: Duration) -> bool {
        if now < self.ready_at(shooter) {
            return false;
        }

        let _ = self
            .ready_at
            .insert(shooter, now.saturating_add(self.cooldown));
        true
    }

    /// Drops the record of a shooter that left play.
    pub fn forget(&mut self, shooter: Combatant) {
        let _ = self.ready_at.remove(&shooter);
    }

    /// Clears every record, typically when a new level starts.
    pub fn reset(&mut self) {
        self.ready_at.clear();
    }
}

impl Default for FireControl {
    fn default() -> Self {
        Self::new(DEFAULT_FIRE_COOLDOWN)
    }
}
