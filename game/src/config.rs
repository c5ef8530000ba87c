//! Tunable parameters of a game session.

use std::time::Duration;

use serde::Deserialize;
use tank_combat_core::DEFAULT_TANK_HEALTH;

/// Session parameters, deserialisable from a partial document.
///
/// Missing fields take their defaults, so an empty document describes the
/// standard game.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Wall-clock time between two simulation ticks, in milliseconds.
    pub tick_interval_ms: u64,
    /// Simulated time a tank must wait between two shots, in milliseconds.
    pub fire_cooldown_ms: u64,
    /// Health of the player tank at the start of every level.
    pub player_health: u32,
    /// Health of every enemy tank when it spawns.
    pub enemy_health: u32,
    /// Level the session starts on.
    pub first_level: u32,
    /// Seed for every random choice; drawn from entropy by the caller when absent.
    pub seed: Option<u64>,
}

impl GameConfig {
    /// Tick interval as a [`Duration`].
    #[must_use]
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Fire cooldown as a [`Duration`].
    #[must_use]
    pub const fn fire_cooldown(&self) -> Duration {
        Duration::from_millis(self.fire_cooldown_ms)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1_000,
            fire_cooldown_ms: 1_000,
            player_health: DEFAULT_TANK_HEALTH,
            enemy_health: DEFAULT_TANK_HEALTH,
            first_level: 1,
            seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_standard_game() {
        let config = GameConfig::default();
        assert_eq!(config.tick_interval(), Duration::from_secs(1));
        assert_eq!(config.fire_cooldown(), Duration::from_secs(1));
        assert_eq!(config.player_health, 2);
        assert_eq!(config.enemy_health, 2);
        assert_eq!(config.first_level, 1);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn partial_documents_keep_defaults() {
        let config: GameConfig =
            serde_json::from_str(r#"{ "tick_interval_ms": 250, "seed": 9 }"#).expect("parses");
        assert_eq!(config.tick_interval(), Duration::from_millis(250));
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.fire_cooldown_ms, 1_000);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let parsed = serde_json::from_str::<GameConfig>(r#"{ "lives": 3 }"#);
        assert!(parsed.is_err());
    }
}
