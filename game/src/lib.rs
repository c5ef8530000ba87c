#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Session orchestration for Tank Combat.
//!
//! [`Game`] owns the player tank, drives the world one tick at a time, applies
//! player input, resolves hits on the player, advances through levels and
//! forwards drawing notifications to a [`Presenter`]. Input, level layouts and
//! presentation are supplied by the embedding adapter through the traits in
//! this crate.

mod clock;
mod collaborators;
mod config;
mod present;

use std::{
    thread,
    time::{Duration, Instant},
};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tank_combat_core::{Combatant, Command, CoreError, Event, IVec2, InputAction};
use tank_combat_system_placement::{random_orientation, random_walkable_cell};
use tank_combat_world::{self as world, query, Projectile, Tank, World};
use thiserror::Error;
use tracing::{debug, info};

pub use clock::TickAccumulator;
pub use collaborators::{
    latest_action_channel, ActionSender, InMemoryLevels, InputSource, LatestAction,
    LevelSource, LevelSourceError, Presenter, ScriptedInput,
};
pub use config::GameConfig;

/// Seed used when the configuration does not provide one.
pub const DEFAULT_SEED: u64 = 0x7a4b_c0de_5eed_0001;

/// Delay between two wall-clock checks of the real-time loop.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Offset separating the enemy decision stream from the placement stream.
const ENEMY_STREAM_OFFSET: u64 = 0x9e37_79b9_7f4a_7c15;

/// Why a session stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// The player tank ran out of health.
    PlayerDestroyed,
    /// The player asked to quit.
    ExitRequested,
    /// The next level does not exist.
    LevelsExhausted,
    /// The input source will never produce another action.
    InputExhausted,
}

/// Summary of a finished session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct RunOutcome {
    /// Why the session stopped.
    pub reason: EndReason,
    /// Level reached.
    pub level: u32,
    /// Player health when the session stopped; zero without a player tank.
    pub player_health: u32,
    /// Number of simulation ticks executed.
    pub ticks: u64,
}

/// Failures that abort a session.
#[derive(Debug, Error)]
pub enum GameError {
    /// The simulation hit a logic error.
    #[error(transparent)]
    Core(#[from] CoreError),
    /// A level exists but could not be loaded.
    #[error(transparent)]
    Level(#[from] LevelSourceError),
    /// Simulated time would never advance, freezing every fire cooldown.
    #[error("tick interval must be greater than zero")]
    ZeroTickInterval,
    /// A level has no walkable cell left for a tank.
    #[error("level {level} has no free cell to place a tank")]
    NoFreeCell {
        /// Level being populated.
        level: u32,
    },
}

/// A running game session.
#[derive(Debug)]
pub struct Game<I, P, L> {
    config: GameConfig,
    seed: u64,
    world: World,
    rng: ChaCha8Rng,
    input: I,
    presenter: P,
    levels: L,
    player: Option<Tank>,
    level: u32,
    end: Option<EndReason>,
    ticks: u64,
    accumulator: TickAccumulator,
}

impl<I, P, L> Game<I, P, L>
where
    I: InputSource,
    P: Presenter,
    L: LevelSource,
{
    /// Creates a session and loads its first level.
    ///
    /// When the first level does not exist the session is created already
    /// finished with [`EndReason::LevelsExhausted`].
    ///
    /// # Errors
    ///
    /// Returns [`GameError::ZeroTickInterval`] for a zero tick interval, or
    /// another [`GameError`] if the first level cannot be loaded or has no
    /// room for its tanks.
    pub fn new(config: GameConfig, input: I, presenter: P, levels: L) -> Result<Self, GameError> {
        if config.tick_interval_ms == 0 {
            return Err(GameError::ZeroTickInterval);
        }
        let seed = config.seed.unwrap_or(DEFAULT_SEED);
        let mut world = World::new(seed ^ ENEMY_STREAM_OFFSET);
        world::apply(
            &mut world,
            Command::ConfigureFireCooldown {
                cooldown: config.fire_cooldown(),
            },
            &mut Vec::new(),
        )?;

        let mut game = Self {
            seed,
            world,
            rng: ChaCha8Rng::seed_from_u64(seed),
            input,
            presenter,
            levels,
            player: None,
            level: config.first_level,
            end: None,
            ticks: 0,
            accumulator: TickAccumulator::new(config.tick_interval()),
            config,
        };
        info!(seed, level = game.level, "session started");

        let mut events = Vec::new();
        game.load_level(&mut events)?;
        game.push_status(&mut events);
        present::dispatch(&mut game.presenter, &game.world, &events);
        Ok(game)
    }

    /// Feeds elapsed wall-clock time and runs a tick when one is due.
    ///
    /// Returns whether a tick ran.
    ///
    /// # Errors
    ///
    /// Propagates failures of [`Game::tick`].
    pub fn advance(&mut self, elapsed: Duration) -> Result<bool, GameError> {
        if self.end.is_some() || !self.accumulator.accumulate(elapsed) {
            return Ok(false);
        }
        self.tick()?;
        Ok(true)
    }

    /// Runs exactly one simulation tick.
    ///
    /// Does nothing once the session has ended.
    ///
    /// # Errors
    ///
    /// Returns a [`GameError`] if the world reports a logic error or the next
    /// level cannot be loaded.
    pub fn tick(&mut self) -> Result<(), GameError> {
        if self.end.is_some() {
            return Ok(());
        }
        if self.input.is_exhausted() {
            self.finish(EndReason::InputExhausted);
            return Ok(());
        }
        let Some(player) = self.player.as_mut() else {
            return Ok(());
        };

        self.ticks = self.ticks.saturating_add(1);
        let mut events = Vec::new();
        let start = player.position();

        match self.input.poll() {
            Some(InputAction::Exit) => {
                self.finish(EndReason::ExitRequested);
                return Ok(());
            }
            Some(InputAction::Fire) => world::apply(
                &mut self.world,
                Command::Fire {
                    shooter: Combatant::Player,
                    origin: player.position(),
                    orientation: player.orientation(),
                },
                &mut events,
            )?,
            Some(action) => {
                if let Some(orientation) = action.orientation() {
                    let moved = player.drive(orientation, &query::view(&self.world));
                    debug!(?action, moved, "player input applied");
                }
            }
            None => {}
        }
        if player.position() != start {
            events.push(Event::CellVacated { cell: start });
        }

        world::apply(
            &mut self.world,
            Command::Tick {
                dt: self.config.tick_interval(),
                player: player.position(),
            },
            &mut events,
        )?;

        let cell = player.position();
        if let Some(projectile) = query::projectile_at(&self.world, cell).map(Projectile::id) {
            world::apply(
                &mut self.world,
                Command::RemoveProjectile { projectile },
                &mut events,
            )?;
            let health = player.take_hit();
            info!(health, "player hit");
            events.push(Event::TankDamaged {
                tank: Combatant::Player,
                health,
            });
        }

        events.push(Event::TankDrawn {
            tank: Combatant::Player,
            cell,
            orientation: player.orientation(),
        });

        if player.is_destroyed() {
            self.finish(EndReason::PlayerDestroyed);
        } else if query::enemy_count(&self.world) == 0 {
            self.level = self.level.saturating_add(1);
            self.load_level(&mut events)?;
        }

        self.push_status(&mut events);
        present::dispatch(&mut self.presenter, &self.world, &events);
        Ok(())
    }

    /// Runs ticks back to back, without waiting, until the session ends.
    ///
    /// The input source must eventually end the session, for example by
    /// running out of actions.
    ///
    /// # Errors
    ///
    /// Propagates failures of [`Game::tick`].
    pub fn run_to_end(&mut self) -> Result<RunOutcome, GameError> {
        loop {
            if let Some(outcome) = self.outcome() {
                return Ok(outcome);
            }
            self.tick()?;
        }
    }

    /// Runs the session in real time until it ends.
    ///
    /// Ticks fire whenever the configured interval of wall-clock time has
    /// elapsed; between checks the thread sleeps briefly.
    ///
    /// # Errors
    ///
    /// Propagates failures of [`Game::tick`].
    pub fn run(&mut self) -> Result<RunOutcome, GameError> {
        let mut last = Instant::now();
        loop {
            if let Some(outcome) = self.outcome() {
                return Ok(outcome);
            }
            let now = Instant::now();
            let _ = self.advance(now.duration_since(last))?;
            last = now;
            thread::sleep(POLL_INTERVAL);
        }
    }

    fn load_level(&mut self, events: &mut Vec<Event>) -> Result<(), GameError> {
        let level = self.level;
        let Some(layout) = self.levels.load(level)? else {
            info!(level, "no level file left");
            self.finish(EndReason::LevelsExhausted);
            return Ok(());
        };

        world::apply(
            &mut self.world,
            Command::LoadLevel { level, layout },
            events,
        )?;

        let view = query::view(&self.world);
        let start = random_walkable_cell(&view, &[], &mut self.rng)
            .ok_or(GameError::NoFreeCell { level })?;
        let orientation = random_orientation(&mut self.rng);
        let player = Tank::new(
            Combatant::Player,
            start,
            orientation,
            self.config.player_health,
        );

        let mut taken: Vec<IVec2> = vec![start];
        let mut spawns = Vec::new();
        for _ in 0..level {
            let cell = random_walkable_cell(&view, &taken, &mut self.rng)
                .ok_or(GameError::NoFreeCell { level })?;
            taken.push(cell);
            spawns.push((cell, random_orientation(&mut self.rng)));
        }

        events.push(Event::TankDrawn {
            tank: Combatant::Player,
            cell: start,
            orientation,
        });
        self.player = Some(player);

        for (cell, orientation) in spawns {
            world::apply(
                &mut self.world,
                Command::SpawnEnemy {
                    cell,
                    orientation,
                    health: self.config.enemy_health,
                },
                events,
            )?;
        }
        info!(level, enemies = level, x = start.x, y = start.y, "level started");
        Ok(())
    }

    fn push_status(&self, events: &mut Vec<Event>) {
        events.push(Event::StatusChanged {
            level: self.level,
            health: self.player_health(),
        });
    }

    fn finish(&mut self, reason: EndReason) {
        if self.end.is_none() {
            info!(
                ?reason,
                level = self.level,
                ticks = self.ticks,
                health = self.player_health(),
                "session ended"
            );
            self.end = Some(reason);
        }
    }
}

impl<I, P, L> Game<I, P, L> {
    /// Seed every random choice of the session derives from.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Session parameters.
    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Authoritative world state.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Player tank, absent when no level was ever loaded.
    #[must_use]
    pub const fn player(&self) -> Option<&Tank> {
        self.player.as_ref()
    }

    /// Current level number.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Number of ticks executed so far.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Reports whether the session is still running.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.end.is_none()
    }

    /// Summary of the session once it has ended.
    #[must_use]
    pub fn outcome(&self) -> Option<RunOutcome> {
        self.end.map(|reason| RunOutcome {
            reason,
            level: self.level,
            player_health: self.player_health(),
            ticks: self.ticks,
        })
    }

    /// Input source feeding the session.
    #[must_use]
    pub const fn input(&self) -> &I {
        &self.input
    }

    /// Presenter receiving drawing notifications.
    #[must_use]
    pub const fn presenter(&self) -> &P {
        &self.presenter
    }

    fn player_health(&self) -> u32 {
        self.player.as_ref().map_or(0, Tank::health)
    }
}
