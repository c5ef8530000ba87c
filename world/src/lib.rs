#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Tank Combat.
//!
//! The world owns the terrain of the current level, the live enemy tanks and
//! the projectiles in flight. Every mutation arrives as a [`Command`] through
//! [`apply`], which reports what happened as [`Event`] values. Adapters and
//! the orchestrator read state through the [`query`] module.

mod grid;
mod units;

use std::time::Duration;

use tank_combat_core::{
    Combatant, Command, CoreError, Event, ExpiryReason, IVec2, LevelLayout, MapQuery,
    Orientation, ProjectileId, TankId,
};
use tank_combat_system_enemy_ai::EnemyAi;
use tank_combat_system_fire_control::FireControl;
use tracing::{debug, info, warn};

pub use grid::StaticMap;
pub use units::{Flight, Projectile, Tank};

/// Represents the authoritative Tank Combat world state.
#[derive(Debug)]
pub struct World {
    map: StaticMap,
    level: u32,
    enemies: Vec<Tank>,
    projectiles: Vec<Projectile>,
    next_tank_id: u32,
    next_projectile_id: u32,
    clock: Duration,
    fire_control: FireControl,
    enemy_ai: EnemyAi,
}

impl World {
    /// Creates an empty world whose enemy decisions derive from `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            map: StaticMap::new(),
            level: 0,
            enemies: Vec::new(),
            projectiles: Vec::new(),
            next_tank_id: 0,
            next_projectile_id: 0,
            clock: Duration::ZERO,
            fire_control: FireControl::default(),
            enemy_ai: EnemyAi::new(seed),
        }
    }

    fn load_level(&mut self, level: u32, layout: &LevelLayout, out_events: &mut Vec<Event>) {
        self.map = StaticMap::from_layout(layout);
        self.level = level;
        self.enemies.clear();
        self.projectiles.clear();
        self.fire_control.reset();
        self.clock = Duration::ZERO;
        info!(level, "level loaded");
        out_events.push(Event::LevelLoaded { level });
    }

    fn spawn_enemy(
        &mut self,
        cell: IVec2,
        orientation: Orientation,
        health: u32,
        out_events: &mut Vec<Event>,
    ) {
        if !WorldView::new(self).is_walkable(cell) {
            warn!(x = cell.x, y = cell.y, "enemy spawn refused on blocked cell");
            return;
        }

        let tank = TankId::new(self.next_tank_id);
        self.next_tank_id = self.next_tank_id.saturating_add(1);
        self.enemies
            .push(Tank::new(Combatant::Enemy(tank), cell, orientation, health));
        debug!(tank = tank.get(), x = cell.x, y = cell.y, "enemy spawned");
        out_events.push(Event::EnemySpawned {
            tank,
            cell,
            orientation,
        });
        out_events.push(Event::TankDrawn {
            tank: Combatant::Enemy(tank),
            cell,
            orientation,
        });
    }

    fn fire(
        &mut self,
        shooter: Combatant,
        origin: IVec2,
        orientation: Orientation,
        out_events: &mut Vec<Event>,
    ) {
        if !self.fire_control.try_fire(shooter, self.clock) {
            debug!(%shooter, "shot rejected during cooldown");
            out_events.push(Event::FireRejected { shooter });
            return;
        }

        let projectile = ProjectileId::new(self.next_projectile_id);
        self.next_projectile_id = self.next_projectile_id.saturating_add(1);
        self.projectiles
            .push(Projectile::new(projectile, shooter, origin, orientation));
        debug!(%shooter, projectile = projectile.get(), "projectile fired");
        out_events.push(Event::ProjectileSpawned {
            projectile,
            shooter,
            cell: origin,
            orientation,
        });
        out_events.push(Event::ProjectileDrawn { cell: origin });
    }

    fn advance_projectiles(&mut self, out_events: &mut Vec<Event>) {
        for projectile in self.projectiles.iter_mut().filter(|p| p.is_alive()) {
            let from = projectile.position();
            let flight = projectile.advance(&self.map);
            out_events.push(Event::CellVacated { cell: from });

            let reason = match flight {
                Flight::LeftMap => ExpiryReason::LeftMap,
                Flight::Blocked { cell } => {
                    if self.map.is_damageable(cell) {
                        if let Some(state) = self.map.damage(cell) {
                            out_events.push(Event::TerrainDamaged { cell, state });
                        }
                    }
                    ExpiryReason::Blocked
                }
                Flight::Traveling => {
                    let cell = projectile.position();
                    let Some(victim) = self
                        .enemies
                        .iter_mut()
                        .find(|enemy| enemy.position() == cell && !enemy.is_destroyed())
                    else {
                        out_events.push(Event::ProjectileDrawn { cell });
                        continue;
                    };
                    projectile.expire();
                    let health = victim.take_hit();
                    info!(
                        victim = %victim.combatant(),
                        shooter = %projectile.shooter(),
                        health,
                        "enemy hit"
                    );
                    out_events.push(Event::TankDamaged {
                        tank: victim.combatant(),
                        health,
                    });
                    ExpiryReason::HitTank
                }
            };

            debug!(projectile = projectile.id().get(), ?reason, "projectile expired");
            out_events.push(Event::ProjectileExpired {
                projectile: projectile.id(),
                cell: projectile.position(),
                reason,
            });
        }
    }

    fn advance_enemies(
        &mut self,
        player: IVec2,
        doomed: &mut Vec<usize>,
        out_events: &mut Vec<Event>,
    ) -> Result<(), CoreError> {
        for index in 0..self.enemies.len() {
            let (transform, health, combatant) = {
                let enemy = &self.enemies[index];
                (*enemy.transform(), enemy.health(), enemy.combatant())
            };
            let view = WorldView {
                map: &self.map,
                enemies: &self.enemies,
            };
            let intent = self.enemy_ai.decide(&transform, health, player, &view)?;

            if intent.destroyed {
                doomed.push(index);
            }
            if intent.fire {
                self.fire(
                    combatant,
                    transform.position(),
                    transform.orientation(),
                    out_events,
                );
            }

            let enemy = &mut self.enemies[index];
            if let Some(step) = intent.step {
                enemy.face(step.orientation);
                enemy.move_to(step.destination);
                if step.destination != transform.position() {
                    out_events.push(Event::CellVacated {
                        cell: transform.position(),
                    });
                }
            }
            out_events.push(Event::TankDrawn {
                tank: combatant,
                cell: enemy.position(),
                orientation: enemy.orientation(),
            });
        }
        Ok(())
    }

    fn evict(&mut self, doomed: &[usize], out_events: &mut Vec<Event>) {
        self.projectiles.retain(Projectile::is_alive);

        for &index in doomed.iter().rev() {
            if index >= self.enemies.len() {
                continue;
            }
            let enemy = self.enemies.remove(index);
            let cell = enemy.position();
            let combatant = enemy.combatant();
            self.fire_control.forget(combatant);
            if let Combatant::Enemy(tank) = combatant {
                info!(tank = tank.get(), x = cell.x, y = cell.y, "enemy destroyed");
                out_events.push(Event::EnemyDestroyed { tank, cell });
            }
            out_events.push(Event::CellVacated { cell });
        }
    }

    fn remove_projectile(&mut self, projectile: ProjectileId) {
        let before = self.projectiles.len();
        self.projectiles.retain(|candidate| candidate.id() != projectile);
        if self.projectiles.len() == before {
            warn!(projectile = projectile.get(), "removal requested for unknown projectile");
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// # Errors
///
/// Returns [`CoreError::NotAdjacent`] if the enemy AI produces a step toward a
/// cell that is not a neighbour of the enemy. The tick is abandoned midway in
/// that case.
pub fn apply(
    world: &mut World,
    command: Command,
    out_events: &mut Vec<Event>,
) -> Result<(), CoreError> {
    match command {
        Command::ConfigureFireCooldown { cooldown } => {
            world.fire_control.set_cooldown(cooldown);
        }
        Command::LoadLevel { level, layout } => {
            world.load_level(level, &layout, out_events);
        }
        Command::SpawnEnemy {
            cell,
            orientation,
            health,
        } => {
            world.spawn_enemy(cell, orientation, health, out_events);
        }
        Command::Fire {
            shooter,
            origin,
            orientation,
        } => {
            world.fire(shooter, origin, orientation, out_events);
        }
        Command::Tick { dt, player } => {
            world.clock = world.clock.saturating_add(dt);
            out_events.push(Event::TimeAdvanced { dt });

            world.advance_projectiles(out_events);
            let mut doomed = Vec::new();
            world.advance_enemies(player, &mut doomed, out_events)?;
            world.evict(&doomed, out_events);
        }
        Command::RemoveProjectile { projectile } => {
            world.remove_projectile(projectile);
        }
    }
    Ok(())
}

/// Legality view combining the terrain with live enemy positions.
///
/// A cell is walkable only when its terrain is empty and no enemy sits on it.
#[derive(Clone, Copy, Debug)]
pub struct WorldView<'a> {
    map: &'a StaticMap,
    enemies: &'a [Tank],
}

impl<'a> WorldView<'a> {
    /// Captures a view of the world's current state.
    #[must_use]
    pub fn new(world: &'a World) -> Self {
        Self {
            map: &world.map,
            enemies: &world.enemies,
        }
    }

    /// Reports whether an enemy currently occupies `cell`.
    #[must_use]
    pub fn is_enemy_at(&self, cell: IVec2) -> bool {
        self.enemies.iter().any(|enemy| enemy.position() == cell)
    }
}

impl MapQuery for WorldView<'_> {
    fn is_on_map(&self, cell: IVec2) -> bool {
        self.map.is_on_map(cell)
    }

    fn is_walkable(&self, cell: IVec2) -> bool {
        self.map.is_walkable(cell) && !self.is_enemy_at(cell)
    }

    fn is_projectile_passable(&self, cell: IVec2) -> bool {
        self.map.is_projectile_passable(cell)
    }

    fn is_damageable(&self, cell: IVec2) -> bool {
        self.map.is_damageable(cell)
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::{Projectile, StaticMap, Tank, World, WorldView};
    use tank_combat_core::{CellState, IVec2, MapQuery};

    /// Terrain of the current level.
    #[must_use]
    pub fn map(world: &World) -> &StaticMap {
        &world.map
    }

    /// Terrain at `cell`, or `None` outside the grid.
    #[must_use]
    pub fn cell_state(world: &World, cell: IVec2) -> Option<CellState> {
        world.map.get(cell)
    }

    /// Reports whether a tank may enter `cell`, taking live enemies into account.
    #[must_use]
    pub fn is_walkable(world: &World, cell: IVec2) -> bool {
        view(world).is_walkable(cell)
    }

    /// Occupancy-aware legality view usable wherever a [`MapQuery`] is expected.
    #[must_use]
    pub fn view(world: &World) -> WorldView<'_> {
        WorldView::new(world)
    }

    /// Live enemy tanks in spawn order.
    #[must_use]
    pub fn enemies(world: &World) -> &[Tank] {
        &world.enemies
    }

    /// Number of live enemy tanks.
    #[must_use]
    pub fn enemy_count(world: &World) -> usize {
        world.enemies.len()
    }

    /// Projectiles in flight in launch order.
    #[must_use]
    pub fn projectiles(world: &World) -> &[Projectile] {
        &world.projectiles
    }

    /// First projectile occupying `cell`, if any.
    #[must_use]
    pub fn projectile_at(world: &World, cell: IVec2) -> Option<&Projectile> {
        world
            .projectiles
            .iter()
            .find(|projectile| projectile.is_alive() && projectile.position() == cell)
    }

    /// Simulated time elapsed since the current level was loaded.
    #[must_use]
    pub fn clock(world: &World) -> Duration {
        world.clock
    }

    /// Number of the level currently loaded, zero before the first load.
    #[must_use]
    pub fn level(world: &World) -> u32 {
        world.level
    }
}
