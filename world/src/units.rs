//! Tanks and projectiles moving across the grid.

use tank_combat_core::{Combatant, IVec2, MapQuery, Orientation, ProjectileId, Transform};

/// Armoured unit controlled either by the player or by the enemy AI.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tank {
    combatant: Combatant,
    transform: Transform,
    health: u32,
}

impl Tank {
    /// Creates a tank on `cell` facing `orientation`.
    #[must_use]
    pub const fn new(combatant: Combatant, cell: IVec2, orientation: Orientation, health: u32) -> Self {
        Self {
            combatant,
            transform: Transform::new(cell, orientation),
            health,
        }
    }

    /// Who controls the tank.
    #[must_use]
    pub const fn combatant(&self) -> Combatant {
        self.combatant
    }

    /// Position, previous position and facing.
    #[must_use]
    pub const fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Cell currently occupied.
    #[must_use]
    pub const fn position(&self) -> IVec2 {
        self.transform.position()
    }

    /// Current facing.
    #[must_use]
    pub const fn orientation(&self) -> Orientation {
        self.transform.orientation()
    }

    /// Remaining health.
    #[must_use]
    pub const fn health(&self) -> u32 {
        self.health
    }

    /// Reports whether the tank has no health left.
    #[must_use]
    pub const fn is_destroyed(&self) -> bool {
        self.health == 0
    }

    /// Removes one point of health and returns what is left.
    pub fn take_hit(&mut self) -> u32 {
        self.health = self.health.saturating_sub(1);
        self.health
    }

    /// Turns toward `orientation` without moving.
    pub fn face(&mut self, orientation: Orientation) {
        self.transform.set_orientation(orientation);
    }

    /// Places the tank on `cell` without any legality check.
    pub fn move_to(&mut self, cell: IVec2) {
        self.transform.set_position(cell);
    }

    /// Turns toward `orientation` and drives one cell forward if that cell is
    /// walkable.
    ///
    /// Returns `true` when the tank changed cell. A refused move still leaves
    /// the tank facing the requested way.
    pub fn drive<Q>(&mut self, orientation: Orientation, map: &Q) -> bool
    where
        Q: MapQuery + ?Sized,
    {
        self.face(orientation);
        let target = self.transform.next_position();
        if map.is_walkable(target) {
            self.move_to(target);
            true
        } else {
            false
        }
    }
}

/// Outcome of advancing a projectile by one cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flight {
    /// The projectile moved onto a passable cell and keeps flying.
    Traveling,
    /// The next cell lies outside the grid; the projectile is spent.
    LeftMap,
    /// The next cell stops projectiles; the projectile is spent.
    Blocked {
        /// Cell that stopped the projectile.
        cell: IVec2,
    },
}

/// Shell travelling one cell per tick along a fixed facing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Projectile {
    id: ProjectileId,
    shooter: Combatant,
    transform: Transform,
    alive: bool,
}

impl Projectile {
    /// Creates a live projectile on `origin` travelling toward `orientation`.
    #[must_use]
    pub const fn new(
        id: ProjectileId,
        shooter: Combatant,
        origin: IVec2,
        orientation: Orientation,
    ) -> Self {
        Self {
            id,
            shooter,
            transform: Transform::new(origin, orientation),
            alive: true,
        }
    }

    /// Identifier assigned at launch.
    #[must_use]
    pub const fn id(&self) -> ProjectileId {
        self.id
    }

    /// Tank that fired the projectile.
    #[must_use]
    pub const fn shooter(&self) -> Combatant {
        self.shooter
    }

    /// Position, previous position and direction of travel.
    #[must_use]
    pub const fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Cell currently occupied.
    #[must_use]
    pub const fn position(&self) -> IVec2 {
        self.transform.position()
    }

    /// Reports whether the projectile is still in flight.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.alive
    }

    /// Marks the projectile as spent.
    pub fn expire(&mut self) {
        self.alive = false;
    }

    /// Moves one cell along the direction of travel.
    ///
    /// A spent projectile stays on its current cell. Terrain damage and tank
    /// hits are resolved by the caller.
    pub fn advance<Q>(&mut self, map: &Q) -> Flight
    where
        Q: MapQuery + ?Sized,
    {
        let next = self.transform.next_position();
        if !map.is_on_map(next) {
            self.expire();
            return Flight::LeftMap;
        }
        if !map.is_projectile_passable(next) {
            self.expire();
            return Flight::Blocked { cell: next };
        }
        self.transform.set_position(next);
        Flight::Traveling
    }
}
