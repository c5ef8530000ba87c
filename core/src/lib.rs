#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Tank Combat engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. The orchestrator submits
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then reports [`Event`] values
//! that drive presentation and progression. Systems never mutate the world;
//! they observe it through the [`MapQuery`] capability and answer with
//! decisions.

use std::{fmt, str::FromStr, time::Duration};

pub use glam::IVec2;
use thiserror::Error;

/// Number of columns in every level grid.
pub const GRID_WIDTH: i32 = 13;

/// Number of rows in every level grid.
pub const GRID_HEIGHT: i32 = 13;

/// Health assigned to freshly spawned tanks unless configured otherwise.
pub const DEFAULT_TANK_HEALTH: u32 = 2;

/// Terrain stored in a single grid cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CellState {
    /// Open ground that tanks and projectiles may cross.
    #[default]
    Empty,
    /// Intact wall that absorbs two projectile hits.
    Wall,
    /// Wall that already absorbed one hit.
    DamagedWall,
    /// Water that blocks tanks but lets projectiles through.
    River,
}

impl CellState {
    /// Maps a level layout glyph onto its terrain.
    ///
    /// `W` is a wall, `D` a damaged wall, `R` a river, and every other
    /// character is empty ground.
    #[must_use]
    pub const fn from_glyph(glyph: char) -> Self {
        match glyph {
            'W' => Self::Wall,
            'D' => Self::DamagedWall,
            'R' => Self::River,
            _ => Self::Empty,
        }
    }

    /// Canonical glyph used when serialising the terrain back to text.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Empty => '.',
            Self::Wall => 'W',
            Self::DamagedWall => 'D',
            Self::River => 'R',
        }
    }

    /// Terrain left behind after a projectile hit.
    ///
    /// Non-wall terrain is unaffected.
    #[must_use]
    pub const fn after_hit(self) -> Self {
        match self {
            Self::Wall => Self::DamagedWall,
            Self::DamagedWall => Self::Empty,
            other => other,
        }
    }
}

/// Facing of a tank or projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Toward decreasing row indices.
    Up,
    /// Toward increasing row indices.
    Down,
    /// Toward decreasing column indices.
    Left,
    /// Toward increasing column indices.
    Right,
}

impl Orientation {
    /// Every orientation in declaration order.
    pub const ALL: [Orientation; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// Unit offset of a single step in this orientation.
    #[must_use]
    pub const fn offset(self) -> IVec2 {
        match self {
            Self::Up => IVec2::new(0, -1),
            Self::Down => IVec2::new(0, 1),
            Self::Left => IVec2::new(-1, 0),
            Self::Right => IVec2::new(1, 0),
        }
    }

    /// Orientation pointing the other way along the same axis.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Orientation of a single orthogonal step from `from` to `to`, if any.
    #[must_use]
    pub fn between(from: IVec2, to: IVec2) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|orientation| from + orientation.offset() == to)
    }
}

/// Position, previous position and facing of a unit on the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transform {
    position: IVec2,
    previous_position: Option<IVec2>,
    orientation: Orientation,
}

impl Transform {
    /// Creates a transform at `position` facing `orientation`.
    #[must_use]
    pub const fn new(position: IVec2, orientation: Orientation) -> Self {
        Self {
            position,
            previous_position: None,
            orientation,
        }
    }

    /// Cell currently occupied.
    #[must_use]
    pub const fn position(&self) -> IVec2 {
        self.position
    }

    /// Cell occupied before the most recent position change.
    #[must_use]
    pub const fn previous_position(&self) -> Option<IVec2> {
        self.previous_position
    }

    /// Current facing.
    #[must_use]
    pub const fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Moves to `position`, remembering the old cell only if it changed.
    pub fn set_position(&mut self, position: IVec2) {
        if self.position != position {
            self.previous_position = Some(self.position);
            self.position = position;
        }
    }

    /// Replaces the facing.
    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
    }

    /// Cell above the current position.
    #[must_use]
    pub fn upper(&self) -> IVec2 {
        self.adjacent(Orientation::Up)
    }

    /// Cell below the current position.
    #[must_use]
    pub fn lower(&self) -> IVec2 {
        self.adjacent(Orientation::Down)
    }

    /// Cell to the left of the current position.
    #[must_use]
    pub fn lefter(&self) -> IVec2 {
        self.adjacent(Orientation::Left)
    }

    /// Cell to the right of the current position.
    #[must_use]
    pub fn righter(&self) -> IVec2 {
        self.adjacent(Orientation::Right)
    }

    /// Cell one step away in `orientation`.
    #[must_use]
    pub fn adjacent(&self, orientation: Orientation) -> IVec2 {
        self.position + orientation.offset()
    }

    /// The four orthogonal neighbours ordered lefter, righter, upper, lower.
    #[must_use]
    pub fn neighbours(&self) -> [IVec2; 4] {
        [self.lefter(), self.righter(), self.upper(), self.lower()]
    }

    /// Cell reached by continuing in the current facing.
    #[must_use]
    pub fn next_position(&self) -> IVec2 {
        self.adjacent(self.orientation)
    }

    /// Cell directly behind the current facing.
    #[must_use]
    pub fn opposite_position(&self) -> IVec2 {
        self.adjacent(self.orientation.opposite())
    }

    /// Orientation needed to step into `candidate`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotAdjacent`] when `candidate` is not one of the
    /// four orthogonal neighbours.
    pub fn orientation_toward(&self, candidate: IVec2) -> Result<Orientation, CoreError> {
        Orientation::between(self.position, candidate).ok_or(CoreError::NotAdjacent {
            from: self.position,
            to: candidate,
        })
    }
}

/// Discrete player intents produced by an input source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputAction {
    /// Turn up and drive forward if possible.
    Up,
    /// Turn down and drive forward if possible.
    Down,
    /// Turn left and drive forward if possible.
    Left,
    /// Turn right and drive forward if possible.
    Right,
    /// Fire a projectile along the current facing.
    Fire,
    /// Stop the run.
    Exit,
}

impl InputAction {
    /// Facing requested by a movement action.
    #[must_use]
    pub const fn orientation(self) -> Option<Orientation> {
        match self {
            Self::Up => Some(Orientation::Up),
            Self::Down => Some(Orientation::Down),
            Self::Left => Some(Orientation::Left),
            Self::Right => Some(Orientation::Right),
            Self::Fire | Self::Exit => None,
        }
    }
}

impl FromStr for InputAction {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "up" | "u" | "w" => Ok(Self::Up),
            "down" | "s" => Ok(Self::Down),
            "left" | "l" | "a" => Ok(Self::Left),
            "right" | "r" | "d" => Ok(Self::Right),
            "fire" | "f" | "space" => Ok(Self::Fire),
            "exit" | "quit" | "q" | "esc" => Ok(Self::Exit),
            other => Err(CoreError::UnknownAction(other.to_owned())),
        }
    }
}

/// Unique identifier assigned to an enemy tank.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TankId(u32);

impl TankId {
    /// Creates a new tank identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// A tank that can shoot or be shot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Combatant {
    /// The single player-controlled tank.
    Player,
    /// An AI-controlled enemy tank.
    Enemy(TankId),
}

impl fmt::Display for Combatant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player => write!(f, "player"),
            Self::Enemy(id) => write!(f, "enemy#{}", id.get()),
        }
    }
}

/// Why a projectile left play.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExpiryReason {
    /// The projectile flew past the grid boundary.
    LeftMap,
    /// The projectile struck terrain it cannot cross.
    Blocked,
    /// The projectile struck a tank.
    HitTank,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Sets the minimum simulated time between two shots of the same shooter.
    ConfigureFireCooldown {
        /// Cooldown applied after every accepted shot.
        cooldown: Duration,
    },
    /// Clears all units and installs the terrain of a new level.
    LoadLevel {
        /// One-based level number.
        level: u32,
        /// Terrain of the level.
        layout: LevelLayout,
    },
    /// Places a new enemy tank.
    SpawnEnemy {
        /// Cell the enemy starts on.
        cell: IVec2,
        /// Initial facing.
        orientation: Orientation,
        /// Initial health.
        health: u32,
    },
    /// Requests a shot, subject to the shooter's cooldown.
    Fire {
        /// Tank pulling the trigger.
        shooter: Combatant,
        /// Cell the projectile starts on.
        origin: IVec2,
        /// Direction of travel.
        orientation: Orientation,
    },
    /// Advances projectiles and enemies by one simulation tick.
    Tick {
        /// Simulated time covered by the tick.
        dt: Duration,
        /// Current cell of the player tank, used for enemy targeting.
        player: IVec2,
    },
    /// Removes a projectile that struck the player.
    RemoveProjectile {
        /// Projectile to remove.
        projectile: ProjectileId,
    },
}

/// Events reported by the world and the orchestrator after processing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// A new level's terrain is in place; the static layer needs a full redraw.
    LevelLoaded {
        /// One-based level number.
        level: u32,
    },
    /// The simulation clock advanced.
    TimeAdvanced {
        /// Simulated time covered by the tick.
        dt: Duration,
    },
    /// An enemy tank entered play.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        tank: TankId,
        /// Cell the enemy occupies.
        cell: IVec2,
        /// Initial facing.
        orientation: Orientation,
    },
    /// A shot was accepted and a projectile entered play.
    ProjectileSpawned {
        /// Identifier assigned to the projectile.
        projectile: ProjectileId,
        /// Tank that fired.
        shooter: Combatant,
        /// Starting cell.
        cell: IVec2,
        /// Direction of travel.
        orientation: Orientation,
    },
    /// A shot was refused because the shooter is still cooling down.
    FireRejected {
        /// Tank that attempted to fire.
        shooter: Combatant,
    },
    /// A cell no longer holds a unit and should show its terrain again.
    CellVacated {
        /// Cell that was left.
        cell: IVec2,
    },
    /// A live projectile occupies a cell.
    ProjectileDrawn {
        /// Cell holding the projectile.
        cell: IVec2,
    },
    /// A tank occupies a cell with the given facing.
    TankDrawn {
        /// Tank being drawn.
        tank: Combatant,
        /// Cell holding the tank.
        cell: IVec2,
        /// Facing of the tank.
        orientation: Orientation,
    },
    /// A projectile damaged a wall.
    TerrainDamaged {
        /// Cell that was struck.
        cell: IVec2,
        /// Terrain after the hit.
        state: CellState,
    },
    /// A projectile left play.
    ProjectileExpired {
        /// Projectile that was removed.
        projectile: ProjectileId,
        /// Last cell the projectile reached.
        cell: IVec2,
        /// Cause of removal.
        reason: ExpiryReason,
    },
    /// A tank lost health to a projectile.
    TankDamaged {
        /// Tank that was hit.
        tank: Combatant,
        /// Remaining health.
        health: u32,
    },
    /// An enemy ran out of health and was removed.
    EnemyDestroyed {
        /// Identifier of the removed enemy.
        tank: TankId,
        /// Cell the enemy last occupied.
        cell: IVec2,
    },
    /// Level number or player health changed and the status line needs refreshing.
    StatusChanged {
        /// Current level.
        level: u32,
        /// Current player health.
        health: u32,
    },
}

/// Read-only capability granting legality checks against the current level.
///
/// Units and systems receive this instead of a handle on the level manager.
pub trait MapQuery {
    /// Reports whether `cell` lies inside the grid.
    fn is_on_map(&self, cell: IVec2) -> bool;

    /// Reports whether a tank may enter `cell`.
    fn is_walkable(&self, cell: IVec2) -> bool;

    /// Reports whether a projectile may fly through `cell`.
    fn is_projectile_passable(&self, cell: IVec2) -> bool;

    /// Reports whether `cell` holds terrain that absorbs projectile damage.
    fn is_damageable(&self, cell: IVec2) -> bool;
}

/// Reports whether `cell` lies inside the fixed level grid.
#[must_use]
pub fn is_within_grid(cell: IVec2) -> bool {
    (0..GRID_WIDTH).contains(&cell.x) && (0..GRID_HEIGHT).contains(&cell.y)
}

const LAYOUT_CELLS: usize = (GRID_WIDTH * GRID_HEIGHT) as usize;

/// Terrain description of a complete level, loaded from text.
#[derive(Clone, PartialEq, Eq)]
pub struct LevelLayout {
    cells: [CellState; LAYOUT_CELLS],
}

impl LevelLayout {
    /// Layout with every cell empty.
    #[must_use]
    pub const fn open() -> Self {
        Self {
            cells: [CellState::Empty; LAYOUT_CELLS],
        }
    }

    /// Parses a layout from one text row per grid row.
    ///
    /// Only the first [`GRID_HEIGHT`] rows and the first [`GRID_WIDTH`]
    /// characters of each row are read.
    ///
    /// # Errors
    ///
    /// Returns a [`LayoutError`] if the text has too few rows or a row has
    /// too few characters.
    pub fn parse(text: &str) -> Result<Self, LayoutError> {
        let mut layout = Self::open();
        let mut rows = text.lines();
        for y in 0..GRID_HEIGHT {
            let row = rows.next().ok_or(LayoutError::TooFewRows {
                expected: GRID_HEIGHT,
                found: y,
            })?;
            let mut glyphs = row.chars();
            for x in 0..GRID_WIDTH {
                let glyph = glyphs.next().ok_or(LayoutError::RowTooShort {
                    row: y,
                    expected: GRID_WIDTH,
                    found: x,
                })?;
                layout.set(IVec2::new(x, y), CellState::from_glyph(glyph));
            }
        }
        Ok(layout)
    }

    /// Terrain at `cell`, or `None` outside the grid.
    #[must_use]
    pub fn get(&self, cell: IVec2) -> Option<CellState> {
        index(cell).map(|index| self.cells[index])
    }

    /// Overwrites the terrain at `cell`; cells outside the grid are ignored.
    pub fn set(&mut self, cell: IVec2, state: CellState) {
        if let Some(index) = index(cell) {
            self.cells[index] = state;
        }
    }

    /// Builder-style variant of [`LevelLayout::set`].
    #[must_use]
    pub fn with_cell(mut self, cell: IVec2, state: CellState) -> Self {
        self.set(cell, state);
        self
    }
}

impl Default for LevelLayout {
    fn default() -> Self {
        Self::open()
    }
}

impl fmt::Debug for LevelLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "LevelLayout")?;
        for row in self.cells.chunks(GRID_WIDTH as usize) {
            let line: String = row.iter().map(|state| state.glyph()).collect();
            writeln!(f, "  {line}")?;
        }
        Ok(())
    }
}

fn index(cell: IVec2) -> Option<usize> {
    if !is_within_grid(cell) {
        return None;
    }
    let row = usize::try_from(cell.y).ok()?;
    let column = usize::try_from(cell.x).ok()?;
    Some(row * GRID_WIDTH as usize + column)
}

/// Logic errors raised by the spatial primitives and input parsing.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CoreError {
    /// An orientation was requested toward a cell that is not a neighbour.
    #[error("cell {to} is not adjacent to {from}")]
    NotAdjacent {
        /// Cell the step starts from.
        from: IVec2,
        /// Requested destination.
        to: IVec2,
    },
    /// Text could not be mapped onto an [`InputAction`].
    #[error("unknown input action '{0}'")]
    UnknownAction(String),
}

/// Reasons a level layout text may be rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// The text ended before every grid row was read.
    #[error("layout has {found} rows, expected {expected}")]
    TooFewRows {
        /// Rows required.
        expected: i32,
        /// Rows present.
        found: i32,
    },
    /// A row ended before every grid column was read.
    #[error("layout row {row} has {found} cells, expected {expected}")]
    RowTooShort {
        /// Zero-based row index.
        row: i32,
        /// Columns required.
        expected: i32,
        /// Columns present.
        found: i32,
    },
}
