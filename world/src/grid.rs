//! Terrain grid of the current level.

use tank_combat_core::{CellState, IVec2, LevelLayout, MapQuery, GRID_HEIGHT, GRID_WIDTH};

/// Dense row-major terrain grid with fixed bounds.
///
/// Every coordinate-accepting method takes anything convertible into
/// [`IVec2`], so `(x, y)` tuples and vectors are interchangeable. Coordinates
/// outside the grid never panic: predicates answer `false`, reads answer
/// `None`, and writes are ignored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StaticMap {
    columns: i32,
    rows: i32,
    cells: Vec<CellState>,
}

impl StaticMap {
    /// Creates a grid of the standard level size with every cell empty.
    #[must_use]
    pub fn new() -> Self {
        let capacity = usize::try_from(GRID_WIDTH * GRID_HEIGHT).unwrap_or(0);
        Self {
            columns: GRID_WIDTH,
            rows: GRID_HEIGHT,
            cells: vec![CellState::Empty; capacity],
        }
    }

    /// Creates a grid holding the terrain described by `layout`.
    #[must_use]
    pub fn from_layout(layout: &LevelLayout) -> Self {
        let mut map = Self::new();
        for cell in map.coordinates().collect::<Vec<_>>() {
            if let Some(state) = layout.get(cell) {
                map.set(cell, state);
            }
        }
        map
    }

    /// Grid dimensions as `(columns, rows)`.
    #[must_use]
    pub const fn dimensions(&self) -> (i32, i32) {
        (self.columns, self.rows)
    }

    /// Terrain at `cell`.
    #[must_use]
    pub fn get(&self, cell: impl Into<IVec2>) -> Option<CellState> {
        self.index(cell.into())
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Overwrites the terrain at `cell`.
    pub fn set(&mut self, cell: impl Into<IVec2>, state: CellState) {
        if let Some(index) = self.index(cell.into()) {
            if let Some(slot) = self.cells.get_mut(index) {
                *slot = state;
            }
        }
    }

    /// Reports whether `cell` lies inside the grid.
    #[must_use]
    pub fn is_on_map(&self, cell: impl Into<IVec2>) -> bool {
        self.index(cell.into()).is_some()
    }

    /// Reports whether the terrain at `cell` lets a tank in.
    ///
    /// Only terrain is considered; unit occupancy is layered on by the world.
    #[must_use]
    pub fn is_walkable(&self, cell: impl Into<IVec2>) -> bool {
        self.get(cell) == Some(CellState::Empty)
    }

    /// Reports whether a projectile may fly through `cell`.
    #[must_use]
    pub fn is_projectile_passable(&self, cell: impl Into<IVec2>) -> bool {
        matches!(self.get(cell), Some(CellState::Empty | CellState::River))
    }

    /// Reports whether `cell` holds a wall that absorbs hits.
    #[must_use]
    pub fn is_damageable(&self, cell: impl Into<IVec2>) -> bool {
        matches!(self.get(cell), Some(CellState::Wall | CellState::DamagedWall))
    }

    /// Applies one projectile hit to `cell`, returning the resulting terrain.
    ///
    /// Walls become damaged walls and damaged walls crumble to empty ground;
    /// other terrain is left untouched.
    pub fn damage(&mut self, cell: impl Into<IVec2>) -> Option<CellState> {
        let cell = cell.into();
        let state = self.get(cell)?.after_hit();
        self.set(cell, state);
        Some(state)
    }

    /// Iterates every cell in row-major order with its terrain.
    pub fn cells(&self) -> impl Iterator<Item = (IVec2, CellState)> + '_ {
        self.coordinates().zip(self.cells.iter().copied())
    }

    fn coordinates(&self) -> impl Iterator<Item = IVec2> {
        let (columns, rows) = self.dimensions();
        (0..rows).flat_map(move |y| (0..columns).map(move |x| IVec2::new(x, y)))
    }

    fn index(&self, cell: IVec2) -> Option<usize> {
        if (0..self.columns).contains(&cell.x) && (0..self.rows).contains(&cell.y) {
            let row = usize::try_from(cell.y).ok()?;
            let column = usize::try_from(cell.x).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

impl Default for StaticMap {
    fn default() -> Self {
        Self::new()
    }
}

impl MapQuery for StaticMap {
    fn is_on_map(&self, cell: IVec2) -> bool {
        StaticMap::is_on_map(self, cell)
    }

    fn is_walkable(&self, cell: IVec2) -> bool {
        StaticMap::is_walkable(self, cell)
    }

    fn is_projectile_passable(&self, cell: IVec2) -> bool {
        StaticMap::is_projectile_passable(self, cell)
    }

    fn is_damageable(&self, cell: IVec2) -> bool {
        StaticMap::is_damageable(self, cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wall_crumbles_after_two_hits() {
        let mut map = StaticMap::new();
        map.set((3, 4), CellState::Wall);

        assert_eq!(map.damage((3, 4)), Some(CellState::DamagedWall));
        assert!(map.is_damageable(IVec2::new(3, 4)));
        assert_eq!(map.damage(IVec2::new(3, 4)), Some(CellState::Empty));
        assert!(map.is_walkable((3, 4)));
    }

    #[test]
    fn damage_leaves_open_terrain_alone() {
        let mut map = StaticMap::new();
        map.set((1, 1), CellState::River);

        assert_eq!(map.damage((0, 0)), Some(CellState::Empty));
        assert_eq!(map.damage((1, 1)), Some(CellState::River));
        assert_eq!(map.damage((-1, 0)), None);
    }

    #[test]
    fn terrain_predicates_follow_cell_rules() {
        let mut map = StaticMap::new();
        map.set((0, 0), CellState::Wall);
        map.set((1, 0), CellState::DamagedWall);
        map.set((2, 0), CellState::River);

        assert!(!map.is_walkable((0, 0)));
        assert!(!map.is_walkable((1, 0)));
        assert!(!map.is_walkable((2, 0)));
        assert!(map.is_walkable((3, 0)));

        assert!(!map.is_projectile_passable((0, 0)));
        assert!(!map.is_projectile_passable((1, 0)));
        assert!(map.is_projectile_passable((2, 0)));
        assert!(map.is_projectile_passable((3, 0)));

        assert!(map.is_damageable((0, 0)));
        assert!(map.is_damageable((1, 0)));
        assert!(!map.is_damageable((2, 0)));
        assert!(!map.is_damageable((3, 0)));
    }

    #[test]
    fn out_of_bounds_queries_fail_closed() {
        let mut map = StaticMap::new();
        for cell in [(-1, 0), (0, -1), (13, 0), (0, 13), (i32::MIN, i32::MAX)] {
            assert!(!map.is_on_map(cell));
            assert!(!map.is_walkable(cell));
            assert!(!map.is_projectile_passable(cell));
            assert!(!map.is_damageable(cell));
            assert_eq!(map.get(cell), None);
            map.set(cell, CellState::Wall);
        }
        assert!(map.cells().all(|(_, state)| state == CellState::Empty));
    }

    #[test]
    fn loads_terrain_from_layout() {
        let layout = LevelLayout::open()
            .with_cell(IVec2::new(12, 12), CellState::Wall)
            .with_cell(IVec2::new(0, 5), CellState::River);
        let map = StaticMap::from_layout(&layout);

        assert_eq!(map.get((12, 12)), Some(CellState::Wall));
        assert_eq!(map.get((0, 5)), Some(CellState::River));
        assert_eq!(map.cells().count(), 169);
        assert_eq!(
            map.cells().nth(13),
            Some((IVec2::new(0, 1), CellState::Empty))
        );
    }
}
