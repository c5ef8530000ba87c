#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Random placement of tanks at the start of a level.

use rand::{seq::SliceRandom, Rng};
use tank_combat_core::{IVec2, MapQuery, Orientation, GRID_HEIGHT, GRID_WIDTH};

/// Rejection-sampling attempts made before falling back to an exhaustive scan.
pub const MAX_SAMPLING_ATTEMPTS: usize = 512;

/// Picks a uniformly random walkable cell that is not listed in `taken`.
///
/// Cells are sampled at random until one is walkable and free. After
/// [`MAX_SAMPLING_ATTEMPTS`] misses the remaining free cells are enumerated
/// and one is chosen uniformly, so sparse maps still terminate. Returns
/// `None` when no walkable free cell exists.
pub fn random_walkable_cell<Q, R>(map: &Q, taken: &[IVec2], rng: &mut R) -> Option<IVec2>
where
    Q: MapQuery + ?Sized,
    R: Rng + ?Sized,
{
    let is_free = |cell: IVec2| map.is_walkable(cell) && !taken.contains(&cell);

    for _ in 0..MAX_SAMPLING_ATTEMPTS {
        let cell = IVec2::new(rng.gen_range(0..GRID_WIDTH), rng.gen_range(0..GRID_HEIGHT));
        if is_free(cell) {
            return Some(cell);
        }
    }

    let remaining: Vec<IVec2> = (0..GRID_HEIGHT)
        .flat_map(|y| (0..GRID_WIDTH).map(move |x| IVec2::new(x, y)))
        .filter(|cell| is_free(*cell))
        .collect();
    remaining.choose(rng).copied()
}

/// Picks a uniformly random facing.
pub fn random_orientation<R>(rng: &mut R) -> Orientation
where
    R: Rng + ?Sized,
{
    Orientation::ALL[rng.gen_range(0..Orientation::ALL.len())]
}
