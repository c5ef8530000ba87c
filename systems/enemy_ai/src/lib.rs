#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Enemy tank decision system.
//!
//! Enemies patrol without pathfinding: they keep driving straight through
//! corridors, pick a random open neighbour at junctions or when the way ahead
//! is closed, and turn around when the cell behind them is the only thing
//! they cannot reach. They shoot whenever the player sits on the same row or
//! column in front of them.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tank_combat_core::{CoreError, IVec2, MapQuery, Orientation, Transform};

/// Committed movement for one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Step {
    /// Cell the tank occupies after the tick. Equal to the current cell for
    /// a turn in place.
    pub destination: IVec2,
    /// Facing after the tick.
    pub orientation: Orientation,
}

/// Everything an enemy wants to do during a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnemyIntent {
    /// The enemy has no health left and leaves play once the tick ends.
    pub destroyed: bool,
    /// The enemy requests a shot along its current facing.
    pub fire: bool,
    /// Movement for the tick, or `None` when the tank is boxed in.
    pub step: Option<Step>,
}

/// Stateful decision maker owning the random stream used for enemy choices.
#[derive(Clone, Debug)]
pub struct EnemyAi {
    rng: ChaCha8Rng,
}

impl EnemyAi {
    /// Creates a decision maker whose random choices derive from `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Decides what the enemy at `enemy` does this tick.
    ///
    /// # Errors
    ///
    /// Propagates [`CoreError::NotAdjacent`] if a chosen destination is not a
    /// neighbour of the enemy, which indicates a logic error.
    pub fn decide<Q>(
        &mut self,
        enemy: &Transform,
        health: u32,
        player: IVec2,
        map: &Q,
    ) -> Result<EnemyIntent, CoreError>
    where
        Q: MapQuery + ?Sized,
    {
        Ok(EnemyIntent {
            destroyed: health == 0,
            fire: faces_target(enemy, player),
            step: choose_step(enemy, map, &mut self.rng)?,
        })
    }
}

/// Reports whether `target` lies on the enemy's row or column, in front of it.
#[must_use]
pub fn faces_target(enemy: &Transform, target: IVec2) -> bool {
    let here = enemy.position();
    match enemy.orientation() {
        Orientation::Up => here.x == target.x && here.y > target.y,
        Orientation::Down => here.x == target.x && here.y < target.y,
        Orientation::Left => here.y == target.y && here.x > target.x,
        Orientation::Right => here.y == target.y && here.x < target.x,
    }
}

/// Walkable neighbours in lefter, righter, upper, lower order.
#[must_use]
pub fn movement_candidates<Q>(enemy: &Transform, map: &Q) -> Vec<IVec2>
where
    Q: MapQuery + ?Sized,
{
    enemy
        .neighbours()
        .into_iter()
        .filter(|cell| map.is_walkable(*cell))
        .collect()
}

/// Picks the movement of a single enemy.
///
/// # Errors
///
/// Returns [`CoreError::NotAdjacent`] if a candidate is not a neighbour.
pub fn choose_step<Q, R>(
    enemy: &Transform,
    map: &Q,
    rng: &mut R,
) -> Result<Option<Step>, CoreError>
where
    Q: MapQuery + ?Sized,
    R: Rng + ?Sized,
{
    let candidates = movement_candidates(enemy, map);
    if candidates.is_empty() {
        return Ok(None);
    }

    let straight = enemy.next_position();
    let straight_open = candidates.contains(&straight);

    if candidates.len() > 2 || !straight_open {
        let destination = candidates[rng.gen_range(0..candidates.len())];
        let orientation = enemy.orientation_toward(destination)?;
        return Ok(Some(Step {
            destination,
            orientation,
        }));
    }

    if candidates.len() == 1 {
        // The lone open cell is straight ahead, so the cell behind is closed:
        // turn around without leaving the current cell.
        return Ok(Some(Step {
            destination: enemy.position(),
            orientation: enemy.orientation().opposite(),
        }));
    }

    Ok(Some(Step {
        destination: straight,
        orientation: enemy.orientation(),
    }))
}
