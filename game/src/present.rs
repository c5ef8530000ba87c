//! Translation of simulation events into presenter calls.

use tank_combat_core::{Combatant, Event};
use tank_combat_world::{query, World};

use crate::Presenter;

/// Forwards the drawing-relevant `events` to `presenter` in order.
pub(crate) fn dispatch<P>(presenter: &mut P, world: &World, events: &[Event])
where
    P: Presenter + ?Sized,
{
    for event in events {
        match *event {
            Event::LevelLoaded { .. } => presenter.render_static_layer(query::map(world)),
            Event::CellVacated { cell } => {
                let state = query::cell_state(world, cell).unwrap_or_default();
                presenter.erase_cell(cell, state);
            }
            Event::TerrainDamaged { cell, state } => presenter.erase_cell(cell, state),
            Event::ProjectileDrawn { cell } => presenter.draw_projectile(cell),
            Event::TankDrawn {
                tank,
                cell,
                orientation,
            } => presenter.draw_tank(cell, orientation, tank == Combatant::Player),
            Event::StatusChanged { level, health } => presenter.render_status(level, health),
            Event::TimeAdvanced { .. }
            | Event::EnemySpawned { .. }
            | Event::ProjectileSpawned { .. }
            | Event::FireRejected { .. }
            | Event::ProjectileExpired { .. }
            | Event::TankDamaged { .. }
            | Event::EnemyDestroyed { .. } => {}
        }
    }
}
