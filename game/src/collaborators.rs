//! Boundaries between the session and the outside world.

use std::{
    collections::{BTreeMap, VecDeque},
    io,
    path::PathBuf,
    sync::{Arc, Mutex, PoisonError},
};

use tank_combat_core::{CellState, IVec2, InputAction, LayoutError, LevelLayout, Orientation};
use tank_combat_world::StaticMap;
use thiserror::Error;

/// Non-blocking source of player intents, polled once per tick.
pub trait InputSource {
    /// Takes the most recent pending action, if any.
    fn poll(&mut self) -> Option<InputAction>;

    /// Reports whether the source will never yield another action.
    fn is_exhausted(&self) -> bool {
        false
    }
}

/// Sink for drawing notifications. Calls are fire-and-forget.
pub trait Presenter {
    /// Draws the terrain of a freshly loaded level.
    fn render_static_layer(&mut self, map: &StaticMap);

    /// Restores the terrain glyph of a cell a unit left.
    fn erase_cell(&mut self, cell: IVec2, state: CellState);

    /// Draws a tank.
    fn draw_tank(&mut self, cell: IVec2, orientation: Orientation, is_player: bool);

    /// Draws a projectile.
    fn draw_projectile(&mut self, cell: IVec2);

    /// Refreshes the status line.
    fn render_status(&mut self, level: u32, health: u32);
}

/// Provider of level layouts by number.
pub trait LevelSource {
    /// Loads level `level`; `Ok(None)` means there is no such level.
    ///
    /// # Errors
    ///
    /// Returns a [`LevelSourceError`] when the level exists but cannot be read
    /// or parsed.
    fn load(&self, level: u32) -> Result<Option<LevelLayout>, LevelSourceError>;
}

/// Failures raised while fetching a level that exists.
#[derive(Debug, Error)]
pub enum LevelSourceError {
    /// The level file could not be read.
    #[error("failed to read level {level} from {}", .path.display())]
    Io {
        /// Level being loaded.
        level: u32,
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The level text is not a valid layout.
    #[error("level {level} has an invalid layout")]
    Layout {
        /// Level being loaded.
        level: u32,
        /// Parse failure.
        #[source]
        source: LayoutError,
    },
}

/// Level source backed by layouts held in memory.
#[derive(Clone, Debug, Default)]
pub struct InMemoryLevels {
    levels: BTreeMap<u32, LevelLayout>,
}

impl InMemoryLevels {
    /// Creates a source without any level.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `layout` as level `level`, replacing any previous entry.
    pub fn insert(&mut self, level: u32, layout: LevelLayout) {
        let _ = self.levels.insert(level, layout);
    }

    /// Builder-style variant of [`InMemoryLevels::insert`].
    #[must_use]
    pub fn with_level(mut self, level: u32, layout: LevelLayout) -> Self {
        self.insert(level, layout);
        self
    }
}

impl LevelSource for InMemoryLevels {
    fn load(&self, level: u32) -> Result<Option<LevelLayout>, LevelSourceError> {
        Ok(self.levels.get(&level).cloned())
    }
}

/// Input source replaying a fixed sequence, one entry per tick.
///
/// `None` entries are ticks without input.
#[derive(Clone, Debug, Default)]
pub struct ScriptedInput {
    actions: VecDeque<Option<InputAction>>,
}

impl ScriptedInput {
    /// Creates a script from per-tick entries.
    pub fn new(actions: impl IntoIterator<Item = Option<InputAction>>) -> Self {
        Self {
            actions: actions.into_iter().collect(),
        }
    }

    /// Number of ticks left in the script.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.actions.len()
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self) -> Option<InputAction> {
        self.actions.pop_front().flatten()
    }

    fn is_exhausted(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Creates a single-slot hand-off keeping only the newest action.
///
/// The sender may live on another thread; every send overwrites whatever
/// the receiver has not yet polled.
#[must_use]
pub fn latest_action_channel() -> (ActionSender, LatestAction) {
    let slot = Arc::new(Mutex::new(Slot::default()));
    (
        ActionSender {
            slot: Arc::clone(&slot),
        },
        LatestAction { slot },
    )
}

#[derive(Debug, Default)]
struct Slot {
    action: Option<InputAction>,
    closed: bool,
}

/// Producer half of [`latest_action_channel`].
#[derive(Debug)]
pub struct ActionSender {
    slot: Arc<Mutex<Slot>>,
}

impl ActionSender {
    /// Replaces the pending action.
    pub fn send(&self, action: InputAction) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        slot.action = Some(action);
    }
}

impl Drop for ActionSender {
    fn drop(&mut self) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        slot.closed = true;
    }
}

/// Consumer half of [`latest_action_channel`].
#[derive(Debug)]
pub struct LatestAction {
    slot: Arc<Mutex<Slot>>,
}

impl InputSource for LatestAction {
    fn poll(&mut self) -> Option<InputAction> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        slot.action.take()
    }

    fn is_exhausted(&self) -> bool {
        let slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        slot.closed && slot.action.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn newest_action_wins() {
        let (sender, mut receiver) = latest_action_channel();
        assert_eq!(receiver.poll(), None);

        sender.send(InputAction::Up);
        sender.send(InputAction::Fire);
        assert_eq!(receiver.poll(), Some(InputAction::Fire));
        assert_eq!(receiver.poll(), None);
    }

    #[test]
    fn dropped_sender_exhausts_after_draining() {
        let (sender, mut receiver) = latest_action_channel();
        let handle = thread::spawn(move || sender.send(InputAction::Left));
        handle.join().expect("sender thread finishes");

        assert!(!receiver.is_exhausted());
        assert_eq!(receiver.poll(), Some(InputAction::Left));
        assert!(receiver.is_exhausted());
    }

    #[test]
    fn script_yields_one_entry_per_poll() {
        let mut script = ScriptedInput::new([Some(InputAction::Down), None, Some(InputAction::Exit)]);
        assert_eq!(script.remaining(), 3);
        assert_eq!(script.poll(), Some(InputAction::Down));
        assert_eq!(script.poll(), None);
        assert!(!script.is_exhausted());
        assert_eq!(script.poll(), Some(InputAction::Exit));
        assert!(script.is_exhausted());
        assert_eq!(script.poll(), None);
    }

    #[test]
    fn in_memory_levels_report_missing_numbers() {
        let levels = InMemoryLevels::new().with_level(1, LevelLayout::open());
        assert_eq!(levels.load(1).expect("loads"), Some(LevelLayout::open()));
        assert_eq!(levels.load(2).expect("loads"), None);
    }
}
