use tank_combat_core::{CellState, IVec2, Orientation, GRID_HEIGHT, GRID_WIDTH};
use tank_combat_game::Presenter;
use tank_combat_world::StaticMap;
use tracing::{debug, info, trace};

const PROJECTILE_GLYPH: char = 'o';

/// Presenter keeping a text frame of the board and reporting it through tracing.
///
/// Every status refresh logs the status line at `info` and the full frame at
/// `debug`.
#[derive(Clone, Debug)]
pub(crate) struct TracingPresenter {
    rows: Vec<Vec<char>>,
    status: Option<(u32, u32)>,
}

impl TracingPresenter {
    pub(crate) fn new() -> Self {
        let width = usize::try_from(GRID_WIDTH).unwrap_or(0);
        let height = usize::try_from(GRID_HEIGHT).unwrap_or(0);
        Self {
            rows: vec![vec![terrain_glyph(CellState::Empty); width]; height],
            status: None,
        }
    }

    /// Current frame, one line per grid row.
    pub(crate) fn frame(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn put(&mut self, cell: IVec2, glyph: char) {
        let (Ok(x), Ok(y)) = (usize::try_from(cell.x), usize::try_from(cell.y)) else {
            return;
        };
        if let Some(slot) = self.rows.get_mut(y).and_then(|row| row.get_mut(x)) {
            *slot = glyph;
        }
    }
}

impl Presenter for TracingPresenter {
    fn render_static_layer(&mut self, map: &StaticMap) {
        for (cell, state) in map.cells() {
            self.put(cell, terrain_glyph(state));
        }
        debug!("static layer rendered");
    }

    fn erase_cell(&mut self, cell: IVec2, state: CellState) {
        trace!(x = cell.x, y = cell.y, "erase");
        self.put(cell, terrain_glyph(state));
    }

    fn draw_tank(&mut self, cell: IVec2, orientation: Orientation, is_player: bool) {
        trace!(x = cell.x, y = cell.y, ?orientation, is_player, "tank");
        self.put(cell, tank_glyph(orientation, is_player));
    }

    fn draw_projectile(&mut self, cell: IVec2) {
        trace!(x = cell.x, y = cell.y, "projectile");
        self.put(cell, PROJECTILE_GLYPH);
    }

    fn render_status(&mut self, level: u32, health: u32) {
        if self.status != Some((level, health)) {
            info!(level, health, "status");
            self.status = Some((level, health));
        }
        let frame = self.frame();
        debug!("frame\n{frame}");
    }
}

fn terrain_glyph(state: CellState) -> char {
    match state {
        CellState::Empty => ' ',
        CellState::Wall => '#',
        CellState::DamagedWall => '%',
        CellState::River => '~',
    }
}

fn tank_glyph(orientation: Orientation, is_player: bool) -> char {
    match (orientation, is_player) {
        (Orientation::Up, true) => '^',
        (Orientation::Down, true) => 'v',
        (Orientation::Left, true) => '<',
        (Orientation::Right, true) => '>',
        (Orientation::Up, false) => 'A',
        (Orientation::Down, false) => 'V',
        (Orientation::Left, false) => '{',
        (Orientation::Right, false) => '}',
    }
}
