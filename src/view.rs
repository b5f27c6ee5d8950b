use std::collections::HashMap;

use crate::layout::{
    TargetPlacement, MARGIN_BOTTOM, MARGIN_LEFT, MARGIN_RIGHT, MARGIN_TOP, TARGET_SIZE,
};
use crate::presenter::{Presenter, TextField, DEFAULT_BOARD_SIZE};

/// Board pixels covered by one terminal cell.
pub const CELL_WIDTH_PX: f64 = 10.0;
pub const CELL_HEIGHT_PX: f64 = 20.0;

// The terminal board sits between the header and the footer, so the layout's
// margins are not drawn: cell (0, 0) holds the first centre a target can have.
const ORIGIN_X_PX: f64 = MARGIN_LEFT + TARGET_SIZE / 2.0;
const ORIGIN_Y_PX: f64 = MARGIN_TOP + TARGET_SIZE / 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetView {
    pub placement: TargetPlacement,
    pub active: bool,
    pub selected: Option<usize>,
}

impl TargetView {
    /// Terminal cell (column, row) of the target centre, board-relative.
    pub fn cell(&self) -> (u16, u16) {
        let cx = self.placement.x + TARGET_SIZE / 2.0 - ORIGIN_X_PX;
        let cy = self.placement.y + TARGET_SIZE / 2.0 - ORIGIN_Y_PX;
        (
            (cx / CELL_WIDTH_PX).floor().max(0.0) as u16,
            (cy / CELL_HEIGHT_PX).floor().max(0.0) as u16,
        )
    }
}

/// Retained model of everything the core has asked to display.
#[derive(Debug, Clone)]
pub struct BoardView {
    targets: Vec<TargetView>,
    grid: Vec<u8>,
    grid_columns: usize,
    overlay_visible: bool,
    selection_controls: bool,
    texts: HashMap<TextField, String>,
    progress_percent: f64,
    board_size: (f64, f64),
}

impl Default for BoardView {
    fn default() -> Self {
        Self {
            targets: Vec::new(),
            grid: Vec::new(),
            grid_columns: 0,
            overlay_visible: false,
            selection_controls: false,
            texts: HashMap::new(),
            progress_percent: 0.0,
            board_size: DEFAULT_BOARD_SIZE,
        }
    }
}

impl BoardView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sizes the board from the terminal area it is drawn into. The reported
    /// size adds the margins back, so every placement lands on a visible cell.
    pub fn resize_cells(&mut self, columns: u16, rows: u16) {
        self.board_size = (
            columns as f64 * CELL_WIDTH_PX + MARGIN_LEFT + MARGIN_RIGHT - CELL_WIDTH_PX,
            rows as f64 * CELL_HEIGHT_PX + MARGIN_TOP + MARGIN_BOTTOM - CELL_HEIGHT_PX,
        );
    }

    pub fn targets(&self) -> &[TargetView] {
        &self.targets
    }

    pub fn grid_rows(&self) -> impl Iterator<Item = &[u8]> {
        self.grid.chunks(self.grid_columns.max(1))
    }

    pub fn overlay_visible(&self) -> bool {
        self.overlay_visible
    }

    pub fn selection_controls(&self) -> bool {
        self.selection_controls
    }

    pub fn text(&self, field: TextField) -> &str {
        self.texts.get(&field).map(String::as_str).unwrap_or("")
    }

    pub fn progress_percent(&self) -> f64 {
        self.progress_percent
    }

    pub fn active_target(&self) -> Option<usize> {
        self.targets
            .iter()
            .find(|t| t.active)
            .map(|t| t.placement.id)
    }

    /// Target drawn at (or right next to) a board-relative cell.
    pub fn target_at_cell(&self, column: u16, row: u16) -> Option<usize> {
        self.targets
            .iter()
            .filter_map(|t| {
                let (tc, tr) = t.cell();
                let dc = (tc as i32 - column as i32).abs();
                let dr = (tr as i32 - row as i32).abs();
                (dc <= 2 && dr <= 1).then_some((dc + dr, t.placement.id))
            })
            .min()
            .map(|(_, id)| id)
    }

    fn target_mut(&mut self, id: usize) -> Option<&mut TargetView> {
        self.targets.iter_mut().find(|t| t.placement.id == id)
    }
}

impl Presenter for BoardView {
    fn render_board(&mut self, placements: &[TargetPlacement]) {
        self.targets = placements
            .iter()
            .map(|&placement| TargetView {
                placement,
                active: false,
                selected: None,
            })
            .collect();
    }

    fn set_target_active(&mut self, id: usize, active: bool) {
        if let Some(target) = self.target_mut(id) {
            target.active = active;
        }
    }

    fn set_target_selected(&mut self, id: usize, order: Option<usize>) {
        if let Some(target) = self.target_mut(id) {
            target.selected = order;
        }
    }

    fn render_symmetry_grid(&mut self, cells: &[u8], columns: usize) {
        self.grid = cells.to_vec();
        self.grid_columns = columns;
    }

    fn show_symmetry_overlay(&mut self, visible: bool) {
        self.overlay_visible = visible;
    }

    fn show_selection_controls(&mut self, visible: bool) {
        self.selection_controls = visible;
    }

    fn set_text(&mut self, field: TextField, value: &str) {
        self.texts.insert(field, value.to_string());
    }

    fn set_progress_bar(&mut self, percent: f64) {
        self.progress_percent = percent.clamp(0.0, 100.0);
    }

    fn has_target(&self, id: usize) -> bool {
        self.targets.iter().any(|t| t.placement.id == id)
    }

    fn board_size(&self) -> (f64, f64) {
        self.board_size
    }
}
