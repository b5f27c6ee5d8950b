use crate::layout::TargetPlacement;

/// Fallback board size when the presentation layer cannot measure its board.
pub const DEFAULT_BOARD_SIZE: (f64, f64) = (800.0, 400.0);

/// Named text slots the core writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
#[strum(serialize_all = "camelCase")]
pub enum TextField {
    Timer,
    LevelNum,
    ProgressText,
    GameInstruction,
    SymmetryQuestion,
    SymmetryTimer,
    SelectedCount,
    TotalNeeded,
    PlayButton,
    Message,
}

/// Rendering surface driven by the core. Every call is fire-and-forget; an
/// implementation missing an element simply ignores the call.
pub trait Presenter {
    fn render_board(&mut self, placements: &[TargetPlacement]);
    fn set_target_active(&mut self, id: usize, active: bool);
    /// `order` is the 1-based selection number, `None` clears the mark.
    fn set_target_selected(&mut self, id: usize, order: Option<usize>);
    fn render_symmetry_grid(&mut self, cells: &[u8], columns: usize);
    fn show_symmetry_overlay(&mut self, visible: bool);
    fn show_selection_controls(&mut self, visible: bool);
    fn set_text(&mut self, field: TextField, value: &str);
    fn set_progress_bar(&mut self, percent: f64);

    /// Whether the target can be highlighted at all.
    fn has_target(&self, _id: usize) -> bool {
        true
    }

    /// Board size in board pixels.
    fn board_size(&self) -> (f64, f64) {
        DEFAULT_BOARD_SIZE
    }
}

/// Presenter with no elements at all.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn render_board(&mut self, _placements: &[TargetPlacement]) {}
    fn set_target_active(&mut self, _id: usize, _active: bool) {}
    fn set_target_selected(&mut self, _id: usize, _order: Option<usize>) {}
    fn render_symmetry_grid(&mut self, _cells: &[u8], _columns: usize) {}
    fn show_symmetry_overlay(&mut self, _visible: bool) {}
    fn show_selection_controls(&mut self, _visible: bool) {}
    fn set_text(&mut self, _field: TextField, _value: &str) {}
    fn set_progress_bar(&mut self, _percent: f64) {}
}

pub fn format_timer(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
