use rand::Rng;
use tracing::debug;

pub const TARGET_SIZE: f64 = 60.0;
pub const TARGET_PADDING: f64 = 20.0;
pub const MAX_PLACEMENT_ATTEMPTS: u32 = 100;

pub const BASE_TARGET_COUNT: u32 = 15;
pub const TARGETS_PER_LEVEL: u32 = 4;
pub const MIN_TARGET_COUNT: u32 = 3;

// Board margins: left/top keep clear of the header, right/bottom of the footer.
pub const MARGIN_LEFT: f64 = 10.0;
pub const MARGIN_RIGHT: f64 = 80.0;
pub const MARGIN_TOP: f64 = 60.0;
pub const MARGIN_BOTTOM: f64 = 140.0;

/// Board-relative position of one target, top-left corner in board pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetPlacement {
    pub id: usize,
    pub x: f64,
    pub y: f64,
}

impl TargetPlacement {
    pub fn distance_to(&self, x: f64, y: f64) -> f64 {
        let dx = self.x - x;
        let dy = self.y - y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Number of targets on the board for a level.
pub fn target_count(level: u32) -> usize {
    BASE_TARGET_COUNT
        .saturating_add(level.saturating_mul(TARGETS_PER_LEVEL))
        .max(MIN_TARGET_COUNT) as usize
}

/// Result of one rejection-sampling batch.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub placements: Vec<TargetPlacement>,
    /// Placements accepted after exhausting every attempt.
    pub relaxed: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct LayoutGenerator {
    pub min_distance: f64,
    pub max_attempts: u32,
}

impl Default for LayoutGenerator {
    fn default() -> Self {
        Self {
            min_distance: TARGET_SIZE + TARGET_PADDING,
            max_attempts: MAX_PLACEMENT_ATTEMPTS,
        }
    }
}

impl LayoutGenerator {
    pub fn generate<R: Rng + ?Sized>(
        &self,
        count: usize,
        board_width: f64,
        board_height: f64,
        rng: &mut R,
    ) -> Vec<TargetPlacement> {
        self.generate_layout(count, board_width, board_height, rng)
            .placements
    }

    /// Best-effort spacing: a candidate that still overlaps after `max_attempts`
    /// draws is accepted anyway, so dense boards may overlap.
    pub fn generate_layout<R: Rng + ?Sized>(
        &self,
        count: usize,
        board_width: f64,
        board_height: f64,
        rng: &mut R,
    ) -> Layout {
        let x_max = (board_width - MARGIN_RIGHT).max(MARGIN_LEFT);
        let y_max = (board_height - MARGIN_BOTTOM).max(MARGIN_TOP);

        let mut placements: Vec<TargetPlacement> = Vec::with_capacity(count);
        let mut relaxed = 0;

        for id in 0..count {
            let mut attempts = 0;
            let (x, y) = loop {
                let x = rng.gen_range(MARGIN_LEFT..=x_max);
                let y = rng.gen_range(MARGIN_TOP..=y_max);
                attempts += 1;

                if !self.overlaps(x, y, &placements) {
                    break (x, y);
                }
                if attempts >= self.max_attempts {
                    relaxed += 1;
                    break (x, y);
                }
            };
            placements.push(TargetPlacement { id, x, y });
        }

        if relaxed > 0 {
            debug!(count, relaxed, board_width, board_height, "layout relaxed spacing");
        }

        Layout { placements, relaxed }
    }

    fn overlaps(&self, x: f64, y: f64, placed: &[TargetPlacement]) -> bool {
        placed
            .iter()
            .any(|p| p.distance_to(x, y) < self.min_distance)
    }
}
