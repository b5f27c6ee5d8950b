use rand::seq::SliceRandom;
use rand::Rng;

pub const GRID_ROWS: usize = 5;
pub const GRID_COLUMNS: usize = 11;

const PROMPT: &str = "Mirror symmetry across red line?";

/// Authored grid for the quiz phase, mirrored across the centre column.
#[derive(Debug, PartialEq, Eq)]
pub struct SymmetryPattern {
    pub cells: [u8; GRID_ROWS * GRID_COLUMNS],
    pub is_symmetric: bool,
    pub prompt_text: &'static str,
}

impl SymmetryPattern {
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.cells.chunks(GRID_COLUMNS)
    }

    /// Checks the cells themselves, independent of the authored label.
    pub fn is_mirrored(&self) -> bool {
        self.rows()
            .all(|row| row.iter().eq(row.iter().rev()))
    }
}

#[rustfmt::skip]
static STANDARD_PATTERNS: [SymmetryPattern; 6] = [
    SymmetryPattern {
        cells: [1,1,1,1,1,0,1,1,1,1,1,
                1,0,0,0,0,0,1,0,1,0,1,
                1,0,1,0,0,0,1,0,1,0,1,
                1,0,0,0,0,0,1,0,1,1,1,
                1,1,1,1,1,0,1,1,0,0,1],
        is_symmetric: false,
        prompt_text: PROMPT,
    },
    SymmetryPattern {
        cells: [1,1,1,1,1,0,1,1,1,1,1,
                1,0,0,0,0,0,0,0,0,0,1,
                1,1,1,1,1,0,1,1,1,1,1,
                0,0,0,0,1,0,1,0,0,0,0,
                1,1,1,1,1,0,1,1,1,1,1],
        is_symmetric: true,
        prompt_text: PROMPT,
    },
    SymmetryPattern {
        cells: [1,0,1,0,1,0,1,0,1,0,1,
                0,1,0,1,0,0,0,1,0,1,0,
                1,0,1,0,1,0,1,0,1,0,1,
                0,1,0,1,0,0,0,1,0,1,0,
                1,0,1,0,1,0,1,0,1,0,1],
        is_symmetric: true,
        prompt_text: PROMPT,
    },
    SymmetryPattern {
        cells: [1,1,0,0,1,0,1,0,0,1,1,
                0,1,1,0,0,0,0,0,1,1,0,
                1,0,1,1,0,0,0,1,1,0,1,
                0,0,1,0,1,0,1,0,1,0,0,
                1,1,0,0,1,0,1,0,0,1,1],
        is_symmetric: true,
        prompt_text: PROMPT,
    },
    SymmetryPattern {
        cells: [1,1,0,0,1,0,1,0,0,1,1,
                0,1,1,0,0,0,0,0,1,1,0,
                1,0,1,1,0,0,0,1,0,0,1,
                0,0,1,0,1,0,1,0,1,0,0,
                1,1,0,0,1,0,1,0,0,1,1],
        is_symmetric: false,
        prompt_text: PROMPT,
    },
    SymmetryPattern {
        cells: [1,1,1,1,1,0,1,1,1,1,1,
                1,0,0,0,0,0,0,0,0,0,1,
                1,1,1,1,1,0,1,1,1,1,1,
                0,0,0,0,1,0,1,0,0,0,0,
                1,1,1,1,0,0,1,1,1,1,1],
        is_symmetric: false,
        prompt_text: PROMPT,
    },
];

/// Read-only registry of quiz patterns.
#[derive(Debug, Clone, Copy)]
pub struct SymmetryBank {
    patterns: &'static [SymmetryPattern],
}

impl Default for SymmetryBank {
    fn default() -> Self {
        Self::standard()
    }
}

impl SymmetryBank {
    pub fn standard() -> Self {
        Self {
            patterns: &STANDARD_PATTERNS,
        }
    }

    /// Swaps in a custom registry; an empty slice falls back to the standard bank.
    pub fn with_patterns(patterns: &'static [SymmetryPattern]) -> Self {
        if patterns.is_empty() {
            return Self::standard();
        }
        Self { patterns }
    }

    pub fn patterns(&self) -> &'static [SymmetryPattern] {
        self.patterns
    }

    pub fn pick_random<R: Rng + ?Sized>(&self, rng: &mut R) -> &'static SymmetryPattern {
        let patterns: &'static [SymmetryPattern] = self.patterns;
        patterns.choose(rng).unwrap_or(&STANDARD_PATTERNS[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use std::collections::HashSet;

    #[test]
    fn standard_bank_has_six_distinct_patterns() {
        let bank = SymmetryBank::standard();
        let distinct: HashSet<_> = bank.patterns().iter().map(|p| p.cells).collect();

        assert_eq!(bank.patterns().len(), 6);
        assert_eq!(distinct.len(), 6);
    }

    #[test]
    fn authored_labels_agree_with_mirror_check() {
        for (idx, pattern) in SymmetryBank::standard().patterns().iter().enumerate() {
            assert_eq!(
                pattern.is_mirrored(),
                pattern.is_symmetric,
                "pattern {idx} is mislabelled"
            );
        }
    }

    #[test]
    fn bank_mixes_symmetric_and_asymmetric() {
        let patterns = SymmetryBank::standard().patterns();
        assert!(patterns.iter().any(|p| p.is_symmetric));
        assert!(patterns.iter().any(|p| !p.is_symmetric));
    }

    #[test]
    fn pick_random_covers_the_whole_bank() {
        let bank = SymmetryBank::standard();
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = HashSet::new();
        for _ in 0..500 {
            seen.insert(bank.pick_random(&mut rng).cells);
        }
        assert_eq!(seen.len(), bank.patterns().len());
    }

    #[test]
    fn empty_registry_falls_back_to_standard() {
        let bank = SymmetryBank::with_patterns(&[]);
        assert_eq!(bank.patterns().len(), 6);
    }

    #[test]
    fn rows_split_grid_by_columns() {
        let pattern = &SymmetryBank::standard().patterns()[0];
        let rows: Vec<_> = pattern.rows().collect();
        assert_eq!(rows.len(), GRID_ROWS);
        assert!(rows.iter().all(|r| r.len() == GRID_COLUMNS));
    }
}
