use crate::session::{SelectionEntry, ShownStep, SymmetryAttempt};
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationError {
    #[error("no sequence to score")]
    EmptySequence,
    #[error("round is not waiting for a selection")]
    NotInSelection,
}

/// Percentages in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreResult {
    pub target_accuracy: u32,
    pub symmetry_accuracy: u32,
    pub overall: u32,
}

fn percent(hits: usize, total: usize) -> u32 {
    ((hits as f64 / total as f64) * 100.0).round() as u32
}

/// Scores one round.
///
/// Target accuracy compares position by position and is undefined without a
/// shown sequence, so that case is an error. Symmetry accuracy is 0 when no
/// quiz was answered: missing quizzes count as failed rather than unscorable.
pub fn evaluate(
    shown: &[ShownStep],
    selected: &[SelectionEntry],
    symmetry_results: &[SymmetryAttempt],
) -> Result<ScoreResult, EvaluationError> {
    if shown.is_empty() {
        return Err(EvaluationError::EmptySequence);
    }

    let matches = shown
        .iter()
        .zip(selected)
        .filter(|(s, sel)| s.target_id == sel.target_id)
        .count();
    let target_accuracy = percent(matches, shown.len());

    let symmetry_accuracy = if symmetry_results.is_empty() {
        0
    } else {
        let correct = symmetry_results.iter().filter(|r| r.correct).count();
        percent(correct, symmetry_results.len())
    };

    let overall = ((target_accuracy + symmetry_accuracy) as f64 / 2.0).round() as u32;

    Ok(ScoreResult {
        target_accuracy,
        symmetry_accuracy,
        overall,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symmetry::SymmetryBank;

    fn shown(ids: &[usize]) -> Vec<ShownStep> {
        ids.iter()
            .enumerate()
            .map(|(i, &target_id)| ShownStep {
                target_id,
                order: i + 1,
                display_duration_ms: 1500,
                phase_index: (i * 2) as u32,
            })
            .collect()
    }

    fn selected(ids: &[usize]) -> Vec<SelectionEntry> {
        ids.iter()
            .enumerate()
            .map(|(i, &target_id)| SelectionEntry {
                target_id,
                selection_order: i + 1,
            })
            .collect()
    }

    fn attempts(answers: &[bool]) -> Vec<SymmetryAttempt> {
        let pattern = &SymmetryBank::standard().patterns()[1];
        answers
            .iter()
            .enumerate()
            .map(|(i, &a)| SymmetryAttempt::judge(pattern, a, (i * 2 + 1) as u32))
            .collect()
    }

    #[test]
    fn exact_order_scores_full_marks() {
        let score = evaluate(&shown(&[4, 9, 2]), &selected(&[4, 9, 2]), &[]).unwrap();
        assert_eq!(score.target_accuracy, 100);
    }

    #[test]
    fn swapped_pair_scores_one_third() {
        let score = evaluate(&shown(&[4, 9, 2]), &selected(&[4, 2, 9]), &[]).unwrap();
        assert_eq!(score.target_accuracy, 33);
    }

    #[test]
    fn extra_selections_are_ignored() {
        let score = evaluate(&shown(&[1, 2]), &selected(&[1, 2, 3, 4]), &[]).unwrap();
        assert_eq!(score.target_accuracy, 100);
    }

    #[test]
    fn short_selection_counts_against_shown_length() {
        let score = evaluate(&shown(&[1, 2, 3, 4]), &selected(&[1]), &[]).unwrap();
        assert_eq!(score.target_accuracy, 25);
    }

    #[test]
    fn repeated_targets_are_compared_by_position() {
        let score = evaluate(&shown(&[5, 5, 7, 5]), &selected(&[5, 7, 7, 5]), &[]).unwrap();
        assert_eq!(score.target_accuracy, 75);
    }

    #[test]
    fn no_symmetry_attempts_scores_zero() {
        let score = evaluate(&shown(&[1]), &selected(&[1]), &[]).unwrap();
        assert_eq!(score.symmetry_accuracy, 0);
        assert_eq!(score.overall, 50);
    }

    #[test]
    fn empty_shown_sequence_is_an_error() {
        let err = evaluate(&[], &selected(&[1]), &attempts(&[true])).unwrap_err();
        assert_eq!(err, EvaluationError::EmptySequence);
        assert_eq!(err.to_string(), "no sequence to score");
    }

    #[test]
    fn overall_is_rounded_mean() {
        // pattern 1 is symmetric: three right answers out of four
        let score = evaluate(
            &shown(&[1, 2, 3]),
            &selected(&[1, 3, 2]),
            &attempts(&[true, true, true, false]),
        )
        .unwrap();

        assert_eq!(score.target_accuracy, 33);
        assert_eq!(score.symmetry_accuracy, 75);
        assert_eq!(score.overall, 54);
    }
}
