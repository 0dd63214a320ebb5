use super::engine::compute_aggregate_score;
use super::model::{CandidateScore, Criterion, Vote};
use super::state::EvaluationState;

/// Highest recorded score for each criterion across all candidates.
#[derive(Debug, Clone, PartialEq)]
pub struct BestScores {
    best: Vec<(String, f64)>,
}

impl BestScores {
    pub fn best_for(&self, criterion_id: &str) -> f64 {
        self.best
            .iter()
            .find(|(id, _)| id == criterion_id)
            .map(|(_, score)| *score)
            .unwrap_or(0.0)
    }

    /// A cell is "best" when it equals the column maximum and is above zero
    pub fn is_best(&self, criterion_id: &str, score: f64) -> bool {
        score > 0.0 && score == self.best_for(criterion_id)
    }
}

pub fn best_per_criterion(candidates: &[CandidateScore], criteria: &[Criterion]) -> BestScores {
    let best = criteria
        .iter()
        .map(|criterion| {
            let max = candidates
                .iter()
                .map(|c| c.score_for(&criterion.id))
                .fold(0.0_f64, f64::max);
            (criterion.id.clone(), max)
        })
        .collect();
    BestScores { best }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CriterionScore<'a> {
    pub criterion: &'a Criterion,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrengthsAndWeaknesses<'a> {
    /// Highest-scoring criteria, best first
    pub strengths: Vec<CriterionScore<'a>>,
    /// Lowest-scoring criteria, worst first
    pub weaknesses: Vec<CriterionScore<'a>>,
}

/// Top `n` and bottom `n` criteria by the candidate's raw score.
///
/// With fewer than `2n` criteria the two lists overlap.
pub fn strengths_and_weaknesses<'a>(
    candidate: &CandidateScore,
    criteria: &'a [Criterion],
    n: usize,
) -> StrengthsAndWeaknesses<'a> {
    let mut scored: Vec<CriterionScore<'a>> = criteria
        .iter()
        .map(|criterion| CriterionScore {
            criterion,
            score: candidate.score_for(&criterion.id),
        })
        .collect();
    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

    let strengths = scored.iter().take(n).cloned().collect();
    let weaknesses = scored.iter().rev().take(n).cloned().collect();

    StrengthsAndWeaknesses {
        strengths,
        weaknesses,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CriterionDiff<'a> {
    pub criterion: &'a Criterion,
    pub first: f64,
    pub second: f64,
    /// first - second
    pub diff: f64,
}

impl CriterionDiff<'_> {
    pub fn is_advantage(&self) -> bool {
        self.diff > 0.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeadToHead<'a> {
    pub first: &'a CandidateScore,
    pub second: &'a CandidateScore,
    pub first_total: f64,
    pub second_total: f64,
    pub diffs: Vec<CriterionDiff<'a>>,
}

pub fn head_to_head<'a>(
    first: &'a CandidateScore,
    second: &'a CandidateScore,
    criteria: &'a [Criterion],
) -> HeadToHead<'a> {
    let diffs = criteria
        .iter()
        .map(|criterion| {
            let a = first.score_for(&criterion.id);
            let b = second.score_for(&criterion.id);
            CriterionDiff {
                criterion,
                first: a,
                second: b,
                diff: a - b,
            }
        })
        .collect();

    HeadToHead {
        first,
        second,
        first_total: compute_aggregate_score(first, criteria),
        second_total: compute_aggregate_score(second, criteria),
        diffs,
    }
}

/// Head-to-head between the two top-ranked candidates, if there are two
pub fn top_two_head_to_head(state: &EvaluationState) -> Option<HeadToHead<'_>> {
    let ranked = state.ranked();
    match ranked.as_slice() {
        [first, second, ..] => Some(head_to_head(first.candidate, second.candidate, &state.criteria)),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeamComment<'a> {
    pub vote: &'a Vote,
    pub comment: &'a str,
    pub candidate_name: &'a str,
}

/// Votes that carry a comment, in the order they were cast
pub fn team_comments(state: &EvaluationState) -> Vec<TeamComment<'_>> {
    state
        .votes
        .iter()
        .filter_map(|vote| {
            vote.comment_text().map(|comment| TeamComment {
                vote,
                comment,
                candidate_name: state.candidate_name(vote.preferred_candidate_id),
            })
        })
        .collect()
}
