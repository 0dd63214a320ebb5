use super::model::{CandidateScore, Criterion};

#[derive(Debug, Clone, PartialEq)]
pub struct CriterionContribution {
    pub criterion_id: String,
    pub label: String,    // e.g. "Price", "Lead time"
    pub score: f64,       // Candidate's score on this criterion (0 when missing)
    pub weight: f64,      // Criterion weight at the time of scoring
    pub weighted: f64,    // score * weight
    pub weight_share: f64, // weight / total weight, 0 when total weight is 0
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreBreakdown {
    pub total_weight: f64,
    pub contributions: Vec<CriterionContribution>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreResult {
    pub score: f64,
    pub breakdown: ScoreBreakdown,
}

/// A candidate together with its aggregate score and 1-based rank.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedCandidate<'a> {
    pub rank: usize,
    pub candidate: &'a CandidateScore,
    pub score: f64,
}

/// Weighted average of the candidate's scores: `sum(score * weight) / sum(weight)`.
///
/// A criterion without a recorded score contributes 0 to the numerator but
/// still counts its weight. Returns exactly 0 when the total weight is 0.
pub fn compute_aggregate_score(candidate: &CandidateScore, criteria: &[Criterion]) -> f64 {
    let mut total_score = 0.0;
    let mut total_weight = 0.0;

    for criterion in criteria {
        total_score += candidate.score_for(&criterion.id) * criterion.weight;
        total_weight += criterion.weight;
    }

    if total_weight > 0.0 {
        total_score / total_weight
    } else {
        0.0
    }
}

/// Aggregate score plus the per-criterion terms that produced it.
pub fn score_breakdown(candidate: &CandidateScore, criteria: &[Criterion]) -> ScoreResult {
    let total_weight: f64 = criteria.iter().map(|c| c.weight).sum();

    let contributions = criteria
        .iter()
        .map(|criterion| {
            let score = candidate.score_for(&criterion.id);
            CriterionContribution {
                criterion_id: criterion.id.clone(),
                label: criterion.name.clone(),
                score,
                weight: criterion.weight,
                weighted: score * criterion.weight,
                weight_share: if total_weight > 0.0 {
                    criterion.weight / total_weight
                } else {
                    0.0
                },
            }
        })
        .collect();

    ScoreResult {
        score: compute_aggregate_score(candidate, criteria),
        breakdown: ScoreBreakdown {
            total_weight,
            contributions,
        },
    }
}

/// Rank candidates by aggregate score, highest first.
///
/// Candidates with equal scores keep their relative input order.
pub fn rank_candidates<'a>(
    candidates: &'a [CandidateScore],
    criteria: &[Criterion],
) -> Vec<RankedCandidate<'a>> {
    let mut scored: Vec<(&CandidateScore, f64)> = candidates
        .iter()
        .map(|c| (c, compute_aggregate_score(c, criteria)))
        .collect();

    // slice::sort_by is stable, so ties stay in input order
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    scored
        .into_iter()
        .enumerate()
        .map(|(idx, (candidate, score))| RankedCandidate {
            rank: idx + 1,
            candidate,
            score,
        })
        .collect()
}
