pub mod comparison;
pub mod engine;
pub mod model;
pub mod state;
pub mod validation;
pub mod votes;

pub use comparison::{
    best_per_criterion, head_to_head, strengths_and_weaknesses, team_comments,
    top_two_head_to_head, BestScores, HeadToHead, StrengthsAndWeaknesses,
};
pub use engine::{
    compute_aggregate_score, rank_candidates, score_breakdown, RankedCandidate, ScoreResult,
};
pub use model::{clamp_rating, CandidateId, CandidateScore, Criterion, Vote, MAX_RATING};
pub use state::EvaluationState;
pub use validation::{session_warnings, validate_session};
pub use votes::{leading_candidate, recommend, tally_votes, Recommendation, VoteTally};
