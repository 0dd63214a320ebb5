use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Lowest value a weight or score cell can hold.
pub const MIN_RATING: f64 = 0.0;
/// Highest value a weight or score cell can hold.
pub const MAX_RATING: f64 = 10.0;

pub type CandidateId = u32;

/// Clamp a weight or score into `[0, 10]`. NaN becomes 0.
pub fn clamp_rating(value: f64) -> f64 {
    if value.is_nan() {
        MIN_RATING
    } else {
        value.clamp(MIN_RATING, MAX_RATING)
    }
}

/// A weighted dimension of comparison (price, lead time, ...).
///
/// Example YAML:
/// ```yaml
/// id: price
/// name: Price
/// description: Unit price incl. tooling amortisation
/// weight: 8
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Criterion {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Relative importance, 0-10
    pub weight: f64,
}

/// One supplier offer and its per-criterion scores.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CandidateScore {
    pub candidate_id: CandidateId,
    pub candidate_name: String,
    /// criterion id -> score (0-10)
    #[serde(default)]
    pub scores: HashMap<String, f64>,
}

impl CandidateScore {
    /// Score recorded for `criterion_id`, or 0 when the cell was never filled in.
    pub fn score_for(&self, criterion_id: &str) -> f64 {
        self.scores.get(criterion_id).copied().unwrap_or(0.0)
    }
}

/// A team member's preference. Immutable once cast.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Vote {
    pub voter_id: String,
    pub voter_name: String,
    pub preferred_candidate_id: CandidateId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cast_at: Option<DateTime<Utc>>,
}

impl Vote {
    /// Comment text, if the voter left a non-blank one
    pub fn comment_text(&self) -> Option<&str> {
        self.comment
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_rating_bounds() {
        assert_eq!(clamp_rating(15.0), 10.0);
        assert_eq!(clamp_rating(-3.0), 0.0);
        assert_eq!(clamp_rating(4.5), 4.5);
        assert_eq!(clamp_rating(f64::NAN), 0.0);
        assert_eq!(clamp_rating(f64::INFINITY), 10.0);
    }

    #[test]
    fn test_score_for_missing_defaults_to_zero() {
        let candidate = CandidateScore {
            candidate_id: 1,
            candidate_name: "Acme".to_string(),
            scores: HashMap::from([("price".to_string(), 7.0)]),
        };
        assert_eq!(candidate.score_for("price"), 7.0);
        assert_eq!(candidate.score_for("quality"), 0.0);
    }

    #[test]
    fn test_comment_text_ignores_blank() {
        let mut vote = Vote {
            voter_id: "u1".to_string(),
            voter_name: "Dana".to_string(),
            preferred_candidate_id: 1,
            comment: Some("   ".to_string()),
            cast_at: None,
        };
        assert_eq!(vote.comment_text(), None);

        vote.comment = Some(" Fast FAI ".to_string());
        assert_eq!(vote.comment_text(), Some("Fast FAI"));
    }

    #[test]
    fn test_vote_parse_without_optional_fields() {
        let yaml = r#"
voter_id: u1
voter_name: Dana
preferred_candidate_id: 2
"#;
        let vote: Vote = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(vote.preferred_candidate_id, 2);
        assert!(vote.comment.is_none());
        assert!(vote.cast_at.is_none());
    }

    #[test]
    fn test_candidate_parse_without_scores() {
        let yaml = r#"
candidate_id: 3
candidate_name: Borealis Castings
"#;
        let candidate: CandidateScore = serde_saphyr::from_str(yaml).unwrap();
        assert!(candidate.scores.is_empty());
        assert_eq!(candidate.score_for("price"), 0.0);
    }

    #[test]
    fn test_criterion_rejects_unknown_fields() {
        let yaml = r#"
id: price
name: Price
weight: 5
colour: red
"#;
        assert!(serde_saphyr::from_str::<Criterion>(yaml).is_err());
    }
}
