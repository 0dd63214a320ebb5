use std::collections::HashSet;

use super::state::EvaluationState;

/// Validate an evaluation session at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_session(state: &EvaluationState) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    let mut seen_criteria = HashSet::new();
    for (i, criterion) in state.criteria.iter().enumerate() {
        if criterion.id.trim().is_empty() {
            errors.push(format!("criteria[{}].id: must not be blank", i));
        } else if !seen_criteria.insert(criterion.id.as_str()) {
            errors.push(format!(
                "criteria[{}].id: duplicate criterion id '{}'",
                i, criterion.id
            ));
        }
    }

    let mut seen_candidates = HashSet::new();
    for (i, candidate) in state.candidates.iter().enumerate() {
        if !seen_candidates.insert(candidate.candidate_id) {
            errors.push(format!(
                "candidates[{}].candidate_id: duplicate candidate id {}",
                i, candidate.candidate_id
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Non-fatal problems: references the scoring will ignore or treat as "Unknown".
pub fn session_warnings(state: &EvaluationState) -> Vec<String> {
    let mut warnings = Vec::new();

    for candidate in &state.candidates {
        let mut unknown: Vec<&str> = candidate
            .scores
            .keys()
            .map(String::as_str)
            .filter(|key| state.criterion(key).is_none())
            .collect();
        unknown.sort();
        for key in unknown {
            warnings.push(format!(
                "candidate {} ('{}'): score for unknown criterion '{}' is ignored",
                candidate.candidate_id, candidate.candidate_name, key
            ));
        }
    }

    for (i, vote) in state.votes.iter().enumerate() {
        if state.candidate(vote.preferred_candidate_id).is_none() {
            warnings.push(format!(
                "votes[{}]: {} voted for unknown candidate {}",
                i, vote.voter_name, vote.preferred_candidate_id
            ));
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{CandidateScore, Criterion, Vote};
    use std::collections::HashMap;

    fn criterion(id: &str) -> Criterion {
        Criterion {
            id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
            weight: 5.0,
        }
    }

    fn candidate(id: u32) -> CandidateScore {
        CandidateScore {
            candidate_id: id,
            candidate_name: format!("Supplier {}", id),
            scores: HashMap::new(),
        }
    }

    #[test]
    fn test_valid_session() {
        let state = EvaluationState::new(
            vec![criterion("price"), criterion("quality")],
            vec![candidate(1), candidate(2)],
            vec![],
        );
        assert!(validate_session(&state).is_ok());
    }

    #[test]
    fn test_empty_session() {
        assert!(validate_session(&EvaluationState::default()).is_ok());
    }

    #[test]
    fn test_duplicate_criterion_id() {
        let state = EvaluationState::new(
            vec![criterion("price"), criterion("price")],
            vec![],
            vec![],
        );
        let errors = validate_session(&state).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("criteria[1].id"));
    }

    #[test]
    fn test_blank_criterion_id() {
        let state = EvaluationState::new(vec![criterion("  ")], vec![], vec![]);
        let errors = validate_session(&state).unwrap_err();
        assert!(errors[0].contains("must not be blank"));
    }

    #[test]
    fn test_collects_all_errors() {
        let state = EvaluationState::new(
            vec![criterion("price"), criterion("price")], // Error 1
            vec![candidate(1), candidate(1)],              // Error 2
            vec![],
        );
        let errors = validate_session(&state).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[1].contains("duplicate candidate id 1"));
    }

    #[test]
    fn test_warnings_for_dangling_references() {
        let mut c = candidate(1);
        c.scores.insert("colour".to_string(), 3.0);
        let state = EvaluationState::new(
            vec![criterion("price")],
            vec![c],
            vec![Vote {
                voter_id: "u1".to_string(),
                voter_name: "Dana".to_string(),
                preferred_candidate_id: 9,
                comment: None,
                cast_at: None,
            }],
        );

        let warnings = session_warnings(&state);
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("unknown criterion 'colour'"));
        assert!(warnings[1].contains("unknown candidate 9"));
    }
}
