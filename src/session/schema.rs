use serde::{Deserialize, Serialize};

use crate::scoring::{CandidateScore, Criterion, EvaluationState, Vote};

/// An evaluation session as stored on disk.
///
/// Example YAML:
/// ```yaml
/// name: Bracket housing RFQ
/// criteria:
///   - { id: price, name: Price, description: Unit price incl. tooling, weight: 8 }
/// candidates:
///   - candidate_id: 1
///     candidate_name: Acme Machining
///     scores: { price: 7 }
/// votes:
///   - { voter_id: u1, voter_name: Dana, preferred_candidate_id: 1 }
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Session {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub criteria: Vec<Criterion>,
    #[serde(default)]
    pub candidates: Vec<CandidateScore>,
    #[serde(default)]
    pub votes: Vec<Vote>,
}

impl Session {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Supplier evaluation")
    }

    /// Split into the display name and the state the scoring engine works on
    pub fn into_state(self) -> (String, EvaluationState) {
        let name = self.display_name().to_string();
        (
            name,
            EvaluationState::new(self.criteria, self.candidates, self.votes),
        )
    }

    /// Starter session written by `offer-bro init`
    pub fn starter(criteria: Vec<Criterion>, supplier_names: &[String]) -> Self {
        let candidates = supplier_names
            .iter()
            .enumerate()
            .map(|(i, name)| CandidateScore {
                candidate_id: (i + 1) as u32,
                candidate_name: name.clone(),
                scores: Default::default(),
            })
            .collect();

        Self {
            name: Some("Supplier evaluation".to_string()),
            criteria,
            candidates,
            votes: Vec::new(),
        }
    }

    /// Criteria offered as defaults by the init wizard
    pub fn default_criteria() -> Vec<Criterion> {
        [
            ("price", "Price", "Unit price including tooling amortisation", 8.0),
            ("lead_time", "Lead time", "Weeks from PO to first article", 6.0),
            ("quality", "Quality", "Certifications, defect rate and FAI history", 9.0),
            ("capacity", "Capacity", "Ability to absorb volume ramps", 5.0),
            ("dfm", "DFM feedback", "Quality of design-for-manufacturing input", 4.0),
        ]
        .into_iter()
        .map(|(id, name, description, weight)| Criterion {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            weight,
        })
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_session_parse() {
        let yaml = r#"
name: Bracket housing RFQ
criteria:
  - { id: price, name: Price, description: Unit price, weight: 8 }
  - { id: lead_time, name: Lead time, weight: 6 }
candidates:
  - candidate_id: 1
    candidate_name: Acme Machining
    scores: { price: 7, lead_time: 9 }
  - candidate_id: 2
    candidate_name: Borealis Castings
votes:
  - { voter_id: u1, voter_name: Dana, preferred_candidate_id: 1, comment: Fast FAI }
"#;
        let session: Session = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(session.display_name(), "Bracket housing RFQ");
        assert_eq!(session.criteria.len(), 2);
        assert_eq!(session.criteria[1].description, "");
        assert_eq!(session.candidates[0].score_for("lead_time"), 9.0);
        assert_eq!(session.votes[0].comment.as_deref(), Some("Fast FAI"));
    }

    #[test]
    fn test_empty_session_parse() {
        let session: Session = serde_saphyr::from_str("{}").unwrap();
        assert!(session.name.is_none());
        assert!(session.criteria.is_empty());
        assert_eq!(session.display_name(), "Supplier evaluation");
    }

    #[test]
    fn test_unknown_field_rejected() {
        let yaml = "name: x\nsuppliers: []\n";
        assert!(serde_saphyr::from_str::<Session>(yaml).is_err());
    }

    #[test]
    fn test_starter_session_numbers_suppliers() {
        let names = vec!["Acme".to_string(), "Borealis".to_string()];
        let session = Session::starter(Session::default_criteria(), &names);
        assert_eq!(session.candidates.len(), 2);
        assert_eq!(session.candidates[1].candidate_id, 2);
        assert_eq!(session.candidates[1].candidate_name, "Borealis");
        assert!(session.votes.is_empty());
    }

    #[test]
    fn test_session_serde_roundtrip() {
        let names = vec!["Acme".to_string()];
        let session = Session::starter(Session::default_criteria(), &names);
        let yaml = serde_saphyr::to_string(&session).unwrap();
        let parsed: Session = serde_saphyr::from_str(&yaml).unwrap();
        assert_eq!(session, parsed);
    }

    #[test]
    fn test_into_state() {
        let names = vec!["Acme".to_string()];
        let (name, state) = Session::starter(Session::default_criteria(), &names).into_state();
        assert_eq!(name, "Supplier evaluation");
        assert_eq!(state.criteria.len(), 5);
        assert_eq!(state.candidates.len(), 1);
    }
}
