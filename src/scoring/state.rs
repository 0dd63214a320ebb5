use super::engine::{rank_candidates, RankedCandidate};
use super::model::{clamp_rating, CandidateId, CandidateScore, Criterion, Vote};
use super::votes::{leading_candidate, recommend, tally_votes, Recommendation, VoteTally};

/// Caller-owned evaluation state.
///
/// The scoring functions never hold on to this; whoever owns it passes it in
/// on every call and applies edits through the update methods below.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationState {
    pub criteria: Vec<Criterion>,
    pub candidates: Vec<CandidateScore>,
    pub votes: Vec<Vote>,
}

impl EvaluationState {
    pub fn new(criteria: Vec<Criterion>, candidates: Vec<CandidateScore>, votes: Vec<Vote>) -> Self {
        Self {
            criteria,
            candidates,
            votes,
        }
    }

    /// Set a criterion's weight, clamped to `[0, 10]`.
    /// Returns false if no criterion has that id.
    pub fn update_criterion_weight(&mut self, criterion_id: &str, new_weight: f64) -> bool {
        match self.criteria.iter_mut().find(|c| c.id == criterion_id) {
            Some(criterion) => {
                criterion.weight = clamp_rating(new_weight);
                true
            }
            None => false,
        }
    }

    /// Set one score cell, clamped to `[0, 10]`.
    /// Returns false if the candidate or the criterion is unknown.
    pub fn update_candidate_score(
        &mut self,
        candidate_id: CandidateId,
        criterion_id: &str,
        new_score: f64,
    ) -> bool {
        if !self.criteria.iter().any(|c| c.id == criterion_id) {
            return false;
        }
        match self
            .candidates
            .iter_mut()
            .find(|c| c.candidate_id == candidate_id)
        {
            Some(candidate) => {
                candidate
                    .scores
                    .insert(criterion_id.to_string(), clamp_rating(new_score));
                true
            }
            None => false,
        }
    }

    /// Append a vote. Votes are never edited or removed.
    pub fn cast_vote(&mut self, vote: Vote) {
        self.votes.push(vote);
    }

    pub fn criterion(&self, criterion_id: &str) -> Option<&Criterion> {
        self.criteria.iter().find(|c| c.id == criterion_id)
    }

    pub fn candidate(&self, candidate_id: CandidateId) -> Option<&CandidateScore> {
        self.candidates
            .iter()
            .find(|c| c.candidate_id == candidate_id)
    }

    /// Display name for a candidate id, "Unknown" if it isn't part of this session
    pub fn candidate_name(&self, candidate_id: CandidateId) -> &str {
        self.candidate(candidate_id)
            .map(|c| c.candidate_name.as_str())
            .unwrap_or("Unknown")
    }

    /// Clamp every loaded weight and score into range.
    /// Returns a description of each value that had to change.
    pub fn clamp_all(&mut self) -> Vec<String> {
        let mut adjusted = Vec::new();

        for criterion in &mut self.criteria {
            let clamped = clamp_rating(criterion.weight);
            if clamped != criterion.weight {
                adjusted.push(format!(
                    "criterion '{}': weight {} clamped to {}",
                    criterion.id, criterion.weight, clamped
                ));
                criterion.weight = clamped;
            }
        }

        for candidate in &mut self.candidates {
            // Sorted for deterministic messages
            let mut keys: Vec<String> = candidate.scores.keys().cloned().collect();
            keys.sort();
            for key in keys {
                if let Some(value) = candidate.scores.get_mut(&key) {
                    let clamped = clamp_rating(*value);
                    if clamped != *value {
                        adjusted.push(format!(
                            "candidate {} ('{}'): score for '{}' {} clamped to {}",
                            candidate.candidate_id, candidate.candidate_name, key, value, clamped
                        ));
                        *value = clamped;
                    }
                }
            }
        }

        adjusted
    }

    pub fn ranked(&self) -> Vec<RankedCandidate<'_>> {
        rank_candidates(&self.candidates, &self.criteria)
    }

    pub fn tally(&self) -> VoteTally {
        tally_votes(&self.votes)
    }

    /// Compare the score ranking with the team's vote leader
    pub fn recommendation(&self) -> Recommendation {
        let ranked = self.ranked();
        let tally = self.tally();
        recommend(&ranked, leading_candidate(&tally))
    }
}
