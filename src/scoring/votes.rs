use serde::Serialize;

use super::engine::RankedCandidate;
use super::model::{CandidateId, Vote};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VoteCount {
    pub candidate_id: CandidateId,
    pub votes: usize,
}

/// Votes per candidate, ordered by candidate id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VoteTally {
    counts: Vec<VoteCount>,
    total: usize,
}

impl VoteTally {
    /// Number of votes for `candidate_id` (0 if it received none)
    pub fn count(&self, candidate_id: CandidateId) -> usize {
        self.counts
            .iter()
            .find(|c| c.candidate_id == candidate_id)
            .map(|c| c.votes)
            .unwrap_or(0)
    }

    /// Total number of votes cast
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Percentage of all votes that went to `candidate_id`, 0 when nobody voted
    pub fn share(&self, candidate_id: CandidateId) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.count(candidate_id) as f64 / self.total as f64 * 100.0
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &VoteCount> {
        self.counts.iter()
    }
}

pub fn tally_votes(votes: &[Vote]) -> VoteTally {
    let mut counts: Vec<VoteCount> = Vec::new();

    for vote in votes {
        match counts
            .iter_mut()
            .find(|c| c.candidate_id == vote.preferred_candidate_id)
        {
            Some(entry) => entry.votes += 1,
            None => counts.push(VoteCount {
                candidate_id: vote.preferred_candidate_id,
                votes: 1,
            }),
        }
    }

    // Candidate ids follow the order suppliers were entered
    counts.sort_by_key(|c| c.candidate_id);

    VoteTally {
        counts,
        total: votes.len(),
    }
}

/// The candidate with the most votes.
///
/// On a tie the candidate with the lowest id wins.
/// `None` when no votes were cast.
pub fn leading_candidate(tally: &VoteTally) -> Option<CandidateId> {
    let mut leader: Option<VoteCount> = None;
    for entry in tally.iter() {
        // Strictly greater: earlier entries keep ties
        if leader.map_or(true, |l| entry.votes > l.votes) {
            leader = Some(*entry);
        }
    }
    leader.filter(|l| l.votes > 0).map(|l| l.candidate_id)
}

/// Whether the score ranking and the team vote point at the same supplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Recommendation {
    /// Nothing to rank
    NoCandidates,
    /// Top-ranked candidate is also the team's favourite
    AgreeOnTop { candidate_id: CandidateId },
    /// Scores and votes disagree, or nobody voted; needs a human call
    Diverge {
        top_scored: CandidateId,
        vote_leader: Option<CandidateId>,
    },
}

pub fn recommend(ranked: &[RankedCandidate], vote_leader: Option<CandidateId>) -> Recommendation {
    let Some(top) = ranked.first() else {
        return Recommendation::NoCandidates;
    };
    let top_scored = top.candidate.candidate_id;

    match vote_leader {
        Some(leader) if leader == top_scored => Recommendation::AgreeOnTop {
            candidate_id: top_scored,
        },
        _ => Recommendation::Diverge {
            top_scored,
            vote_leader,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::model::CandidateScore;
    use std::collections::HashMap;

    fn vote(pref: CandidateId) -> Vote {
        Vote {
            voter_id: format!("u{}", pref),
            voter_name: "Voter".to_string(),
            preferred_candidate_id: pref,
            comment: None,
            cast_at: None,
        }
    }

    fn candidate(id: CandidateId) -> CandidateScore {
        CandidateScore {
            candidate_id: id,
            candidate_name: format!("Supplier {}", id),
            scores: HashMap::new(),
        }
    }

    fn ranked(candidates: &[CandidateScore]) -> Vec<RankedCandidate<'_>> {
        candidates
            .iter()
            .enumerate()
            .map(|(i, c)| RankedCandidate {
                rank: i + 1,
                candidate: c,
                score: 0.0,
            })
            .collect()
    }

    #[test]
    fn test_tally_counts_and_leader() {
        let votes = vec![vote(1), vote(2), vote(1)];
        let tally = tally_votes(&votes);

        assert_eq!(tally.count(1), 2);
        assert_eq!(tally.count(2), 1);
        assert_eq!(tally.count(3), 0);
        assert_eq!(tally.total(), 3);
        assert_eq!(leading_candidate(&tally), Some(1));
    }

    #[test]
    fn test_tally_ordered_by_candidate_id() {
        let votes = vec![vote(3), vote(1), vote(3), vote(2)];
        let tally = tally_votes(&votes);
        let order: Vec<CandidateId> = tally.iter().map(|c| c.candidate_id).collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn test_leader_tie_goes_to_lowest_id() {
        // Vote order doesn't matter on a tie
        let votes = vec![vote(2), vote(1), vote(1), vote(2)];
        let tally = tally_votes(&votes);
        assert_eq!(leading_candidate(&tally), Some(1));

        let votes = vec![vote(1), vote(2), vote(2), vote(1)];
        let tally = tally_votes(&votes);
        assert_eq!(leading_candidate(&tally), Some(1));

        let votes = vec![vote(3), vote(2), vote(3), vote(2), vote(1)];
        let tally = tally_votes(&votes);
        assert_eq!(leading_candidate(&tally), Some(2));
    }

    #[test]
    fn test_no_votes_no_leader() {
        let tally = tally_votes(&[]);
        assert!(tally.is_empty());
        assert_eq!(leading_candidate(&tally), None);
        assert_eq!(tally.share(1), 0.0);
    }

    #[test]
    fn test_same_voter_counts_every_vote() {
        let mut second = vote(1);
        second.voter_id = "u1".to_string();
        let tally = tally_votes(&[vote(1), second]);
        assert_eq!(tally.count(1), 2);
    }

    #[test]
    fn test_share_percentages() {
        let votes = vec![vote(1), vote(2), vote(1), vote(1)];
        let tally = tally_votes(&votes);
        assert_eq!(tally.share(1), 75.0);
        assert_eq!(tally.share(2), 25.0);
        assert_eq!(tally.share(9), 0.0);
    }

    #[test]
    fn test_recommend_diverge() {
        let candidates = vec![candidate(2), candidate(3)];
        let result = recommend(&ranked(&candidates), Some(3));
        assert_eq!(
            result,
            Recommendation::Diverge {
                top_scored: 2,
                vote_leader: Some(3),
            }
        );
    }

    #[test]
    fn test_recommend_agree() {
        let candidates = vec![candidate(2), candidate(3)];
        assert_eq!(
            recommend(&ranked(&candidates), Some(2)),
            Recommendation::AgreeOnTop { candidate_id: 2 }
        );
    }

    #[test]
    fn test_recommend_without_votes_never_agrees() {
        let candidates = vec![candidate(2)];
        assert_eq!(
            recommend(&ranked(&candidates), None),
            Recommendation::Diverge {
                top_scored: 2,
                vote_leader: None,
            }
        );
    }

    #[test]
    fn test_recommend_with_all_scores_equal_uses_first_input() {
        let criteria = vec![crate::scoring::model::Criterion {
            id: "price".to_string(),
            name: "Price".to_string(),
            description: String::new(),
            weight: 5.0,
        }];
        let candidates: Vec<CandidateScore> = [1, 2, 3]
            .into_iter()
            .map(|id| CandidateScore {
                candidate_id: id,
                candidate_name: format!("Supplier {}", id),
                scores: HashMap::from([("price".to_string(), 6.0)]),
            })
            .collect();
        let ranked = crate::scoring::engine::rank_candidates(&candidates, &criteria);
        assert_eq!(ranked[0].candidate.candidate_id, 1);

        assert_eq!(
            recommend(&ranked, Some(1)),
            Recommendation::AgreeOnTop { candidate_id: 1 }
        );
        assert_eq!(
            recommend(&ranked, Some(3)),
            Recommendation::Diverge {
                top_scored: 1,
                vote_leader: Some(3),
            }
        );
    }

    #[test]
    fn test_recommend_no_candidates() {
        assert_eq!(recommend(&[], Some(1)), Recommendation::NoCandidates);
        assert_eq!(recommend(&[], None), Recommendation::NoCandidates);
    }

    #[test]
    fn test_recommendation_json_shape() {
        let json = serde_json::to_value(Recommendation::AgreeOnTop { candidate_id: 4 }).unwrap();
        assert_eq!(json["outcome"], "agree_on_top");
        assert_eq!(json["candidate_id"], 4);

        let json = serde_json::to_value(Recommendation::Diverge {
            top_scored: 2,
            vote_leader: None,
        })
        .unwrap();
        assert_eq!(json["outcome"], "diverge");
        assert!(json["vote_leader"].is_null());
    }
}
