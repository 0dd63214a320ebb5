use crate::config::VoterConfig;
use crate::scoring::{CandidateId, CandidateScore, Criterion, EvaluationState, Vote};
use crate::tui::theme::ThemeColors;
use chrono::Utc;
use std::collections::VecDeque;
use std::time::Instant;

const MAX_UNDO: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Scoring,
    Comparison,
    Voting,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Scoring, Tab::Comparison, Tab::Voting];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Scoring => "Weighted Scoring",
            Tab::Comparison => "Comparison Matrix",
            Tab::Voting => "Team Voting",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Tab::Scoring => 0,
            Tab::Comparison => 1,
            Tab::Voting => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputMode {
    Normal,
    WeightInput,
    ScoreInput,
    VoteComment,
    Help,
    ScoreBreakdown,
}

/// Edits that can be undone. Votes are append-only and never appear here.
#[derive(Debug, Clone, PartialEq)]
pub enum UndoAction {
    Weight {
        criterion_id: String,
        previous: f64,
    },
    Score {
        candidate_id: CandidateId,
        criterion_id: String,
        previous: f64,
    },
}

pub struct App {
    pub session_name: String,
    /// Owned evaluation state; scoring is re-derived from it on every draw
    pub state: EvaluationState,
    pub voter: VoterConfig,
    pub current_tab: Tab,
    pub table_state: ratatui::widgets::TableState,
    /// Candidate column selected on the scoring tab (input order)
    pub selected_column: usize,
    pub input_mode: InputMode,
    pub input_buffer: String,
    pub flash_message: Option<(String, Instant)>,
    pub undo_stack: VecDeque<UndoAction>,
    pub should_quit: bool,
    pub theme_colors: ThemeColors,
}

impl App {
    pub fn new(
        session_name: String,
        state: EvaluationState,
        voter: VoterConfig,
        theme_colors: ThemeColors,
    ) -> Self {
        let mut table_state = ratatui::widgets::TableState::default();
        if !state.criteria.is_empty() {
            table_state.select(Some(0));
        }

        Self {
            session_name,
            state,
            voter,
            current_tab: Tab::Scoring,
            table_state,
            selected_column: 0,
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            flash_message: None,
            undo_stack: VecDeque::new(),
            should_quit: false,
            theme_colors,
        }
    }

    /// Number of selectable rows on the current tab
    pub fn row_count(&self) -> usize {
        match self.current_tab {
            Tab::Scoring => self.state.criteria.len(),
            Tab::Comparison | Tab::Voting => self.state.candidates.len(),
        }
    }

    pub fn next_row(&mut self) {
        let len = self.row_count();
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) => {
                if i >= len - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn previous_row(&mut self) {
        let len = self.row_count();
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) => {
                if i == 0 {
                    len - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn next_column(&mut self) {
        let len = self.state.candidates.len();
        if len > 0 {
            self.selected_column = (self.selected_column + 1) % len;
        }
    }

    pub fn previous_column(&mut self) {
        let len = self.state.candidates.len();
        if len > 0 {
            self.selected_column = (self.selected_column + len - 1) % len;
        }
    }

    /// Cycle Scoring -> Comparison -> Voting
    pub fn next_tab(&mut self) {
        self.select_tab(match self.current_tab {
            Tab::Scoring => Tab::Comparison,
            Tab::Comparison => Tab::Voting,
            Tab::Voting => Tab::Scoring,
        });
    }

    pub fn select_tab(&mut self, tab: Tab) {
        self.current_tab = tab;
        // Reset selection to first item in the new tab, or None if empty
        if self.row_count() == 0 {
            self.table_state.select(None);
        } else {
            self.table_state.select(Some(0));
        }
    }

    /// Criterion under the cursor on the scoring tab
    pub fn selected_criterion(&self) -> Option<&Criterion> {
        if self.current_tab != Tab::Scoring {
            return None;
        }
        self.table_state
            .selected()
            .and_then(|i| self.state.criteria.get(i))
    }

    /// Candidate whose score column is selected on the scoring tab
    pub fn selected_column_candidate(&self) -> Option<&CandidateScore> {
        self.state.candidates.get(self.selected_column)
    }

    /// Candidate under the cursor on the comparison and voting tabs (ranked order)
    pub fn selected_ranked_candidate(&self) -> Option<CandidateId> {
        if self.current_tab == Tab::Scoring {
            return None;
        }
        let ranked = self.state.ranked();
        self.table_state
            .selected()
            .and_then(|i| ranked.get(i).map(|r| r.candidate.candidate_id))
    }

    pub fn push_undo(&mut self, action: UndoAction) {
        self.undo_stack.push_front(action);
        if self.undo_stack.len() > MAX_UNDO {
            self.undo_stack.pop_back();
        }
    }

    pub fn update_flash(&mut self) {
        if let Some((_, timestamp)) = self.flash_message {
            if timestamp.elapsed().as_secs() >= 3 {
                self.flash_message = None;
            }
        }
    }

    pub fn show_flash(&mut self, msg: String) {
        self.flash_message = Some((msg, Instant::now()));
    }

    /// Start editing the selected criterion's weight
    pub fn start_weight_input(&mut self) {
        if let Some(weight) = self.selected_criterion().map(|c| c.weight) {
            self.input_mode = InputMode::WeightInput;
            self.input_buffer = format!("{}", weight);
        }
    }

    /// Start editing the selected score cell
    pub fn start_score_input(&mut self) {
        let current = match (self.selected_criterion(), self.selected_column_candidate()) {
            (Some(criterion), Some(candidate)) => candidate.score_for(&criterion.id),
            _ => return,
        };
        self.input_mode = InputMode::ScoreInput;
        self.input_buffer = format!("{}", current);
    }

    /// Start writing a vote comment for the selected supplier
    pub fn start_vote_input(&mut self) {
        if self.current_tab == Tab::Voting && self.selected_ranked_candidate().is_some() {
            self.input_mode = InputMode::VoteComment;
            self.input_buffer.clear();
        }
    }

    pub fn cancel_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input_buffer.clear();
    }

    /// Confirm whichever input popup is open
    pub fn confirm_input(&mut self) {
        let input = std::mem::take(&mut self.input_buffer);
        let mode = std::mem::replace(&mut self.input_mode, InputMode::Normal);

        match mode {
            InputMode::WeightInput => {
                if let Some(value) = self.parse_number(&input) {
                    if let Some(id) = self.selected_criterion().map(|c| c.id.clone()) {
                        self.set_weight(&id, value);
                    }
                }
            }
            InputMode::ScoreInput => {
                if let Some(value) = self.parse_number(&input) {
                    let target = match (self.selected_criterion(), self.selected_column_candidate()) {
                        (Some(criterion), Some(candidate)) => {
                            Some((candidate.candidate_id, criterion.id.clone()))
                        }
                        _ => None,
                    };
                    if let Some((candidate_id, criterion_id)) = target {
                        self.set_score(candidate_id, &criterion_id, value);
                    }
                }
            }
            InputMode::VoteComment => self.cast_vote(&input),
            _ => {}
        }
    }

    fn parse_number(&mut self, input: &str) -> Option<f64> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return None;
        }
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => Some(value),
            _ => {
                self.show_flash(format!("Invalid number: '{}'", trimmed));
                None
            }
        }
    }

    /// Set a criterion weight (clamped) and record it for undo
    pub fn set_weight(&mut self, criterion_id: &str, value: f64) {
        let Some(previous) = self.state.criterion(criterion_id).map(|c| c.weight) else {
            return;
        };
        self.state.update_criterion_weight(criterion_id, value);
        let stored = self.state.criterion(criterion_id).map(|c| c.weight).unwrap_or(previous);

        if stored != previous {
            self.push_undo(UndoAction::Weight {
                criterion_id: criterion_id.to_string(),
                previous,
            });
        }
        let name = self
            .state
            .criterion(criterion_id)
            .map(|c| c.name.clone())
            .unwrap_or_default();
        if stored != value {
            self.show_flash(format!("Weight for {} clamped to {} (z to undo)", name, stored));
        } else {
            self.show_flash(format!("Weight for {} set to {} (z to undo)", name, stored));
        }
    }

    /// Nudge the selected criterion's weight by `delta`
    pub fn nudge_weight(&mut self, delta: f64) {
        if let Some((id, weight)) = self.selected_criterion().map(|c| (c.id.clone(), c.weight)) {
            self.set_weight(&id, weight + delta);
        }
    }

    /// Set a score cell (clamped) and record it for undo
    pub fn set_score(&mut self, candidate_id: CandidateId, criterion_id: &str, value: f64) {
        let Some(previous) = self
            .state
            .candidate(candidate_id)
            .map(|c| c.score_for(criterion_id))
        else {
            return;
        };
        if !self
            .state
            .update_candidate_score(candidate_id, criterion_id, value)
        {
            return;
        }
        let stored = self
            .state
            .candidate(candidate_id)
            .map(|c| c.score_for(criterion_id))
            .unwrap_or(previous);

        if stored != previous {
            self.push_undo(UndoAction::Score {
                candidate_id,
                criterion_id: criterion_id.to_string(),
                previous,
            });
        }
        let supplier = self.state.candidate_name(candidate_id).to_string();
        if stored != value {
            self.show_flash(format!("Score for {} clamped to {} (z to undo)", supplier, stored));
        } else {
            self.show_flash(format!("Score for {} set to {} (z to undo)", supplier, stored));
        }
    }

    /// Cast a vote for the selected supplier as the configured voter
    pub fn cast_vote(&mut self, comment: &str) {
        let Some(candidate_id) = self.selected_ranked_candidate() else {
            return;
        };
        let comment = comment.trim();
        self.state.cast_vote(Vote {
            voter_id: self.voter.id.clone(),
            voter_name: self.voter.name.clone(),
            preferred_candidate_id: candidate_id,
            comment: if comment.is_empty() {
                None
            } else {
                Some(comment.to_string())
            },
            cast_at: Some(Utc::now()),
        });
        log::debug!("{} voted for candidate {}", self.voter.name, candidate_id);
        let name = self.state.candidate_name(candidate_id).to_string();
        self.show_flash(format!("Voted for {}", name));
    }

    /// Undo the last weight or score edit
    pub fn undo_last(&mut self) {
        let action = match self.undo_stack.pop_front() {
            Some(action) => action,
            None => {
                self.show_flash("Nothing to undo".to_string());
                return;
            }
        };

        match action {
            UndoAction::Weight {
                criterion_id,
                previous,
            } => {
                self.state.update_criterion_weight(&criterion_id, previous);
                self.show_flash(format!("Undid weight change: {}", criterion_id));
            }
            UndoAction::Score {
                candidate_id,
                criterion_id,
                previous,
            } => {
                self.state
                    .update_candidate_score(candidate_id, &criterion_id, previous);
                let name = self.state.candidate_name(candidate_id).to_string();
                self.show_flash(format!("Undid score change: {} / {}", name, criterion_id));
            }
        }
    }

    /// Show help overlay
    pub fn show_help(&mut self) {
        self.input_mode = InputMode::Help;
    }

    /// Dismiss help overlay
    pub fn dismiss_help(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    /// Show score breakdown overlay for the selected supplier
    pub fn show_score_breakdown(&mut self) {
        if self.breakdown_candidate().is_some() {
            self.input_mode = InputMode::ScoreBreakdown;
        }
    }

    /// Dismiss score breakdown overlay
    pub fn dismiss_score_breakdown(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    /// Supplier the breakdown overlay describes: the selected column on the
    /// scoring tab, the selected row elsewhere
    pub fn breakdown_candidate(&self) -> Option<&CandidateScore> {
        match self.current_tab {
            Tab::Scoring => self.selected_column_candidate(),
            _ => self
                .selected_ranked_candidate()
                .and_then(|id| self.state.candidate(id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::Recommendation;
    use std::collections::HashMap;

    fn test_app() -> App {
        let criterion = |id: &str, weight: f64| Criterion {
            id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
            weight,
        };
        let candidate = |id: u32, price: f64| CandidateScore {
            candidate_id: id,
            candidate_name: format!("Supplier {}", id),
            scores: HashMap::from([("price".to_string(), price)]),
        };
        let state = EvaluationState::new(
            vec![criterion("price", 5.0), criterion("quality", 5.0)],
            vec![candidate(1, 4.0), candidate(2, 8.0), candidate(3, 6.0)],
            vec![],
        );
        App::new(
            "RFQ".to_string(),
            state,
            VoterConfig {
                id: "dana".to_string(),
                name: "Dana".to_string(),
            },
            ThemeColors::dark(),
        )
    }

    fn type_input(app: &mut App, text: &str) {
        app.input_buffer = text.to_string();
        app.confirm_input();
    }

    #[test]
    fn test_row_navigation_wraps() {
        let mut app = test_app();
        assert_eq!(app.table_state.selected(), Some(0));
        app.next_row();
        assert_eq!(app.table_state.selected(), Some(1));
        app.next_row();
        assert_eq!(app.table_state.selected(), Some(0));
        app.previous_row();
        assert_eq!(app.table_state.selected(), Some(1));
    }

    #[test]
    fn test_column_navigation_wraps() {
        let mut app = test_app();
        app.previous_column();
        assert_eq!(app.selected_column, 2);
        app.next_column();
        assert_eq!(app.selected_column, 0);
    }

    #[test]
    fn test_tab_cycle_resets_selection() {
        let mut app = test_app();
        app.next_row();
        app.next_tab();
        assert_eq!(app.current_tab, Tab::Comparison);
        assert_eq!(app.table_state.selected(), Some(0));
        app.next_tab();
        app.next_tab();
        assert_eq!(app.current_tab, Tab::Scoring);
    }

    #[test]
    fn test_weight_input_clamps_and_undoes() {
        let mut app = test_app();
        app.start_weight_input();
        assert_eq!(app.input_mode, InputMode::WeightInput);
        assert_eq!(app.input_buffer, "5");

        type_input(&mut app, "15");
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.state.criterion("price").unwrap().weight, 10.0);
        assert!(app.flash_message.as_ref().unwrap().0.contains("clamped to 10"));

        app.undo_last();
        assert_eq!(app.state.criterion("price").unwrap().weight, 5.0);
        assert!(app.undo_stack.is_empty());
    }

    #[test]
    fn test_invalid_number_leaves_state() {
        let mut app = test_app();
        app.start_weight_input();
        type_input(&mut app, "heavy");
        assert_eq!(app.state.criterion("price").unwrap().weight, 5.0);
        assert!(app.flash_message.as_ref().unwrap().0.starts_with("Invalid number"));
        assert!(app.undo_stack.is_empty());
    }

    #[test]
    fn test_score_input_targets_selected_cell() {
        let mut app = test_app();
        app.next_row(); // quality
        app.next_column(); // Supplier 2
        app.start_score_input();
        assert_eq!(app.input_buffer, "0");
        type_input(&mut app, "9");

        assert_eq!(app.state.candidate(2).unwrap().score_for("quality"), 9.0);
        assert_eq!(app.undo_stack.len(), 1);

        app.undo_last();
        assert_eq!(app.state.candidate(2).unwrap().score_for("quality"), 0.0);
    }

    #[test]
    fn test_nudge_weight_saturates() {
        let mut app = test_app();
        for _ in 0..8 {
            app.nudge_weight(1.0);
        }
        assert_eq!(app.state.criterion("price").unwrap().weight, 10.0);
        // Only the five real changes are undoable
        assert_eq!(app.undo_stack.len(), 5);
    }

    #[test]
    fn test_edit_reranks_immediately() {
        let mut app = test_app();
        assert_eq!(app.state.ranked()[0].candidate.candidate_id, 2);
        app.set_score(1, "price", 10.0);
        assert_eq!(app.state.ranked()[0].candidate.candidate_id, 1);
    }

    #[test]
    fn test_vote_casts_for_ranked_selection() {
        let mut app = test_app();
        app.select_tab(Tab::Voting);
        app.next_row(); // second in ranking: Supplier 3 (6.0)
        app.start_vote_input();
        assert_eq!(app.input_mode, InputMode::VoteComment);
        type_input(&mut app, "  Solid capacity  ");

        assert_eq!(app.state.votes.len(), 1);
        let vote = &app.state.votes[0];
        assert_eq!(vote.preferred_candidate_id, 3);
        assert_eq!(vote.voter_name, "Dana");
        assert_eq!(vote.comment.as_deref(), Some("Solid capacity"));
        assert!(vote.cast_at.is_some());

        assert_eq!(
            app.state.recommendation(),
            Recommendation::Diverge {
                top_scored: 2,
                vote_leader: Some(3),
            }
        );
    }

    #[test]
    fn test_vote_without_comment() {
        let mut app = test_app();
        app.select_tab(Tab::Voting);
        app.start_vote_input();
        type_input(&mut app, "");
        assert_eq!(app.state.votes.len(), 1);
        assert!(app.state.votes[0].comment.is_none());
    }

    #[test]
    fn test_vote_input_only_on_voting_tab() {
        let mut app = test_app();
        app.start_vote_input();
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn test_votes_not_undoable() {
        let mut app = test_app();
        app.select_tab(Tab::Voting);
        app.cast_vote("");
        app.undo_last();
        assert_eq!(app.state.votes.len(), 1);
        assert_eq!(app.flash_message.as_ref().unwrap().0, "Nothing to undo");
    }

    #[test]
    fn test_cancel_input() {
        let mut app = test_app();
        app.start_weight_input();
        app.input_buffer.push('7');
        app.cancel_input();
        assert_eq!(app.input_mode, InputMode::Normal);
        assert!(app.input_buffer.is_empty());
        assert_eq!(app.state.criterion("price").unwrap().weight, 5.0);
    }

    #[test]
    fn test_breakdown_candidate_per_tab() {
        let mut app = test_app();
        app.next_column();
        assert_eq!(app.breakdown_candidate().unwrap().candidate_id, 2);

        app.select_tab(Tab::Comparison);
        app.next_row();
        app.next_row();
        // Ranking: 2 (8), 3 (6), 1 (4)
        assert_eq!(app.breakdown_candidate().unwrap().candidate_id, 1);
        app.show_score_breakdown();
        assert_eq!(app.input_mode, InputMode::ScoreBreakdown);
    }

    #[test]
    fn test_undo_stack_bounded() {
        let mut app = test_app();
        for i in 0..(MAX_UNDO + 10) {
            app.push_undo(UndoAction::Weight {
                criterion_id: "price".to_string(),
                previous: i as f64,
            });
        }
        assert_eq!(app.undo_stack.len(), MAX_UNDO);
    }
}
