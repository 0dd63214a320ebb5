use std::io::IsTerminal;
use chrono::{Duration, Utc};
use owo_colors::OwoColorize;
use serde::Serialize;
use terminal_size::{Width, terminal_size};

use crate::scoring::{
    best_per_criterion, leading_candidate, strengths_and_weaknesses, team_comments,
    top_two_head_to_head, CandidateId, EvaluationState, RankedCandidate, Recommendation,
    MAX_RATING,
};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format an aggregate score with two decimals ("7.25")
pub fn format_score(score: f64) -> String {
    format!("{:.2}", score)
}

/// Format a raw 0-10 cell value without a trailing ".0" ("7", "7.5")
pub fn format_cell(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

/// Horizontal bar for a 0-10 value
pub fn score_bar(score: f64, width: usize) -> String {
    let ratio = (score / MAX_RATING).clamp(0.0, 1.0);
    let filled = (ratio * width as f64).round() as usize;
    let empty = width.saturating_sub(filled);
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a name to fit available width, accounting for Unicode
pub fn truncate_name(name: &str, max_width: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_width {
        name.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Format ranked candidates as a table: Index, Score, Bar, Name
/// No headers (minimal format)
pub fn format_ranking_table(ranked: &[RankedCandidate], use_colors: bool) -> String {
    if ranked.is_empty() {
        return "No suppliers to rank.".to_string();
    }

    let term_width = get_terminal_width();
    let bar_width = 10;
    // " 1. " + "10.00 / 10" + 2 + bar + 2
    let fixed_width = 4 + 10 + 2 + bar_width + 2;

    ranked
        .iter()
        .map(|entry| {
            let index_str = format!("{:>2}.", entry.rank);
            let score_str = format!("{:>5} / 10", format_score(entry.score));
            let bar = score_bar(entry.score, bar_width);

            let name = match term_width {
                Some(width) if width > fixed_width + 10 => {
                    truncate_name(&entry.candidate.candidate_name, width - fixed_width)
                }
                Some(_) => truncate_name(&entry.candidate.candidate_name, 20),
                None => entry.candidate.candidate_name.clone(),
            };

            if use_colors {
                format!(
                    "{} {}  {}  {}",
                    index_str.dimmed(),
                    score_str.bold(),
                    bar.green(),
                    name
                )
            } else {
                format!("{} {}  {}  {}", index_str, score_str, bar, name)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format ranked candidates as tab-separated values for scripting
/// Columns: rank, score, candidate_id, name (no headers, no colors)
pub fn format_tsv(ranked: &[RankedCandidate]) -> String {
    ranked
        .iter()
        .map(|entry| {
            format!(
                "{}\t{}\t{}\t{}",
                entry.rank,
                format_score(entry.score),
                entry.candidate.candidate_id,
                entry.candidate.candidate_name
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Serialize)]
struct RankingEntry<'a> {
    rank: usize,
    candidate_id: CandidateId,
    candidate_name: &'a str,
    score: f64,
    votes: usize,
}

#[derive(Debug, Serialize)]
struct RankingReport<'a> {
    session: &'a str,
    ranking: Vec<RankingEntry<'a>>,
    total_votes: usize,
    vote_leader: Option<CandidateId>,
    recommendation: Recommendation,
}

/// Format ranking, tally and recommendation as pretty-printed JSON
pub fn format_json(session_name: &str, state: &EvaluationState) -> anyhow::Result<String> {
    let tally = state.tally();
    let report = RankingReport {
        session: session_name,
        ranking: state
            .ranked()
            .iter()
            .map(|entry| RankingEntry {
                rank: entry.rank,
                candidate_id: entry.candidate.candidate_id,
                candidate_name: &entry.candidate.candidate_name,
                score: entry.score,
                votes: tally.count(entry.candidate.candidate_id),
            })
            .collect(),
        total_votes: tally.total(),
        vote_leader: leading_candidate(&tally),
        recommendation: state.recommendation(),
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

/// Comparison matrix: one row per supplier in ranked order, one column per
/// criterion, then the weighted total. The best cell in each column is marked `*`.
pub fn format_matrix(state: &EvaluationState, use_colors: bool) -> String {
    let ranked = state.ranked();
    if ranked.is_empty() {
        return "No suppliers to compare.".to_string();
    }

    let best = best_per_criterion(&state.candidates, &state.criteria);
    let name_width = ranked
        .iter()
        .map(|r| r.candidate.candidate_name.chars().count())
        .max()
        .unwrap_or(8)
        .clamp(8, 28);
    let col_width = |name: &str| name.chars().count().clamp(6, 14);

    let mut lines = Vec::new();

    let mut header = format!("{:<width$}", "Supplier", width = name_width);
    for criterion in &state.criteria {
        let w = col_width(&criterion.name);
        header.push_str(&format!("  {:>w$}", truncate_name(&criterion.name, w), w = w + 1));
    }
    header.push_str(&format!("  {:>6}", "Total"));
    lines.push(if use_colors {
        header.bold().to_string()
    } else {
        header
    });

    for entry in &ranked {
        let mut line = format!(
            "{:<width$}",
            truncate_name(&entry.candidate.candidate_name, name_width),
            width = name_width
        );
        for criterion in &state.criteria {
            let w = col_width(&criterion.name);
            let score = entry.candidate.score_for(&criterion.id);
            let is_best = best.is_best(&criterion.id, score);
            let cell = if is_best {
                format!("{}*", format_cell(score))
            } else {
                format!("{} ", format_cell(score))
            };
            let padded = format!("  {:>w$}", cell, w = w + 1);
            if use_colors && is_best {
                line.push_str(&padded.green().to_string());
            } else {
                line.push_str(&padded);
            }
        }
        let total = format!("  {:>6}", format_score(entry.score));
        if use_colors {
            line.push_str(&total.bold().to_string());
        } else {
            line.push_str(&total);
        }
        lines.push(line);
    }

    lines.join("\n")
}

/// Strengths and weaknesses of the two top-ranked suppliers, then a head-to-head
pub fn format_comparison(state: &EvaluationState, use_colors: bool) -> String {
    let ranked = state.ranked();
    if ranked.is_empty() {
        return "No suppliers to compare.".to_string();
    }

    let mut lines = Vec::new();
    for entry in ranked.iter().take(2) {
        let sw = strengths_and_weaknesses(entry.candidate, &state.criteria, 2);
        let title = &entry.candidate.candidate_name;
        lines.push(if use_colors {
            title.bold().to_string()
        } else {
            title.clone()
        });
        lines.push("  Top strengths:".to_string());
        for s in &sw.strengths {
            lines.push(format!("    {}: {}/10", s.criterion.name, format_cell(s.score)));
        }
        lines.push("  Areas for improvement:".to_string());
        for w in &sw.weaknesses {
            lines.push(format!("    {}: {}/10", w.criterion.name, format_cell(w.score)));
        }
        lines.push(String::new());
    }

    match top_two_head_to_head(state) {
        Some(h2h) => {
            let header = format!(
                "Head-to-head: {} vs {}",
                h2h.first.candidate_name, h2h.second.candidate_name
            );
            lines.push(if use_colors {
                header.bold().to_string()
            } else {
                header
            });
            for diff in &h2h.diffs {
                let verdict = if diff.is_advantage() {
                    "advantage"
                } else {
                    "disadvantage"
                };
                let detail = format!("{:.1} point {}", diff.diff.abs(), verdict);
                let detail = if use_colors {
                    if diff.is_advantage() {
                        detail.green().to_string()
                    } else {
                        detail.red().to_string()
                    }
                } else {
                    detail
                };
                lines.push(format!(
                    "  {:<16} {:>4} vs {:<4} {}",
                    truncate_name(&diff.criterion.name, 16),
                    format_cell(diff.first),
                    format_cell(diff.second),
                    detail
                ));
            }
            lines.push(format!(
                "  Total score      {} vs {}",
                format_score(h2h.first_total),
                format_score(h2h.second_total)
            ));
        }
        None => lines.push("Head-to-head needs at least two suppliers.".to_string()),
    }

    lines.join("\n")
}

/// Vote counts per supplier (in ranked order), the leader, and team comments
pub fn format_vote_summary(state: &EvaluationState, use_colors: bool) -> String {
    let tally = state.tally();
    let leader = leading_candidate(&tally);
    let mut lines = Vec::new();

    let mut header = format!("Total votes: {}", tally.total());
    if let Some(id) = leader {
        header.push_str(&format!("  Leading: {}", state.candidate_name(id)));
    }
    lines.push(header);
    lines.push(String::new());

    for entry in state.ranked() {
        let id = entry.candidate.candidate_id;
        let votes = tally.count(id);
        let share = tally.share(id);
        let plural = if votes == 1 { "" } else { "s" };
        let bar = score_bar(share / 10.0, 10);
        let bar = if use_colors {
            if Some(id) == leader {
                bar.blue().to_string()
            } else {
                bar.dimmed().to_string()
            }
        } else {
            bar
        };
        lines.push(format!(
            "  {:<24} {} {} vote{} ({:.0}%)",
            truncate_name(&entry.candidate.candidate_name, 24),
            bar,
            votes,
            plural,
            share
        ));
    }

    lines.push(String::new());
    lines.push("Team comments:".to_string());
    let comments = team_comments(state);
    if comments.is_empty() {
        lines.push("  No comments yet.".to_string());
    }
    for comment in comments {
        let age = comment
            .vote
            .cast_at
            .map(|at| format!(" ({} ago)", format_age(Utc::now() - at)))
            .unwrap_or_default();
        let who = if use_colors {
            comment.vote.voter_name.bold().to_string()
        } else {
            comment.vote.voter_name.clone()
        };
        lines.push(format!(
            "  {} voted for {}{}: {}",
            who, comment.candidate_name, age, comment.comment
        ));
    }

    lines.join("\n")
}

/// Quantitative winner, team preference and the combined recommendation
pub fn format_decision_summary(state: &EvaluationState, use_colors: bool) -> String {
    let ranked = state.ranked();
    let tally = state.tally();
    let leader = leading_candidate(&tally);
    let mut lines = Vec::new();

    lines.push("Quantitative analysis".to_string());
    match ranked.first() {
        Some(top) => lines.push(format!(
            "  Based on weighted scoring, {} has the highest score of {}/10.",
            top.candidate.candidate_name,
            format_score(top.score)
        )),
        None => lines.push("  No suppliers are being evaluated.".to_string()),
    }

    lines.push("Team preference".to_string());
    match leader {
        Some(id) => lines.push(format!(
            "  {} is preferred by the team with {} out of {} votes.",
            state.candidate_name(id),
            tally.count(id),
            tally.total()
        )),
        None => lines.push("  No votes have been cast yet.".to_string()),
    }

    lines.push("Recommendation".to_string());
    let text = recommendation_text(state, state.recommendation());
    lines.push(format!(
        "  {}",
        if use_colors {
            text.bold().to_string()
        } else {
            text
        }
    ));

    lines.join("\n")
}

/// One-sentence rendering of a recommendation
pub fn recommendation_text(state: &EvaluationState, recommendation: Recommendation) -> String {
    match recommendation {
        Recommendation::NoCandidates => "Nothing to recommend without suppliers.".to_string(),
        Recommendation::AgreeOnTop { candidate_id } => format!(
            "Scores and team agree: go with {}.",
            state.candidate_name(candidate_id)
        ),
        Recommendation::Diverge {
            vote_leader: None, ..
        } => "No team votes yet; further discussion may be needed before deciding.".to_string(),
        Recommendation::Diverge {
            top_scored,
            vote_leader: Some(leader),
        } => format!(
            "Further discussion may be needed: scoring favours {} but the team prefers {}.",
            state.candidate_name(top_scored),
            state.candidate_name(leader)
        ),
    }
}

/// Format a duration into a human-readable age string
/// "2h" for hours, "3d" for days, "1w" for weeks
pub fn format_age(duration: Duration) -> String {
    let hours = duration.num_hours();
    let days = duration.num_days();
    let weeks = days / 7;

    if weeks >= 1 {
        format!("{}w", weeks)
    } else if days >= 1 {
        format!("{}d", days)
    } else if hours >= 1 {
        format!("{}h", hours)
    } else {
        let minutes = duration.num_minutes();
        if minutes >= 1 {
            format!("{}m", minutes)
        } else {
            "now".to_string()
        }
    }
}
