use chrono::Utc;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Cell, Clear, Paragraph, Row, Table, Tabs, Wrap};

use crate::output::{format_age, format_score, recommendation_text, truncate_name};
use crate::scoring::{
    best_per_criterion, leading_candidate, score_breakdown, strengths_and_weaknesses,
    team_comments, top_two_head_to_head, MAX_RATING,
};
use crate::tui::app::{App, InputMode, Tab};
use crate::tui::theme::ThemeColors;

pub fn draw(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Handle very small terminal sizes gracefully
    if area.height < 8 || area.width < 40 {
        let msg = Paragraph::new("Terminal too small").alignment(Alignment::Center);
        frame.render_widget(msg, area);
        return;
    }

    // Layout: Title(1) + Tabs(1) + Body(fill) + Status(1)
    let chunks = Layout::vertical([
        Constraint::Length(1), // Title bar
        Constraint::Length(1), // Tab bar
        Constraint::Fill(1),   // Tab body
        Constraint::Length(1), // Status bar
    ])
    .split(area);

    render_title(frame, chunks[0], app);
    render_tabs(frame, chunks[1], app);
    match app.current_tab {
        Tab::Scoring => render_scoring_tab(frame, chunks[2], app),
        Tab::Comparison => render_comparison_tab(frame, chunks[2], app),
        Tab::Voting => render_voting_tab(frame, chunks[2], app),
    }
    render_status_bar(frame, chunks[3], app);

    // Render overlays based on input mode
    match app.input_mode {
        InputMode::WeightInput => render_input_popup(frame, app, " Criterion Weight (0-10) "),
        InputMode::ScoreInput => render_input_popup(frame, app, " Score (0-10) "),
        InputMode::VoteComment => render_input_popup(frame, app, " Vote Comment (optional) "),
        InputMode::Help => render_help_popup(frame, &app.theme_colors),
        InputMode::ScoreBreakdown => render_breakdown_popup(frame, app),
        InputMode::Normal => {}
    }
}

fn render_title(frame: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme_colors;
    let left = format!("Offer Bro  {}", app.session_name);
    let right = format!(
        "{} suppliers  voting as {}",
        app.state.candidates.len(),
        app.voter.name
    );
    let padding_len =
        (area.width as usize).saturating_sub(left.chars().count() + right.chars().count());

    let title = Line::from(vec![
        Span::styled(left, Style::default().fg(theme.title_color).bold()),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right, Style::default().fg(theme.muted)),
    ]);
    frame.render_widget(Paragraph::new(title), area);
}

fn render_tabs(frame: &mut Frame, area: Rect, app: &App) {
    let titles: Vec<&str> = Tab::ALL.iter().map(|t| t.title()).collect();

    let tabs = Tabs::new(titles)
        .select(app.current_tab.index())
        .style(app.theme_colors.tab_inactive_style)
        .highlight_style(app.theme_colors.tab_active_style.reversed())
        .divider(" | ");

    frame.render_widget(tabs, area);
}

/// Colored bar for a 0-10 value
fn rating_bar(value: f64, width: usize, theme: &ThemeColors) -> Vec<Span<'static>> {
    let ratio = (value / MAX_RATING).clamp(0.0, 1.0);
    let filled = (ratio * width as f64).round() as usize;
    let empty = width.saturating_sub(filled);

    let mut spans = Vec::new();
    if filled > 0 {
        spans.push(Span::styled(
            "█".repeat(filled),
            Style::default().fg(theme.score_color(value, MAX_RATING)),
        ));
    }
    if empty > 0 {
        spans.push(Span::styled(
            "░".repeat(empty),
            Style::default().fg(theme.bar_empty),
        ));
    }
    spans
}

fn cell_text(value: f64) -> String {
    crate::output::formatter::format_cell(value)
}

fn render_empty(frame: &mut Frame, area: Rect, msg: &str) {
    let empty_msg = Paragraph::new(msg.to_string())
        .alignment(Alignment::Center)
        .block(Block::default());
    frame.render_widget(empty_msg, area);
}

fn render_scoring_tab(frame: &mut Frame, area: Rect, app: &mut App) {
    if app.state.criteria.is_empty() || app.state.candidates.is_empty() {
        render_empty(frame, area, "Add criteria and suppliers to the session to start scoring");
        return;
    }

    let chunks = Layout::horizontal([Constraint::Fill(3), Constraint::Fill(2)]).split(area);
    let theme = app.theme_colors.clone();
    let best = best_per_criterion(&app.state.candidates, &app.state.criteria);

    let rows: Vec<Row> = app
        .state
        .criteria
        .iter()
        .enumerate()
        .map(|(idx, criterion)| {
            let mut cells = vec![
                Cell::from(truncate_name(&criterion.name, 20)),
                Cell::from(Line::from(
                    std::iter::once(Span::raw(format!("{:>4} ", cell_text(criterion.weight))))
                        .chain(rating_bar(criterion.weight, 5, &theme))
                        .collect::<Vec<_>>(),
                )),
            ];
            for (col, candidate) in app.state.candidates.iter().enumerate() {
                let score = candidate.score_for(&criterion.id);
                let mut style = if best.is_best(&criterion.id, score) {
                    theme.best_cell
                } else {
                    Style::default().fg(theme.score_color(score, MAX_RATING))
                };
                if col == app.selected_column {
                    style = style.patch(theme.column_selected);
                }
                cells.push(Cell::from(format!("{:>6}", cell_text(score))).style(style));
            }

            let row_style = if idx % 2 == 1 {
                Style::default().bg(theme.row_alt_bg)
            } else {
                Style::default()
            };
            Row::new(cells).style(row_style)
        })
        .collect();

    let mut header = vec![Cell::from("Criterion"), Cell::from("Weight")];
    let mut footer = vec![Cell::from("Weighted total"), Cell::from("")];
    let mut widths = vec![Constraint::Length(21), Constraint::Length(11)];
    let totals: Vec<f64> = app
        .state
        .candidates
        .iter()
        .map(|c| crate::scoring::compute_aggregate_score(c, &app.state.criteria))
        .collect();
    for (col, (candidate, total)) in app.state.candidates.iter().zip(&totals).enumerate() {
        let mut style = theme.header_style;
        if col == app.selected_column {
            style = style.patch(theme.column_selected);
        }
        header.push(Cell::from(truncate_name(&candidate.candidate_name, 10)).style(style));
        footer.push(
            Cell::from(format!("{:>6}", format_score(*total)))
                .style(Style::default().fg(theme.score_color(*total, MAX_RATING)).bold()),
        );
        widths.push(Constraint::Length(10));
    }

    let table = Table::new(rows, widths)
        .header(Row::new(header).style(theme.header_style).bottom_margin(1))
        .footer(Row::new(footer).top_margin(1))
        .row_highlight_style(theme.row_selected)
        .block(Block::bordered().title(" Scores "));

    frame.render_stateful_widget(table, chunks[0], &mut app.table_state);

    // Live ranking panel
    let lines: Vec<Line> = app
        .state
        .ranked()
        .iter()
        .map(|entry| {
            let mut spans = vec![
                Span::styled(format!("{:>2}. ", entry.rank), Style::default().fg(theme.index_color)),
                Span::styled(
                    format!("{:>5} ", format_score(entry.score)),
                    Style::default().fg(theme.score_color(entry.score, MAX_RATING)),
                ),
            ];
            spans.extend(rating_bar(entry.score, 10, &theme));
            spans.push(Span::raw(format!(
                " {}",
                truncate_name(&entry.candidate.candidate_name, 24)
            )));
            Line::from(spans)
        })
        .collect();
    frame.render_widget(
        Paragraph::new(lines).block(Block::bordered().title(" Ranking ")),
        chunks[1],
    );
}

fn render_comparison_tab(frame: &mut Frame, area: Rect, app: &mut App) {
    if app.state.candidates.is_empty() {
        render_empty(frame, area, "No suppliers to compare");
        return;
    }

    let theme = app.theme_colors.clone();
    let chunks = Layout::vertical([Constraint::Fill(1), Constraint::Fill(1)]).split(area);
    let ranked = app.state.ranked();
    let best = best_per_criterion(&app.state.candidates, &app.state.criteria);

    let rows: Vec<Row> = ranked
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let mut cells = vec![
                Cell::from(format!("{}.", entry.rank)).style(Style::default().fg(theme.index_color)),
                Cell::from(truncate_name(&entry.candidate.candidate_name, 20)),
            ];
            for criterion in &app.state.criteria {
                let score = entry.candidate.score_for(&criterion.id);
                let style = if best.is_best(&criterion.id, score) {
                    theme.best_cell
                } else {
                    Style::default()
                };
                cells.push(Cell::from(format!("{:>5}", cell_text(score))).style(style));
            }
            cells.push(
                Cell::from(format!("{:>6}", format_score(entry.score)))
                    .style(Style::default().fg(theme.score_color(entry.score, MAX_RATING)).bold()),
            );

            let row_style = if idx % 2 == 1 {
                Style::default().bg(theme.row_alt_bg)
            } else {
                Style::default()
            };
            Row::new(cells).style(row_style)
        })
        .collect();

    let mut header = vec![Cell::from("#"), Cell::from("Supplier")];
    let mut widths = vec![Constraint::Length(4), Constraint::Length(21)];
    for criterion in &app.state.criteria {
        header.push(Cell::from(truncate_name(&criterion.name, 8)));
        widths.push(Constraint::Length(9));
    }
    header.push(Cell::from("Total"));
    widths.push(Constraint::Length(7));

    let table = Table::new(rows, widths)
        .header(Row::new(header).style(theme.header_style).bottom_margin(1))
        .row_highlight_style(theme.row_selected)
        .block(Block::bordered().title(" Comparison Matrix (best per criterion highlighted) "));

    let selected = app.table_state.selected().and_then(|i| ranked.get(i));
    let detail_chunks =
        Layout::horizontal([Constraint::Fill(1), Constraint::Fill(1)]).split(chunks[1]);

    // Strengths and weaknesses of the selected supplier
    let mut sw_lines = Vec::new();
    let sw_title = match selected {
        Some(entry) => {
            let sw = strengths_and_weaknesses(entry.candidate, &app.state.criteria, 2);
            sw_lines.push(Line::from(Span::styled(
                "Top strengths",
                Style::default().fg(theme.advantage).bold(),
            )));
            for s in &sw.strengths {
                sw_lines.push(Line::from(format!("  {}: {}/10", s.criterion.name, cell_text(s.score))));
            }
            sw_lines.push(Line::from(""));
            sw_lines.push(Line::from(Span::styled(
                "Areas for improvement",
                Style::default().fg(theme.disadvantage).bold(),
            )));
            for w in &sw.weaknesses {
                sw_lines.push(Line::from(format!("  {}: {}/10", w.criterion.name, cell_text(w.score))));
            }
            format!(" {} ", entry.candidate.candidate_name)
        }
        None => " Supplier ".to_string(),
    };

    // Head-to-head of the top two
    let mut h2h_lines = Vec::new();
    let h2h_title = match top_two_head_to_head(&app.state) {
        Some(h2h) => {
            for diff in &h2h.diffs {
                let (verdict, color) = if diff.is_advantage() {
                    ("advantage", theme.advantage)
                } else {
                    ("disadvantage", theme.disadvantage)
                };
                h2h_lines.push(Line::from(vec![
                    Span::raw(format!(
                        "{:<14} {:>4} vs {:<4} ",
                        truncate_name(&diff.criterion.name, 14),
                        cell_text(diff.first),
                        cell_text(diff.second)
                    )),
                    Span::styled(
                        format!("{:.1} point {}", diff.diff.abs(), verdict),
                        Style::default().fg(color),
                    ),
                ]));
            }
            h2h_lines.push(Line::from(""));
            h2h_lines.push(Line::from(Span::styled(
                format!(
                    "Total score    {} vs {}",
                    format_score(h2h.first_total),
                    format_score(h2h.second_total)
                ),
                Style::default().bold(),
            )));
            format!(
                " {} vs {} ",
                truncate_name(&h2h.first.candidate_name, 16),
                truncate_name(&h2h.second.candidate_name, 16)
            )
        }
        None => {
            h2h_lines.push(Line::from(Span::styled(
                "Head-to-head needs at least two suppliers",
                Style::default().fg(theme.muted),
            )));
            " Head-to-head ".to_string()
        }
    };

    frame.render_widget(
        Paragraph::new(sw_lines).block(Block::bordered().title(sw_title)),
        detail_chunks[0],
    );
    frame.render_widget(
        Paragraph::new(h2h_lines).block(Block::bordered().title(h2h_title)),
        detail_chunks[1],
    );

    frame.render_stateful_widget(table, chunks[0], &mut app.table_state);
}

fn render_voting_tab(frame: &mut Frame, area: Rect, app: &mut App) {
    if app.state.candidates.is_empty() {
        render_empty(frame, area, "No suppliers to vote on");
        return;
    }

    let theme = app.theme_colors.clone();
    let chunks = Layout::horizontal([Constraint::Fill(1), Constraint::Fill(1)]).split(area);
    let tally = app.state.tally();
    let leader = leading_candidate(&tally);

    let rows: Vec<Row> = app
        .state
        .ranked()
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let id = entry.candidate.candidate_id;
            let share = tally.share(id);
            let mut share_spans = rating_bar(share / 10.0, 10, &theme);
            share_spans.push(Span::raw(format!(" {:>3.0}%", share)));

            let name_style = if Some(id) == leader {
                Style::default().bold()
            } else {
                Style::default()
            };
            let row_style = if idx % 2 == 1 {
                Style::default().bg(theme.row_alt_bg)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(format!("{}.", entry.rank)).style(Style::default().fg(theme.index_color)),
                Cell::from(truncate_name(&entry.candidate.candidate_name, 20)).style(name_style),
                Cell::from(format_score(entry.score))
                    .style(Style::default().fg(theme.score_color(entry.score, MAX_RATING))),
                Cell::from(format!("{:>3}", tally.count(id))),
                Cell::from(Line::from(share_spans)),
            ])
            .style(row_style)
        })
        .collect();

    let widths = [
        Constraint::Length(4),  // Rank
        Constraint::Fill(1),    // Supplier
        Constraint::Length(6),  // Score
        Constraint::Length(5),  // Votes
        Constraint::Length(16), // Share bar
    ];
    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["#", "Supplier", "Score", "Votes", "Share"])
                .style(theme.header_style)
                .bottom_margin(1),
        )
        .row_highlight_style(theme.row_selected)
        .block(Block::bordered().title(format!(" Team Votes ({}) ", tally.total())));

    frame.render_stateful_widget(table, chunks[0], &mut app.table_state);

    let right = Layout::vertical([Constraint::Length(11), Constraint::Fill(1)]).split(chunks[1]);
    render_decision_summary(frame, right[0], app, &theme);
    render_comments(frame, right[1], app, &theme);
}

fn render_decision_summary(frame: &mut Frame, area: Rect, app: &App, theme: &ThemeColors) {
    let state = &app.state;
    let ranked = state.ranked();
    let tally = state.tally();
    let heading = |text: &'static str| {
        Line::from(Span::styled(text, Style::default().fg(theme.title_color).bold()))
    };

    let mut lines = vec![heading("Quantitative analysis")];
    lines.push(Line::from(match ranked.first() {
        Some(top) => format!(
            "{} has the highest weighted score of {}/10.",
            top.candidate.candidate_name,
            format_score(top.score)
        ),
        None => "No suppliers are being evaluated.".to_string(),
    }));
    lines.push(heading("Team preference"));
    lines.push(Line::from(match leading_candidate(&tally) {
        Some(id) => format!(
            "{} is preferred with {} out of {} votes.",
            state.candidate_name(id),
            tally.count(id),
            tally.total()
        ),
        None => "No votes have been cast yet.".to_string(),
    }));
    lines.push(heading("Recommendation"));
    lines.push(Line::from(Span::styled(
        recommendation_text(state, state.recommendation()),
        Style::default().bold(),
    )));

    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(Block::bordered().title(" Decision Summary ")),
        area,
    );
}

fn render_comments(frame: &mut Frame, area: Rect, app: &App, theme: &ThemeColors) {
    let comments = team_comments(&app.state);
    let mut lines = Vec::new();
    if comments.is_empty() {
        lines.push(Line::from(Span::styled(
            "No comments yet. Press v to vote.",
            Style::default().fg(theme.muted),
        )));
    }
    // Newest first
    for comment in comments.iter().rev() {
        let age = comment
            .vote
            .cast_at
            .map(|at| format!(" {} ago", format_age(Utc::now() - at)))
            .unwrap_or_default();
        lines.push(Line::from(vec![
            Span::styled(comment.vote.voter_name.clone(), Style::default().bold()),
            Span::styled(
                format!(" voted for {}{}", comment.candidate_name, age),
                Style::default().fg(theme.muted),
            ),
        ]));
        lines.push(Line::from(format!("  {}", comment.comment)));
    }

    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::bordered().title(" Team Comments ")),
        area,
    );
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme_colors;
    let text = if let Some((ref msg, _)) = app.flash_message {
        // Show flash message with color based on message type
        let msg_color = if msg.starts_with("Invalid") || msg.contains("clamped") {
            theme.flash_error
        } else if msg.starts_with("Voted") || msg.contains(" set to ") || msg.starts_with("Undid") {
            theme.flash_success
        } else {
            Color::White // Default for unknown message types
        };
        Line::from(Span::styled(msg.clone(), Style::default().fg(msg_color)))
    } else {
        let hints: Vec<(&str, &str)> = match app.current_tab {
            Tab::Scoring => vec![
                ("j/k", ":criterion "),
                ("h/l", ":supplier "),
                ("w", ":weight "),
                ("+/-", ":nudge "),
                ("e", ":score "),
                ("z", ":undo "),
            ],
            Tab::Comparison => vec![("j/k", ":nav "), ("b", ":breakdown ")],
            Tab::Voting => vec![("j/k", ":nav "), ("v", ":vote ")],
        };

        let mut spans = Vec::new();
        for (key, label) in hints
            .into_iter()
            .chain([("Tab", ":next tab "), ("?", ":help "), ("q", ":quit")])
        {
            spans.push(Span::styled(key, Style::default().fg(theme.status_key_color)));
            spans.push(Span::raw(label));
        }
        Line::from(spans)
    };

    frame.render_widget(
        Paragraph::new(text).style(Style::default().bg(theme.status_bar_bg)),
        area,
    );
}

/// Render a single-line text input popup
fn render_input_popup(frame: &mut Frame, app: &App, title: &str) {
    let popup_area = centered_rect_fixed(50, 5, frame.area());

    // Clear the background
    frame.render_widget(Clear, popup_area);

    let block = Block::bordered()
        .title(title.to_string())
        .title_style(app.theme_colors.popup_title)
        .border_style(Style::default().fg(app.theme_colors.popup_border));
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let chunks = Layout::vertical([
        Constraint::Length(1), // Input line
        Constraint::Length(1), // Spacer
        Constraint::Length(1), // Help text
    ])
    .split(inner);

    // Render input with cursor
    frame.render_widget(Paragraph::new(format!("{}|", app.input_buffer)), chunks[0]);

    let help = Paragraph::new("Enter: confirm | Esc: cancel")
        .style(Style::default().fg(app.theme_colors.muted));
    frame.render_widget(help, chunks[2]);
}

/// Create a centered rectangle with fixed width and height
fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    // Clamp dimensions to area bounds
    let width = width.min(area.width);
    let height = height.min(area.height);

    // Calculate centered position
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;

    Rect {
        x,
        y,
        width,
        height,
    }
}

/// Render the help overlay popup
fn render_help_popup(frame: &mut Frame, theme: &ThemeColors) {
    let popup_area = centered_rect_fixed(52, 19, frame.area());
    frame.render_widget(Clear, popup_area);

    let block = Block::bordered()
        .title(" Keyboard Shortcuts ")
        .title_style(theme.popup_title)
        .border_style(Style::default().fg(theme.popup_border));
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let key_style = Style::default().fg(theme.status_key_color).bold();
    let entries = [
        ("j / Down      ", "Next row"),
        ("k / Up        ", "Previous row"),
        ("h / l         ", "Previous / next supplier column"),
        ("Tab / 1-3     ", "Switch tab"),
        ("w             ", "Edit criterion weight"),
        ("+ / -         ", "Nudge criterion weight by 1"),
        ("e / Enter     ", "Edit selected score"),
        ("v             ", "Vote for selected supplier"),
        ("b             ", "Score breakdown"),
        ("z             ", "Undo last weight or score edit"),
        ("?             ", "Show/hide this help"),
        ("q / Ctrl-c    ", "Quit (edits are not saved)"),
    ];
    let mut help_lines: Vec<Line> = entries
        .iter()
        .map(|(key, desc)| Line::from(vec![Span::styled(*key, key_style), Span::raw(*desc)]))
        .collect();
    help_lines.push(Line::from(""));
    help_lines.push(Line::from(Span::styled(
        "Press any key to close",
        Style::default().fg(theme.muted),
    )));

    frame.render_widget(Paragraph::new(help_lines), inner);
}

/// Render the per-criterion contribution breakdown for one supplier
fn render_breakdown_popup(frame: &mut Frame, app: &App) {
    let Some(candidate) = app.breakdown_candidate() else {
        return;
    };
    let theme = &app.theme_colors;
    let result = score_breakdown(candidate, &app.state.criteria);

    let height = (result.breakdown.contributions.len() as u16).saturating_add(7);
    let popup_area = centered_rect_fixed(64, height, frame.area());
    frame.render_widget(Clear, popup_area);

    let block = Block::bordered()
        .title(format!(" Score Breakdown: {} ", candidate.candidate_name))
        .title_style(theme.popup_title)
        .border_style(Style::default().fg(theme.popup_border));
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let mut lines = vec![Line::from(Span::styled(
        format!(
            "{:<18} {:>5} {:>6} {:>8} {:>6}",
            "Criterion", "Score", "Weight", "Weighted", "Share"
        ),
        theme.header_style,
    ))];
    for c in &result.breakdown.contributions {
        lines.push(Line::from(format!(
            "{:<18} {:>5} {:>6} {:>8.1} {:>5.0}%",
            truncate_name(&c.label, 18),
            cell_text(c.score),
            cell_text(c.weight),
            c.weighted,
            c.weight_share * 100.0
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!(
            "Weighted average: {}/10 (total weight {})",
            format_score(result.score),
            cell_text(result.breakdown.total_weight)
        ),
        Style::default().fg(theme.score_color(result.score, MAX_RATING)).bold(),
    )));
    lines.push(Line::from(Span::styled(
        "Esc/b: close",
        Style::default().fg(theme.muted),
    )));

    frame.render_widget(Paragraph::new(lines), inner);
}
