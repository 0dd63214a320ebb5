pub mod formatter;

pub use formatter::{
    format_age, format_comparison, format_decision_summary, format_json, format_matrix,
    format_ranking_table, format_score, format_tsv, format_vote_summary, recommendation_text,
    score_bar, should_use_colors, truncate_name,
};
