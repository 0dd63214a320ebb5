use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Who votes are attributed to when cast from the TUI
    #[serde(default)]
    pub voter: Option<VoterConfig>,
    /// Session file used when `--session` is not given
    #[serde(default)]
    pub session: Option<PathBuf>,
    #[serde(default)]
    pub theme: ThemeMode,
}

impl Config {
    /// Voter identity, falling back to the login name
    pub fn effective_voter(&self) -> VoterConfig {
        self.voter.clone().unwrap_or_else(|| {
            let login = std::env::var("USER")
                .or_else(|_| std::env::var("USERNAME"))
                .unwrap_or_else(|_| "me".to_string());
            VoterConfig {
                id: login.clone(),
                name: login,
            }
        })
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct VoterConfig {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Auto,
    Dark,
    Light,
}
