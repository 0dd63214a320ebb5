use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::schema::Session;

/// Get the default session file path (~/.config/offer-bro/session.yaml)
pub fn get_session_path() -> PathBuf {
    crate::config::get_config_dir().join("session.yaml")
}

/// Pick the session file: explicit flag first, then the config entry, then the default
pub fn resolve_session_path(cli_path: Option<PathBuf>, config_path: Option<&Path>) -> PathBuf {
    cli_path
        .or_else(|| config_path.map(Path::to_path_buf))
        .unwrap_or_else(get_session_path)
}

/// Load an evaluation session from a YAML file
///
/// # Errors
///
/// Returns an error if:
/// - The session file does not exist
/// - The session file cannot be read
/// - The YAML cannot be parsed
pub fn load_session(path: &Path) -> Result<Session> {
    if !path.exists() {
        anyhow::bail!(
            "Session file not found at {}. Run `offer-bro init` to create one",
            path.display()
        );
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read session file at {}", path.display()))?;

    let session: Session = serde_saphyr::from_str(&content)
        .with_context(|| format!("Failed to parse session: invalid YAML in {}", path.display()))?;

    log::debug!(
        "Loaded session '{}' from {}: {} criteria, {} candidates, {} votes",
        session.display_name(),
        path.display(),
        session.criteria.len(),
        session.candidates.len(),
        session.votes.len()
    );

    Ok(session)
}

/// Write a session file atomically, creating parent directories as needed.
/// Only used to bootstrap a starter session; edits made in the TUI are never written back.
pub fn write_session(path: &Path, session: &Session) -> Result<()> {
    let yaml = serde_saphyr::to_string(session)
        .map_err(|e| anyhow::anyhow!("Failed to serialize session: {}", e))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    file.write_all(yaml.as_bytes())
        .with_context(|| format!("Failed to write session to {}", path.display()))?;
    file.commit().context("Failed to save session")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_load_missing_file_errors() {
        let temp_path = env::temp_dir().join("offer_bro_test_missing_session.yaml");
        let _ = fs::remove_file(&temp_path);

        let err = load_session(&temp_path).unwrap_err();
        assert!(err.to_string().contains("offer-bro init"));
    }

    #[test]
    fn test_load_invalid_yaml_errors() {
        let temp_path = env::temp_dir().join("offer_bro_test_invalid_session.yaml");
        fs::write(&temp_path, "criteria: [oops").unwrap();

        let err = load_session(&temp_path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse session"));

        let _ = fs::remove_file(&temp_path);
    }

    #[test]
    fn test_write_and_load_roundtrip() {
        let temp_dir = env::temp_dir().join("offer_bro_test_roundtrip");
        let temp_path = temp_dir.join("session.yaml");
        let _ = fs::remove_dir_all(&temp_dir);

        let names = vec!["Acme".to_string(), "Borealis".to_string()];
        let session = Session::starter(Session::default_criteria(), &names);
        write_session(&temp_path, &session).unwrap();

        let loaded = load_session(&temp_path).unwrap();
        assert_eq!(loaded, session);

        let _ = fs::remove_dir_all(&temp_dir);
    }

    #[test]
    fn test_resolve_session_path_precedence() {
        let cli = PathBuf::from("/tmp/cli.yaml");
        let cfg = PathBuf::from("/tmp/cfg.yaml");

        assert_eq!(resolve_session_path(Some(cli.clone()), Some(&cfg)), cli);
        assert_eq!(resolve_session_path(None, Some(&cfg)), cfg);
        assert_eq!(resolve_session_path(None, None), get_session_path());
    }
}
