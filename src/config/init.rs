use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::config::{get_config_path, write_config, Config, ThemeMode, VoterConfig};
use crate::scoring::{clamp_rating, Criterion, MAX_RATING};
use crate::session::{get_session_path, write_session, Session};

/// Prompt user with a message and return their trimmed input.
fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    std::io::stdout()
        .flush()
        .context("Failed to flush stdout")?;
    let mut input = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut input)
        .context("Failed to read input")?;
    Ok(input.trim().to_string())
}

/// Prompt user with a message and a default value. Returns default if input is empty.
fn prompt_with_default(message: &str, default: &str) -> Result<String> {
    let input = prompt(&format!("{} [{}]: ", message, default))?;
    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input)
    }
}

/// Prompt user with a yes/no question. Returns bool based on input and default.
fn prompt_yes_no(message: &str, default_yes: bool) -> Result<bool> {
    let hint = if default_yes { "Y/n" } else { "y/N" };
    let input = prompt(&format!("{} [{}]: ", message, hint))?;
    let input = input.to_lowercase();
    if input.is_empty() {
        Ok(default_yes)
    } else {
        Ok(input == "y" || input == "yes")
    }
}

/// Parse a weight typed by the user. Out-of-range numbers are clamped, not rejected.
fn parse_weight(input: &str) -> Result<f64, String> {
    input
        .trim()
        .parse::<f64>()
        .map(clamp_rating)
        .map_err(|_| format!("'{}' is not a number", input.trim()))
}

/// Turn a display name into a criterion id ("Lead time" -> "lead_time")
fn slugify(name: &str) -> String {
    let mut slug = String::new();
    for c in name.trim().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('_') && !slug.is_empty() {
            slug.push('_');
        }
    }
    slug.trim_end_matches('_').to_string()
}

fn prompt_criteria() -> Result<Vec<Criterion>> {
    let defaults = Session::default_criteria();
    println!("Default criteria:");
    for criterion in &defaults {
        println!(
            "  {:<14} weight {:>2}  {}",
            criterion.name, criterion.weight, criterion.description
        );
    }
    if prompt_yes_no("Use the default criteria?", true)? {
        return Ok(defaults);
    }

    println!();
    println!("Define your criteria. Weights run from 0 (ignored) to {}.", MAX_RATING);
    let mut criteria: Vec<Criterion> = Vec::new();
    loop {
        let name = loop {
            let n = prompt("  Criterion name: ")?;
            if slugify(&n).is_empty() {
                println!("  Criterion name is required.");
                continue;
            }
            if criteria.iter().any(|c| c.id == slugify(&n)) {
                println!("  A criterion with that name already exists.");
                continue;
            }
            break n;
        };
        let description = prompt("  Description (optional): ")?;
        let weight = loop {
            let input = prompt_with_default("  Weight", "5")?;
            match parse_weight(&input) {
                Ok(w) => break w,
                Err(e) => println!("  Invalid: {}. Try again.", e),
            }
        };
        criteria.push(Criterion {
            id: slugify(&name),
            name,
            description,
            weight,
        });
        if !prompt_yes_no("  Add another criterion?", criteria.len() < 3)? {
            break;
        }
    }
    Ok(criteria)
}

fn prompt_suppliers() -> Result<Vec<String>> {
    let mut suppliers: Vec<String> = Vec::new();
    loop {
        let name = prompt("  Supplier name: ")?;
        if name.is_empty() {
            println!("  Supplier name is required.");
            continue;
        }
        suppliers.push(name);
        if !prompt_yes_no("  Add another supplier?", suppliers.len() < 2)? {
            break;
        }
    }
    Ok(suppliers)
}

/// Ask before replacing an existing file. Returns false if the user declined.
fn confirm_overwrite(path: &std::path::Path, what: &str) -> Result<bool> {
    if !path.exists() {
        return Ok(true);
    }
    prompt_yes_no(
        &format!("{} already exists at {}. Overwrite?", what, path.display()),
        false,
    )
}

/// Run the interactive init wizard to create a config file and a starter session.
///
/// If `default_path` is Some, uses that as the config file path.
/// Otherwise, prompts the user with the default config path.
pub fn run_init_wizard(default_path: Option<PathBuf>) -> Result<()> {
    println!();
    println!("Offer Bro Setup");
    println!("===============");
    println!();

    // 1. Voter identity
    let fallback = Config::default().effective_voter();
    println!("Votes you cast in the decision screen are recorded under your name.");
    let voter_name = prompt_with_default("Your name", &fallback.name)?;
    let voter = VoterConfig {
        id: slugify(&voter_name),
        name: voter_name,
    };

    // 2. Criteria
    println!();
    println!("Suppliers are compared on weighted criteria, each scored 0-10.");
    let criteria = prompt_criteria()?;

    // 3. Suppliers
    println!();
    println!("Which suppliers are you comparing? Scores start at 0 and can be filled in later.");
    let suppliers = prompt_suppliers()?;

    // 4. Paths
    let default_config_path = default_path.unwrap_or_else(get_config_path);
    println!();
    let config_path = PathBuf::from(prompt_with_default(
        "Where should the config be saved?",
        &default_config_path.display().to_string(),
    )?);
    let session_path = PathBuf::from(prompt_with_default(
        "Where should the session be saved?",
        &get_session_path().display().to_string(),
    )?);

    if !confirm_overwrite(&config_path, "Config")?
        || !confirm_overwrite(&session_path, "Session")?
    {
        println!("Aborted.");
        return Ok(());
    }

    // 5. Write files
    let session = Session::starter(criteria, &suppliers);
    write_session(&session_path, &session)?;

    let config = Config {
        voter: Some(voter),
        session: Some(session_path.clone()),
        theme: ThemeMode::Auto,
    };
    write_config(&config_path, &config)?;

    println!();
    println!("Config written to {}", config_path.display());
    println!("Session written to {}", session_path.display());
    println!("Fill in supplier scores in the session file, then run `offer-bro tui`.");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Lead time"), "lead_time");
        assert_eq!(slugify("  DFM / feedback!  "), "dfm_feedback");
        assert_eq!(slugify("Price"), "price");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn test_parse_weight_clamps() {
        assert_eq!(parse_weight("15"), Ok(10.0));
        assert_eq!(parse_weight("-3"), Ok(0.0));
        assert_eq!(parse_weight(" 7.5 "), Ok(7.5));
        assert!(parse_weight("heavy").is_err());
    }
}
