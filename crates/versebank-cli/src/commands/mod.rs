//! Command handlers

pub mod config;
pub mod db;
pub mod user;
pub mod verse;

use anyhow::Result;
use std::io::Write;

/// Ask a yes/no question on stdin; default is no
pub fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
