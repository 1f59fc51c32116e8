//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use versebank_core::{User, Verse};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Whether destructive commands should ask before proceeding
    pub fn should_prompt(&self) -> bool {
        matches!(self.format, OutputFormat::Human)
    }

    /// Print a status line (human output only)
    pub fn success(&self, message: &str) {
        if matches!(self.format, OutputFormat::Human) {
            println!("{}", message);
        }
    }

    /// Print a single user profile
    pub fn print_user(&self, user: &User) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:           {}", user.id);
                println!("Name:         {}", user.name);
                println!("Phone:        {}", user.phone);
                if let Some(ref denomination) = user.denomination {
                    println!("Denomination: {}", denomination);
                }
                println!("Translation:  {}", user.preferred_translation);
                println!("Registered:   {}", user.created_at.format("%Y-%m-%d %H:%M"));
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(user).unwrap_or_default());
            }
            OutputFormat::Quiet => {
                println!("{}", user.id);
            }
        }
    }

    /// Print a list of users
    pub fn print_users(&self, users: &[User]) {
        match self.format {
            OutputFormat::Human => {
                if users.is_empty() {
                    println!("No accounts registered.");
                    return;
                }
                for user in users {
                    println!(
                        "{}  {}  {}  [{}]",
                        short_id(&user.id),
                        user.name,
                        user.phone,
                        user.preferred_translation
                    );
                }
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(users).unwrap_or_default());
            }
            OutputFormat::Quiet => {
                for user in users {
                    println!("{}", user.id);
                }
            }
        }
    }

    /// Print a single verse with full details
    pub fn print_verse(&self, verse: &Verse) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:          {}", verse.id);
                println!("Reference:   {}", verse.reference);
                println!("Translation: {}", verse.translation);
                println!("Content:     {}", verse.content);
                println!("Added:       {}", verse.created_at.format("%Y-%m-%d %H:%M"));
                println!("Updated:     {}", verse.updated_at.format("%Y-%m-%d %H:%M"));
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(verse).unwrap_or_default());
            }
            OutputFormat::Quiet => {
                println!("{}", verse.id);
            }
        }
    }

    /// Print a list of verses, one line each
    pub fn print_verses(&self, verses: &[Verse]) {
        match self.format {
            OutputFormat::Human => {
                if verses.is_empty() {
                    println!("No verses collected yet.");
                    return;
                }
                for verse in verses {
                    println!(
                        "{}  {} ({})  {}",
                        short_id(&verse.id),
                        verse.reference,
                        verse.translation,
                        truncate_line(&verse.content, 60)
                    );
                }
            }
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(verses).unwrap_or_default()
                );
            }
            OutputFormat::Quiet => {
                for verse in verses {
                    println!("{}", verse.id);
                }
            }
        }
    }

    /// Print database stats (tables and row counts)
    pub fn print_db_info(&self, tables: &[String], user_count: i64, verse_count: i64) {
        match self.format {
            OutputFormat::Human => {
                println!("Tables: {}", tables.join(", "));
                println!("Users:  {}", user_count);
                println!("Verses: {}", verse_count);
            }
            OutputFormat::Json => {
                let info = serde_json::json!({
                    "tables": tables,
                    "users": user_count,
                    "verses": verse_count,
                });
                println!("{}", serde_json::to_string_pretty(&info).unwrap_or_default());
            }
            OutputFormat::Quiet => {
                println!("{} {}", user_count, verse_count);
            }
        }
    }
}

/// First characters of an opaque id, for one-line listings
fn short_id(id: &str) -> &str {
    &id[..id.len().min(10)]
}

/// Truncate to a display width, appending an ellipsis when cut
fn truncate_line(text: &str, max: usize) -> String {
    let line = text.lines().next().unwrap_or("");
    if line.chars().count() <= max {
        line.to_string()
    } else {
        let truncated: String = line.chars().take(max).collect();
        format!("{}...", truncated)
    }
}
