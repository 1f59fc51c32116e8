//! Versebank CLI
//!
//! Command-line interface for Versebank - verse collection and accounts.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use versebank_core::{Config, Store};

mod commands;
mod output;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "versebank")]
#[command(about = "Versebank - local verse collection and accounts")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a new account
    Register {
        /// Display name
        #[arg(long)]
        name: String,
        /// Phone number (the login credential)
        #[arg(long)]
        phone: String,
        /// Denomination
        #[arg(long)]
        denomination: Option<String>,
        /// Preferred translation code (defaults to NIV)
        #[arg(long)]
        translation: Option<String>,
    },
    /// Log in by phone number and show the profile
    Login {
        /// Phone number the account was registered with
        phone: String,
    },
    /// Show or update a profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },
    /// Manage collected verses
    Verse {
        #[command(subcommand)]
        command: VerseCommands,
    },
    /// Inspect or reset the database
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ProfileCommands {
    /// Show a profile
    Show {
        /// Phone number of the account
        #[arg(long)]
        phone: String,
    },
    /// Update profile fields
    Update {
        /// Phone number of the account
        #[arg(long)]
        phone: String,
        /// New display name
        #[arg(long)]
        name: Option<String>,
        /// New denomination
        #[arg(long, conflicts_with = "clear_denomination")]
        denomination: Option<String>,
        /// Clear the denomination
        #[arg(long)]
        clear_denomination: bool,
        /// New preferred translation code
        #[arg(long)]
        translation: Option<String>,
    },
}

#[derive(Subcommand)]
enum VerseCommands {
    /// Add a verse to an account's collection
    Add {
        /// Phone number of the owning account
        #[arg(long)]
        phone: String,
        /// Book name (e.g. John)
        #[arg(long)]
        book: String,
        /// Chapter number
        #[arg(long)]
        chapter: i64,
        /// Verse number
        #[arg(long)]
        verse: i64,
        /// The verse text
        #[arg(long)]
        content: String,
        /// Citation (defaults to "Book Chapter:Verse")
        #[arg(long)]
        reference: Option<String>,
        /// Translation code (defaults to the owner's preferred translation)
        #[arg(long)]
        translation: Option<String>,
    },
    /// List an account's verses, most recent first
    #[command(alias = "ls")]
    List {
        /// Phone number of the owning account
        #[arg(long)]
        phone: String,
    },
    /// Show a single verse
    Show {
        /// Verse ID
        id: String,
    },
    /// Edit verse fields
    Edit {
        /// Verse ID
        id: String,
        #[arg(long)]
        book: Option<String>,
        #[arg(long)]
        chapter: Option<i64>,
        #[arg(long)]
        verse: Option<i64>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        reference: Option<String>,
        #[arg(long)]
        translation: Option<String>,
    },
    /// Delete a verse
    #[command(alias = "rm")]
    Delete {
        /// Verse ID
        id: String,
    },
}

#[derive(Subcommand)]
enum DbCommands {
    /// Show tables and row counts
    Info,
    /// Dump every user and verse
    Dump,
    /// Insert a test account with one verse
    Seed,
    /// Delete all users and verses
    Reset {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir)
        key: String,
        /// Configuration value
        value: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // Config commands don't need the store
    if let Commands::Config { command } = &cli.command {
        return commands::config::handle(command.clone(), &output);
    }

    let config = Config::load()?;
    let mut store = Store::open_with_config(&config)?;

    match cli.command {
        Commands::Register {
            name,
            phone,
            denomination,
            translation,
        } => commands::user::register(&store, name, phone, denomination, translation, &output),
        Commands::Login { phone } => commands::user::login(&store, phone, &output),
        Commands::Profile { command } => match command {
            ProfileCommands::Show { phone } => commands::user::show(&store, phone, &output),
            ProfileCommands::Update {
                phone,
                name,
                denomination,
                clear_denomination,
                translation,
            } => commands::user::update(
                &store,
                phone,
                name,
                denomination,
                clear_denomination,
                translation,
                &output,
            ),
        },
        Commands::Verse { command } => match command {
            VerseCommands::Add {
                phone,
                book,
                chapter,
                verse,
                content,
                reference,
                translation,
            } => commands::verse::add(
                &store,
                phone,
                book,
                chapter,
                verse,
                content,
                reference,
                translation,
                &output,
            ),
            VerseCommands::List { phone } => commands::verse::list(&store, phone, &output),
            VerseCommands::Show { id } => commands::verse::show(&store, id, &output),
            VerseCommands::Edit {
                id,
                book,
                chapter,
                verse,
                content,
                reference,
                translation,
            } => commands::verse::edit(
                &store,
                id,
                book,
                chapter,
                verse,
                content,
                reference,
                translation,
                &output,
            ),
            VerseCommands::Delete { id } => commands::verse::delete(&store, id, &output),
        },
        Commands::Db { command } => match command {
            DbCommands::Info => commands::db::info(&store, &output),
            DbCommands::Dump => commands::db::dump(&store, &output),
            DbCommands::Seed => commands::db::seed(&store, &output),
            DbCommands::Reset { yes } => commands::db::reset(&mut store, yes, &output),
        },
        Commands::Config { .. } => unreachable!("handled above"),
    }
}

/// Route library logging to stderr; VERSEBANK_LOG overrides the filter
fn init_logging() {
    let filter = EnvFilter::try_from_env("VERSEBANK_LOG")
        .unwrap_or_else(|_| EnvFilter::new("versebank_core=warn,versebank_cli=warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
