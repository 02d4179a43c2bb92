//! CLI interface for qabot

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::audit::FileAuditLog;
use crate::chat::terminal::{format_suggestions, print_dim, print_error, print_info, print_success};
use crate::config::Config;
use crate::knowledge::default_entries;
use crate::session::{LearnOutcome, Session};
use crate::store::{self, StoreFormat};
use crate::types::{to_percent, Decision};

#[derive(Parser)]
#[command(name = "qabot")]
#[command(about = "Question-answering assistant that learns new answers as you go", long_about = None)]
#[command(version)]
struct Cli {
    /// Knowledge base file (.csv, .json or .txt)
    #[arg(short, long, global = true, env = "QABOT_STORE")]
    store: Option<PathBuf>,

    /// Store format, overriding the file extension
    #[arg(short, long, global = true)]
    format: Option<StoreFormat>,

    /// Minimum similarity for an answer, 0 to 1
    #[arg(short, long, global = true, env = "QABOT_THRESHOLD")]
    threshold: Option<f64>,

    /// Number of suggestions shown when nothing matches
    #[arg(short = 'n', long, global = true)]
    top_n: Option<usize>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive chat session
    Chat,
    /// Answer a single question
    Ask {
        /// The question
        question: String,
        /// Only accept a stored question equal up to case and accents
        #[arg(short, long)]
        exact: bool,
    },
    /// Teach a question and its answer
    Learn {
        question: String,
        answer: String,
    },
    /// List stored questions and answers
    List {
        /// Maximum entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
    /// Show knowledge base statistics
    Stats,
    /// Configure matching
    Config {
        /// Display current configuration
        #[arg(long)]
        show: bool,
        /// Set the match threshold (0 to 1)
        #[arg(long)]
        set_threshold: Option<f64>,
        /// Set the number of suggestions
        #[arg(long)]
        set_top_n: Option<usize>,
        /// Set the normalization profile (light, full)
        #[arg(long)]
        set_profile: Option<String>,
        /// Set the stemmer language
        #[arg(long)]
        set_language: Option<String>,
        /// Reset configuration to defaults
        #[arg(long)]
        reset: bool,
    },
}

impl Cli {
    /// Apply one-run overrides on top of the loaded file
    fn effective_config(&self, mut config: Config) -> Result<Config> {
        if let Some(threshold) = self.threshold {
            config.matching.threshold = threshold;
        }
        if let Some(top_n) = self.top_n {
            config.matching.top_n = top_n;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Open the knowledge base and build a session for `config`.
///
/// With an explicit `store` path the format comes from `format` or the file
/// extension and the file is used as is. Otherwise the data directory is
/// searched and a default store is seeded when none exists.
pub fn open_session(config: &Config, store: Option<&Path>, format: Option<StoreFormat>) -> Result<Session> {
    let backend = match store {
        Some(path) => {
            let format = match format {
                Some(format) => format,
                None => StoreFormat::from_path(path)?,
            };
            store::open(format, path)
        }
        None => {
            let dir = config.store.resolve_dir()?;
            let fresh = format.or(config.store.format).unwrap_or(StoreFormat::Csv);
            let located = store::locate_or_seed(&dir, fresh, &default_entries())
                .with_context(|| format!("Failed to open knowledge base in {}", dir.display()))?;
            if located.seeded {
                print_dim(&format!("Created {} with the default questions\n", located.path.display()));
            }
            store::open(located.format, located.path)
        }
    };

    let session = Session::open(&config.matching, backend)?;
    match config.audit_path()? {
        Some(path) => Ok(session.with_audit(Box::new(FileAuditLog::with_path(path)?))),
        None => Ok(session),
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Some(Commands::Config { show, set_threshold, set_top_n, set_profile, set_language, reset }) = &cli.command {
        return run_config(*show, *set_threshold, *set_top_n, set_profile.as_deref(), set_language.as_deref(), *reset);
    }

    let config = cli.effective_config(Config::load()?)?;
    let mut session = open_session(&config, cli.store.as_deref(), cli.format)?;

    match cli.command {
        None | Some(Commands::Chat) => crate::chat::run_chat(&mut session)?,
        Some(Commands::Ask { question, exact }) => ask(&session, &question, exact),
        Some(Commands::Learn { question, answer }) => learn(&mut session, &question, &answer)?,
        Some(Commands::List { limit }) => list(&session, limit),
        Some(Commands::Stats) => stats(&session),
        Some(Commands::Config { .. }) => {}
    }

    Ok(())
}

fn run_config(
    show: bool,
    set_threshold: Option<f64>,
    set_top_n: Option<usize>,
    set_profile: Option<&str>,
    set_language: Option<&str>,
    reset: bool,
) -> Result<()> {
    if let Some(threshold) = set_threshold {
        crate::config::set_threshold(threshold)
    } else if let Some(top_n) = set_top_n {
        crate::config::set_top_n(top_n)
    } else if let Some(profile) = set_profile {
        crate::config::set_profile(profile)
    } else if let Some(language) = set_language {
        crate::config::set_language(language)
    } else if reset {
        crate::config::reset_config()
    } else if show {
        crate::config::show_config()
    } else {
        println!("Configuration options:");
        println!("  --show                   Display current configuration");
        println!("  --set-threshold <x>      Minimum similarity for an answer (0 to 1)");
        println!("  --set-top-n <n>          Suggestions shown when nothing matches");
        println!("  --set-profile <p>        Normalization profile (light, full)");
        println!("  --set-language <l>       Stemmer language");
        println!("  --reset                  Restore defaults");
        Ok(())
    }
}

fn ask(session: &Session, question: &str, exact: bool) {
    if exact {
        match session.lookup_exact(question) {
            Some(entry) => println!("{}", entry.answer()),
            None => print_dim("No stored question matches exactly.\n"),
        }
        return;
    }

    match session.ask(question) {
        Decision::Answered { entry, similarity } => {
            println!("{}", entry.answer());
            print_dim(&format!("(similarity {}%)\n", to_percent(similarity)));
        }
        Decision::Unmatched { suggestions } => {
            print_info("No close enough answer found.\n");
            if !suggestions.is_empty() {
                println!("Closest questions:");
                for line in format_suggestions(&suggestions) {
                    println!("{}", line);
                }
            }
        }
    }
}

fn learn(session: &mut Session, question: &str, answer: &str) -> Result<()> {
    match session.learn(question, answer) {
        LearnOutcome::Rejected => anyhow::bail!("The answer must not be empty"),
        LearnOutcome::Learned { persisted: Ok(()), .. } => {
            print_success(&format!("✓ Learned ({} entries)\n", session.base().len()));
            Ok(())
        }
        LearnOutcome::Learned { persisted: Err(e), .. } => {
            print_error("✗ The entry could not be saved\n");
            Err(e.into())
        }
    }
}

fn list(session: &Session, limit: usize) {
    if session.base().is_empty() {
        println!("The knowledge base is empty.");
        return;
    }

    for (i, entry) in session.base().iter().take(limit).enumerate() {
        println!("{}. {}", i + 1, entry.question());
        print_dim(&format!("   {}\n", entry.answer()));
    }
    if session.base().len() > limit {
        println!("... and {} more", session.base().len() - limit);
    }
}

fn stats(session: &Session) {
    let normalizer = session.normalizer();
    println!("Knowledge Base Statistics:");
    println!("  Entries:     {}", session.base().len());
    println!("  Store:       {}", session.store().path().display());
    println!("  Format:      {}", session.store().format());
    println!("  Threshold:   {}", session.threshold());
    println!("  Suggestions: {}", session.top_n());
    println!("  Profile:     {} ({})", normalizer.profile(), normalizer.language());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_global_overrides() {
        let cli = Cli::try_parse_from([
            "qabot", "ask", "¿Qué es DRS?", "--threshold", "0.5", "--format", "json", "-n", "5",
        ])
        .unwrap();
        assert_eq!(cli.threshold, Some(0.5));
        assert_eq!(cli.format, Some(StoreFormat::Json));
        assert!(matches!(cli.command, Some(Commands::Ask { exact: false, .. })));

        let config = cli.effective_config(Config::default()).unwrap();
        assert_eq!(config.matching.threshold, 0.5);
        assert_eq!(config.matching.top_n, 5);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let cli = Cli::try_parse_from(["qabot", "--threshold", "2"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.effective_config(Config::default()).is_err());
    }

    #[test]
    fn test_open_session_seeds_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.store.data_dir = Some(dir.path().to_path_buf());
        config.audit.enabled = false;

        let session = open_session(&config, None, Some(StoreFormat::Text)).unwrap();
        assert_eq!(session.base().len(), default_entries().len());
        assert_eq!(session.store().format(), StoreFormat::Text);
        assert!(dir.path().join("questions.txt").exists());
    }

    #[test]
    fn test_open_session_explicit_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("faq.data");
        std::fs::write(&path, "[]").unwrap();
        let mut config = Config::default();
        config.audit.path = Some(dir.path().join("audit.log"));

        assert!(open_session(&config, Some(&path), None).is_err());
        let session = open_session(&config, Some(&path), Some(StoreFormat::Json)).unwrap();
        assert!(session.base().is_empty());
    }
}
