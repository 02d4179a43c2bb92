//! Configuration management
//!
//! Matching thresholds, normalization, store location and audit settings,
//! kept in a TOML file under the platform config directory.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::matching::{validate_threshold, Language, Profile, DEFAULT_THRESHOLD, DEFAULT_TOP_N};
use crate::store::StoreFormat;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Matching engine settings
    #[serde(default)]
    pub matching: MatchingConfig,
    /// Knowledge base location
    #[serde(default)]
    pub store: StoreConfig,
    /// Decision log
    #[serde(default)]
    pub audit: AuditConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Minimum similarity for an answer, in [0, 1]
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Number of candidates kept as suggestions
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    /// Normalization profile used for ranking
    #[serde(default)]
    pub profile: Profile,
    /// Stemmer language
    #[serde(default)]
    pub language: Language,
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            top_n: default_top_n(),
            profile: Profile::default(),
            language: Language::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory holding `questions.{csv,json,txt}`; platform data dir when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    /// Format of a freshly created store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<StoreFormat>,
}

impl StoreConfig {
    /// Configured data directory, falling back to the platform one
    pub fn resolve_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => data_dir(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Log file; `<data_dir>/log.txt` when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
        }
    }
}

impl Config {
    /// Load configuration from file, writing the defaults on first use
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path()?)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .context("Failed to read config file")?;
            let config: Config = toml::from_str(&contents)
                .context("Failed to parse config file")?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;
        let parent = path.parent()
            .context("Config path has no parent")?;

        std::fs::create_dir_all(parent)
            .context("Failed to create config directory")?;

        let contents = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        std::fs::write(path, contents)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Reject values the matching engine cannot work with
    pub fn validate(&self) -> Result<()> {
        validate_threshold(self.matching.threshold)
            .context("Invalid matching.threshold")?;
        if self.matching.top_n == 0 {
            anyhow::bail!("Invalid matching.top_n: must be at least 1");
        }
        Ok(())
    }

    /// Audit log file, if auditing is enabled
    pub fn audit_path(&self) -> Result<Option<PathBuf>> {
        if !self.audit.enabled {
            return Ok(None);
        }
        match &self.audit.path {
            Some(path) => Ok(Some(path.clone())),
            None => Ok(Some(self.store.resolve_dir()?.join("log.txt"))),
        }
    }
}

fn project_dirs() -> Result<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "qabot", "qabot")
        .context("Failed to get project directories")
}

/// Get the configuration file path
pub fn config_path() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join("config.toml"))
}

/// Get the data directory path
pub fn data_dir() -> Result<PathBuf> {
    Ok(project_dirs()?.data_dir().to_path_buf())
}

/// Show current configuration
pub fn show_config() -> Result<()> {
    let config = Config::load()?;

    println!("Configuration ({})", config_path()?.display());
    println!();
    println!("Matching:");
    println!("  threshold:  {}", config.matching.threshold);
    println!("  top_n:      {}", config.matching.top_n);
    println!("  profile:    {}", config.matching.profile);
    println!("  language:   {}", config.matching.language);
    println!();
    println!("Store:");
    println!("  data_dir:   {}", config.store.resolve_dir()?.display());
    println!(
        "  format:     {}",
        config.store.format.map(|f| f.to_string()).unwrap_or_else(|| "auto".to_string())
    );
    println!();
    println!("Audit:");
    match config.audit_path()? {
        Some(path) => println!("  log:        {}", path.display()),
        None => println!("  log:        disabled"),
    }

    println!("\nUse 'qabot config --set-threshold <0..1>' to change the match threshold");
    println!("   Languages: {}", Language::all().join(", "));

    Ok(())
}

/// Set the match threshold
pub fn set_threshold(threshold: f64) -> Result<()> {
    let mut config = Config::load()?;
    config.matching.threshold = threshold;
    config.save()?;
    println!("Match threshold set to {}", threshold);
    Ok(())
}

/// Set the number of suggestions
pub fn set_top_n(top_n: usize) -> Result<()> {
    let mut config = Config::load()?;
    config.matching.top_n = top_n;
    config.save()?;
    println!("Suggestions set to {}", top_n);
    Ok(())
}

/// Set the normalization profile
pub fn set_profile(profile: &str) -> Result<()> {
    let mut config = Config::load()?;
    config.matching.profile = profile.parse()?;
    config.save()?;
    println!("Normalization profile set to {}", config.matching.profile);
    Ok(())
}

/// Set the stemmer language
pub fn set_language(language: &str) -> Result<()> {
    let mut config = Config::load()?;
    config.matching.language = language.parse()?;
    config.save()?;
    println!("Stemmer language set to {}", config.matching.language);
    Ok(())
}

/// Reset configuration to defaults
pub fn reset_config() -> Result<()> {
    let config = Config::default();
    config.save()?;
    println!("Configuration reset to defaults.");
    Ok(())
}

/// Get default configuration as TOML string
pub fn default_config_toml() -> String {
    let config = Config::default();
    toml::to_string_pretty(&config).unwrap_or_else(|_| "# Default configuration\n".to_string())
}
