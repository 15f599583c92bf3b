//! Unified configuration for Architect.
//!
//! Settings are read from `.architect/architect.toml` and layered
//! file → environment → CLI. Every field has a default, so a missing file
//! or a partial file is always valid.
//!
//! # Configuration File Format
//!
//! ```toml
//! [project]
//! name = "my-project"
//!
//! [defaults]
//! tech_stack = "nodejs"
//! ui_type = "cli"
//!
//! [generation]
//! line_delay_ms = 50
//!
//! [review]
//! auto_approve = false
//! write_timeout_secs = 30
//!
//! [events]
//! capacity = 1024
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::clarify::SpecDefaults;
use crate::errors::ConfigError;
use crate::init::ARCHITECT_DIR;
use crate::workflow::WorkflowSettings;

pub const CONFIG_FILE: &str = "architect.toml";
pub const ENV_LINE_DELAY_MS: &str = "ARCHITECT_LINE_DELAY_MS";
pub const ENV_AUTO_APPROVE: &str = "ARCHITECT_AUTO_APPROVE";

/// Delays above this are almost certainly a typo (milliseconds vs seconds).
const MAX_SENSIBLE_LINE_DELAY_MS: u64 = 5_000;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectSection {
    #[serde(default)]
    pub name: Option<String>,
}

/// Fallback keys used when a clarification question is left unanswered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsSection {
    #[serde(default = "default_tech_stack")]
    pub tech_stack: String,
    #[serde(default = "default_ui_type")]
    pub ui_type: String,
}

fn default_tech_stack() -> String {
    "nodejs".to_string()
}

fn default_ui_type() -> String {
    "cli".to_string()
}

impl Default for DefaultsSection {
    fn default() -> Self {
        Self {
            tech_stack: default_tech_stack(),
            ui_type: default_ui_type(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSection {
    /// Simulated delay between streamed lines.
    #[serde(default = "default_line_delay_ms")]
    pub line_delay_ms: u64,
}

fn default_line_delay_ms() -> u64 {
    50
}

impl Default for GenerationSection {
    fn default() -> Self {
        Self {
            line_delay_ms: default_line_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewSection {
    /// Approve and apply every generated change without asking.
    #[serde(default)]
    pub auto_approve: bool,
    /// Upper bound for a single file write; 0 disables the bound.
    #[serde(default = "default_write_timeout_secs")]
    pub write_timeout_secs: u64,
}

fn default_write_timeout_secs() -> u64 {
    30
}

impl Default for ReviewSection {
    fn default() -> Self {
        Self {
            auto_approve: false,
            write_timeout_secs: default_write_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsSection {
    #[serde(default = "default_event_capacity")]
    pub capacity: usize,
}

fn default_event_capacity() -> usize {
    architect_common::events::DEFAULT_EVENT_CAPACITY
}

impl Default for EventsSection {
    fn default() -> Self {
        Self {
            capacity: default_event_capacity(),
        }
    }
}

/// The complete architect.toml structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArchitectToml {
    #[serde(default)]
    pub project: ProjectSection,
    #[serde(default)]
    pub defaults: DefaultsSection,
    #[serde(default)]
    pub generation: GenerationSection,
    #[serde(default)]
    pub review: ReviewSection,
    #[serde(default)]
    pub events: EventsSection,
}

impl ArchitectToml {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load `.architect/architect.toml`, or defaults when the file is absent.
    pub fn load_or_default(architect_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = architect_dir.join(CONFIG_FILE);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        use anyhow::Context;
        let content = toml::to_string_pretty(self).context("Failed to serialize architect.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Validate the configuration and return any warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.defaults.tech_stack.trim().is_empty() {
            warnings.push("defaults.tech_stack is empty; specs will carry an empty tech stack".to_string());
        }
        if self.defaults.ui_type.trim().is_empty() {
            warnings.push("defaults.ui_type is empty; specs will carry an empty UI type".to_string());
        }
        if self.events.capacity == 0 {
            warnings.push("events.capacity is 0; a capacity of 1 will be used".to_string());
        }
        if self.generation.line_delay_ms > MAX_SENSIBLE_LINE_DELAY_MS {
            warnings.push(format!(
                "generation.line_delay_ms = {} is very slow (value is in milliseconds)",
                self.generation.line_delay_ms
            ));
        }

        warnings
    }
}

/// Environment overrides, parsed once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    pub line_delay_ms: Option<u64>,
    pub auto_approve: Option<bool>,
}

impl EnvOverrides {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Parse overrides through an arbitrary lookup, so tests need not touch
    /// the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let line_delay_ms = match lookup(ENV_LINE_DELAY_MS) {
            Some(raw) => Some(raw.trim().parse::<u64>().map_err(|_| ConfigError::InvalidEnv {
                variable: ENV_LINE_DELAY_MS.to_string(),
                value: raw.clone(),
            })?),
            None => None,
        };

        let auto_approve = match lookup(ENV_AUTO_APPROVE) {
            Some(raw) => match raw.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" => Some(true),
                "0" | "false" | "no" => Some(false),
                _ => {
                    return Err(ConfigError::InvalidEnv {
                        variable: ENV_AUTO_APPROVE.to_string(),
                        value: raw,
                    });
                }
            },
            None => None,
        };

        Ok(Self {
            line_delay_ms,
            auto_approve,
        })
    }
}

/// Configuration for one invocation: parsed file plus env and CLI overrides.
#[derive(Debug, Clone)]
pub struct ArchitectConfig {
    pub project_dir: PathBuf,
    pub architect_dir: PathBuf,
    pub toml: ArchitectToml,
    pub env: EnvOverrides,
    pub verbose: bool,
    /// CLI override: approve and apply everything.
    pub yes: bool,
    pub cli_line_delay_ms: Option<u64>,
}

impl ArchitectConfig {
    pub fn new(project_dir: PathBuf) -> Result<Self, ConfigError> {
        let architect_dir = project_dir.join(ARCHITECT_DIR);
        let toml = ArchitectToml::load_or_default(&architect_dir)?;
        let env = EnvOverrides::from_env()?;

        Ok(Self {
            project_dir,
            architect_dir,
            toml,
            env,
            verbose: false,
            yes: false,
            cli_line_delay_ms: None,
        })
    }

    pub fn with_cli_args(
        project_dir: PathBuf,
        verbose: bool,
        yes: bool,
        line_delay_ms: Option<u64>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::new(project_dir)?;
        config.verbose = verbose;
        config.yes = yes;
        config.cli_line_delay_ms = line_delay_ms;
        Ok(config)
    }

    /// Per-line streaming delay (CLI → env → file).
    pub fn line_delay(&self) -> Duration {
        let ms = self
            .cli_line_delay_ms
            .or(self.env.line_delay_ms)
            .unwrap_or(self.toml.generation.line_delay_ms);
        Duration::from_millis(ms)
    }

    /// Auto-approve (CLI `--yes` → env → file).
    pub fn auto_approve(&self) -> bool {
        self.yes || self.env.auto_approve.unwrap_or(self.toml.review.auto_approve)
    }

    pub fn write_timeout(&self) -> Option<Duration> {
        match self.toml.review.write_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    pub fn config_file(&self) -> PathBuf {
        self.architect_dir.join(CONFIG_FILE)
    }

    pub fn state_dir(&self) -> PathBuf {
        self.architect_dir.join("state")
    }

    pub fn log_dir(&self) -> PathBuf {
        self.architect_dir.join("logs")
    }

    pub fn workflow_settings(&self) -> WorkflowSettings {
        WorkflowSettings {
            line_delay: self.line_delay(),
            write_timeout: self.write_timeout(),
            auto_approve: self.auto_approve(),
            event_capacity: self.toml.events.capacity.max(1),
            spec_defaults: SpecDefaults {
                tech_stack: self.toml.defaults.tech_stack.clone(),
                ui_type: self.toml.defaults.ui_type.clone(),
            },
        }
    }
}
