//! Initialization of the project-local `.architect/` directory.
//!
//! ```text
//! .architect/
//! ├── architect.toml   # Configuration (written with defaults on init)
//! ├── state/           # Durable key/value store (pending specification)
//! └── logs/            # architect.log
//! ```

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::architect_config::{ArchitectToml, CONFIG_FILE};

/// The name of the architect directory.
pub const ARCHITECT_DIR: &str = ".architect";

/// Result of initializing an architect project.
#[derive(Debug)]
pub struct InitResult {
    pub architect_dir: PathBuf,
    /// False if the directory already existed.
    pub created: bool,
}

/// Initialize `.architect/` in `project_dir`. Idempotent: an existing
/// directory is completed, never overwritten.
pub fn init_project(project_dir: &Path) -> Result<InitResult> {
    let architect_dir = get_architect_dir(project_dir);
    let created = !architect_dir.exists();

    std::fs::create_dir_all(&architect_dir).with_context(|| {
        format!("Failed to create directory: {}", architect_dir.display())
    })?;
    ensure_directory_structure(&architect_dir)?;

    Ok(InitResult {
        architect_dir,
        created,
    })
}

fn ensure_directory_structure(architect_dir: &Path) -> Result<()> {
    for sub in ["state", "logs"] {
        let dir = architect_dir.join(sub);
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {} directory: {}", sub, dir.display()))?;
    }

    let config_file = architect_dir.join(CONFIG_FILE);
    if !config_file.exists() {
        ArchitectToml::default().save(&config_file)?;
    }

    Ok(())
}

pub fn is_initialized(project_dir: &Path) -> bool {
    get_architect_dir(project_dir).exists()
}

pub fn get_architect_dir(project_dir: &Path) -> PathBuf {
    project_dir.join(ARCHITECT_DIR)
}
