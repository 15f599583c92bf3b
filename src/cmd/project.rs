//! Project initialization and status commands.

use anyhow::Result;
use std::path::Path;

pub fn cmd_init(project_dir: &Path) -> Result<()> {
    use architect::init::init_project;

    let result = init_project(project_dir)?;

    if result.created {
        println!(
            "Initialized architect project at {}",
            result.architect_dir.display()
        );
        println!();
        println!("Created directory structure:");
        println!("  .architect/");
        println!("  ├── architect.toml   # Configuration (see `architect config`)");
        println!("  ├── state/           # Pending specification between runs");
        println!("  └── logs/            # architect.log");
        println!();
        println!("Next steps:");
        println!("  1. Run `architect new \"<what you want to build>\"`");
        println!("  2. Answer the clarification questions and review the generated files");
    } else {
        println!(
            "Architect project already initialized at {}",
            result.architect_dir.display()
        );
        println!("Directory structure verified.");
    }

    Ok(())
}

pub fn cmd_status(project_dir: &Path) -> Result<()> {
    use architect::architect_config::CONFIG_FILE;
    use architect::init::{get_architect_dir, is_initialized};
    use architect::store::{FileStore, PENDING_SPEC_KEY};
    use architect_common::{KeyValueStore, ProjectSpecification};

    println!();
    if !is_initialized(project_dir) {
        println!("Not initialized. Run 'architect init' to create the .architect/ directory.");
        println!();
        return Ok(());
    }

    let architect_dir = get_architect_dir(project_dir);
    println!("Project: {}", architect_dir.display());

    let config_file = architect_dir.join(CONFIG_FILE);
    if config_file.exists() {
        println!("Config:  {}", config_file.display());
    } else {
        println!("Config:  defaults (no {})", CONFIG_FILE);
    }

    let store = FileStore::new(architect_dir.join("state"));
    match store.load(PENDING_SPEC_KEY)? {
        None => println!("Pending specification: none"),
        Some(raw) => match ProjectSpecification::from_json(&raw) {
            Ok(spec) => {
                println!("Pending specification: \"{}\"", spec.description);
                println!(
                    "  tech stack = {}, ui = {}, features = [{}]",
                    spec.tech_stack,
                    spec.ui_type,
                    spec.features.join(", ")
                );
                println!("  Run 'architect resume' to generate it.");
            }
            Err(_) => {
                println!("Pending specification: unreadable (will be discarded on resume)")
            }
        },
    }
    println!();

    Ok(())
}
