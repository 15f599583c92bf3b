//! Configuration view and validation commands (`architect config`).

use anyhow::Result;

use super::super::ConfigCommands;

fn print_toml(toml: &architect::architect_config::ArchitectToml) {
    if let Some(name) = &toml.project.name {
        println!("[project]");
        println!("  name = \"{}\"", name);
        println!();
    }

    println!("[defaults]");
    println!("  tech_stack = \"{}\"", toml.defaults.tech_stack);
    println!("  ui_type = \"{}\"", toml.defaults.ui_type);
    println!();
    println!("[generation]");
    println!("  line_delay_ms = {}", toml.generation.line_delay_ms);
    println!();
    println!("[review]");
    println!("  auto_approve = {}", toml.review.auto_approve);
    println!("  write_timeout_secs = {}", toml.review.write_timeout_secs);
    println!();
    println!("[events]");
    println!("  capacity = {}", toml.events.capacity);
    println!();
}

pub fn cmd_config(project_dir: &std::path::Path, command: Option<ConfigCommands>) -> Result<()> {
    use architect::architect_config::{ArchitectConfig, ArchitectToml, CONFIG_FILE};
    use architect::init::get_architect_dir;

    let architect_dir = get_architect_dir(project_dir);
    let config_path = architect_dir.join(CONFIG_FILE);

    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("Architect Configuration");
            println!("=======================");
            println!();

            if config_path.exists() {
                println!("Config file: {}", config_path.display());
                println!();
                print_toml(&ArchitectToml::load(&config_path)?);
            } else {
                println!("No architect.toml found at {}", config_path.display());
                println!();
                println!("Using default configuration:");
                print_toml(&ArchitectToml::default());
                println!("Run 'architect config init' to create an architect.toml file.");
                println!();
            }

            println!("Effective values (with env/CLI overrides):");
            let config = ArchitectConfig::new(project_dir.to_path_buf())?;
            println!("  line_delay = {:?}", config.line_delay());
            println!("  auto_approve = {}", config.auto_approve());
            match config.write_timeout() {
                Some(timeout) => println!("  write_timeout = {:?}", timeout),
                None => println!("  write_timeout = none"),
            }
            println!();
        }
        Some(ConfigCommands::Validate) => {
            println!();
            println!("Validating configuration...");
            println!();

            if !config_path.exists() {
                println!("No architect.toml found. Using defaults (valid).");
                return Ok(());
            }

            let toml = ArchitectToml::load(&config_path)?;
            let warnings = toml.validate();

            if warnings.is_empty() {
                println!("Configuration is valid.");
            } else {
                println!("Configuration warnings:");
                for warning in warnings {
                    println!("  - {}", warning);
                }
            }
            println!();
        }
        Some(ConfigCommands::Init) => {
            if config_path.exists() {
                println!("architect.toml already exists at {}", config_path.display());
                println!("Delete it first if you want to recreate it.");
                return Ok(());
            }

            std::fs::create_dir_all(&architect_dir)?;
            ArchitectToml::default().save(&config_path)?;

            println!("Created architect.toml at {}", config_path.display());
            println!();
            println!("You can now customize:");
            println!("  - [defaults] tech_stack, ui_type");
            println!("  - [generation] line_delay_ms");
            println!("  - [review] auto_approve, write_timeout_secs");
            println!();
        }
    }

    Ok(())
}
