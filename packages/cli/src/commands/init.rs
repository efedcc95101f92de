use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pagecraft_editor::EditorConfig;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Data directory for pages and local snapshots
    #[arg(short, long, default_value = ".pagecraft")]
    pub data_dir: String,

    /// Default user for this workspace
    #[arg(short, long)]
    pub user: Option<String>,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

    // Check if config already exists
    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!(
        "{}",
        "📝 Initializing Pagecraft workspace...".bright_blue().bold()
    );

    let config = Config {
        data_dir: args.data_dir.clone(),
        user: args.user.clone(),
        editor: EditorConfig::default(),
    };

    // Create data directory if it doesn't exist
    let data_dir = config.get_data_dir(cwd);
    if !data_dir.exists() {
        fs::create_dir_all(config.get_store_dir(cwd))?;
        println!("  {} Created {}/", "✓".green(), args.data_dir);
    }

    // Write config file
    let config_json = serde_json::to_string_pretty(&config)?;
    fs::write(&config_path, config_json)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("{}", "✅ Workspace initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Run: pagecraft new \"My landing page\"");
    println!("  2. Run: pagecraft add <page> hero");
    println!("  3. Run: pagecraft publish <page>");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_writes_config() {
        let dir = tempfile::tempdir().unwrap();
        let cwd = dir.path().display().to_string();

        init(
            InitArgs {
                data_dir: "data".to_string(),
                user: Some("alice".to_string()),
                force: false,
            },
            &cwd,
        )
        .unwrap();

        let config = Config::load(&cwd).unwrap();
        assert_eq!(config.data_dir, "data");
        assert_eq!(config.user.as_deref(), Some("alice"));
        assert!(dir.path().join("data").join("store").is_dir());
    }

    #[test]
    fn test_init_keeps_existing_config() {
        let dir = tempfile::tempdir().unwrap();
        let cwd = dir.path().display().to_string();
        fs::write(dir.path().join(DEFAULT_CONFIG_NAME), r#"{ "dataDir": "kept" }"#).unwrap();

        init(
            InitArgs {
                data_dir: "data".to_string(),
                user: None,
                force: false,
            },
            &cwd,
        )
        .unwrap();

        assert_eq!(Config::load(&cwd).unwrap().data_dir, "kept");
    }
}
