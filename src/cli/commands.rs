use crate::cli::menu::MenuCli;
use crate::config::Config;
use crate::core::Ledger;
use crate::crypto::hash::DigestAlgorithm;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "tallychain")]
#[command(about = "Tallychain - A single-node proof-of-work ledger")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(long, global = true, help = "Enable debug logging")]
    pub debug: bool,

    #[arg(long, global = true, help = "Configuration file path")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Override the mining difficulty (leading zero hex digits)")]
    pub difficulty: Option<usize>,

    #[arg(long, global = true, value_enum, help = "Override the block digest algorithm")]
    pub digest: Option<DigestArg>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the interactive ledger menu (default)
    Run,

    /// Configuration commands
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Write the default configuration file
    Init {
        #[arg(long, help = "Overwrite an existing file")]
        force: bool,
    },

    /// Print the effective configuration
    Show,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum DigestArg {
    Djb2,
    Sha256,
}

impl From<DigestArg> for DigestAlgorithm {
    fn from(arg: DigestArg) -> Self {
        match arg {
            DigestArg::Djb2 => DigestAlgorithm::Djb2,
            DigestArg::Sha256 => DigestAlgorithm::Sha256,
        }
    }
}

impl Cli {
    fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::config_path)
    }

    /// Loads the file config (creating defaults on first run) and applies
    /// command-line overrides on top.
    fn effective_config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };

        if let Some(difficulty) = self.difficulty {
            config.mining.difficulty = difficulty;
        }
        if let Some(digest) = self.digest {
            config.mining.digest = digest.into();
        }

        config.validate()?;
        Ok(config)
    }
}

pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging once
    let _ = if cli.debug {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).try_init()
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).try_init()
    };

    match &cli.command {
        Some(Commands::Config(ConfigCommands::Init { force })) => init_config(&cli.config_path(), *force),
        Some(Commands::Config(ConfigCommands::Show)) => {
            let config = cli.effective_config()?;
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
        Some(Commands::Run) | None => {
            let config = cli.effective_config()?;
            log::info!(
                "Starting ledger (difficulty {}, {} digest, pool of {})",
                config.mining.difficulty,
                config.mining.digest,
                config.mempool.max_pending_transactions
            );
            let ledger = Ledger::new(&config)?;
            MenuCli::new(ledger).run()
        }
    }
}

fn init_config(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "configuration already exists at {} (use --force to overwrite)",
            path.display()
        );
    }

    Config::default().save_to(path)?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_overrides_apply_on_top_of_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        Config::default().save_to(&path).unwrap();

        let cli = Cli::parse_from([
            "tallychain",
            "--config",
            path.to_str().unwrap(),
            "--difficulty",
            "2",
            "--digest",
            "sha256",
            "run",
        ]);
        let config = cli.effective_config().unwrap();

        assert_eq!(config.mining.difficulty, 2);
        assert_eq!(config.mining.digest, DigestAlgorithm::Sha256);
        assert_eq!(config.mempool.max_pending_transactions, 10);
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        init_config(&path, false).unwrap();
        assert!(init_config(&path, false).is_err());
        assert!(init_config(&path, true).is_ok());
        assert!(Config::load_from(&path).is_ok());
    }
}
