//! Command-line interface, parsed with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Account registration service
#[derive(Parser)]
#[command(name = "driving-app")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config.toml (must exist when given)
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Run the HTTP server (default)
    Serve {
        /// Override the configured listen port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Write a default config file if none exists
    InitConfig,
}

impl Cli {
    #[must_use]
    pub fn command(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or(Commands::Serve { port: None })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_serve() {
        let cli = Cli::try_parse_from(["driving-app"]).unwrap();
        assert_eq!(cli.command(), Commands::Serve { port: None });
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_serve_with_port() {
        let cli = Cli::try_parse_from(["driving-app", "serve", "--port", "8080"]).unwrap();
        assert_eq!(cli.command(), Commands::Serve { port: Some(8080) });
    }

    #[test]
    fn test_init_config_with_path() {
        let cli =
            Cli::try_parse_from(["driving-app", "init-config", "--config", "/tmp/app.toml"])
                .unwrap();
        assert_eq!(cli.command(), Commands::InitConfig);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/app.toml")));
    }

    #[test]
    fn test_rejects_invalid_port() {
        assert!(Cli::try_parse_from(["driving-app", "serve", "--port", "99999"]).is_err());
    }
}
