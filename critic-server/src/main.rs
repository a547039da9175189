//! Critic CLI - run and operate the Critic code review service

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use critic_core::{Config, Secrets};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{CheckDbArgs, ServeArgs, TokenArgs};

/// Critic: AI code reviews over HTTP
#[derive(Parser, Debug)]
#[command(name = "critic")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to ~/.config/critic/config.toml)
    #[arg(short, long, global = true, env = "CRITIC_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    #[command(visible_alias = "s")]
    Serve(ServeArgs),

    /// Mint a bearer token for a user
    Token(TokenArgs),

    /// Check the reviews table schema
    CheckDb(CheckDbArgs),

    /// Show current configuration
    Config {
        /// Write a secrets template to ~/.config/critic/secrets.toml
        #[arg(long)]
        init_secrets: bool,
    },

    /// Show version information
    Version,
}

fn setup_logging(verbose: bool, json: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.json_logs);

    let listen = match &cli.command {
        Some(Commands::Serve(args)) => args.listen.clone(),
        _ => None,
    };

    // Load configuration with overrides
    let config = Config::load_with_overrides(cli.config.as_deref(), listen)?;

    if cli.verbose {
        tracing::info!(
            listen_addr = %config.server.listen_addr,
            environment = %config.server.environment,
            database = %config.database.path.display(),
            model = %config.generation.model,
            "Configuration loaded"
        );
    }

    match cli.command {
        Some(Commands::Serve(args)) => {
            args.execute(config).await?;
        }
        Some(Commands::Token(args)) => {
            args.execute(&config)?;
        }
        Some(Commands::CheckDb(args)) => {
            args.execute(&config).await?;
        }
        Some(Commands::Config { init_secrets }) => {
            if init_secrets {
                let path = Secrets::create_template()?;
                println!("Secrets template written to {}", path.display());
                println!();
            }

            println!("Critic Configuration");
            println!("====================");
            println!();
            print!("{}", toml::to_string_pretty(&config)?);
            println!();

            let secrets = Secrets::load()?;
            println!("Secrets:");
            println!("  groq api_key: {}", configured(secrets.groq_api_key().is_some()));
            println!("  jwt_secret: {}", configured(secrets.jwt_secret().is_some()));
            println!();

            let config_path = cli.config.or_else(Config::default_config_path);
            if let Some(path) = config_path {
                println!("Config file: {}", path.display());
                if path.exists() {
                    println!("  (exists)");
                } else {
                    println!("  (not found - using defaults)");
                }
            }
        }
        Some(Commands::Version) => {
            println!("critic {}", env!("CARGO_PKG_VERSION"));
        }
        None => {
            println!("Critic - AI code reviews over HTTP");
            println!();
            println!("Use --help for usage information");
        }
    }

    Ok(())
}

fn configured(present: bool) -> &'static str {
    if present {
        "(set)"
    } else {
        "(not set)"
    }
}
