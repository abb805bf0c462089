//! Quire - flat-file blog post store
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use quire::auth::SessionGate;
use quire::cli::args::LogFormat;
use quire::cli::{commands, Cli, Commands};
use quire::config::ConfigManager;
use quire::error::{QuireError, QuireResult};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            debug!("Command failed: {:?}", e);
            eprintln!("{}", style(e.status_message()).red().bold());
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> QuireResult<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_format);
    quire::ui::init_theme();

    // Completions need no configuration
    if let Commands::Completions(args) = cli.command {
        return commands::completions(args);
    }

    let manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };

    let local_config_path = if cli.no_local {
        debug!("Local config discovery disabled (--no-local)");
        None
    } else {
        let cwd = std::env::current_dir()
            .map_err(|e| QuireError::io("getting current directory", e))?;
        let found = ConfigManager::find_local_config(&cwd);
        if let Some(ref path) = found {
            debug!("Found local config: {}", path.display());
        }
        found
    };

    let mut config = manager.load_merged(local_config_path.as_deref()).await?;
    if let Some(root) = cli.root {
        config.site.root = root;
    }
    debug!("Site root: {}", config.site.root.display());

    let gate = SessionGate::new(&config.admin);

    match cli.command {
        Commands::Completions(_) => unreachable!("Completions handled above"),
        Commands::List(args) => commands::list(args, &config).await,
        Commands::Show(args) => commands::show(args, &config).await,
        Commands::Search(args) => commands::search(args, &config).await,
        Commands::New(args) => commands::new(args, &config, &gate).await,
        Commands::Edit(args) => commands::edit(args, &config, &gate).await,
        Commands::Delete(args) => commands::delete(args, &config, &gate).await,
        Commands::Move(args) => commands::move_post(args, &config, &gate).await,
        Commands::Shuffle(args) => commands::shuffle(args, &config, &gate).await,
        Commands::Cache(args) => commands::cache(args, &config, &gate).await,
        Commands::Login(args) => commands::login(args, &config, &gate).await,
        Commands::Logout => commands::logout(&config, &gate).await,
        Commands::Passwd(args) => commands::passwd(args, &config, &manager, &gate).await,
        Commands::Upload(args) => commands::upload(args, &config, &gate).await,
        Commands::Images(args) => commands::images(args, &config).await,
        Commands::Stats => commands::stats(&config).await,
        Commands::Config(args) => commands::config(args, &config, &manager).await,
    }
}

/// 0 = warn, 1 = info, 2+ = debug
fn init_logging(verbose: u8, format: LogFormat) {
    let filter = match verbose {
        0 => EnvFilter::new("quire=warn"),
        1 => EnvFilter::new("quire=info"),
        _ => EnvFilter::new("quire=debug"),
    };

    match format {
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .without_time()
            .with_writer(std::io::stderr)
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
    }
}
