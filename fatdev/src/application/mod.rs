pub mod handlers;

use crate::presentation::cli::{Cli, Commands, StoreArgs};
use clap::Parser;
use fat_core::{Result, StoreConfig};
use tracing_subscriber::EnvFilter;

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = store_config(&cli.store)?;
    tracing::debug!(?config, "store configuration");

    match cli.command.unwrap_or(Commands::Shell) {
        Commands::Shell => handlers::handle_shell(&config),
        Commands::Create { name, content } => handlers::handle_create(&config, name, content),
        Commands::Ls { deleted, long } => handlers::handle_ls(&config, deleted, long),
        Commands::Cat { index } => handlers::handle_cat(&config, index),
        Commands::Edit {
            index,
            content,
            yes,
        } => handlers::handle_edit(&config, index, content, yes),
        Commands::Rm { index, yes } => handlers::handle_rm(&config, index, yes),
        Commands::Recover { index, yes } => handlers::handle_recover(&config, index, yes),
        Commands::Verify => handlers::handle_verify(&config),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("FAT_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Defaults, then the config file, then explicit flags.
pub fn store_config(args: &StoreArgs) -> Result<StoreConfig> {
    let mut cfg = match &args.config {
        Some(path) => StoreConfig::from_file(path)?,
        None => StoreConfig::default(),
    };
    if let Some(root) = &args.root {
        cfg.root = root.clone();
    }
    if let Some(capacity) = args.capacity {
        cfg.segment_capacity = capacity;
    }
    if let Some(format) = args.format {
        cfg.format = format.into();
    }
    if let Some(backend) = args.backend {
        cfg.backend = backend.into();
    }
    cfg.validate()?;
    Ok(cfg)
}
