mod cli;
mod commands;
mod config;
mod records;
mod storage;

use std::io::{self, Write};

use clap::Parser;
use cli::{Command, ConfigCommand, RecordKind};
use color_eyre::Result;
use commands::BuildStamp;
use keepsake_storage::RecordStore;
use records::{IngameData, UserSettingsData};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Entry point wiring the CLI to the record stores.
fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let cli = cli::Cli::parse();
    let config = config::load()?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(cli.command.unwrap_or(Command::Demo), &config, &mut out)
}

/// Dispatch one command. Stores are built only for the records a command
/// touches, so `version` and `config init` work even when a record's format
/// in the config is invalid.
fn run(command: Command, config: &config::Config, out: &mut dyn Write) -> Result<()> {
    let stamp = build_stamp(config);
    match command {
        Command::Save {
            record,
            assignments,
        } => match record {
            RecordKind::Ingame => {
                commands::save(&mut ingame_store(config)?, &assignments, &stamp, out)
            }
            RecordKind::Settings => {
                commands::save(&mut settings_store(config)?, &assignments, &stamp, out)
            }
        },
        Command::Load { record } => match record {
            RecordKind::Ingame => commands::load(&mut ingame_store(config)?, out),
            RecordKind::Settings => commands::load(&mut settings_store(config)?, out),
        },
        Command::Delete { record } => match record {
            RecordKind::Ingame => commands::delete(&mut ingame_store(config)?, out),
            RecordKind::Settings => commands::delete(&mut settings_store(config)?, out),
        },
        Command::Info { record } => match record {
            RecordKind::Ingame => commands::info(&ingame_store(config)?, out),
            RecordKind::Settings => commands::info(&settings_store(config)?, out),
        },
        Command::Demo => {
            // Both descriptors are built before either store does any I/O.
            let mut ingame = ingame_store(config)?;
            let mut settings = settings_store(config)?;
            commands::demo(&mut ingame, &mut settings, &stamp, out)
        }
        Command::Version => print_version(out),
        Command::Config(ConfigCommand::Init) => init_config(config, out),
    }
}

fn ingame_store(config: &config::Config) -> Result<RecordStore<IngameData, storage::Resolver>> {
    storage::store_from_config(config, config.ingame.as_ref())
}

fn settings_store(
    config: &config::Config,
) -> Result<RecordStore<UserSettingsData, storage::Resolver>> {
    storage::store_from_config(config, config.settings.as_ref())
}

fn init_tracing() {
    // Respect user-provided filters, default to info to avoid noisy stdout.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(io::stderr);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn build_stamp(config: &config::Config) -> BuildStamp {
    BuildStamp {
        app_version: config
            .app_version
            .clone()
            .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string()),
        test_build: config.test_build,
    }
}

fn print_version(out: &mut dyn Write) -> Result<()> {
    writeln!(out, "keepsake {}", env!("CARGO_PKG_VERSION"))?;
    Ok(())
}

fn init_config(config: &config::Config, out: &mut dyn Write) -> Result<()> {
    let path = config::write_default_if_missing(config)?;
    writeln!(out, "Config initialized at {}", path.display())?;
    Ok(())
}
