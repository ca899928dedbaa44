use clap::{Parser, Subcommand, ValueEnum};

/// CLI surface definition for the sample save manager.
#[derive(Parser, Debug)]
#[command(
    name = "keepsake",
    about = "Save, load and delete application records on disk",
    version,
    propagate_version = true
)]
pub struct Cli {
    /// Optional subcommand; defaults to running the demo when absent.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Save a record, optionally changing fields first (e.g. `highscore=250`).
    Save {
        record: RecordKind,
        #[arg(value_name = "FIELD=VALUE")]
        assignments: Vec<String>,
    },
    /// Load a record and print it.
    Load { record: RecordKind },
    /// Delete a record's file and reset it to defaults.
    Delete { record: RecordKind },
    /// Show where and how a record is stored.
    Info { record: RecordKind },
    /// Save both records with defaults, then load them back.
    Demo,
    /// Print version and exit.
    Version,
    /// Manage CLI configuration.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// Scores (encrypted binary by default).
    Ingame,
    /// Audio and language preferences (XML by default).
    Settings,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigCommand {
    /// Create a default config file if one does not exist.
    Init,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_save_with_assignments() {
        let cli = Cli::try_parse_from(["keepsake", "save", "ingame", "highscore=250"])
            .expect("parse should succeed");
        assert_eq!(
            cli.command,
            Some(Command::Save {
                record: RecordKind::Ingame,
                assignments: vec!["highscore=250".into()],
            })
        );
    }

    #[test]
    fn defaults_to_demo_when_missing_subcommand() {
        let cli = Cli::try_parse_from(["keepsake"]).expect("parse should succeed");
        assert_eq!(cli.command, None);
    }

    #[test]
    fn parses_record_kinds() {
        let cli = Cli::try_parse_from(["keepsake", "delete", "settings"])
            .expect("parse should succeed");
        assert_eq!(
            cli.command,
            Some(Command::Delete {
                record: RecordKind::Settings
            })
        );
        assert!(Cli::try_parse_from(["keepsake", "load", "inventory"]).is_err());
    }

    #[test]
    fn parses_config_init_subcommand() {
        let cli =
            Cli::try_parse_from(["keepsake", "config", "init"]).expect("parse should succeed");
        assert_eq!(cli.command, Some(Command::Config(ConfigCommand::Init)));
    }
}
