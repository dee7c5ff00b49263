//! Command line interface built on clap.
//!
//! [`Cli`] carries the global `--config`, `--database` and `--verbose` flags;
//! [`Command`] lists the subcommands: CSV load, interactive entry, lifecycle
//! transitions, `show`, `report` and `demo`.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

use crate::lifecycle::WorkOrderId;

/// obras: load and track the urban public works observatory dataset.
#[derive(Debug, Parser)]
#[command(name = "obras", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file (default: obras.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// SQLite database to use. Overrides the config file and OBRAS_DATABASE.
    #[arg(long, global = true)]
    pub database: Option<PathBuf>,

    /// Enable debug output.
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load the CSV export into the database.
    Load {
        /// CSV path (default: csv_path from the configuration).
        #[arg(long)]
        file: Option<PathBuf>,

        /// Field delimiter.
        #[arg(long)]
        delimiter: Option<char>,

        /// File encoding (utf-8, latin-1).
        #[arg(long)]
        encoding: Option<String>,

        /// Load even if the database already holds work orders.
        #[arg(long, default_value_t = false)]
        force: bool,
    },

    /// Create a work order interactively.
    New,

    /// Begin contracting for a work order in stage NEW.
    Contract {
        id: WorkOrderId,
        /// Contracting type, e.g. "Licitación Pública".
        contracting_type: String,
        /// Contracting number.
        number: String,
    },

    /// Award the work order to a company.
    Award {
        id: WorkOrderId,
        company: String,
        /// Administrative file number.
        file_number: String,
        /// Company tax id (CUIT).
        #[arg(long)]
        tax_id: Option<String>,
    },

    /// Start works on an awarded order.
    Begin {
        id: WorkOrderId,
        /// Funding source.
        funding: String,
        /// Initial workforce.
        workforce: u32,
        /// Start date (YYYY-MM-DD).
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Planned end date (YYYY-MM-DD).
        #[arg(long)]
        end: Option<NaiveDate>,
    },

    /// Record the progress percentage (0 to 100).
    Progress { id: WorkOrderId, percent: Decimal },

    /// Extend the duration by a number of months.
    Extend {
        id: WorkOrderId,
        #[arg(allow_negative_numbers = true)]
        months: i64,
    },

    /// Add workers.
    Staff {
        id: WorkOrderId,
        #[arg(allow_negative_numbers = true)]
        workers: i64,
    },

    /// Finish the work order.
    Finish { id: WorkOrderId },

    /// Rescind the work order.
    Rescind { id: WorkOrderId },

    /// Print the work order as JSON.
    Show { id: WorkOrderId },

    /// Print the indicators.
    Report {
        /// Emit the indicators as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Run the built-in lifecycle demonstration.
    Demo,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    const ID: &str = "7c9e6679-7425-40de-944b-e07fc1f90ae7";

    #[test]
    fn cli_parses_load_subcommand() {
        let cli = Cli::parse_from([
            "obras",
            "load",
            "--file",
            "obras.csv",
            "--delimiter",
            ",",
            "--encoding",
            "latin-1",
        ]);
        match cli.command {
            Command::Load {
                file,
                delimiter,
                encoding,
                force,
            } => {
                assert_eq!(file, Some(PathBuf::from("obras.csv")));
                assert_eq!(delimiter, Some(','));
                assert_eq!(encoding.as_deref(), Some("latin-1"));
                assert!(!force);
            }
            _ => panic!("expected Load command"),
        }
    }

    #[test]
    fn cli_parses_global_flags() {
        let cli = Cli::parse_from([
            "obras",
            "--config",
            "custom.toml",
            "--database",
            "/tmp/obras.db",
            "--verbose",
            "report",
        ]);
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        assert_eq!(cli.database, Some(PathBuf::from("/tmp/obras.db")));
        assert!(matches!(cli.command, Command::Report { json: false }));
    }

    #[test]
    fn cli_parses_begin_with_dates() {
        let cli = Cli::parse_from([
            "obras", "begin", ID, "GCBA", "10", "--start", "2025-01-01", "--end", "2025-06-01",
        ]);
        match cli.command {
            Command::Begin {
                id,
                funding,
                workforce,
                start,
                end,
            } => {
                assert_eq!(id.to_string(), ID);
                assert_eq!(funding, "GCBA");
                assert_eq!(workforce, 10);
                assert_eq!(start, NaiveDate::from_ymd_opt(2025, 1, 1));
                assert_eq!(end, NaiveDate::from_ymd_opt(2025, 6, 1));
            }
            _ => panic!("expected Begin command"),
        }
    }

    #[test]
    fn cli_parses_progress_as_decimal() {
        let cli = Cli::parse_from(["obras", "progress", ID, "33.5"]);
        match cli.command {
            Command::Progress { percent, .. } => assert_eq!(percent, Decimal::new(335, 1)),
            _ => panic!("expected Progress command"),
        }
    }

    #[test]
    fn negative_increments_reach_the_lifecycle() {
        let cli = Cli::parse_from(["obras", "extend", ID, "-2"]);
        assert!(matches!(cli.command, Command::Extend { months: -2, .. }));
    }

    #[test]
    fn cli_rejects_malformed_ids() {
        assert!(Cli::try_parse_from(["obras", "finish", "not-an-id"]).is_err());
    }

    #[test]
    fn cli_verify() {
        Cli::command().debug_assert();
    }
}
