mod cli;
mod config;
mod demo;
mod entry;
mod error;
mod etl;
mod lifecycle;
mod report;
mod store;
mod ui;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Command};
use config::ObrasConfig;
use entry::ConsoleInput;
use error::ObrasError;
use lifecycle::{WorkLifecycle, WorkOrder, WorkOrderId};
use report::Indicators;
use store::{RecordStore, SqliteStore, WorkOrderFilter};

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli) {
        ui::fatal(&err);
        std::process::exit(1);
    }
}

/// Logs go to stderr; `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

fn run(cli: Cli) -> Result<()> {
    // The demo never touches the configured database.
    if let Command::Demo = cli.command {
        return run_demo();
    }

    let mut config = ObrasConfig::load_from(cli.config.as_deref()).context("loading configuration")?;
    if let Some(database) = cli.database {
        config.database_path = database;
    }
    debug!(?config, "configuration loaded");

    let mut store = SqliteStore::open(&config.database_path)?;

    match cli.command {
        Command::Load {
            file,
            delimiter,
            encoding,
            force,
        } => load(&mut store, &config, file, delimiter, encoding, force),
        Command::New => {
            let lifecycle = WorkLifecycle::new(&store);
            let mut input = ConsoleInput::new();
            let order = entry::new_work_order(&mut input, &store, &lifecycle)
                .context("creating work order")?;
            ui::success(&format!("Work order '{}' created with id {}", order.name(), order.id));
            Ok(())
        }
        Command::Contract {
            id,
            contracting_type,
            number,
        } => transition(&store, id, "begin contracting", |lifecycle, order| {
            lifecycle.begin_contracting(order, &contracting_type, &number)
        }),
        Command::Award {
            id,
            company,
            file_number,
            tax_id,
        } => transition(&store, id, "award", |lifecycle, order| {
            lifecycle.award(order, &company, tax_id.as_deref(), &file_number)
        }),
        Command::Begin {
            id,
            funding,
            workforce,
            start,
            end,
        } => transition(&store, id, "begin", |lifecycle, order| {
            lifecycle.begin(order, start, end, &funding, workforce)
        }),
        Command::Progress { id, percent } => transition(&store, id, "update progress", |lifecycle, order| {
            lifecycle.update_progress(order, percent)
        }),
        Command::Extend { id, months } => transition(&store, id, "extend duration", |lifecycle, order| {
            lifecycle.extend_duration(order, months)
        }),
        Command::Staff { id, workers } => transition(&store, id, "add workforce", |lifecycle, order| {
            lifecycle.add_workforce(order, workers)
        }),
        Command::Finish { id } => transition(&store, id, "finish", |lifecycle, order| lifecycle.finish(order)),
        Command::Rescind { id } => transition(&store, id, "rescind", |lifecycle, order| lifecycle.rescind(order)),
        Command::Show { id } => {
            ui::print_work_order(&store.load(&id)?);
            Ok(())
        }
        Command::Report { json } => {
            let indicators = Indicators::collect(&store).context("collecting indicators")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&indicators)?);
            } else {
                ui::print_indicators(&indicators);
            }
            Ok(())
        }
        Command::Demo => run_demo(),
    }
}

fn load(
    store: &mut SqliteStore,
    config: &ObrasConfig,
    file: Option<std::path::PathBuf>,
    delimiter: Option<char>,
    encoding: Option<String>,
    force: bool,
) -> Result<()> {
    let existing = store.count_where(&WorkOrderFilter::default())?;
    if existing > 0 && !force {
        ui::notice(&format!(
            "The database already holds {existing} work orders, skipping load (use --force to load anyway)"
        ));
        return Ok(());
    }

    let mut source = config.csv_source()?;
    if let Some(file) = file {
        source.path = file;
    }
    if let Some(delimiter) = delimiter {
        source.delimiter = u8::try_from(delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| anyhow!("delimiter must be a single ASCII character, got {delimiter:?}"))?;
    }
    if let Some(encoding) = encoding {
        source.encoding = encoding.parse()?;
    }

    let progress = ui::LoadProgress::start(&source.path.display().to_string());
    match etl::ingest(store, &source, config.batch_size) {
        Ok(report) => {
            progress.complete(&report);
            Ok(())
        }
        Err(err) => {
            progress.fail();
            Err(err).with_context(|| format!("loading {}", source.path.display()))
        }
    }
}

fn transition<F>(store: &SqliteStore, id: WorkOrderId, action: &str, apply: F) -> Result<()>
where
    F: FnOnce(&WorkLifecycle<'_, SqliteStore>, &mut WorkOrder) -> Result<(), ObrasError>,
{
    let lifecycle = WorkLifecycle::new(store);
    let mut order = store.load(&id)?;
    apply(&lifecycle, &mut order).with_context(|| format!("cannot {action} '{}'", order.name()))?;
    ui::success(&format!("{}: {}", order.name(), stage_label(&order)));
    Ok(())
}

fn run_demo() -> Result<()> {
    let store = SqliteStore::in_memory()?;
    let order = demo::run(&store, |step, order| {
        ui::success(&format!("{step} [{}]", stage_label(order)));
    })?;
    ui::print_work_order(&order);
    Ok(())
}

fn stage_label(order: &WorkOrder) -> String {
    order
        .stage()
        .map(|stage| stage.to_string())
        .unwrap_or_else(|| "UNSET".to_string())
}
