//! Operator CLI for the matching core.
//!
//! # Responsibility
//! - Wire configuration, logging, the SQLite record store and the task
//!   catalog together for quick local inspection.
//! - Keep output deterministic apart from the outreach sample itself.
//!
//! Usage:
//! - `aidmatch_cli catalog`
//! - `aidmatch_cli outreach <db_path> <task_label> [max_count]`
//! - `aidmatch_cli task-counts <db_path>`
//!
//! Dispatch settings come from the environment (see `DispatchConfig::from_env`).
//! Set `AIDMATCH_LOG_DIR` to an absolute path to enable file logging.

use aidmatch_core::db::{open_db, share, SharedConnection};
use aidmatch_core::{
    core_version, default_log_level, init_logging, DispatchConfig, RecordFilter, RequestService,
    SqliteRecordStore, StaticGeocoder, StoreAuditSink, TaskCatalog, VolunteerSampler,
    VolunteerService,
};
use log::{error, info};
use std::error::Error;
use std::process::ExitCode;
use std::sync::Arc;

const DEFAULT_OUTREACH_COUNT: usize = 10;

type CliResult = Result<(), Box<dyn Error>>;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    if let Ok(log_dir) = std::env::var("AIDMATCH_LOG_DIR") {
        if let Err(err) = init_logging(default_log_level().as_str(), &log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    info!(
        "event=cli_command module=cli status=start command={}",
        args.first().map_or("catalog", String::as_str)
    );
    let result = match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        [] | ["catalog"] => print_catalog(),
        ["outreach", db_path, task_label] => outreach(db_path, task_label, DEFAULT_OUTREACH_COUNT).await,
        ["outreach", db_path, task_label, max_count] => match max_count.parse() {
            Ok(max_count) => outreach(db_path, task_label, max_count).await,
            Err(_) => Err(format!("max_count must be a non-negative integer, got `{max_count}`").into()),
        },
        ["task-counts", db_path] => task_counts(db_path).await,
        _ => Err("usage: aidmatch_cli [catalog | outreach <db> <task> [max] | task-counts <db>]".into()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_command module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn print_catalog() -> CliResult {
    let catalog = TaskCatalog::builtin()?;
    println!("aidmatch_core version={}", core_version());
    for task in catalog.tasks() {
        let marker = if catalog.catch_all() == Some(task) {
            " (catch-all)"
        } else {
            ""
        };
        println!(
            "task={:?}{marker} prefixes={} predicates={:?}",
            task.id(),
            task.capability_prefixes().len(),
            task.predicates().iter().map(|p| p.name()).collect::<Vec<_>>()
        );
    }
    Ok(())
}

struct Wiring {
    config: Arc<DispatchConfig>,
    catalog: Arc<TaskCatalog>,
    conn: SharedConnection,
}

fn wire(db_path: &str) -> Result<Wiring, Box<dyn Error>> {
    Ok(Wiring {
        config: Arc::new(DispatchConfig::from_env()?),
        catalog: Arc::new(TaskCatalog::builtin()?),
        conn: share(open_db(db_path)?),
    })
}

impl Wiring {
    fn store(&self, table: &str, view: &str) -> SqliteRecordStore {
        SqliteRecordStore::new(Arc::clone(&self.conn), table).with_view(view, RecordFilter::All)
    }

    fn audit(&self) -> StoreAuditSink<SqliteRecordStore> {
        StoreAuditSink::new(SqliteRecordStore::new(
            Arc::clone(&self.conn),
            self.config.errors_table.as_str(),
        ))
    }
}

async fn outreach(db_path: &str, task_label: &str, max_count: usize) -> CliResult {
    let wiring = wire(db_path)?;
    let task = wiring
        .catalog
        .lookup_by_label(task_label)
        .cloned()
        .ok_or_else(|| format!("unknown task `{task_label}`"))?;

    let service = VolunteerService::new(
        wiring.store(&wiring.config.volunteers_table, &wiring.config.volunteers_view),
        StaticGeocoder::new(),
        wiring.audit(),
        VolunteerSampler::from_os(),
        Arc::clone(&wiring.catalog),
        Arc::clone(&wiring.config),
    );
    for volunteer in service.find_outreach_candidates(&task, max_count).await? {
        println!("volunteer_id={}", volunteer.into_record().id());
    }
    Ok(())
}

async fn task_counts(db_path: &str) -> CliResult {
    let wiring = wire(db_path)?;
    let service = RequestService::new(
        wiring.store(&wiring.config.requests_table, &wiring.config.requests_view),
        StaticGeocoder::new(),
        wiring.audit(),
        Arc::clone(&wiring.catalog),
        Arc::clone(&wiring.config),
    );
    for (volunteer_id, count) in service.volunteer_task_counts().await? {
        println!("volunteer_id={volunteer_id} open_requests={count}");
    }
    Ok(())
}
