//! Backfill tool: copy historical legacy documents into the target
//! relational store, one pass per selected entity type.
//!
//! Exit codes: 0 complete, 1 unexpected failure, 2 precondition not
//! met (guarded environment, no usable legacy connection).

use std::path::Path;
use std::process;

use clap::Parser;
use tracing::error;

use stride_core::errors::{MigrateError, MigrateResult};
use stride_migrate::backfill::{run_backfill, BackfillOptions};
use stride_migrate::cli::{init_tracing, EntityFlags, ScopeFlags, StoreFlags};
use stride_migrate::preflight;
use stride_migrate::validate_catalog;
use stride_storage::TargetStore;

#[derive(Parser)]
#[command(
    name = "stride-backfill",
    version,
    about = "Copy historical legacy documents into the target relational store"
)]
struct Cli {
    /// Classify records without writing anything.
    #[arg(long)]
    dry_run: bool,
    /// Cap on documents scanned (not documents matched).
    #[arg(long, value_name = "N")]
    limit: Option<usize>,
    #[command(flatten)]
    scope: ScopeFlags,
    #[command(flatten)]
    entities: EntityFlags,
    #[command(flatten)]
    stores: StoreFlags,
}

fn main() {
    process::exit(run());
}

fn run() -> i32 {
    init_tracing();
    let args = Cli::parse();

    if let Err(e) = validate_catalog() {
        error!(target: "backfill", error = %e, "translation catalog invalid");
        return 1;
    }

    match execute(&args) {
        Ok(()) => 0,
        Err(e) => {
            error!(target: "backfill", error = %e, "backfill failed");
            e.exit_code()
        }
    }
}

fn execute(args: &Cli) -> MigrateResult<()> {
    let config = args.stores.build_config();
    preflight::ensure_environment(&config)?;
    let legacy = preflight::ensure_legacy(&config)?;
    let target = TargetStore::open(
        Path::new(config.effective_target_db_path()),
        config.read_pool_size,
    )
    .map_err(MigrateError::from)?;

    let opts = BackfillOptions {
        dry_run: args.dry_run,
        limit: args.limit,
        user_filter: args.scope.user_id.clone(),
        pillar_filter: args.scope.pillar.clone(),
    };

    for entity in args.entities.selected() {
        run_backfill(entity, &legacy, &target, &opts)?;
    }
    Ok(())
}
