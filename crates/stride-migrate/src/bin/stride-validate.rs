//! Parity validator: read-only comparison of the legacy and target
//! stores, usable as an automated gate before retiring a legacy path.
//!
//! Exit codes: 0 zero drift across all selected entity types, 3 drift
//! found, 1 unexpected failure, 2 precondition not met.

use std::path::Path;
use std::process;

use clap::Parser;
use tracing::{error, info};

use stride_core::errors::{MigrateError, MigrateResult};
use stride_migrate::cli::{init_tracing, EntityFlags, ScopeFlags, StoreFlags};
use stride_migrate::parity::{run_parity, ParityOptions};
use stride_migrate::preflight;
use stride_migrate::validate_catalog;
use stride_storage::TargetStore;

/// Exit code for "drift found" — distinct from crashes (1) and failed
/// preconditions (2) so CI gates can tell them apart.
const EXIT_DRIFT: i32 = 3;

#[derive(Parser)]
#[command(
    name = "stride-validate",
    version,
    about = "Report count, recency, and field-level drift between the legacy and target stores"
)]
struct Cli {
    /// How many of the most recent legacy documents to field-compare.
    #[arg(long, value_name = "N", default_value_t = 50)]
    sample: usize,
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
        error!(target: "parity", error = %e, "translation catalog invalid");
        return 1;
    }

    match execute(&args) {
        Ok(clean) => {
            if clean {
                0
            } else {
                EXIT_DRIFT
            }
        }
        Err(e) => {
            error!(target: "parity", error = %e, "validation failed");
            e.exit_code()
        }
    }
}

fn execute(args: &Cli) -> MigrateResult<bool> {
    let config = args.stores.build_config();
    preflight::ensure_environment(&config)?;
    let legacy = preflight::ensure_legacy(&config)?;
    let target = TargetStore::open(
        Path::new(config.effective_target_db_path()),
        config.read_pool_size,
    )
    .map_err(MigrateError::from)?;

    let opts = ParityOptions {
        sample_size: args.sample,
        user_filter: args.scope.user_id.clone(),
        pillar_filter: args.scope.pillar.clone(),
    };

    // Every selected entity is compared even after drift is found —
    // one run surfaces all of it.
    let mut clean = true;
    for entity in args.entities.selected() {
        let report = run_parity(entity, &legacy, &target, &opts)?;
        clean &= report.is_clean();
    }

    info!(target: "parity", clean = clean, "validation complete");
    Ok(clean)
}
