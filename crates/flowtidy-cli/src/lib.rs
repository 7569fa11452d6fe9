//! CLI logic for the flowtidy canvas arranger.
//!
//! [`run`] wires the configuration, the NiFi transport and the
//! [`Arranger`] together. Every abort condition is a [`CliError`] with its
//! own process exit code.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;
pub use config::{ConfigError, apply_overrides, load_config};

use std::io::{self, Write};

use log::{info, warn};
use thiserror::Error;

use flowtidy::{Arranger, FlowtidyError, plan::LayoutPlan, reconcile::CancelFlag};
use flowtidy_client::{ClientError, NifiClient};

/// Exit code for a successful run.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code for invalid command-line usage.
pub const EXIT_USAGE: i32 = 1;

/// Errors that abort a CLI run.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Transport(#[from] ClientError),

    #[error(transparent)]
    Run(#[from] FlowtidyError),

    #[error("{failed} of {total} components in process group `{group_id}` were not repositioned")]
    Incomplete {
        group_id: String,
        failed: usize,
        total: usize,
    },

    #[error("Failed to write the layout plan: {0}")]
    Output(#[source] io::Error),
}

impl CliError {
    /// Returns the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Run(FlowtidyError::Connectivity(_)) => 2,
            CliError::Run(FlowtidyError::Snapshot { .. }) => 3,
            CliError::Config(_) | CliError::Run(FlowtidyError::Config(_)) => 4,
            CliError::Run(FlowtidyError::Catalog(_) | FlowtidyError::Graph(_)) => 5,
            CliError::Run(FlowtidyError::Layout(_)) => 6,
            CliError::Incomplete { .. } => 7,
            CliError::Transport(_) => 8,
            CliError::Output(_) => 9,
        }
    }
}

/// Run the flowtidy CLI application
///
/// Loads the configuration, connects to NiFi and arranges the process group
/// named in `args`. With `--dry-run` the planned positions are printed to
/// stdout and nothing is written back.
///
/// Each component that fails to update is logged by the reconciler; the run
/// adds one summary warning and fails only with `--strict`.
///
/// # Errors
///
/// Returns [`CliError`] for configuration, transport, snapshot, graph and
/// layout failures, for a failed write of the dry-run plan, and for
/// incomplete write-back under `--strict`.
pub fn run(args: &Args) -> Result<(), CliError> {
    info!(
        api_root = args.api_root.as_str(),
        group_id = args.group_id.as_str();
        "Arranging process group"
    );

    let mut app_config = config::load_config(args.config.as_ref())?;
    config::apply_overrides(&mut app_config, args);
    app_config.validate().map_err(FlowtidyError::from)?;

    let mut client = NifiClient::builder(&args.api_root).timeout(app_config.client().timeout());
    if let Some(token) = &args.token {
        client = client.bearer_token(token);
    }
    let client = client.build()?;

    let arranger = Arranger::new(app_config);

    if args.dry_run {
        let plan = arranger.fetch_plan(&client, &args.group_id)?;
        write_plan(&mut io::stdout().lock(), &plan).map_err(CliError::Output)?;
        info!(positions = plan.len(); "Dry run, nothing written back");
        return Ok(());
    }

    let report = arranger.arrange(&client, &args.group_id, &CancelFlag::new())?;

    if report.is_complete() {
        info!(components = report.len(); "Process group arranged successfully");
        return Ok(());
    }

    let failed = report.len() - report.submitted();
    if args.strict {
        return Err(CliError::Incomplete {
            group_id: report.group_id().to_string(),
            failed,
            total: report.len(),
        });
    }
    warn!(
        failed,
        total = report.len();
        "Some components were left in place"
    );
    Ok(())
}

/// Write one `KIND id x y` line per planned position.
///
/// # Errors
///
/// Returns the I/O error of the underlying writer.
pub fn write_plan(writer: &mut impl Write, plan: &LayoutPlan) -> io::Result<()> {
    for planned in plan {
        let position = planned.position();
        writeln!(
            writer,
            "{} {} {} {}",
            planned.identity().kind(),
            planned.identity().id(),
            position.x(),
            position.y()
        )?;
    }
    writer.flush()
}
