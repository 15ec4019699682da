use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod scan;

/// Re-register every running envoy-shim with the control plane.
///
/// Each instance is re-run with `--reload` appended. Existing instances are
/// never signalled or stopped.
#[derive(Parser, Debug)]
#[command(name = "shim-resync", version)]
struct Cli {
    /// Binary name of the shim to look for
    #[arg(long, default_value = "envoy-shim")]
    binary: String,

    /// Where to scan for processes
    #[arg(long, default_value = "/proc")]
    proc_root: PathBuf,

    /// Only list the commands that would run
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let instances = scan::find_instances(&cli.proc_root, &cli.binary, std::process::id())
        .with_context(|| format!("scanning {}", cli.proc_root.display()))?;
    info!("Found {} running {} instances", instances.len(), cli.binary);

    let mut failures = 0;
    for instance in &instances {
        let argv = instance.reload_argv();
        info!(pid = instance.pid, command = ?argv, "Reloading");
        if cli.dry_run {
            continue;
        }

        let status = Command::new(&argv[0]).args(&argv[1..]).status().await;
        match status {
            Ok(status) if status.success() => {}
            Ok(status) => {
                error!(pid = instance.pid, %status, "Reload exited unsuccessfully");
                failures += 1;
            }
            Err(e) => {
                error!(pid = instance.pid, "Failed to start reload: {}", e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        bail!("{} of {} reloads failed", failures, instances.len());
    }
    Ok(())
}
