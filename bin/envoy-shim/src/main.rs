use anyhow::{Context, Result};
use shim_core::{EndpointRegistrar, RegistrationClient, UnixSocketDialer};
use shim_docker::{DockerClient, DockerDiscovery};
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod cli;

use cli::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();
    init_tracing(cli.log_json);

    let mapping = cli.mapping()?;
    let config = cli.registrar_config()?;
    info!(
        server = %config.server_addr.display(),
        docker = %cli.docker_socket.display(),
        "Starting envoy-shim..."
    );

    // Installed before registering so an early SIGTERM is not lost
    let shutdown = shutdown_signal()?;

    let dialer = UnixSocketDialer::new(config.server_addr.clone(), config.dial_timeout);
    let resolver = DockerDiscovery::new(DockerClient::new(cli.docker_socket.clone()));
    let mut registrar =
        EndpointRegistrar::new(mapping, config, resolver, RegistrationClient::new(dialer));

    if let Err(e) = registrar.run(shutdown).await {
        error!("Registration lifecycle failed: {}", e);
        return Err(e).context(format!("endpoint {}", mapping));
    }

    info!(state = %registrar.state(), "Exiting");
    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Resolves on the first SIGTERM or SIGINT
fn shutdown_signal() -> Result<impl std::future::Future<Output = ()>> {
    let mut terminate = signal(SignalKind::terminate()).context("install SIGTERM handler")?;
    let mut interrupt = signal(SignalKind::interrupt()).context("install SIGINT handler")?;

    Ok(async move {
        tokio::select! {
            _ = terminate.recv() => info!("Received SIGTERM"),
            _ = interrupt.recv() => info!("Received SIGINT"),
        }
    })
}
