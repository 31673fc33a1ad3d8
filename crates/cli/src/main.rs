use crate::{
    commands::{TRY_HELP, TailArgs, is_informational},
    connect::connect,
    env::EnvManager,
    error::CliError,
    shutdown::{ExitCode, ShutdownCoordinator},
};
use clap::Parser;
use engine_config::settings::Settings;
use engine_runtime::tail::TailPoller;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod commands;
mod connect;
mod env;
mod error;
mod shutdown;

#[tokio::main]
async fn main() {
    let args = match TailArgs::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            if !is_informational(err.kind()) {
                eprintln!("{TRY_HELP}");
            }
            std::process::exit(ExitCode::Success.as_i32());
        }
    };

    init_tracing(args.verbose);

    let code = match run(args).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err}");
            err.exit_code()
        }
    };

    std::process::exit(code.as_i32());
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(args: TailArgs) -> Result<ExitCode, CliError> {
    let mut env = EnvManager::from_process();
    if let Some(path) = &args.env_file {
        env.load_from_file(path)?;
    }

    let settings = Settings::resolve(&args.to_options(), env.all())?;

    let shutdown = ShutdownCoordinator::new(CancellationToken::new());
    shutdown.register_handlers();
    let cancel = shutdown.cancel_token();

    let adapter = tokio::select! {
        adapter = connect(settings.connection, args.password) => adapter?,
        _ = cancel.cancelled() => return Ok(ExitCode::ShutdownRequested),
    };

    let mut poller = TailPoller::new(adapter, settings.poll, std::io::stdout());
    match poller.run(cancel).await {
        Ok(()) if shutdown.is_shutdown_requested() => Ok(ExitCode::ShutdownRequested),
        Ok(()) => Ok(ExitCode::Success),
        Err(err) if err.is_broken_pipe() => {
            info!("Output closed, stopping");
            Ok(ExitCode::Success)
        }
        Err(err) => {
            warn!(watermark = ?poller.watermark().current(), "Tail stopped on error");
            Err(err.into())
        }
    }
}
