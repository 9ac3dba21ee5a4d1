use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;

use pbx_core::Pbx;
use pbx_server::{error::ServerError, logging, server};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "PBX telephone switch simulator",
    long_about = "Runs a line-oriented TCP PBX: extensions register on \
                  connect and exchange pickup/hangup/dial/chat commands."
)]
struct Args {
    /// Port to listen on.
    #[arg(short, long)]
    port: u16,

    /// Maximum number of simultaneously registered extensions.
    #[arg(short, long, default_value_t = pbx_core::DEFAULT_MAX_EXTENSIONS)]
    extensions: usize,

    /// Mirror logs to this file in addition to stdout.
    #[arg(long)]
    log_file: Option<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let _log_guard = logging::init(args.log_file.as_deref());

    let listener = match server::bind(args.port) {
        Ok(listener) => listener,
        Err(ServerError::Bind(e)) => {
            tracing::error!(port = args.port, error = %e, "failed to bind listening socket");
            return ExitCode::FAILURE;
        }
    };

    let pbx = Arc::new(Pbx::with_capacity(args.extensions));

    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_writer = shutdown.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        shutdown_writer.store(true, Ordering::SeqCst);
    }) {
        tracing::warn!(error = %e, "failed to install Ctrl+C handler");
    }

    server::serve(listener, pbx, shutdown);
    ExitCode::SUCCESS
}
