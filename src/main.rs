use std::process;

use clap::CommandFactory;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use check_ganglia::cli::{self, Cli, Request};
use check_ganglia::{check, icinga, Resource, Runner, ServiceState, PLUGIN_NAME};

fn main() {
    init_logging();

    let request = match cli::parse_from(std::env::args_os()) {
        Ok(request) => request,
        Err(err) => {
            debug!(error = %err, "invalid arguments");
            println!("{}", cli::USAGE);
            process::exit(ServiceState::Unknown.exit_code());
        }
    };

    match request {
        Request::IcingaCommand => match icinga::check_command_config("ganglia", &Cli::command()) {
            Ok(config) => {
                println!("{}", config.trim());
                process::exit(0);
            }
            Err(err) => Resource::new(PLUGIN_NAME, ServiceState::Unknown)
                .with_description(err.to_string())
                .print_and_exit(),
        },
        Request::Check(invocation) => Runner::new(PLUGIN_NAME)
            .on_error(check::unknown)
            .safe_run(|| check(&invocation))
            .print_and_exit(),
    }
}

// Logs go to stderr; stdout carries nothing but the status line.
fn init_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
