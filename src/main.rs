use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use srt::cli::{orchestration, Cli};
use srt::{ui, SrtError};

/// Console logging on stderr, stdout carries command output.
///
/// `RUST_LOG` wins over `--debug`.
fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_filter(filter),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    if let Err(e) = orchestration::run(cli) {
        ui::display_error(&format!("{:#}", e));
        if e.downcast_ref::<SrtError>().is_some_and(SrtError::is_tag_error) {
            ui::display_status("Tags look like v<major>.<minor>.<patch>[-<name><number>]*, e.g. v4.4.115-rt38");
        }
        std::process::exit(1);
    }
}
