use clap::error::ErrorKind;
use clap::Parser;
use ezid::cli::{run, Cli, USAGE};
use ezid::EzidError;
use std::process::ExitCode;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            eprint!("{}\n{}", e, USAGE);
            return ExitCode::from(1);
        }
    };

    init_tracing(cli.verbose);

    let invocation = match cli.invocation() {
        Ok(invocation) => invocation,
        Err(e) => {
            eprint!("error: {}\n\n{}", e, USAGE);
            return ExitCode::from(1);
        }
    };

    match run(&cli, invocation).and_then(|output| output.render(cli.format)) {
        Ok(text) => {
            println!("{}", text);
            ExitCode::SUCCESS
        }
        Err(e) => {
            report(&e);
            ExitCode::from(1)
        }
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "warn".into()),
        1 => tracing_subscriber::EnvFilter::new("debug"),
        _ => tracing_subscriber::EnvFilter::new("trace"),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// HTTP failures print status, reason and body; everything else its message
fn report(error: &anyhow::Error) {
    match error.downcast_ref::<EzidError>() {
        Some(EzidError::Request {
            status,
            reason,
            body,
            ..
        }) => {
            eprintln!("{} {}", status, reason);
            if !body.is_empty() {
                eprintln!("{}", body.trim_end());
            }
        }
        _ => eprintln!("error: {:#}", error),
    }
}
