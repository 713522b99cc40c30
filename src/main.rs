//! ixctl entry point: argument parsing, catalog open (with interactive
//! password prompt on the client/server backends), progress/output wiring,
//! and exit-code mapping (spec §6).

use std::io::IsTerminal;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use ixctl::backend::{Catalog, CatalogUri};
use ixctl::cli::Cli;
use ixctl::error::Error;
use ixctl::progress::{NullProgress, Progress, ProgressWriter};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let pipe = cli.pipe || !std::io::stdout().is_terminal();
    let started = Instant::now();

    match run(&cli) {
        Ok(()) => {
            if cli.time {
                report_elapsed(started.elapsed().as_secs_f64(), pipe);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            if pipe {
                eprintln!("{}", e.to_structured_json());
            } else if !cli.quiet {
                eprintln!("ERROR: {e}");
            }
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(cli: &Cli) -> Result<(), Error> {
    let uri = cli.parse_database_uri()?;
    let ops = cli.to_operations()?;

    let mut cat = open_with_password_retry(uri)?;

    let mut null_progress = NullProgress;
    let mut writer_progress = ProgressWriter::new("ixctl", cli.pipe);
    let progress: &mut dyn Progress = if cli.quiet { &mut null_progress } else { &mut writer_progress };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let outcome = ixctl::operations::run(&ops, &mut cat, progress, &mut out)?;

    let checked = ops.check_integrity || ops.check_orphaned || ops.check_duplicates || ops.check;
    if checked && outcome.integrity_findings > 0 {
        return Err(Error::IntegrityViolation {
            count: outcome.integrity_findings,
            detail: format!(
                "{} orphaned row group(s), {} duplicate storage name(s)",
                outcome.orphans_found, outcome.duplicates_found
            ),
        });
    }

    Ok(())
}

/// Open `uri`, prompting for a password on the client/server backends if the
/// backend rejects the connection for lack of one (spec §6: the password
/// segment of `mariadb:`/`postgresql:` URIs is optional on the command line).
fn open_with_password_retry(uri: CatalogUri) -> Result<Catalog, Error> {
    match Catalog::open(&uri) {
        Ok(cat) => Ok(cat),
        Err(Error::AuthorizationRequired { server }) if !uri.is_embedded() => {
            let prompt = format!("Password for {server}: ");
            let password = rpassword::prompt_password(prompt).map_err(Error::Io)?;
            Catalog::open(&uri.with_password(password))
        }
        Err(e) => Err(e),
    }
}

fn report_elapsed(secs: f64, pipe: bool) {
    if pipe {
        println!("{}", serde_json::json!({ "elapsed_secs": secs }));
    } else {
        eprintln!("ixctl: {secs:.3}s");
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    if quiet {
        return;
    }

    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("ixctl=info"),
            2 => EnvFilter::new("ixctl=debug"),
            _ => EnvFilter::new("ixctl=trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}
