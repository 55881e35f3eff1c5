use std::path::PathBuf;
use std::process::ExitCode;

use tracing::info;
use tracing_subscriber::EnvFilter;

use empcheck::config::{Config, Profile};
use empcheck::core::Result;
use empcheck::{probe, report};

/// Environment variable overriding the per-profile log filter.
const LOG_ENV_VAR: &str = "EMPCHECK_LOG";

const USAGE: &str = "Usage: empcheck [OPTIONS]

Runs the Employee Management System database check and writes the
diagnostic page as HTML.

Options:
    --profile <development|production>   Select the configuration profile
                                         (default: $EMPCHECK_PROFILE or development)
    --config <path>                      Read connection overrides from a TOML file
    --output <path>                      Write the page to a file instead of stdout
    --help                               Show this message
";

#[derive(Debug, Default, PartialEq)]
struct CliArgs {
    profile: Option<String>,
    config: Option<PathBuf>,
    output: Option<PathBuf>,
    help: bool,
}

fn parse_args(args: &[String]) -> std::result::Result<CliArgs, String> {
    let mut parsed = CliArgs::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--profile" => {
                parsed.profile = Some(
                    iter.next()
                        .ok_or("--profile requires a value")?
                        .to_string(),
                );
            }
            "--config" => {
                parsed.config =
                    Some(PathBuf::from(iter.next().ok_or("--config requires a path")?));
            }
            "--output" => {
                parsed.output =
                    Some(PathBuf::from(iter.next().ok_or("--output requires a path")?));
            }
            "--help" | "-h" => parsed.help = true,
            other => return Err(format!("unknown option '{}'", other)),
        }
    }
    Ok(parsed)
}

fn init_logging(profile: Profile) {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(profile.default_log_filter()));
    // The page goes to stdout; keep all logging on stderr.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(args: CliArgs) -> Result<bool> {
    let profile = match &args.profile {
        Some(name) => Profile::from_name(name)?,
        None => Profile::from_env()?,
    };
    init_logging(profile);

    let config = Config::load(profile, args.config.as_deref())?;
    let report = probe::run(&config).await;
    let page = report::render(&report);

    match &args.output {
        Some(path) => {
            std::fs::write(path, &page)?;
            info!(path = %path.display(), "Diagnostic page written");
        }
        None => print!("{}", page),
    }

    Ok(report.connection_ok())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let args = match parse_args(&args) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("error: {}", message);
            eprint!("{}", USAGE);
            return ExitCode::from(2);
        }
    };
    if args.help {
        print!("{}", USAGE);
        return ExitCode::SUCCESS;
    }

    match run(args).await {
        // The page itself reports query failures; only a failed
        // connection is terminal for the caller.
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}
