//! Command-line URL inspector.
//!
//! Parses a URL, optionally resolves it against `--base`, optionally converts
//! its hostname to ASCII, and prints a field dump followed by a JSON record.
//!
//! # Usage
//!
//! ```bash
//! urlscope 'https://a:b@example.com:8080/p%20ath?x=1&x=2#frag'
//! urlscope --base http://example.com/a/b/c ../g
//! URLSCOPE_LOG=debug urlscope --idna 'http://straße.de/'
//! ```

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;
use urlscope::{
    inspect, ConfigError, InspectConfig, Inspection, TextDump, UrlReport, LOG_ENV_VAR, USAGE,
};

/// Exit code for command-line errors.
const EXIT_USAGE: u8 = 1;

/// Exit code for parse and hostname conversion failures.
const EXIT_FAILURE: u8 = 2;

fn main() -> ExitCode {
    init_tracing();

    let config = match InspectConfig::from_env() {
        Ok(config) => config,
        Err(ConfigError::HelpRequested) => {
            println!("{USAGE}");
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("error: {e}");
            eprintln!("{USAGE}");
            return ExitCode::from(EXIT_USAGE);
        }
    };

    println!("VERSION:{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("parsing {:?}", config.input);
    if let Some(base) = &config.base {
        println!();
        println!("parsing base {base:?}");
        println!();
        println!("resolving URLs");
    }

    match inspect(&config) {
        Ok(inspection) => match print_inspection(&inspection) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("error: encode JSON record: {e}");
                ExitCode::from(EXIT_FAILURE)
            }
        },
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

fn print_inspection(inspection: &Inspection) -> Result<(), serde_json::Error> {
    let json = UrlReport::from(&inspection.url).to_json()?;
    print!("{}", TextDump(&inspection.url));
    println!("JSON:{json}");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
